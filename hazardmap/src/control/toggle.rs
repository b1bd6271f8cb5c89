//! Toggle controls bound to overlay layers.

use std::sync::Arc;

use crate::layer::Layer;
use crate::map::Map;
use crate::ui::{Legend, ToggleControl};

/// Wiring of one toggle control to the layer it shows and its legend.
pub struct ToggleBinding {
    control: Arc<ToggleControl>,
    layer: Arc<dyn Layer>,
    legend: Option<Arc<Legend>>,
}

impl ToggleBinding {
    /// Bound control.
    pub fn control(&self) -> &ToggleControl {
        &self.control
    }

    /// Bound layer.
    pub fn layer(&self) -> &Arc<dyn Layer> {
        &self.layer
    }

    /// Brings the map and the legend in line with the control state.
    ///
    /// Attaches the layer if the control is checked, detaches it otherwise. Both
    /// are no-ops when the layer already is in the requested state.
    pub fn apply(&self, map: &mut Map) {
        let checked = self.control.is_checked();
        let attached = map.has_layer(self.layer.id());

        if checked && !attached {
            map.add_layer(self.layer.clone());
        } else if !checked && attached {
            map.remove_layer(self.layer.id());
        }

        if let Some(legend) = &self.legend {
            legend.set_visible(checked);
        }
    }
}

/// Routes control changes to the map.
#[derive(Default)]
pub struct ToggleController {
    bindings: Vec<ToggleBinding>,
}

impl ToggleController {
    /// Creates a controller without bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `control` to `layer` and, optionally, a legend.
    ///
    /// Nothing is applied until the control changes.
    pub fn bind(
        &mut self,
        control: Arc<ToggleControl>,
        layer: Arc<dyn Layer>,
        legend: Option<Arc<Legend>>,
    ) {
        log::debug!("Binding '{}' to layer '{}'", control.id(), layer.id());
        self.bindings.push(ToggleBinding {
            control,
            layer,
            legend,
        });
    }

    /// Handles a change of the control with id `control_id`.
    ///
    /// Returns false if no binding exists for the control.
    pub fn set(&self, control_id: &str, checked: bool, map: &mut Map) -> bool {
        let Some(binding) = self.binding(control_id) else {
            log::warn!("No toggle bound to control '{control_id}'");
            return false;
        };

        binding.control.set_checked(checked);
        binding.apply(map);
        true
    }

    /// Binding of the control with id `control_id`.
    pub fn binding(&self, control_id: &str) -> Option<&ToggleBinding> {
        self.bindings
            .iter()
            .find(|binding| binding.control.id() == control_id)
    }

    /// All bindings in bind order.
    pub fn bindings(&self) -> &[ToggleBinding] {
        &self.bindings
    }
}
