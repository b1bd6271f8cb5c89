//! Groups of rendered feature annotations.

use geo_types::MultiPolygon;
use parking_lot::RwLock;

use crate::feature::GeoPosition;
use crate::layer::Layer;
use crate::style::StyleSpec;

/// Geometry of a rendered annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Circle marker centered at a point. The radius comes from the style.
    CircleMarker {
        /// Marker center.
        center: GeoPosition,
    },
    /// Filled region.
    Region {
        /// Region outline.
        area: MultiPolygon<f64>,
    },
}

/// One rendered feature: a shape, its style and the popup shown when the user
/// interacts with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Drawn geometry.
    pub shape: Shape,
    /// Visual style.
    pub style: StyleSpec,
    /// Popup markup bound to the shape.
    pub popup: String,
}

/// Named collection of annotations that is attached to and detached from the
/// map as a whole.
///
/// A group only ever touches its own annotations, so clearing one group never
/// affects another.
pub struct LayerGroup {
    id: String,
    annotations: RwLock<Vec<Annotation>>,
}

impl LayerGroup {
    /// Creates an empty group.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            annotations: RwLock::new(Vec::new()),
        }
    }

    /// Adds one annotation.
    pub fn add(&self, annotation: Annotation) {
        self.annotations.write().push(annotation);
    }

    /// Removes all annotations of this group.
    pub fn clear_layers(&self) {
        self.annotations.write().clear();
    }

    /// Clears the group and fills it with the given annotations in one step.
    pub fn replace(&self, annotations: Vec<Annotation>) {
        let mut current = self.annotations.write();
        current.clear();
        current.extend(annotations);
    }

    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.annotations.read().len()
    }

    /// Returns true if the group holds nothing.
    pub fn is_empty(&self) -> bool {
        self.annotations.read().is_empty()
    }

    /// Copy of the current annotations.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.annotations.read().clone()
    }

    /// Popup markup of the annotation at `index`, as shown on click.
    pub fn popup(&self, index: usize) -> Option<String> {
        self.annotations
            .read()
            .get(index)
            .map(|annotation| annotation.popup.clone())
    }
}

impl Layer for LayerGroup {
    fn id(&self) -> &str {
        &self.id
    }

    fn annotation_count(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl std::fmt::Debug for LayerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerGroup")
            .field("id", &self.id)
            .field("annotations", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{quake_style, SizePolicy};

    fn marker(lat: f64) -> Annotation {
        Annotation {
            shape: Shape::CircleMarker {
                center: GeoPosition::new(lat, 0.0),
            },
            style: quake_style(Some(lat), SizePolicy::Linear),
            popup: format!("<p>{lat}</p>"),
        }
    }

    #[test]
    fn clearing_one_group_keeps_the_other() {
        let weather = LayerGroup::new("weather");
        let quakes = LayerGroup::new("earthquakes");
        weather.add(marker(1.0));
        quakes.add(marker(2.0));
        quakes.add(marker(3.0));

        weather.clear_layers();

        assert!(weather.is_empty());
        assert_eq!(quakes.len(), 2);
        assert_eq!(quakes.annotation_count(), Some(2));
    }

    #[test]
    fn replace_drops_previous_content() {
        let group = LayerGroup::new("earthquakes");
        group.add(marker(1.0));
        group.replace(vec![marker(5.0), marker(6.0)]);

        assert_eq!(group.len(), 2);
        assert_eq!(group.popup(0).as_deref(), Some("<p>5</p>"));
        assert_eq!(group.popup(2), None);
    }
}
