//! Conversion of decoded feeds into layer group content.

use crate::feature::{AlertFeature, FeatureCollection, QuakeFeature};
use crate::layer::{Annotation, Layer, LayerGroup, Shape};
use crate::popup::PopupFormatter;
use crate::style::{alert_style, quake_style, SizePolicy};

/// Builds annotations from features using the style rules and the popup
/// formatter.
#[derive(Debug, Clone, Default)]
pub struct LayerBuilder {
    popups: PopupFormatter,
    size_policy: SizePolicy,
}

/// Features that can be turned into an [`Annotation`].
pub trait Annotate {
    /// Creates the annotation for this feature.
    fn annotate(&self, builder: &LayerBuilder) -> Annotation;
}

impl LayerBuilder {
    /// Creates a new builder.
    pub fn new(popups: PopupFormatter, size_policy: SizePolicy) -> Self {
        Self {
            popups,
            size_policy,
        }
    }

    /// Radius policy used for earthquake markers.
    pub fn size_policy(&self) -> SizePolicy {
        self.size_policy
    }

    /// Replaces the content of `group` with one annotation per feature and
    /// returns the number of rendered annotations.
    ///
    /// An empty collection empties the group and returns 0.
    pub fn build<F: Annotate>(&self, collection: &FeatureCollection<F>, group: &LayerGroup) -> usize {
        let annotations: Vec<Annotation> = collection
            .features
            .iter()
            .map(|feature| feature.annotate(self))
            .collect();
        let count = annotations.len();

        group.replace(annotations);
        log::debug!("Layer group '{}' rebuilt with {count} annotations", group.id());

        count
    }
}

impl Annotate for QuakeFeature {
    fn annotate(&self, builder: &LayerBuilder) -> Annotation {
        Annotation {
            shape: Shape::CircleMarker {
                center: self.position,
            },
            style: quake_style(self.magnitude, builder.size_policy),
            popup: builder.popups.describe_quake(self).into_string(),
        }
    }
}

impl Annotate for AlertFeature {
    fn annotate(&self, builder: &LayerBuilder) -> Annotation {
        Annotation {
            shape: Shape::Region {
                area: self.area.clone(),
            },
            style: alert_style(self.severity.as_deref()),
            popup: builder.popups.describe_alert(self).into_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::GeoPosition;
    use crate::style::Color;

    fn quake(magnitude: f64) -> QuakeFeature {
        QuakeFeature {
            id: None,
            position: GeoPosition::new(10.0, 20.0),
            magnitude: Some(magnitude),
            place: None,
            time_ms: None,
            url: None,
        }
    }

    #[test]
    fn builds_one_marker_per_feature() {
        let collection = FeatureCollection {
            features: vec![quake(7.2), quake(2.1)],
            skipped: 0,
        };
        let group = LayerGroup::new("earthquakes");

        let count = LayerBuilder::default().build(&collection, &group);

        assert_eq!(count, 2);
        let colors: Vec<Color> = group
            .annotations()
            .iter()
            .map(|annotation| annotation.style.fill_color)
            .collect();
        assert_eq!(colors, vec![Color::DARK_RED, Color::GREEN]);
        assert!(group
            .annotations()
            .iter()
            .all(|annotation| matches!(annotation.shape, Shape::CircleMarker { .. })));
    }

    #[test]
    fn rebuild_from_same_input_is_identical() {
        let collection = FeatureCollection {
            features: vec![quake(5.5), quake(3.3), quake(6.1)],
            skipped: 0,
        };
        let group = LayerGroup::new("earthquakes");
        let builder = LayerBuilder::new(PopupFormatter::default(), SizePolicy::Stepped);

        builder.build(&collection, &group);
        let first = group.annotations();
        group.clear_layers();
        builder.build(&collection, &group);
        builder.build(&collection, &group);

        assert_eq!(group.annotations(), first);
    }

    #[test]
    fn empty_collection_clears_group() {
        let group = LayerGroup::new("weather");
        let builder = LayerBuilder::default();
        builder.build(
            &FeatureCollection {
                features: vec![quake(4.0)],
                skipped: 0,
            },
            &group,
        );

        let count = builder.build(&FeatureCollection::<AlertFeature>::default(), &group);

        assert_eq!(count, 0);
        assert!(group.is_empty());
    }
}
