use std::collections::HashSet;

use bevy::math::Vec3;
use geo::{Centroid, LineString, MultiPoint};

use crate::{
    projection::project_f32,
    settings::GlobeSettings,
    types::{CentroidTable, GeoFeature},
};

/// One closed border loop, already projected onto the border sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderRing {
    pub country: String,
    pub points: Vec<Vec3>,
}

/// Where a country's floating name goes.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSpec {
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub anchor: Vec3,
}

#[derive(Clone, Debug, Default)]
pub struct BuildOutput {
    pub borders: Vec<BorderRing>,
    pub labels: Vec<LabelSpec>,
    pub centroids: CentroidTable,
}

/// Turns countries into border loops, labels and search centroids.
///
/// Every ring of a feature becomes its own loop and re-registers its vertex
/// mean as the country's centroid, so the table ends up holding the last
/// ring's centroid. Labels are created once per country from whichever
/// ring comes first; `labeled` remembers which countries already have one.
pub struct BorderBuilder {
    border_radius: f64,
    label_radius: f64,
    labeled: HashSet<String>,
    output: BuildOutput,
}

impl BorderBuilder {
    pub fn new(border_radius: f64, label_radius: f64) -> Self {
        Self {
            border_radius,
            label_radius,
            labeled: HashSet::new(),
            output: BuildOutput::default(),
        }
    }

    pub fn from_settings(settings: &GlobeSettings) -> Self {
        Self::new(settings.border_radius, settings.label_radius)
    }

    /// Convenience for the whole feature list.
    pub fn build(mut self, features: &[GeoFeature]) -> BuildOutput {
        for feature in features {
            self.add_feature(feature);
        }
        self.finish()
    }

    pub fn add_feature(&mut self, feature: &GeoFeature) {
        for ring in feature.outer_rings() {
            let Some((lat, lon)) = ring_centroid(ring) else {
                continue;
            };

            let points = ring
                .coords()
                .map(|c| project_f32(c.y, c.x, self.border_radius))
                .collect();
            self.output.borders.push(BorderRing {
                country: feature.name.clone(),
                points,
            });

            self.output.centroids.register(&feature.name, lat, lon);

            if self.labeled.insert(feature.name.clone()) {
                self.output.labels.push(LabelSpec {
                    country: feature.name.clone(),
                    lat,
                    lon,
                    anchor: project_f32(lat, lon, self.label_radius),
                });
            }
        }
    }

    pub fn is_labeled(&self, country: &str) -> bool {
        self.labeled.contains(country)
    }

    pub fn finish(self) -> BuildOutput {
        self.output
    }
}

/// Plain mean of the ring's vertices as (lat, lon). `None` for an empty ring.
pub fn ring_centroid(ring: &LineString<f64>) -> Option<(f64, f64)> {
    let vertices: MultiPoint<f64> = ring.points().collect();
    vertices.centroid().map(|point| (point.y(), point.x()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ring_from_lon_lat, FeatureGeometry};

    fn testland() -> GeoFeature {
        GeoFeature::new(
            "Testland",
            Some(FeatureGeometry::Polygon(ring_from_lon_lat(&[
                [0.0, 0.0],
                [0.0, 10.0],
                [10.0, 10.0],
                [10.0, 0.0],
            ]))),
        )
    }

    #[test]
    fn polygon_gives_one_border_and_centroid() {
        let output = BorderBuilder::new(0.602, 0.65).build(&[testland()]);

        assert_eq!(output.borders.len(), 1);
        assert_eq!(output.borders[0].country, "Testland");
        assert_eq!(output.borders[0].points.len(), 4);
        for p in &output.borders[0].points {
            assert!((p.length() - 0.602).abs() < 1e-5);
        }

        assert_eq!(output.centroids.len(), 1);
        let centroid = output.centroids.get("Testland").unwrap();
        assert!((centroid.lat - 5.0).abs() < 1e-12);
        assert!((centroid.lon - 5.0).abs() < 1e-12);
        assert_eq!(centroid.normalized_key, "testland");

        assert_eq!(output.labels.len(), 1);
        assert!((output.labels[0].anchor.length() - 0.65).abs() < 1e-5);
    }

    #[test]
    fn multipolygon_gets_a_single_label() {
        let archipelago = GeoFeature::new(
            "Archipelago",
            Some(FeatureGeometry::MultiPolygon(vec![
                ring_from_lon_lat(&[[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0]]),
                ring_from_lon_lat(&[[20.0, 20.0], [20.0, 24.0], [24.0, 24.0], [24.0, 20.0]]),
            ])),
        );

        let mut builder = BorderBuilder::new(0.602, 0.65);
        builder.add_feature(&archipelago);
        assert!(builder.is_labeled("Archipelago"));
        let output = builder.finish();

        assert_eq!(output.borders.len(), 2);
        assert!(output.borders.iter().all(|b| b.country == "Archipelago"));
        assert_eq!(output.labels.len(), 1);
        // Label sits on the first ring, the table keeps the last one.
        assert!((output.labels[0].lat - 1.0).abs() < 1e-12);
        assert!((output.labels[0].lon - 1.0).abs() < 1e-12);
        let centroid = output.centroids.get("Archipelago").unwrap();
        assert!((centroid.lat - 22.0).abs() < 1e-12);
        assert!((centroid.lon - 22.0).abs() < 1e-12);
    }

    #[test]
    fn null_geometry_is_skipped() {
        let ghost = GeoFeature::new("Ghost", None);
        let output = BorderBuilder::new(0.602, 0.65).build(&[ghost]);
        assert!(output.borders.is_empty());
        assert!(output.labels.is_empty());
        assert!(output.centroids.is_empty());
    }

    #[test]
    fn unsupported_geometry_is_ignored() {
        let line = GeoFeature::new("Line", Some(FeatureGeometry::Other("LineString".into())));
        let output = BorderBuilder::new(0.602, 0.65).build(&[line, testland()]);
        assert_eq!(output.borders.len(), 1);
        assert!(!output.centroids.contains("Line"));
    }

    #[test]
    fn every_border_has_a_centroid() {
        let features = [
            testland(),
            GeoFeature::new("Ghost", None),
            GeoFeature::new(
                "Isle",
                Some(FeatureGeometry::MultiPolygon(vec![
                    ring_from_lon_lat(&[[30.0, 5.0], [31.0, 5.0], [31.0, 6.0]]),
                    LineString::new(Vec::new()),
                ])),
            ),
        ];
        let output = BorderBuilder::new(0.602, 0.65).build(&features);
        assert_eq!(output.borders.len(), 2, "empty rings produce nothing");
        for border in &output.borders {
            assert!(output.centroids.contains(&border.country));
        }
    }
}
