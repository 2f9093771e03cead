use std::path::Path;

use bevy::log::warn;
use geo::LineString;
use geojson::{FeatureCollection, GeoJson, Value};

use crate::{
    error::GeodataError,
    types::{FeatureGeometry, GeoFeature},
};

use super::Topology;

/// Reads the geodata file and returns its countries.
pub fn load_geodata(path: &Path, topology_object: &str) -> Result<Vec<GeoFeature>, GeodataError> {
    let text = std::fs::read_to_string(path).map_err(|source| GeodataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_geodata(&text, topology_object)
}

/// Accepts either a TopoJSON topology (decoded through `topology_object`) or
/// a GeoJSON FeatureCollection.
pub fn parse_geodata(text: &str, topology_object: &str) -> Result<Vec<GeoFeature>, GeodataError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let collection = match value.get("type").and_then(|t| t.as_str()) {
        Some("Topology") => Topology::from_json(value)?.to_feature_collection(topology_object)?,
        Some("FeatureCollection") => match GeoJson::from_json_value(value)? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => return Err(GeodataError::UnsupportedDocument),
        },
        _ => return Err(GeodataError::UnsupportedDocument),
    };

    Ok(features_from_collection(collection))
}

/// Keeps the name and the outer ring of each polygon. Features without a
/// string `name` property cannot be tagged and are dropped.
pub fn features_from_collection(collection: FeatureCollection) -> Vec<GeoFeature> {
    let mut features = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(|name| name.as_str())
            .map(str::to_string);
        let Some(name) = name else {
            warn!("Skipping feature without a name (id {:?})", feature.id);
            continue;
        };

        let geometry = feature.geometry.map(|geometry| match geometry.value {
            Value::Polygon(rings) => match rings.first() {
                Some(outer) => FeatureGeometry::Polygon(line_string(outer)),
                None => FeatureGeometry::MultiPolygon(Vec::new()),
            },
            Value::MultiPolygon(polygons) => FeatureGeometry::MultiPolygon(
                polygons
                    .iter()
                    .filter_map(|rings| rings.first())
                    .map(|outer| line_string(outer))
                    .collect(),
            ),
            Value::Point(_) => FeatureGeometry::Other("Point".to_string()),
            Value::MultiPoint(_) => FeatureGeometry::Other("MultiPoint".to_string()),
            Value::LineString(_) => FeatureGeometry::Other("LineString".to_string()),
            Value::MultiLineString(_) => FeatureGeometry::Other("MultiLineString".to_string()),
            Value::GeometryCollection(_) => {
                FeatureGeometry::Other("GeometryCollection".to_string())
            }
        });

        features.push(GeoFeature { name, geometry });
    }

    features
}

fn line_string(ring: &[Vec<f64>]) -> LineString<f64> {
    LineString::from(
        ring.iter()
            .filter_map(|position| match position.as_slice() {
                [lon, lat, ..] => Some(geo::Coord { x: *lon, y: *lat }),
                _ => None,
            })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_feature_collections() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "name": "Testland" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [
                            [[0, 0], [0, 10], [10, 10], [10, 0]],
                            [[2, 2], [2, 3], [3, 3], [2, 2]]
                        ]
                    }
                },
                { "type": "Feature", "properties": { "name": "Ghost" }, "geometry": null },
                {
                    "type": "Feature",
                    "properties": { "name": "Dot" },
                    "geometry": { "type": "Point", "coordinates": [1, 1] }
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": { "type": "Point", "coordinates": [1, 1] }
                }
            ]
        }"#;

        let features = parse_geodata(text, "countries").unwrap();
        assert_eq!(features.len(), 3);

        assert_eq!(features[0].name, "Testland");
        let rings = features[0].outer_rings();
        assert_eq!(rings.len(), 1, "holes are dropped");
        assert_eq!(rings[0].0.len(), 4, "ring is not closed on load");

        assert_eq!(features[1].geometry, None);
        assert_eq!(
            features[2].geometry,
            Some(FeatureGeometry::Other("Point".to_string()))
        );
        assert!(features[2].outer_rings().is_empty());
    }

    #[test]
    fn reads_topologies() {
        let text = r#"{
            "type": "Topology",
            "arcs": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]],
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0]], "properties": { "name": "Testland" } }
                    ]
                }
            }
        }"#;

        let features = parse_geodata(text, "countries").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].outer_rings()[0].0.len(), 5);
    }

    #[test]
    fn odd_topology_member_does_not_drop_the_rest() {
        let text = r#"{
            "type": "Topology",
            "arcs": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]],
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Sphere", "properties": { "name": "Everywhere" } },
                        { "type": "Polygon", "arcs": [[0]], "properties": { "name": "Testland" } }
                    ]
                }
            }
        }"#;

        let features = parse_geodata(text, "countries").unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].geometry, None);

        let output = super::super::BorderBuilder::new(0.602, 0.65).build(&features);
        assert_eq!(output.borders.len(), 1);
        assert_eq!(output.borders[0].country, "Testland");
        assert!(!output.centroids.contains("Everywhere"));
    }

    #[test]
    fn rejects_other_documents() {
        assert!(matches!(
            parse_geodata(r#"{ "type": "Feature" }"#, "countries"),
            Err(GeodataError::UnsupportedDocument)
        ));
        assert!(matches!(
            parse_geodata("not json", "countries"),
            Err(GeodataError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_geodata(Path::new("/no/such/world.json"), "countries");
        assert!(matches!(err, Err(GeodataError::Io { .. })));
    }
}
