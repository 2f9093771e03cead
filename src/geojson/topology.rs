//! TopoJSON decoding.
//!
//! A topology stores shared borders once as "arcs" and builds geometries by
//! referencing arc indices (negative indices mean "walk this arc backwards",
//! encoded as the one's complement). Quantized topologies additionally
//! delta-encode each arc and carry a transform back to longitude/latitude.
//! This turns one named object of a topology into a plain GeoJSON
//! `FeatureCollection` so the rest of the loader only deals with GeoJSON.

use std::collections::HashMap;

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use bevy::log::warn;
use serde::Deserialize;

use crate::error::GeodataError;

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub objects: HashMap<String, TopoObject>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> Vec<f64> {
        vec![
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        ]
    }
}

/// A geometry object inside a topology. `type` may be `null`, which
/// becomes a feature without geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct TopoObject {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub arcs: Option<serde_json::Value>,
    #[serde(default)]
    pub coordinates: Option<serde_json::Value>,
    #[serde(default)]
    pub geometries: Vec<TopoObject>,
    #[serde(default)]
    pub properties: Option<JsonObject>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl Topology {
    pub fn from_json(value: serde_json::Value) -> Result<Self, GeodataError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Converts `object` into features. A GeometryCollection yields one
    /// feature per member, anything else a single feature.
    pub fn to_feature_collection(&self, object: &str) -> Result<FeatureCollection, GeodataError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| GeodataError::MissingObject(object.to_string()))?;
        let decoder = ArcDecoder::new(self);

        let features = if root.kind.as_deref() == Some("GeometryCollection") {
            root.geometries
                .iter()
                .map(|member| decoder.feature(member))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![decoder.feature(root)?]
        };

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }
}

struct ArcDecoder<'a> {
    arcs: Vec<Vec<Vec<f64>>>,
    transform: Option<&'a Transform>,
}

impl<'a> ArcDecoder<'a> {
    fn new(topology: &'a Topology) -> Self {
        let transform = topology.transform.as_ref();
        let arcs = topology
            .arcs
            .iter()
            .map(|arc| match transform {
                Some(t) => {
                    // Delta encoding restarts at every arc.
                    let (mut x, mut y) = (0.0, 0.0);
                    arc.iter()
                        .map(|p| {
                            x += p.first().copied().unwrap_or_default();
                            y += p.get(1).copied().unwrap_or_default();
                            t.apply(x, y)
                        })
                        .collect()
                }
                None => arc.clone(),
            })
            .collect();
        Self { arcs, transform }
    }

    fn feature(&self, object: &TopoObject) -> Result<Feature, GeodataError> {
        let geometry = self.geometry(object)?.map(Geometry::new);
        let id = match &object.id {
            Some(serde_json::Value::String(s)) => Some(Id::String(s.clone())),
            Some(serde_json::Value::Number(n)) => Some(Id::Number(n.clone())),
            _ => None,
        };
        Ok(Feature {
            bbox: None,
            geometry,
            id,
            properties: object.properties.clone(),
            foreign_members: None,
        })
    }

    fn geometry(&self, object: &TopoObject) -> Result<Option<Value>, GeodataError> {
        let Some(kind) = object.kind.as_deref() else {
            return Ok(None);
        };
        let value = match kind {
            "Polygon" => Value::Polygon(self.polygon(&parse_arcs::<Vec<Vec<i64>>>(object)?)?),
            "MultiPolygon" => Value::MultiPolygon(
                parse_arcs::<Vec<Vec<Vec<i64>>>>(object)?
                    .iter()
                    .map(|polygon| self.polygon(polygon))
                    .collect::<Result<_, _>>()?,
            ),
            "LineString" => Value::LineString(self.line(&parse_arcs::<Vec<i64>>(object)?)?),
            "MultiLineString" => Value::MultiLineString(
                parse_arcs::<Vec<Vec<i64>>>(object)?
                    .iter()
                    .map(|line| self.line(line))
                    .collect::<Result<_, _>>()?,
            ),
            "Point" => Value::Point(self.point(&parse_coordinates::<Vec<f64>>(object)?)),
            "MultiPoint" => Value::MultiPoint(
                parse_coordinates::<Vec<Vec<f64>>>(object)?
                    .iter()
                    .map(|p| self.point(p))
                    .collect(),
            ),
            "GeometryCollection" => Value::GeometryCollection(
                object
                    .geometries
                    .iter()
                    .filter_map(|member| self.geometry(member).transpose())
                    .map(|value| value.map(Geometry::new))
                    .collect::<Result<_, _>>()?,
            ),
            other => {
                warn!("Ignoring topology geometry of unknown type {other:?}");
                return Ok(None);
            }
        };
        Ok(Some(value))
    }

    /// Points are quantized but never delta encoded.
    fn point(&self, position: &[f64]) -> Vec<f64> {
        match self.transform {
            Some(t) => t.apply(
                position.first().copied().unwrap_or_default(),
                position.get(1).copied().unwrap_or_default(),
            ),
            None => position.to_vec(),
        }
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<Vec<f64>>>, GeodataError> {
        rings.iter().map(|ring| self.ring(ring)).collect()
    }

    fn ring(&self, indices: &[i64]) -> Result<Vec<Vec<f64>>, GeodataError> {
        let mut points = self.line(indices)?;
        if let Some(first) = points.first().cloned() {
            while points.len() < 4 {
                points.push(first.clone());
            }
        }
        Ok(points)
    }

    /// Stitches arcs end to end; consecutive arcs share their joint vertex.
    fn line(&self, indices: &[i64]) -> Result<Vec<Vec<f64>>, GeodataError> {
        let mut points: Vec<Vec<f64>> = Vec::new();
        for &index in indices {
            let (slot, reversed) = if index < 0 {
                ((!index) as usize, true)
            } else {
                (index as usize, false)
            };
            let arc = self.arcs.get(slot).ok_or_else(|| {
                GeodataError::Topology(format!(
                    "arc {index} out of range ({} arcs)",
                    self.arcs.len()
                ))
            })?;
            points.pop();
            if reversed {
                points.extend(arc.iter().rev().cloned());
            } else {
                points.extend(arc.iter().cloned());
            }
        }
        if points.len() == 1 {
            points.push(points[0].clone());
        }
        Ok(points)
    }
}

fn parse_arcs<T: serde::de::DeserializeOwned>(object: &TopoObject) -> Result<T, GeodataError> {
    let arcs = object
        .arcs
        .clone()
        .ok_or_else(|| GeodataError::Topology("geometry without arcs".to_string()))?;
    Ok(serde_json::from_value(arcs)?)
}

fn parse_coordinates<T: serde::de::DeserializeOwned>(
    object: &TopoObject,
) -> Result<T, GeodataError> {
    let coordinates = object
        .coordinates
        .clone()
        .ok_or_else(|| GeodataError::Topology("point without coordinates".to_string()))?;
    Ok(serde_json::from_value(coordinates)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn topology(value: serde_json::Value) -> Topology {
        Topology::from_json(value).unwrap()
    }

    fn polygon_rings(feature: &Feature) -> Vec<Vec<Vec<f64>>> {
        match &feature.geometry.as_ref().unwrap().value {
            Value::Polygon(rings) => rings.clone(),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn decodes_quantized_delta_arcs() {
        let topo = topology(json!({
            "type": "Topology",
            "transform": { "scale": [0.5, 2.0], "translate": [10.0, -20.0] },
            "arcs": [[[0, 0], [2, 0], [0, 3], [-2, -3]]],
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0]], "properties": { "name": "Quantia" } }
                    ]
                }
            }
        }));

        let collection = topo.to_feature_collection("countries").unwrap();
        assert_eq!(collection.features.len(), 1);
        let rings = polygon_rings(&collection.features[0]);
        assert_eq!(
            rings[0],
            vec![
                vec![10.0, -20.0],
                vec![11.0, -20.0],
                vec![11.0, -14.0],
                vec![10.0, -20.0],
            ]
        );
        let name = collection.features[0]
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str());
        assert_eq!(name, Some("Quantia"));
    }

    #[test]
    fn stitches_shared_and_reversed_arcs() {
        // Two squares sharing the edge x = 1. Arc 0 is the shared edge.
        let topo = topology(json!({
            "type": "Topology",
            "arcs": [
                [[1, 0], [1, 1]],
                [[1, 1], [0, 1], [0, 0], [1, 0]],
                [[1, 0], [2, 0], [2, 1], [1, 1]]
            ],
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0, 1]], "properties": { "name": "West" } },
                        { "type": "Polygon", "arcs": [[2, -1]], "properties": { "name": "East" } }
                    ]
                }
            }
        }));

        let collection = topo.to_feature_collection("countries").unwrap();
        let west = polygon_rings(&collection.features[0]);
        assert_eq!(
            west[0],
            vec![
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 1.0],
                vec![0.0, 0.0],
                vec![1.0, 0.0],
            ]
        );
        let east = polygon_rings(&collection.features[1]);
        assert_eq!(
            east[0],
            vec![
                vec![1.0, 0.0],
                vec![2.0, 0.0],
                vec![2.0, 1.0],
                vec![1.0, 1.0],
                vec![1.0, 0.0],
            ]
        );
    }

    #[test]
    fn null_type_becomes_feature_without_geometry() {
        let topo = topology(json!({
            "type": "Topology",
            "arcs": [],
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [ { "type": null, "properties": { "name": "Nowhere" } } ]
                }
            }
        }));
        let collection = topo.to_feature_collection("countries").unwrap();
        assert!(collection.features[0].geometry.is_none());
    }

    #[test]
    fn unknown_type_becomes_feature_without_geometry() {
        let topo = topology(json!({
            "type": "Topology",
            "arcs": [[[0, 0], [0, 1], [1, 1], [0, 0]]],
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Sphere", "properties": { "name": "Everywhere" } },
                        { "type": "Polygon", "arcs": [[0]], "properties": { "name": "Square" } }
                    ]
                }
            }
        }));
        let collection = topo.to_feature_collection("countries").unwrap();
        assert_eq!(collection.features.len(), 2);
        assert!(collection.features[0].geometry.is_none());
        assert_eq!(polygon_rings(&collection.features[1]).len(), 1);
    }

    #[test]
    fn multipolygon_keeps_every_polygon() {
        let topo = topology(json!({
            "type": "Topology",
            "arcs": [
                [[0, 0], [0, 1], [1, 1], [0, 0]],
                [[5, 5], [5, 6], [6, 6], [5, 5]]
            ],
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "MultiPolygon", "arcs": [[[0]], [[1]]], "properties": { "name": "Isles" } }
                    ]
                }
            }
        }));
        let collection = topo.to_feature_collection("countries").unwrap();
        match &collection.features[0].geometry.as_ref().unwrap().value {
            Value::MultiPolygon(polygons) => assert_eq!(polygons.len(), 2),
            other => panic!("expected multipolygon, got {other:?}"),
        }
    }

    #[test]
    fn missing_object_and_bad_arc_are_errors() {
        let topo = topology(json!({
            "type": "Topology",
            "arcs": [],
            "objects": {
                "land": { "type": "Polygon", "arcs": [[3]] }
            }
        }));
        assert!(matches!(
            topo.to_feature_collection("countries"),
            Err(GeodataError::MissingObject(_))
        ));
        assert!(matches!(
            topo.to_feature_collection("land"),
            Err(GeodataError::Topology(_))
        ));
    }
}
