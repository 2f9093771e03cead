use geo::LineString;

/// One country read from the geodata, reduced to what the globe needs: its
/// name and the outer ring of each polygon. Holes are dropped on load.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFeature {
    pub name: String,
    pub geometry: Option<FeatureGeometry>,
}

/// Rings are stored exactly as they appear in the source (x = longitude,
/// y = latitude), closing vertex included if the source repeats it.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureGeometry {
    Polygon(LineString<f64>),
    MultiPolygon(Vec<LineString<f64>>),
    /// Any other geometry kind; kept only so it can be reported and ignored.
    Other(String),
}

impl GeoFeature {
    pub fn new(name: impl Into<String>, geometry: Option<FeatureGeometry>) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }

    /// Outer rings of every polygon, Polygon and MultiPolygon treated alike.
    /// Unsupported geometry and missing geometry both yield nothing.
    pub fn outer_rings(&self) -> &[LineString<f64>] {
        match &self.geometry {
            Some(FeatureGeometry::Polygon(ring)) => std::slice::from_ref(ring),
            Some(FeatureGeometry::MultiPolygon(rings)) => rings,
            Some(FeatureGeometry::Other(_)) | None => &[],
        }
    }
}

/// Builds a ring from `[longitude, latitude]` pairs.
pub fn ring_from_lon_lat(points: &[[f64; 2]]) -> LineString<f64> {
    LineString::from(
        points
            .iter()
            .map(|[lon, lat]| geo::Coord { x: *lon, y: *lat })
            .collect::<Vec<_>>(),
    )
}
