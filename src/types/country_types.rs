use std::collections::HashMap;

/// Approximate label / camera target for a country: the plain mean of one
/// ring's vertices, not an area weighted centre.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryCentroid {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Lowercase, whitespace-free name used by search.
    pub normalized_key: String,
}

/// Centroids keyed by country name, kept in registration order so that
/// searches resolve to the first registered country on key collisions.
#[derive(Clone, Debug, Default)]
pub struct CentroidTable {
    entries: Vec<CountryCentroid>,
    by_name: HashMap<String, usize>,
}

impl CentroidTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the centroid for `name`.
    pub fn register(&mut self, name: &str, lat: f64, lon: f64) {
        let centroid = CountryCentroid {
            name: name.to_string(),
            lat,
            lon,
            normalized_key: crate::names::search_key(name),
        };
        match self.by_name.get(name) {
            Some(&index) => self.entries[index] = centroid,
            None => {
                self.by_name.insert(name.to_string(), self.entries.len());
                self.entries.push(centroid);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CountryCentroid> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    /// Exact match on the normalized key; returns the country name.
    pub fn find_by_normalized_key(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|centroid| centroid.normalized_key == key)
            .map(|centroid| centroid.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryCentroid> {
        self.entries.iter()
    }
}

/// What the info panel shows for one country. Built fresh on every lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryInfo {
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
    /// Flag URL as reported by the country service, may be empty.
    pub flag_url: String,
    pub population: String,
    pub area: String,
    pub gdp: String,
    pub gdp_year: Option<String>,
}

impl CountryInfo {
    /// `https://flagcdn.com/w80/{code}.png` style URL for the panel image.
    pub fn flag_cdn_url(&self, base: &str) -> String {
        format!(
            "{}/{}.png",
            base.trim_end_matches('/'),
            self.code.to_lowercase()
        )
    }
}
