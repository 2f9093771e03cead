use serde::Deserialize;

// Only the fields the panel uses; everything else in the responses is ignored.

/// One entry of the country service's `/name/{name}` array.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct RestCountry {
    #[serde(default)]
    pub flags: Option<Flags>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub cca2: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub png: Option<String>,
}

/// One yearly observation of the GDP indicator series.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct IndicatorEntry {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}
