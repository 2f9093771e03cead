//! Error types for geodata loading, country lookups and configuration.
//!
//! None of these reach the user directly: geodata failures leave the globe
//! without borders, lookup failures surface as "Country not found", and
//! configuration failures fall back to defaults. They exist so the cause can
//! be logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeodataError {
    #[error("failed to read geodata file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("geodata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("malformed topology: {0}")]
    Topology(String),
    #[error("topology has no object named {0:?}")]
    MissingObject(String),
    #[error("geodata is neither a Topology nor a FeatureCollection")]
    UnsupportedDocument,
}

#[derive(Debug, Error)]
pub enum InfoError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no country matched {0:?}")]
    NoMatch(String),
    #[error("response is missing {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}
