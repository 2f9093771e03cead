//! # Country Info
//!
//! Population, area and GDP for a country, fetched from two public REST
//! services on every lookup (nothing is cached).
//!
//! ## Sub-modules
//! - `client`: blocking HTTP lookups and response parsing
//! - `format`: number formatting for display
//! - `info_types`: response shapes
//! - `worker`: runs lookups off the main thread and hands results back
//!
//! Failures never reach the caller as errors: a lookup either produces a
//! complete record or `None`, and the cause is logged.

mod client;
mod format;
mod info_types;
mod worker;

use std::time::Duration;

pub use client::*;
pub use format::*;
pub use info_types::*;
use ureq::Agent;
pub use worker::*;

use crate::{settings::GlobeSettings, types::CountryInfo};

/// Anything that can turn a country name into an info record.
pub trait CountryInfoSource: Send + Sync {
    fn fetch_info(&self, name: &str) -> Option<CountryInfo>;
}

#[derive(Clone)]
pub struct CountryInfoClient {
    pub agent: Agent,
    rest_countries_url: String,
    world_bank_url: String,
    gdp_indicator: String,
}

impl Default for CountryInfoClient {
    fn default() -> Self {
        Self::new(&GlobeSettings::default())
    }
}

impl CountryInfoClient {
    pub fn new(settings: &GlobeSettings) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.request_timeout_secs)))
            .build();
        let agent: Agent = config.into();
        CountryInfoClient {
            agent,
            rest_countries_url: settings.rest_countries_url.clone(),
            world_bank_url: settings.world_bank_url.clone(),
            gdp_indicator: settings.gdp_indicator.clone(),
        }
    }
}
