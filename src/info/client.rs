use std::fmt::Write;

use bevy::log::{debug, error};

use crate::{error::InfoError, names::normalize, types::CountryInfo};

use super::{
    format::{format_area, format_currency, format_population, UNKNOWN},
    CountryInfoClient, CountryInfoSource, IndicatorEntry, RestCountry,
};

/// The parts of a country record that come from the country service.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicInfo {
    pub code: String,
    pub flag_url: String,
    pub population: String,
    pub area: String,
}

/// Most recent GDP figure of the indicator series.
#[derive(Debug, Clone, PartialEq)]
pub struct GdpFigure {
    pub amount: String,
    pub year: Option<String>,
}

impl CountryInfoClient {
    /// Looks `name` up in both services. The name is normalized first; the
    /// returned record carries the normalized name.
    pub fn lookup(&self, name: &str) -> Result<CountryInfo, InfoError> {
        let clean_name = normalize(name);

        let url = format!(
            "{}/{}",
            self.rest_countries_url.trim_end_matches('/'),
            encode_path_segment(clean_name)
        );
        debug!("Country lookup: {url}");
        let basic = parse_basic_info(&self.get_text(&url)?, clean_name)?;

        let url = format!(
            "{}/{}/indicator/{}?format=json",
            self.world_bank_url.trim_end_matches('/'),
            encode_path_segment(&basic.code),
            self.gdp_indicator
        );
        debug!("GDP lookup: {url}");
        let gdp = parse_gdp(&self.get_text(&url)?)?;

        Ok(CountryInfo {
            name: clean_name.to_string(),
            code: basic.code,
            flag_url: basic.flag_url,
            population: basic.population,
            area: basic.area,
            gdp: gdp.amount,
            gdp_year: gdp.year,
        })
    }

    /// Non-2xx statuses come back from ureq as errors.
    fn get_text(&self, url: &str) -> Result<String, InfoError> {
        let mut response = self.agent.get(url).call()?;
        Ok(response.body_mut().read_to_string()?)
    }
}

impl CountryInfoSource for CountryInfoClient {
    fn fetch_info(&self, name: &str) -> Option<CountryInfo> {
        match self.lookup(name) {
            Ok(info) => Some(info),
            Err(e) => {
                error!("Failed to fetch info for {name:?}: {e}");
                None
            }
        }
    }
}

/// The country service answers with an array; the first entry is used.
pub fn parse_basic_info(body: &str, name: &str) -> Result<BasicInfo, InfoError> {
    let countries: Vec<RestCountry> = serde_json::from_str(body)?;
    let country = countries
        .into_iter()
        .next()
        .ok_or_else(|| InfoError::NoMatch(name.to_string()))?;
    let code = country
        .cca2
        .filter(|code| !code.is_empty())
        .ok_or(InfoError::MissingField("cca2"))?;

    Ok(BasicInfo {
        code,
        flag_url: country.flags.and_then(|f| f.png).unwrap_or_default(),
        population: format_population(country.population),
        area: format_area(country.area),
    })
}

/// The indicator service answers `[metadata, [entry, ...]]` with the newest
/// year first. The first entry holding a value wins; a missing series is
/// reported as unknown rather than as an error.
pub fn parse_gdp(body: &str) -> Result<GdpFigure, InfoError> {
    let document: serde_json::Value = serde_json::from_str(body)?;

    let Some(series) = document.get(1).and_then(|series| series.as_array()) else {
        return Ok(GdpFigure {
            amount: UNKNOWN.to_string(),
            year: None,
        });
    };

    let latest = series
        .iter()
        .filter_map(|entry| serde_json::from_value::<IndicatorEntry>(entry.clone()).ok())
        .find_map(|entry| entry.value.map(|value| (value, entry.date)));

    Ok(match latest {
        Some((value, year)) => GdpFigure {
            amount: format_currency(value),
            year,
        },
        None => GdpFigure {
            amount: UNKNOWN.to_string(),
            year: None,
        },
    })
}

/// Percent-encodes everything except the characters `encodeURIComponent`
/// leaves alone.
pub fn encode_path_segment(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => {
                let _ = write!(encoded, "%{byte:02X}");
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_info_from_singleton_array() {
        let body = r#"[{
            "name": { "common": "Germany" },
            "cca2": "DE",
            "flags": { "png": "https://flagcdn.com/w320/de.png", "svg": "x" },
            "population": 83240525,
            "area": 357114.0
        }]"#;
        let basic = parse_basic_info(body, "Germany").unwrap();
        assert_eq!(basic.code, "DE");
        assert_eq!(basic.flag_url, "https://flagcdn.com/w320/de.png");
        assert_eq!(basic.population, "83,240,525");
        assert_eq!(basic.area, "357,114 km²");
    }

    #[test]
    fn basic_info_tolerates_missing_numbers() {
        let basic = parse_basic_info(r#"[{ "cca2": "AQ" }]"#, "Antarctica").unwrap();
        assert_eq!(basic.population, "Unknown");
        assert_eq!(basic.area, "Unknown");
        assert_eq!(basic.flag_url, "");
    }

    #[test]
    fn basic_info_failures() {
        assert!(matches!(
            parse_basic_info("[]", "Atlantis"),
            Err(InfoError::NoMatch(name)) if name == "Atlantis"
        ));
        assert!(matches!(
            parse_basic_info(r#"[{ "population": 1 }]"#, "Nowhere"),
            Err(InfoError::MissingField("cca2"))
        ));
        assert!(matches!(
            parse_basic_info("<html>", "Nowhere"),
            Err(InfoError::Json(_))
        ));
    }

    #[test]
    fn gdp_takes_first_non_null_value() {
        let body = r#"[
            { "page": 1, "pages": 2, "per_page": 50, "total": 64 },
            [
                { "date": "2024", "value": null },
                { "date": "2023", "value": 4525703903627.53 },
                { "date": "2022", "value": 4163596357879.39 }
            ]
        ]"#;
        let gdp = parse_gdp(body).unwrap();
        assert_eq!(gdp.amount, "$4,525,703,903,627.53");
        assert_eq!(gdp.year.as_deref(), Some("2023"));
    }

    #[test]
    fn gdp_without_series_is_unknown() {
        let error_body = r#"[{ "message": [{ "id": "120", "value": "Invalid value" }] }]"#;
        assert_eq!(parse_gdp(error_body).unwrap().amount, "Unknown");

        let all_null = r#"[{}, [{ "date": "2024", "value": null }]]"#;
        let gdp = parse_gdp(all_null).unwrap();
        assert_eq!(gdp.amount, "Unknown");
        assert_eq!(gdp.year, None);

        assert!(parse_gdp("oops").is_err());
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(encode_path_segment("France"), "France");
        assert_eq!(encode_path_segment("United States"), "United%20States");
        assert_eq!(encode_path_segment("Côte d'Ivoire"), "C%C3%B4te%20d'Ivoire");
        assert_eq!(encode_path_segment("a/b?c"), "a%2Fb%3Fc");
    }
}
