//! Country naming helpers.
//!
//! The geodata uses official/long-form names while the info lookup service
//! expects common names, hence the fix-up table. Border tags and labels keep
//! the geodata spelling; only outgoing lookups go through [`normalize`].

const NAME_FIXES: &[(&str, &str)] = &[
    ("Bolivia, Plurinational State of", "Bolivia"),
    ("Tanzania, United Republic of", "Tanzania"),
    ("Iran, Islamic Republic of", "Iran"),
    ("Korea, Republic of", "South Korea"),
    ("Korea, Democratic People's Republic of", "North Korea"),
    ("Venezuela, Bolivarian Republic of", "Venezuela"),
    ("Moldova, Republic of", "Moldova"),
    ("Syrian Arab Republic", "Syria"),
    ("Lao People's Democratic Republic", "Laos"),
    ("Russian Federation", "Russia"),
    ("Brunei Darussalam", "Brunei"),
    ("Czechia", "Czech Republic"),
    ("United States of America", "United States"),
    (
        "United Kingdom of Great Britain and Northern Ireland",
        "United Kingdom",
    ),
];

/// Returns the display name the info service understands.
/// Names without an entry pass through untouched.
pub fn normalize(name: &str) -> &str {
    NAME_FIXES
        .iter()
        .find(|(official, _)| *official == name)
        .map_or(name, |(_, display)| display)
}

/// Lowercase with every whitespace character removed, used to match search
/// input against country names regardless of case or spacing.
pub fn search_key(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
