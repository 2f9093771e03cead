//! en-US style number formatting for the info panel.

pub const UNKNOWN: &str = "Unknown";

/// Groups the integer part with commas and keeps at most three fraction
/// digits, trailing zeros dropped: `1234567.5` -> `1,234,567.5`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 1);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = whole.chars().all(|c| c == '0') && fraction.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

pub fn format_population(population: Option<u64>) -> String {
    population.map_or_else(|| UNKNOWN.to_string(), |p| format_number(p as f64))
}

/// Zero counts as unknown, as the country service uses it for "no data".
pub fn format_area(area: Option<f64>) -> String {
    match area {
        Some(km2) if km2 != 0.0 => format!("{} km²", format_number(km2)),
        _ => UNKNOWN.to_string(),
    }
}

pub fn format_currency(value: f64) -> String {
    format!("${}", format_number(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1_000.0), "1,000");
        assert_eq!(format_number(83_240_525.0), "83,240,525");
        assert_eq!(format_number(27_360_935_000_000.0), "27,360,935,000,000");
        assert_eq!(format_number(1234.5), "1,234.5");
        assert_eq!(format_number(0.12345), "0.123");
        assert_eq!(format_number(-4_500.25), "-4,500.25");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn test_format_fields() {
        assert_eq!(format_population(Some(5_000)), "5,000");
        assert_eq!(format_population(None), "Unknown");
        assert_eq!(format_area(Some(357_114.0)), "357,114 km²");
        assert_eq!(format_area(Some(0.0)), "Unknown");
        assert_eq!(format_area(None), "Unknown");
        assert_eq!(format_currency(4_525_703_903_627.53), "$4,525,703,903,627.53");
    }
}
