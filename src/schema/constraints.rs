//! Human readable constraint descriptions.

use regex::Regex;
use std::sync::OnceLock;

use super::ObjectSchema;

/// Format a number without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Describe a numeric range, e.g. `[ 0 .. 10 )`, `>= 1` or `< 100`.
///
/// Exclusive bounds win over inclusive ones on the same side.
pub fn humanize_number_range(
    minimum: Option<f64>,
    exclusive_minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_maximum: Option<f64>,
) -> Option<String> {
    let lower = exclusive_minimum
        .map(|value| (value, true))
        .or(minimum.map(|value| (value, false)));
    let upper = exclusive_maximum
        .map(|value| (value, true))
        .or(maximum.map(|value| (value, false)));

    match (lower, upper) {
        (Some((min, min_exclusive)), Some((max, max_exclusive))) => Some(format!(
            "{} {} .. {} {}",
            if min_exclusive { "(" } else { "[" },
            format_number(min),
            format_number(max),
            if max_exclusive { ")" } else { "]" },
        )),
        (Some((min, exclusive)), None) => Some(format!(
            "{} {}",
            if exclusive { ">" } else { ">=" },
            format_number(min)
        )),
        (None, Some((max, exclusive))) => Some(format!(
            "{} {}",
            if exclusive { "<" } else { "<=" },
            format_number(max)
        )),
        (None, None) => None,
    }
}

fn is_decimal_places(text: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^0\.0*1$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

/// Describe `multipleOf`; powers of ten below one read as decimal places.
pub fn humanize_multiple_of(multiple_of: Option<f64>) -> Option<String> {
    let text = format_number(multiple_of?);
    if is_decimal_places(&text) {
        let places = text.split('.').nth(1).map(str::len).unwrap_or_default();
        Some(format!("decimal places <= {}", places))
    } else {
        Some(format!("multiple of {}", text))
    }
}

/// Describe a count range such as string length or array size.
pub fn humanize_range(description: &str, min: Option<u64>, max: Option<u64>) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) if min == max => Some(format!("{} {}", min, description)),
        (Some(min), Some(max)) => Some(format!("[ {} .. {} ] {}", min, max, description)),
        (None, Some(max)) => Some(format!("<= {} {}", max, description)),
        (Some(1), None) => Some("non-empty".to_string()),
        (Some(min), None) => Some(format!(">= {} {}", min, description)),
        (None, None) => None,
    }
}

/// All humanized constraints of a schema in display order:
/// number range, multiple of, string length, array size, object size.
pub fn humanize_constraints(schema: &ObjectSchema) -> Vec<String> {
    let items_label = if schema.unique_items {
        "unique items"
    } else {
        "items"
    };

    [
        humanize_number_range(
            schema.minimum,
            schema.exclusive_minimum,
            schema.maximum,
            schema.exclusive_maximum,
        ),
        humanize_multiple_of(schema.multiple_of),
        humanize_range("characters", schema.min_length, schema.max_length),
        humanize_range(items_label, schema.min_items, schema.max_items),
        humanize_range("properties", schema.min_properties, schema.max_properties),
    ]
    .into_iter()
    .flatten()
    .collect()
}
