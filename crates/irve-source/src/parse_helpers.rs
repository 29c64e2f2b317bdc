//! Scalar parsing shared by the CSV and records-API mappers.

/// Lowercased tokens accepted as `true` in IRVE boolean columns.
const TRUTHY: [&str; 4] = ["true", "1", "yes", "oui"];

/// Connector labels in the order their flags are evaluated.
pub(crate) const CONNECTOR_FLAGS: [(&str, &str); 5] = [
    ("prise_type_ef", "Type E/F"),
    ("prise_type_2", "Type 2"),
    ("prise_type_combo_ccs", "CCS"),
    ("prise_type_chademo", "CHAdeMO"),
    ("prise_type_autre", "Autre"),
];

pub(crate) const DEFAULT_NAME: &str = "Borne de recharge";
pub(crate) const DEFAULT_OPERATOR: &str = "Inconnu";
pub(crate) const DEFAULT_ACCESS: &str = "public";
pub(crate) const OUT_OF_SERVICE: &str = "hors-service";

/// Parses a float, ignoring surrounding whitespace.
///
/// `NaN` and infinities are rejected: they have no JSON representation.
#[must_use]
pub fn parse_float(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// `true` iff the lowercased value is one of `true`, `1`, `yes`, `oui`.
#[must_use]
pub fn parse_bool(value: Option<&str>) -> bool {
    value.is_some_and(|v| TRUTHY.contains(&v.to_lowercase().as_str()))
}

/// Collects connector labels for each set flag; `None` when no flag is set.
pub(crate) fn connector_types<F>(is_set: F) -> Option<Vec<String>>
where
    F: Fn(&str) -> bool,
{
    let types: Vec<String> = CONNECTOR_FLAGS
        .iter()
        .filter(|(column, _)| is_set(column))
        .map(|(_, label)| (*label).to_string())
        .collect();
    (!types.is_empty()).then_some(types)
}

/// Formats a coordinate for synthesized ids: shortest round-trip digits,
/// whole numbers keep a trailing `.0`.
///
/// Exponent forms use Rust notation (`1e-5`, not `1e-05`). French
/// coordinates never reach that range.
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    format!("{value:?}")
}

/// `true` unless `status` equals `hors-service`, ignoring case.
#[must_use]
pub fn is_available(status: Option<&str>) -> bool {
    !status.is_some_and(|s| s.eq_ignore_ascii_case(OUT_OF_SERVICE))
}
