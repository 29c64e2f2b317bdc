//! Mapping of opendatasoft JSON records into [`Station`] records.
//!
//! Records from the API use a looser schema than the CSV snapshot: fields may
//! be JSON numbers, booleans or strings, coordinates usually sit in a nested
//! `coordonneesxy` object, and several columns have older alternate names.

use irve_core::Station;
use serde_json::Value;

use crate::parse_helpers::{
    connector_types, format_coordinate, parse_bool, parse_float, DEFAULT_ACCESS, DEFAULT_NAME,
    DEFAULT_OPERATOR, OUT_OF_SERVICE,
};

/// Converts one records-API object into a [`Station`], or `None` when it has
/// no usable coordinates.
#[must_use]
pub fn map_record(record: &Value) -> Option<Station> {
    let xy = record.get("coordonneesxy");
    let latitude = xy
        .and_then(|c| number(c.get("lat")))
        .or_else(|| number(record.get("consolidated_latitude")))?;
    let longitude = xy
        .and_then(|c| number(c.get("lon")))
        .or_else(|| number(record.get("consolidated_longitude")))?;

    let id = first_text(record, &["id_pdc_itinerance", "id_station", "id"]).unwrap_or_else(|| {
        format!(
            "{}-{}-{}",
            format_coordinate(latitude),
            format_coordinate(longitude),
            text(record.get("nom_station")).unwrap_or_else(|| "station".to_string())
        )
    });

    let power_kw = number(record.get("puissance_nominale"))
        .or_else(|| number(record.get("pdc_puiss_max")))
        .unwrap_or(0.0);

    Some(Station {
        id,
        name: first_text(record, &["nom_station", "n_enseigne"])
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        address: first_text(record, &["adresse_station", "ad_station"]).unwrap_or_default(),
        city: first_text(record, &["commune", "consolidated_commune"]).unwrap_or_default(),
        region: text(record.get("region")).unwrap_or_default(),
        latitude,
        longitude,
        power_kw,
        connector_types: record_connectors(record),
        available: record_available(record),
        price_per_hour: number(record.get("tarification")),
        operator: first_text(record, &["nom_operateur", "n_operateur"])
            .unwrap_or_else(|| DEFAULT_OPERATOR.to_string()),
        access_type: first_text(record, &["acces_recharge", "accessibilite"])
            .unwrap_or_else(|| DEFAULT_ACCESS.to_string()),
        description: text(record.get("observations")).unwrap_or_default(),
    })
}

/// A single free-text `type_prise` wins over the boolean flags.
fn record_connectors(record: &Value) -> Option<Vec<String>> {
    if let Some(kind) = record.get("type_prise").and_then(Value::as_str) {
        let kind = kind.trim();
        if !kind.is_empty() {
            return Some(vec![kind.to_string()]);
        }
    }
    connector_types(|column| flag(record.get(column)))
}

fn record_available(record: &Value) -> bool {
    ["etat_pdc", "etat"].iter().all(|column| {
        !record
            .get(*column)
            .and_then(Value::as_str)
            .is_some_and(|s| {
                s.eq_ignore_ascii_case(OUT_OF_SERVICE) || s.eq_ignore_ascii_case("hors_service")
            })
    })
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_float(Some(s.as_str())),
        _ => None,
    }
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => parse_bool(Some(s.as_str())),
        _ => false,
    }
}

/// Non-empty string form of a scalar; numbers are rendered as JSON.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(record: &Value, columns: &[&str]) -> Option<String> {
    columns.iter().find_map(|c| text(record.get(*c)))
}
