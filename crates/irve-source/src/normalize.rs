//! Mapping of consolidated IRVE CSV rows into [`Station`] records.

use irve_core::Station;

use crate::parse_helpers::{
    connector_types, format_coordinate, is_available, parse_bool, parse_float, DEFAULT_ACCESS,
    DEFAULT_NAME, DEFAULT_OPERATOR,
};
use crate::row::RawRow;

/// Converts one CSV row into a [`Station`].
///
/// Returns `None` when `consolidated_longitude` or `consolidated_latitude` is
/// missing or not a finite number; no other field can cause a skip.
#[must_use]
pub fn map_station(row: &RawRow) -> Option<Station> {
    let longitude = parse_float(row.get("consolidated_longitude"))?;
    let latitude = parse_float(row.get("consolidated_latitude"))?;

    let id = row
        .get("id_pdc_itinerance")
        .or_else(|| row.get("id_station_itinerance"))
        .map_or_else(
            || synthesized_id(longitude, latitude, row.get("nom_station")),
            str::to_string,
        );

    let name = row
        .get("nom_station")
        .or_else(|| row.get("nom_enseigne"))
        .unwrap_or(DEFAULT_NAME);

    Some(Station {
        id,
        name: name.to_string(),
        address: text(row, "adresse_station"),
        city: text(row, "consolidated_commune"),
        region: text(row, "consolidated_code_postal"),
        latitude,
        longitude,
        power_kw: parse_float(row.get("puissance_nominale")).unwrap_or(0.0),
        connector_types: connector_types(|column| parse_bool(row.get(column))),
        available: is_available(row.get("etat_pdc")),
        price_per_hour: parse_float(row.get("tarification")),
        operator: row
            .get("nom_operateur")
            .unwrap_or(DEFAULT_OPERATOR)
            .to_string(),
        access_type: row
            .get("condition_acces")
            .unwrap_or(DEFAULT_ACCESS)
            .to_string(),
        description: text(row, "observations"),
    })
}

/// Fallback id for rows without an itinerance identifier.
///
/// Not unique: two unnamed stations at the same coordinates share an id and
/// the later one overwrites the earlier on upsert.
#[must_use]
pub fn synthesized_id(longitude: f64, latitude: f64, name: Option<&str>) -> String {
    format!(
        "{}-{}-{}",
        format_coordinate(longitude),
        format_coordinate(latitude),
        name.unwrap_or("station")
    )
}

fn text(row: &RawRow, column: &str) -> String {
    row.get(column).unwrap_or_default().to_string()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
