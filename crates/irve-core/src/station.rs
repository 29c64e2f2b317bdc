//! The normalized charging-station record written to the `stations_irve` table.

use serde::{Deserialize, Serialize};

/// Name of the target table behind the PostgREST endpoint.
pub const STATIONS_TABLE: &str = "stations_irve";

/// One charging point, normalized from an upstream IRVE row.
///
/// Serialized field names match the table columns. `connector_types` and
/// `price_per_hour` serialize as `null` when unknown so that an upsert
/// overwrites stale values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    /// Holds the postal code of the station, not an administrative region.
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub power_kw: f64,
    pub connector_types: Option<Vec<String>>,
    pub available: bool,
    pub price_per_hour: Option<f64>,
    pub operator: String,
    pub access_type: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Station {
        Station {
            id: "FRS35PSDR01".to_string(),
            name: "Parking Sainte-Anne".to_string(),
            address: "1 rue de Dinan".to_string(),
            city: "Rennes".to_string(),
            region: "35000".to_string(),
            latitude: 48.1147,
            longitude: -1.6794,
            power_kw: 22.0,
            connector_types: None,
            available: true,
            price_per_hour: None,
            operator: "Inconnu".to_string(),
            access_type: "public".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn unknown_optionals_serialize_as_null() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["connector_types"].is_null());
        assert!(json["price_per_hour"].is_null());
    }

    #[test]
    fn serializes_table_column_names() {
        let mut station = sample();
        station.connector_types = Some(vec!["Type 2".to_string(), "CCS".to_string()]);
        let json = serde_json::to_value(&station).unwrap();
        assert_eq!(json["id"], "FRS35PSDR01");
        assert_eq!(json["region"], "35000");
        assert_eq!(json["power_kw"], 22.0);
        assert_eq!(json["connector_types"], serde_json::json!(["Type 2", "CCS"]));
        assert_eq!(json["access_type"], "public");
        assert_eq!(json.as_object().unwrap().len(), 14);
    }
}
