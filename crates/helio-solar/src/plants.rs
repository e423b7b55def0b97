//! Station-list normalization across fork-divergent record shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::snapshot::extract_number;

/// Normalized power-station listing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub capacity: Option<f64>,
}

/// Alternate key names used by different portal forks.
const ID_KEYS: &[&str] = &["powerStationId", "powerstation_id", "station_id", "id"];
const NAME_KEYS: &[&str] = &["stationname", "plant_name", "name"];
const CAPACITY_KEYS: &[&str] = &["capacity", "plant_capacity"];

fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match record.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn first_number(record: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        let parsed = match record.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => extract_number(s),
            _ => None,
        };
        if parsed.is_some() {
            return parsed;
        }
    }
    None
}

/// Normalize one raw station record. Records without a resolvable id and
/// name are dropped.
pub fn normalize_plant(record: &Value) -> Option<Plant> {
    let id = first_text(record, ID_KEYS)?;
    let name = first_text(record, NAME_KEYS)?;
    Some(Plant {
        id,
        name,
        capacity: first_number(record, CAPACITY_KEYS),
    })
}

/// Harvest station records from a listing response. Forks answer either
/// with an object whose values include record arrays, or with a bare array.
pub fn collect_plants(response: &Value) -> Vec<Plant> {
    let mut plants = Vec::new();

    match response {
        Value::Object(map) => {
            for value in map.values() {
                if let Value::Array(items) = value {
                    plants.extend(items.iter().filter_map(normalize_plant));
                }
            }
        }
        Value::Array(items) => {
            plants.extend(items.iter().filter_map(normalize_plant));
        }
        _ => {}
    }

    plants
}
