//! Collated plant snapshot, flattened from three sub-responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inverter from the plant's inverter list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverterInfo {
    pub serial: Option<String>,
    pub model: Option<String>,
    pub internal_temp: Option<f64>,
}

/// Normalized plant snapshot: identity and capacity from the plant details,
/// live flows from the powerflow, and the inverter list. Any slice whose
/// sub-fetch failed is simply absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub name: Option<String>,
    pub id: Option<String>,
    pub model: Option<String>,
    pub capacity: Option<f64>,
    pub battery_capacity: Option<f64>,

    pub generation_today: Option<f64>,
    pub generation_live: Option<f64>,
    pub month_generation: Option<f64>,
    pub all_time_generation: Option<f64>,
    pub income_today: Option<f64>,
    pub income_total: Option<f64>,

    pub soc: Option<f64>,
    pub pv_status: Option<i64>,
    pub battery: Option<f64>,
    pub battery_status: Option<i64>,
    pub battery_status_text: Option<String>,
    pub house_load: Option<f64>,
    pub house_load_status: Option<i64>,
    pub grid_load: Option<f64>,
    pub grid_load_status: Option<i64>,

    pub inverters: Vec<InverterInfo>,
}

/// Extract the leading numeric token from a unit-suffixed string
/// ("45.2°C" -> 45.2). `None` when the string does not start with a digit.
pub fn extract_number(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() {
            end = i + c.len_utf8();
        } else if c == '.' && !seen_dot && end > 0 {
            seen_dot = true;
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    if end == 0 {
        return None;
    }
    trimmed[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// Numeric field that may arrive as a JSON number or a unit-suffixed string.
fn number_field(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => extract_number(s),
        _ => None,
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn status_field(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Look up `value` in the vendor's `[{key, value}, ...]` attribute arrays.
fn value_by_key<'a>(entries: &'a Value, key_to_find: &str) -> Option<&'a Value> {
    entries.as_array()?.iter().find_map(|entry| {
        if entry.get("key").and_then(Value::as_str) == Some(key_to_find) {
            entry.get("value")
        } else {
            None
        }
    })
}

fn normalize_inverter(raw: &Value) -> InverterInfo {
    let left = raw
        .get("dict")
        .and_then(|d| d.get("left"))
        .cloned()
        .unwrap_or(Value::Null);

    InverterInfo {
        serial: text_field(raw.get("sn")),
        model: value_by_key(&left, "dmDeviceType")
            .and_then(Value::as_str)
            .map(str::to_string),
        internal_temp: value_by_key(&left, "innerTemp")
            .and_then(Value::as_str)
            .and_then(extract_number),
    }
}

/// Flatten the three sub-responses into one snapshot. Each argument is
/// `None` when its fetch failed; the corresponding fields stay absent.
pub(crate) fn build_snapshot(
    powerflow: Option<&Value>,
    details: Option<&Value>,
    inverters: Option<&Value>,
) -> PlantSnapshot {
    let mut snapshot = PlantSnapshot::default();

    if let Some(details) = details {
        let info = details.get("info");
        let kpi = details.get("kpi");

        snapshot.name = info.and_then(|i| text_field(i.get("stationname")));
        snapshot.id = info.and_then(|i| text_field(i.get("powerstation_id")));
        snapshot.model = Some("GoodWe".to_string());
        snapshot.capacity = info.and_then(|i| number_field(i.get("capacity")));
        snapshot.battery_capacity = info.and_then(|i| number_field(i.get("battery_capacity")));

        snapshot.generation_today = kpi.and_then(|k| number_field(k.get("power")));
        snapshot.month_generation = kpi.and_then(|k| number_field(k.get("month_generation")));
        snapshot.all_time_generation = kpi.and_then(|k| number_field(k.get("total_power")));
        snapshot.income_today = kpi.and_then(|k| number_field(k.get("day_income")));
        snapshot.income_total = kpi.and_then(|k| number_field(k.get("total_income")));
    }

    if let Some(powerflow) = powerflow {
        // Some forks nest the live flows under "powerflow", others answer
        // with the flows at the top level.
        let flows = powerflow.get("powerflow").unwrap_or(powerflow);

        snapshot.generation_live = number_field(flows.get("pv"));
        snapshot.pv_status = status_field(flows.get("pvStatus"));
        // "bettery" is the vendor's spelling on the wire
        snapshot.battery = number_field(flows.get("bettery"));
        snapshot.battery_status = status_field(flows.get("betteryStatus"));
        snapshot.battery_status_text = text_field(flows.get("betteryStatusStr"));
        snapshot.house_load = number_field(flows.get("load"));
        snapshot.house_load_status = status_field(flows.get("loadStatus"));
        snapshot.grid_load = number_field(flows.get("grid"));
        snapshot.grid_load_status = status_field(flows.get("gridStatus"));
        snapshot.soc = number_field(flows.get("soc"))
            .or_else(|| number_field(flows.get("socText")));
    }

    if let Some(Value::Array(items)) = inverters {
        snapshot.inverters = items
            .iter()
            .filter(|i| i.is_object())
            .map(normalize_inverter)
            .collect();
    }

    snapshot
}
