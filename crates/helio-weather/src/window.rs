//! Timezone resolution and today-local windowing of raw forecast data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::forecast::RawForecast;
use crate::types::{DailySample, ForecastTables, HourlySample, Place};

/// Timezone names treated as "unset". The zero-UTC-offset entries are the
/// provider's default echo, not a real declaration.
const TZ_UNSET_SENTINELS: &[&str] = &["", "auto", "gmt0", "utc+0", "utc-0"];

fn is_unset(name: &str) -> bool {
    let lowered = name.trim().to_lowercase();
    TZ_UNSET_SENTINELS.contains(&lowered.as_str())
}

fn parse_tz(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Resolve the effective timezone: the declared one unless unset or
/// unparseable, then the provider echo, then UTC.
pub(crate) fn resolve_timezone(declared: &str, provider: Option<&str>) -> Tz {
    if !is_unset(declared) {
        if let Some(tz) = parse_tz(declared) {
            return tz;
        }
    }
    if let Some(name) = provider {
        if !is_unset(name) {
            if let Some(tz) = parse_tz(name) {
                return tz;
            }
        }
    }
    chrono_tz::UTC
}

/// Permissive numeric coercion: JSON numbers pass through, numeric strings
/// parse, everything else is missing.
pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Wire timestamps are UTC-labeled naive datetimes ("2024-03-10T14:00");
/// daily rows come as bare dates.
fn parse_wire_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn to_local(naive_utc: NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive_utc, Utc).with_timezone(tz)
}

fn column(values: &[Value], index: usize) -> Option<f64> {
    values.get(index).and_then(coerce_f64)
}

/// Build the normalized tables from a raw forecast. `None` when the hourly
/// or daily section is absent.
///
/// The hourly table is the today-local slice (rows whose local date equals
/// today in the resolved timezone); when that slice is empty the first 24
/// raw rows are used instead. The daily table is the full returned range.
pub(crate) fn build_tables(
    raw: &RawForecast,
    place: &Place,
    now_utc: DateTime<Utc>,
) -> Option<ForecastTables> {
    let hourly = raw.hourly.as_ref()?;
    let daily = raw.daily.as_ref()?;
    if hourly.time.is_empty() || daily.time.is_empty() {
        return None;
    }

    let tz = resolve_timezone(&place.timezone, raw.timezone.as_deref());

    let hourly_rows: Vec<HourlySample> = hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            let naive = parse_wire_time(t)?;
            Some(HourlySample {
                time: to_local(naive, &tz),
                temperature: column(&hourly.temperature_2m, i),
                precipitation: column(&hourly.precipitation, i),
            })
        })
        .collect();

    let today = now_utc.with_timezone(&tz).date_naive();
    let mut hourly_today: Vec<HourlySample> = hourly_rows
        .iter()
        .filter(|row| row.time.date_naive() == today)
        .cloned()
        .collect();
    if hourly_today.is_empty() {
        hourly_today = hourly_rows.into_iter().take(24).collect();
    }

    let daily_rows: Vec<DailySample> = daily
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            let naive = parse_wire_time(t)?;
            Some(DailySample {
                date: to_local(naive, &tz),
                temp_min: column(&daily.temperature_2m_min, i),
                temp_max: column(&daily.temperature_2m_max, i),
                precipitation_sum: column(&daily.precipitation_sum, i),
            })
        })
        .collect();

    Some(ForecastTables {
        hourly_today,
        daily: daily_rows,
    })
}
