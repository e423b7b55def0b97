//! Canned pt-BR weather responders over the normalized forecast tables.
//!
//! All responders are pure over (tables, place name, now) so the texts are
//! deterministic in tests.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use helio_weather::{DailySample, ForecastTables};

/// Precipitation above this counts as a rainy day/period.
pub const RAIN_THRESHOLD_MM: f64 = 0.2;

/// Day names, Monday-first to match `num_days_from_monday`.
const WEEKDAYS_PT: [&str; 7] = [
    "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado", "Domingo",
];

fn day_name(sample: &DailySample) -> &'static str {
    WEEKDAYS_PT[sample.date.weekday().num_days_from_monday() as usize]
}

fn table_timezone(tables: &ForecastTables) -> Option<Tz> {
    tables
        .daily
        .first()
        .map(|d| d.date.timezone())
        .or_else(|| tables.hourly_today.first().map(|h| h.time.timezone()))
}

fn tomorrow_local(tables: &ForecastTables, now_utc: DateTime<Utc>) -> Option<NaiveDate> {
    let tz = table_timezone(tables)?;
    Some((now_utc.with_timezone(&tz) + Duration::days(1)).date_naive())
}

/// Daily rows from tomorrow-local onward, capped at seven; when nothing
/// lies after today the first seven returned rows serve instead.
fn week_rows<'a>(tables: &'a ForecastTables, now_utc: DateTime<Utc>) -> Vec<&'a DailySample> {
    let Some(tomorrow) = tomorrow_local(tables, now_utc) else {
        return Vec::new();
    };
    let upcoming: Vec<&DailySample> = tables
        .daily
        .iter()
        .filter(|d| d.date.date_naive() >= tomorrow)
        .take(7)
        .collect();
    if upcoming.is_empty() {
        tables.daily.iter().take(7).collect()
    } else {
        upcoming
    }
}

fn rainy_days(rows: &[&DailySample]) -> usize {
    rows.iter()
        .filter(|d| d.precipitation_sum.unwrap_or(0.0) > RAIN_THRESHOLD_MM)
        .count()
}

/// Weekly forecast: one line per day starting tomorrow-local, plus a count
/// of rainy days.
pub fn weekly_forecast(
    tables: &ForecastTables,
    place_name: &str,
    now_utc: DateTime<Utc>,
) -> String {
    let rows = week_rows(tables, now_utc);
    if rows.is_empty() {
        return "Não consegui obter a previsão da semana agora.".to_string();
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|d| {
            format!(
                "- {} {}: {:.0}–{:.0} °C, chuva {:.0} mm",
                day_name(d),
                d.date.format("%d/%m"),
                d.temp_min.unwrap_or(f64::NAN),
                d.temp_max.unwrap_or(f64::NAN),
                d.precipitation_sum.unwrap_or(0.0),
            )
        })
        .collect();

    format!(
        "Previsão para **{}** (próx. 7 dias):\n\n{}\n\nResumo: chuva em ~{} dia(s).",
        place_name,
        lines.join("\n"),
        rainy_days(&rows),
    )
}

/// Yes/no rain answer for today, tomorrow, or the coming week, picked from
/// the message text.
pub fn rain_answer(
    message: &str,
    tables: &ForecastTables,
    place_name: &str,
    now_utc: DateTime<Utc>,
) -> String {
    let text = message.to_lowercase();

    if text.contains("amanhã") || text.contains("amanha") {
        if tables.daily.len() < 2 {
            return "Não consegui calcular para amanhã.".to_string();
        }
        let rain = tables.daily[1].precipitation_sum.unwrap_or(0.0);
        let verdict = if rain > RAIN_THRESHOLD_MM { "Sim" } else { "Não" };
        format!("{} deve chover **amanhã** em {}.", verdict, place_name)
    } else if text.contains("semana") {
        if tables.daily.is_empty() {
            return "Não consegui calcular para esta semana.".to_string();
        }
        let rows = week_rows(tables, now_utc);
        format!(
            "Na próxima semana, há sinal de chuva em ~{} dia(s) em {}.",
            rainy_days(&rows),
            place_name,
        )
    } else {
        if tables.hourly_today.is_empty() {
            return "Não consegui calcular para hoje.".to_string();
        }
        let rain: f64 = tables
            .hourly_today
            .iter()
            .filter_map(|h| h.precipitation)
            .sum();
        let verdict = if rain > RAIN_THRESHOLD_MM { "Sim" } else { "Não" };
        format!("{} deve chover **hoje** em {}.", verdict, place_name)
    }
}

/// "Now + today" summary: the hourly row closest to the current local time
/// plus today's daily figures.
pub fn current_conditions(
    tables: &ForecastTables,
    place_name: &str,
    now_utc: DateTime<Utc>,
) -> String {
    let (Some(today), false) = (tables.daily.first(), tables.hourly_today.is_empty()) else {
        return "Não consegui obter a previsão agora. Tente novamente em instantes.".to_string();
    };

    let closest = tables
        .hourly_today
        .iter()
        .min_by_key(|h| (h.time.with_timezone(&Utc) - now_utc).num_seconds().abs());
    let temp_now = closest
        .and_then(|h| h.temperature)
        .unwrap_or(f64::NAN);

    format!(
        "**{}**\n- Agora: **{:.1}°C**\n- Hoje: **mín {:.1}°C / máx {:.1}°C**, chuva **{:.1} mm** nas 24h",
        place_name,
        temp_now,
        today.temp_min.unwrap_or(f64::NAN),
        today.temp_max.unwrap_or(f64::NAN),
        today.precipitation_sum.unwrap_or(0.0),
    )
}
