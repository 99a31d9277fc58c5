use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_EMBEDDED_ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})").unwrap()
});

/// Best-effort calendar date for an observation's free-form `date` value.
/// Returns None when nothing date-like can be recovered.
pub fn parse_observation_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() { return None; }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    let datetime_fmts = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for f in datetime_fmts.iter() {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(ndt.date());
        }
    }
    // Day-first forms are the common convention on site paperwork
    let date_fmts = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d.%m.%Y",
        // Month-first only gets a look once the day-first reading is impossible
        "%m/%d/%Y",
        "%d %B %Y",
        "%d %b %Y",
        "%B %d, %Y",
        "%b %d, %Y",
    ];
    for f in date_fmts.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return Some(d);
        }
    }
    embedded_iso_date(s)
}

fn embedded_iso_date(s: &str) -> Option<NaiveDate> {
    let caps = RE_EMBEDDED_ISO_DATE.captures(s)?;
    let y: i32 = caps[1].parse().ok()?;
    let m: u32 = caps[2].parse().ok()?;
    let d: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}
