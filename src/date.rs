use serde_json::Value;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Parse a raw timestamp value into a UTC instant.
///
/// Strings may be RFC 3339 (with `T` or a single space as separator), an offset-less
/// `YYYY-MM-DDTHH:MM:SS[.fraction]` (taken as UTC) or a bare `YYYY-MM-DD`.
/// Integers and floats are Unix epoch seconds. Anything else is `None`.
pub fn parse_timestamp_utc(v: &Value) -> Option<OffsetDateTime> {
    match v {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => {
            if let Some(secs) = n.as_i64() {
                OffsetDateTime::from_unix_timestamp(secs).ok()
            } else {
                let f = n.as_f64()?;
                OffsetDateTime::from_unix_timestamp_nanos((f * 1e9) as i128).ok()
            }
        }
        _ => None,
    }
}

pub fn parse_timestamp_str(raw: &str) -> Option<OffsetDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let normalized;
    let s = if s.len() > 10 && s.as_bytes()[10] == b' ' {
        normalized = format!("{}T{}", &s[..10], &s[11..]);
        normalized.as_str()
    } else {
        s
    };

    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt.to_offset(UtcOffset::UTC));
    }
    let with_frac = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let plain = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    for fmt in [with_frac, plain] {
        if let Ok(p) = PrimitiveDateTime::parse(s, fmt) {
            return Some(p.assume_utc());
        }
    }
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

/// UTC calendar date of a raw timestamp value.
pub fn partition_date(v: &Value) -> Option<Date> {
    parse_timestamp_utc(v).map(|dt| dt.date())
}

/// `YYYY-MM-DD`
pub fn format_dt(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), d.month() as u8, d.day())
}

/// Wall-clock instant captured once per job run and stamped on every output row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunStamp {
    at: OffsetDateTime,
}

impl RunStamp {
    pub fn now() -> Self {
        Self { at: OffsetDateTime::now_utc() }
    }

    pub fn at(at: OffsetDateTime) -> Self {
        Self { at: at.to_offset(UtcOffset::UTC) }
    }

    /// ISO-8601 with microseconds (omitted when zero) and a trailing `Z`.
    pub fn iso(&self) -> String {
        let at = self.at;
        let mut s = format!(
            "{}T{:02}:{:02}:{:02}",
            format_dt(at.date()),
            at.hour(),
            at.minute(),
            at.second()
        );
        let micros = at.microsecond();
        if micros != 0 {
            s.push_str(&format!(".{:06}", micros));
        }
        s.push('Z');
        s
    }

    /// File-name safe identifier for this run (Unix nanoseconds).
    pub fn run_id(&self) -> String {
        self.at.unix_timestamp_nanos().to_string()
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}
