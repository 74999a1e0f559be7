use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{DateTime, ParseError};

/// Webflow export timestamps, e.g. `Sun Jun 02 2024 19:09:10 GMT+0000`, split
/// into the leading weekday and the rest.
const WEEKDAY_FORMAT: &str = "%a";
const TIMESTAMP_FORMAT: &str = "%b %d %Y %H:%M:%S GMT%z";

/// Parse a Webflow CSV timestamp into an ISO date (`YYYY-MM-DD`).
///
/// The trailing ` (Zone Name)` is dropped before parsing. The weekday must be a
/// weekday name but is not checked against the date. Blank input yields an
/// empty string, which callers treat as "field absent".
pub fn to_iso_date(raw: &str) -> Result<String, ParseError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(String::new());
    }
    let s = s.split_once(" (").map_or(s, |(head, _)| head);

    let (weekday, rest) = s.split_once(' ').unwrap_or((s, ""));
    parse(&mut Parsed::new(), weekday, StrftimeItems::new(WEEKDAY_FORMAT))?;
    let dt = DateTime::parse_from_str(rest.trim_start(), TIMESTAMP_FORMAT)?;
    Ok(dt.date_naive().format("%Y-%m-%d").to_string())
}
