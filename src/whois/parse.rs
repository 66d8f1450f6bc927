//! WHOIS data parsing and conversion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use whois_service::WhoisResponse;

use super::types::WhoisRecord;

/// Converts a whois-service response to a [`WhoisRecord`].
///
/// A response without parsed data yields a record carrying only the domain.
pub(crate) fn convert_response(domain: &str, response: &WhoisResponse) -> WhoisRecord {
    let Some(parsed) = &response.parsed_data else {
        return WhoisRecord {
            domain: domain.to_string(),
            ..Default::default()
        };
    };

    WhoisRecord {
        domain: domain.to_string(),
        registrar: parsed.registrar.clone(),
        registrant: parsed.registrant_name.clone(),
        creation_date: parsed.creation_date.as_deref().map(normalize_date),
        expiration_date: parsed.expiration_date.as_deref().map(normalize_date),
        updated_date: parsed.updated_date.as_deref().map(normalize_date),
        status: parsed.status.clone(),
        name_servers: parsed
            .name_servers
            .iter()
            .map(|ns| ns.trim_end_matches('.').to_lowercase())
            .collect(),
    }
}

/// Parses the date formats WHOIS servers commonly emit.
pub(crate) fn parse_date_string(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%d %H:%M:%S"];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%d/%m/%Y", "%Y.%m.%d"];

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date_str, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(date_str, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

/// RFC 3339 rendering of `raw`, or `raw` itself if it cannot be parsed.
pub(crate) fn normalize_date(raw: &str) -> String {
    parse_date_string(raw)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Domain queried for a host: a leading `www.` is dropped.
pub fn whois_domain(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_string_formats() {
        for input in [
            "2024-01-15T10:30:45.123Z",
            "2024-01-15T10:30:45Z",
            "2024-01-15T10:30:45+00:00",
            "2024-01-15 10:30:45",
            "2024-01-15",
            "15-Jan-2024",
            "15/01/2024",
            "2024.01.15",
        ] {
            let parsed = parse_date_string(input)
                .unwrap_or_else(|| panic!("{input} should parse"));
            assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2024-01-15", "{input}");
        }
    }

    #[test]
    fn test_parse_date_string_rejects_garbage() {
        assert!(parse_date_string("not a date").is_none());
        assert!(parse_date_string("").is_none());
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("1995-08-14"), "1995-08-14T00:00:00Z");
        assert_eq!(normalize_date(" before 1996 "), "before 1996");
    }

    #[test]
    fn test_whois_domain_strips_www() {
        assert_eq!(whois_domain("www.example.com"), "example.com");
        assert_eq!(whois_domain("blog.example.com"), "blog.example.com");
    }
}
