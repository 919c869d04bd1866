//! Token coercion for scalar field kinds.
//!
//! Each function turns one raw token into a typed value. All share the
//! [`ScalarFn`](crate::reflect::ScalarFn) signature `(field, token, options)`
//! so they can be stored as plain function pointers. Tokens are taken as-is:
//! no trimming, no locale handling.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{CoercionError, CoercionResult};
use crate::mapping::ParseOptions;
use crate::models::PrimitiveKind;

const TRUE_TOKENS: &[&str] = &["1", "t", "T", "TRUE", "true", "True"];
const FALSE_TOKENS: &[&str] = &["0", "f", "F", "FALSE", "false", "False"];

fn parse_failure(field: &str, token: &str, expected: PrimitiveKind) -> CoercionError {
    CoercionError::ParseFailure {
        field: field.to_string(),
        token: token.to_string(),
        expected,
    }
}

/// Boolean token. Uses [`ParseOptions::BooleanTokens`] when present,
/// otherwise the standard `1/t/true` and `0/f/false` spellings.
pub fn parse_bool(field: &str, token: &str, options: Option<&ParseOptions>) -> CoercionResult<bool> {
    if let Some(ParseOptions::BooleanTokens { truthy, falsy }) = options {
        if truthy.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            return Ok(true);
        }
        if falsy.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            return Ok(false);
        }
        return Err(parse_failure(field, token, PrimitiveKind::Boolean));
    }

    if TRUE_TOKENS.contains(&token) {
        Ok(true)
    } else if FALSE_TOKENS.contains(&token) {
        Ok(false)
    } else {
        Err(parse_failure(field, token, PrimitiveKind::Boolean))
    }
}

/// Base-10 integer in the native width. Overflow is a parse failure.
pub fn parse_integer<T: FromStr>(
    field: &str,
    token: &str,
    _options: Option<&ParseOptions>,
) -> CoercionResult<T> {
    token
        .parse::<T>()
        .map_err(|_| parse_failure(field, token, PrimitiveKind::Integer))
}

/// Base-10 floating point.
pub fn parse_decimal<T: FromStr>(
    field: &str,
    token: &str,
    _options: Option<&ParseOptions>,
) -> CoercionResult<T> {
    token
        .parse::<T>()
        .map_err(|_| parse_failure(field, token, PrimitiveKind::Decimal))
}

/// Raw token, verbatim.
pub fn parse_text(
    _field: &str,
    token: &str,
    _options: Option<&ParseOptions>,
) -> CoercionResult<String> {
    Ok(token.to_string())
}

fn timestamp_format<'a>(field: &str, options: Option<&'a ParseOptions>) -> CoercionResult<&'a str> {
    match options {
        Some(ParseOptions::TimestampFormat { format }) => Ok(format.as_str()),
        _ => Err(CoercionError::MissingOption {
            field: field.to_string(),
        }),
    }
}

fn naive_datetime(token: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(token, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(token, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Date-time. Date-only formats resolve to midnight.
pub fn parse_naive_datetime(
    field: &str,
    token: &str,
    options: Option<&ParseOptions>,
) -> CoercionResult<NaiveDateTime> {
    let format = timestamp_format(field, options)?;
    naive_datetime(token, format).ok_or_else(|| parse_failure(field, token, PrimitiveKind::Timestamp))
}

/// Calendar date.
pub fn parse_naive_date(
    field: &str,
    token: &str,
    options: Option<&ParseOptions>,
) -> CoercionResult<NaiveDate> {
    let format = timestamp_format(field, options)?;
    NaiveDate::parse_from_str(token, format)
        .map_err(|_| parse_failure(field, token, PrimitiveKind::Timestamp))
}

/// UTC instant. Formats with an offset are converted; formats without one
/// are read as UTC.
pub fn parse_utc_datetime(
    field: &str,
    token: &str,
    options: Option<&ParseOptions>,
) -> CoercionResult<DateTime<Utc>> {
    let format = timestamp_format(field, options)?;
    DateTime::parse_from_str(token, format)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| naive_datetime(token, format).map(|naive| naive.and_utc()))
        .ok_or_else(|| parse_failure(field, token, PrimitiveKind::Timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_bool_tokens() {
        for token in ["1", "t", "TRUE", "True"] {
            assert_eq!(parse_bool("Active", token, None), Ok(true));
        }
        for token in ["0", "F", "false"] {
            assert_eq!(parse_bool("Active", token, None), Ok(false));
        }
        assert!(matches!(
            parse_bool("Active", "yes", None),
            Err(CoercionError::ParseFailure { expected: PrimitiveKind::Boolean, .. })
        ));
    }

    #[test]
    fn test_bool_custom_tokens() {
        let options = ParseOptions::boolean_tokens(&["oui", "x"], &["non"]);
        assert_eq!(parse_bool("Instrumental", "OUI", Some(&options)), Ok(true));
        assert_eq!(parse_bool("Instrumental", "x", Some(&options)), Ok(true));
        assert_eq!(parse_bool("Instrumental", "non", Some(&options)), Ok(false));
        assert!(parse_bool("Instrumental", "true", Some(&options)).is_err());
    }

    #[test]
    fn test_integer_round_trip() {
        for value in [0_i64, -42, 8_305_025_573, i64::MAX, i64::MIN] {
            assert_eq!(parse_integer::<i64>("Id", &value.to_string(), None), Ok(value));
        }
        assert_eq!(parse_integer::<u8>("Age", "255", None), Ok(255));
    }

    #[test]
    fn test_integer_failures() {
        assert!(parse_integer::<i32>("Id", "8305025573", None).is_err()); // overflow
        assert!(parse_integer::<u32>("Id", "-1", None).is_err());
        assert!(parse_integer::<i64>("Id", "12a", None).is_err());
        assert!(parse_integer::<i64>("Id", " 12", None).is_err());
    }

    #[test]
    fn test_decimal_round_trip() {
        for value in [10000.53_f64, -0.25, 1e-9, 123456789.125] {
            let parsed = parse_decimal::<f64>("Budget", &value.to_string(), None).unwrap();
            assert!((parsed - value).abs() <= f64::EPSILON * value.abs().max(1.0));
        }
        assert!(matches!(
            parse_decimal::<f64>("Budget", "ten", None),
            Err(CoercionError::ParseFailure { expected: PrimitiveKind::Decimal, .. })
        ));
    }

    #[test]
    fn test_text_is_verbatim() {
        assert_eq!(parse_text("Name", "  Clementine ", None), Ok("  Clementine ".to_string()));
        assert_eq!(parse_text("Name", "", None), Ok(String::new()));
    }

    #[test]
    fn test_timestamp_requires_format() {
        assert_eq!(
            parse_naive_datetime("Join", "2011-04-11", None),
            Err(CoercionError::MissingOption { field: "Join".into() })
        );
        let wrong_kind = ParseOptions::boolean_tokens(&["y"], &[]);
        assert!(matches!(
            parse_naive_date("Join", "2011-04-11", Some(&wrong_kind)),
            Err(CoercionError::MissingOption { .. })
        ));
    }

    #[test]
    fn test_timestamp_date_only_is_midnight() {
        let options = ParseOptions::timestamp("%Y-%m-%d");
        let parsed = parse_naive_datetime("Join", "2011-04-11", Some(&options)).unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2011, 4, 11));
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let format = "%Y-%m-%d %H:%M:%S";
        let options = ParseOptions::timestamp(format);
        let value = NaiveDate::from_ymd_opt(2024, 2, 29)
            .and_then(|d| d.and_hms_opt(13, 45, 7))
            .unwrap();
        let token = value.format(format).to_string();
        assert_eq!(parse_naive_datetime("At", &token, Some(&options)), Ok(value));
        assert_eq!(
            parse_utc_datetime("At", &token, Some(&options)).map(|dt| dt.naive_utc()),
            Ok(value)
        );
    }

    #[test]
    fn test_timestamp_offset_converted() {
        let options = ParseOptions::timestamp("%Y-%m-%dT%H:%M:%S%z");
        let parsed = parse_utc_datetime("At", "2011-04-11T10:00:00+0200", Some(&options)).unwrap();
        assert_eq!(parsed.hour(), 8);
    }

    #[test]
    fn test_timestamp_reference_layout_is_literal() {
        let layout = ParseOptions::timestamp("2006-01-02");
        assert!(matches!(
            parse_naive_datetime("Join", "2011-04-11", Some(&layout)),
            Err(CoercionError::ParseFailure { expected: PrimitiveKind::Timestamp, .. })
        ));

        let strftime = ParseOptions::timestamp("%Y-%m-%d");
        assert!(parse_naive_datetime("Join", "2011-04-11", Some(&strftime)).is_ok());
    }

    #[test]
    fn test_timestamp_mismatch() {
        let options = ParseOptions::timestamp("%Y-%m-%d");
        assert!(matches!(
            parse_naive_date("Join", "11/04/2011", Some(&options)),
            Err(CoercionError::ParseFailure { expected: PrimitiveKind::Timestamp, .. })
        ));
    }
}
