use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::core::types::SequenceId;
use crate::parsing::{parse_finite, parse_token, ParseError};

const ID: usize = 0;
const LATITUDE: usize = 1;
const LONGITUDE: usize = 2;
const DEPTH: usize = 3;
const ERROR_X: usize = 7;
const ERROR_Y: usize = 8;
const ERROR_Z: usize = 9;
const YEAR: usize = 10;
const MONTH: usize = 11;
const DAY: usize = 12;
const HOUR: usize = 13;
const MINUTE: usize = 14;
const SECOND: usize = 15;
const MAGNITUDE: usize = 16;
const RESIDUAL: usize = 22;

/// Which hypoDD output a hypocenter line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypocenterKind {
    /// `hypoDD.loc`: starting locations
    Initial,
    /// `hypoDD.reloc`: relocated events, with residual columns
    Relocated,
}

impl HypocenterKind {
    fn min_fields(self) -> usize {
        match self {
            Self::Initial => MAGNITUDE + 1,
            Self::Relocated => RESIDUAL + 1,
        }
    }
}

/// One decoded hypocenter line
#[derive(Debug, Clone, PartialEq)]
pub struct HypocenterRecord {
    pub sequence_id: SequenceId,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
    /// EX and EY in metres, as written
    pub horizontal_errors: (f64, f64),
    /// EZ in metres
    pub depth_error: f64,
    pub origin_time: DateTime<Utc>,
    pub magnitude: f64,
    /// Catalog travel-time residual; only relocated lines carry it
    pub rms: Option<f64>,
}

/// Parse hypocenter lines; blank lines are skipped
///
/// # Errors
///
/// Returns `ParseError::MissingField` for short lines, `ParseError::InvalidNumber`
/// for malformed numeric columns, or `ParseError::InvalidDate` for an
/// impossible calendar date.
pub fn parse_hypocenter_text(
    text: &str,
    kind: HypocenterKind,
) -> Result<Vec<HypocenterRecord>, ParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_hypocenter_line(line, kind, i + 1))
        .collect()
}

/// Decode one line. `line_num` is 1-based and only used in errors.
///
/// # Errors
///
/// See [`parse_hypocenter_text`].
pub fn parse_hypocenter_line(
    line: &str,
    kind: HypocenterKind,
    line_num: usize,
) -> Result<HypocenterRecord, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < kind.min_fields() {
        return Err(ParseError::MissingField {
            line: line_num,
            expected: kind.min_fields(),
            found: fields.len(),
        });
    }

    let sequence_id = SequenceId(parse_token(fields[ID], "event id", line_num)?);
    let float = |idx: usize, name: &'static str| parse_finite(fields[idx], name, line_num);

    let rms = match kind {
        HypocenterKind::Initial => None,
        HypocenterKind::Relocated => Some(float(RESIDUAL, "residual")?),
    };

    Ok(HypocenterRecord {
        sequence_id,
        latitude: float(LATITUDE, "latitude")?,
        longitude: float(LONGITUDE, "longitude")?,
        depth_km: float(DEPTH, "depth")?,
        horizontal_errors: (float(ERROR_X, "EX")?, float(ERROR_Y, "EY")?),
        depth_error: float(ERROR_Z, "EZ")?,
        origin_time: parse_origin_time(&fields, line_num)?,
        magnitude: float(MAGNITUDE, "magnitude")?,
        rms,
    })
}

fn parse_origin_time(fields: &[&str], line_num: usize) -> Result<DateTime<Utc>, ParseError> {
    let year: i32 = parse_token(fields[YEAR], "year", line_num)?;
    let month: u32 = parse_token(fields[MONTH], "month", line_num)?;
    let day: u32 = parse_token(fields[DAY], "day", line_num)?;
    let hour: u32 = parse_token(fields[HOUR], "hour", line_num)?;
    let minute: u32 = parse_token(fields[MINUTE], "minute", line_num)?;
    let micros = parse_seconds(fields[SECOND]).ok_or_else(|| ParseError::InvalidNumber {
        line: line_num,
        field: "second",
        value: fields[SECOND].to_string(),
    })?;

    let invalid = || ParseError::InvalidDate {
        line: line_num,
        value: format!(
            "{year}-{month}-{day} {hour}:{minute}:{}",
            fields[SECOND]
        ),
    };

    let midnight = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)?
        .and_utc();

    // hypoDD can write minute 60 or second 60.00; let the offsets carry over
    let offset = TimeDelta::try_hours(i64::from(hour))
        .zip(TimeDelta::try_minutes(i64::from(minute)))
        .and_then(|(h, m)| h.checked_add(&m))
        .and_then(|hm| hm.checked_add(&TimeDelta::microseconds(micros)))
        .ok_or_else(invalid)?;

    midnight.checked_add_signed(offset).ok_or_else(invalid)
}

/// Parse a `SS.fff` seconds field into whole microseconds.
///
/// The fraction is read as a decimal fraction: `5.23` is 5 s 230 ms. Digits
/// past the sixth are dropped.
fn parse_seconds(raw: &str) -> Option<i64> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let digits: String = fraction.chars().chain("000000".chars()).take(6).collect();
    let micros = whole
        .checked_mul(1_000_000)?
        .checked_add(digits.parse::<i64>().ok()?)?;

    Some(if negative { -micros } else { micros })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const LOC_LINE: &str = "     1  46.51200000   9.88100000     5.200     0.0     0.0     0.0   320.0   170.0   410.0 2019  5  3 12 30 15.25  2.3   0";
    const RELOC_LINE: &str = "     1  46.51234567   9.88123456     5.321   -12.3    45.6   -78.9   170.0   320.0   210.0 2019  5  3 12 30 15.31  2.3   14    9   22   17  0.012  0.034  1";

    #[test]
    fn test_parse_initial_line() {
        let rec = parse_hypocenter_line(LOC_LINE, HypocenterKind::Initial, 1).unwrap();
        assert_eq!(rec.sequence_id, SequenceId(1));
        assert!((rec.latitude - 46.512).abs() < 1e-9);
        assert!((rec.depth_km - 5.2).abs() < 1e-9);
        assert_eq!(rec.horizontal_errors, (320.0, 170.0));
        assert!((rec.depth_error - 410.0).abs() < 1e-9);
        assert_eq!(
            rec.origin_time,
            Utc.with_ymd_and_hms(2019, 5, 3, 12, 30, 15).unwrap() + Duration::milliseconds(250)
        );
        assert!(rec.rms.is_none());
    }

    #[test]
    fn test_parse_relocated_line() {
        let rec = parse_hypocenter_line(RELOC_LINE, HypocenterKind::Relocated, 1).unwrap();
        assert_eq!(rec.horizontal_errors, (170.0, 320.0));
        assert_eq!(rec.rms, Some(0.034));
    }

    #[test]
    fn test_relocated_layout_accepts_initial_prefix_only_as_initial() {
        // The initial line lacks the residual column
        let err = parse_hypocenter_line(LOC_LINE, HypocenterKind::Relocated, 7).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingField { line: 7, expected: 23, .. }
        ));
        // A relocated line decodes fine with the initial schema
        assert!(parse_hypocenter_line(RELOC_LINE, HypocenterKind::Initial, 1).is_ok());
    }

    #[test]
    fn test_malformed_numbers() {
        let bad = LOC_LINE.replacen("46.51200000", "46.5x", 1);
        let err = parse_hypocenter_line(&bad, HypocenterKind::Initial, 3).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber { line: 3, field: "latitude", .. }
        ));

        let bad_date = LOC_LINE.replacen(" 5  3 ", " 2 30 ", 1);
        let err = parse_hypocenter_line(&bad_date, HypocenterKind::Initial, 1).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
    }

    #[test]
    fn test_parse_text_skips_blank_lines_and_reports_line() {
        let text = format!("{LOC_LINE}\n\n{LOC_LINE}\nnot a line\n");
        let err = parse_hypocenter_text(&text, HypocenterKind::Initial).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { line: 4, .. }));

        let ok = format!("{LOC_LINE}\n\n{LOC_LINE}\n");
        assert_eq!(parse_hypocenter_text(&ok, HypocenterKind::Initial).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("15.25"), Some(15_250_000));
        assert_eq!(parse_seconds("0.123456789"), Some(123_456));
        assert_eq!(parse_seconds("7"), Some(7_000_000));
        assert_eq!(parse_seconds("60.00"), Some(60_000_000));
        assert_eq!(parse_seconds("-0.5"), Some(-500_000));
        assert_eq!(parse_seconds("."), None);
        assert_eq!(parse_seconds("1.2e3"), None);
        assert_eq!(parse_seconds("99999999999999999.25"), None);
    }

    #[test]
    fn test_out_of_range_time_fields_are_errors() {
        let huge_hour = LOC_LINE.replacen(" 12 30 ", " 9999999999999999 30 ", 1);
        let err = parse_hypocenter_line(&huge_hour, HypocenterKind::Initial, 2).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber { line: 2, field: "hour", .. }
        ));

        let negative_minute = LOC_LINE.replacen(" 12 30 ", " 12 -5 ", 1);
        let err = parse_hypocenter_line(&negative_minute, HypocenterKind::Initial, 1).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber { field: "minute", .. }
        ));

        let huge_second = LOC_LINE.replacen("15.25", "99999999999999999.25", 1);
        let err = parse_hypocenter_line(&huge_second, HypocenterKind::Initial, 1).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber { field: "second", .. }
        ));

        // Representable as offsets but past the end of the calendar
        let far_future = LOC_LINE
            .replacen(" 2019 ", " 262000 ", 1)
            .replacen(" 12 30 ", " 4000000000 30 ", 1);
        let err = parse_hypocenter_line(&far_future, HypocenterKind::Initial, 1).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { .. }));
    }

    #[test]
    fn test_second_sixty_rolls_over() {
        let line = LOC_LINE.replacen("30 15.25", "59 60.00", 1);
        let rec = parse_hypocenter_line(&line, HypocenterKind::Initial, 1).unwrap();
        assert_eq!(
            rec.origin_time,
            Utc.with_ymd_and_hms(2019, 5, 3, 13, 0, 0).unwrap()
        );
    }
}
