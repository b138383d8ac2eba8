use crate::error::DateRangeError;
use chrono::NaiveDate;

/// Shared by every entry form: both dates present and `end >= start`.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> std::result::Result<(), DateRangeError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(DateRangeError::EndBeforeStart { start, end })
        }
        (Some(_), Some(_)) => Ok(()),
        _ => Err(DateRangeError::MissingDate),
    }
}

/// Rounds a monetary value to whole cents. Non-finite input counts as zero.
pub fn to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round()
}

/// True when `total` is above `ceiling` by at least one cent.
///
/// A total that overflowed to infinity (or is NaN) always exceeds a finite
/// ceiling. Values too large to scale to cents are compared directly.
pub fn exceeds_ceiling(total: f64, ceiling: f64) -> bool {
    if !total.is_finite() {
        return !ceiling.is_infinite() || total.is_nan();
    }
    if ceiling.is_nan() {
        return true;
    }

    let (total_cents, ceiling_cents) = (total * 100.0, ceiling * 100.0);
    if total_cents.is_infinite() || ceiling_cents.is_infinite() {
        return total > ceiling;
    }
    total_cents.round() > ceiling_cents.round()
}

/// Remaining room under a ceiling, rounded to cents and never negative.
pub fn remaining_under(ceiling: f64, used: f64) -> f64 {
    if !used.is_finite() || !ceiling.is_finite() {
        return 0.0;
    }
    ((ceiling - used) * 100.0).round().max(0.0) / 100.0
}

/// Trims free text, mapping blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_date_range() {
        assert!(validate_date_range(Some(date(2024, 1, 1)), Some(date(2024, 1, 31))).is_ok());
        assert!(validate_date_range(Some(date(2024, 1, 1)), Some(date(2024, 1, 1))).is_ok());

        assert_eq!(
            validate_date_range(Some(date(2024, 2, 1)), Some(date(2024, 1, 31))),
            Err(DateRangeError::EndBeforeStart {
                start: date(2024, 2, 1),
                end: date(2024, 1, 31),
            })
        );
        assert_eq!(
            validate_date_range(None, Some(date(2024, 1, 31))),
            Err(DateRangeError::MissingDate)
        );
        assert_eq!(
            validate_date_range(Some(date(2024, 1, 1)), None),
            Err(DateRangeError::MissingDate)
        );
    }

    #[test]
    fn test_ceiling_comparison_is_cent_exact() {
        // 0.1 + 0.2 drifts above 0.3 in binary floating point
        assert!(!exceeds_ceiling(0.1 + 0.2, 0.3));
        assert!(!exceeds_ceiling(10_000.0, 10_000.0));
        assert!(exceeds_ceiling(10_000.01, 10_000.0));
        assert!(!exceeds_ceiling(9_999.99, 10_000.0));
    }

    #[test]
    fn test_remaining_under() {
        assert_eq!(remaining_under(10_000.0, 9_500.0), 500.0);
        assert_eq!(remaining_under(1_000.0, 1_200.0), 0.0);
        assert_eq!(to_cents(f64::NAN), 0.0);
        assert_eq!(remaining_under(1_000.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_ceiling_holds_for_huge_amounts() {
        // Above i64 cents range, ordering must still hold
        assert!(exceeds_ceiling(6e17, 1e17));
        assert!(!exceeds_ceiling(1e17, 6e17));
        assert!(!exceeds_ceiling(5e17, 5e17));

        // Too large to scale by 100 without overflowing
        assert!(exceeds_ceiling(1.7e307, 1.6e307));
        assert!(!exceeds_ceiling(1.6e307, 1.7e307));

        // A running sum that overflowed
        assert!(exceeds_ceiling(1e308 + 1e308, 10_000.0));
        assert!(exceeds_ceiling(f64::NAN, 10_000.0));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  V-01 ")), Some("V-01"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
