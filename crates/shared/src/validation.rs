//! Common validation logic.

use chrono::NaiveDate;
use thiserror::Error;

/// Rejection reasons for runner identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunnerIdError {
    #[error("runner id must not be empty")]
    Empty,
    #[error("runner id must be at most {0} characters")]
    TooLong(usize),
}

/// Normalises a self-asserted runner identifier.
///
/// Trims surrounding whitespace and enforces the configured length cap.
/// The identifier is otherwise opaque; no character class is imposed.
pub fn normalize_runner_id(raw: &str, max_len: usize) -> Result<String, RunnerIdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RunnerIdError::Empty);
    }
    if trimmed.chars().count() > max_len {
        return Err(RunnerIdError::TooLong(max_len));
    }
    Ok(trimmed.to_string())
}

/// Parses a `YYYY-MM` month string into its first and last calendar day.
pub fn month_window(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (year, month_num) = month.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month_num: u32 = month_num.parse().ok()?;
    let first = NaiveDate::from_ymd_opt(year, month_num, 1)?;
    let next_month = if month_num == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month_num + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        assert_eq!(
            normalize_runner_id("  12345678  ", 64),
            Ok("12345678".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert_eq!(normalize_runner_id("", 64), Err(RunnerIdError::Empty));
        assert_eq!(normalize_runner_id("   ", 64), Err(RunnerIdError::Empty));
    }

    #[test]
    fn test_normalize_rejects_over_length() {
        let long = "x".repeat(65);
        assert_eq!(
            normalize_runner_id(&long, 64),
            Err(RunnerIdError::TooLong(64))
        );
        // exactly at the cap is fine
        assert!(normalize_runner_id(&"x".repeat(64), 64).is_ok());
    }

    #[test]
    fn test_normalize_counts_chars_not_bytes() {
        let name = "å".repeat(64);
        assert!(normalize_runner_id(&name, 64).is_ok());
    }

    #[test]
    fn test_month_window() {
        let (first, last) = month_window("2025-03").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    }

    #[test]
    fn test_month_window_december() {
        let (first, last) = month_window("2024-12").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_month_window_leap_february() {
        let (_, last) = month_window("2024-02").unwrap();
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_month_window_rejects_garbage() {
        assert!(month_window("2025").is_none());
        assert!(month_window("2025-13").is_none());
        assert!(month_window("march").is_none());
        assert!(month_window("2025-3x").is_none());
    }
}
