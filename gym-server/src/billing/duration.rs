//! Membership duration labels and cycle-length resolution

use shared::error::{AppError, AppResult, ErrorCode};

/// The closed set of accepted duration labels
pub const ALLOWED_LABELS: [&str; 4] = ["1 Month", "3 Months", "6 Months", "1 Year"];

/// Normalized membership duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationLabel {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl DurationLabel {
    /// Parse a free-form or already-canonical duration string.
    /// Matching is trim + case-insensitive against the four allowed labels.
    pub fn parse(input: &str) -> AppResult<Self> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "1 month" => Ok(Self::OneMonth),
            "3 months" => Ok(Self::ThreeMonths),
            "6 months" => Ok(Self::SixMonths),
            "1 year" => Ok(Self::OneYear),
            _ => Err(AppError::with_message(
                ErrorCode::InvalidDuration,
                format!(
                    "Invalid duration '{}'. Allowed values: {}",
                    input,
                    ALLOWED_LABELS.join(", ")
                ),
            )),
        }
    }

    /// The canonical label
    pub fn label(&self) -> &'static str {
        match self {
            Self::OneMonth => "1 Month",
            Self::ThreeMonths => "3 Months",
            Self::SixMonths => "6 Months",
            Self::OneYear => "1 Year",
        }
    }

    /// Cycle length in calendar months
    pub fn months(&self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::OneYear => 12,
        }
    }
}

/// Normalize a duration string to its canonical label
pub fn normalize(input: &str) -> AppResult<&'static str> {
    DurationLabel::parse(input).map(|d| d.label())
}

/// Cycle length in months for a stored duration label.
///
/// Strict parse first; falls back to the substring heuristic of the legacy
/// data ("year" → 12, '6' → 6, '3' → 3, otherwise 1) so that un-normalized
/// records keep resolving. New input must pass [`DurationLabel::parse`].
pub fn months_for_label(label: &str) -> u32 {
    if let Ok(d) = DurationLabel::parse(label) {
        return d.months();
    }
    let value = label.to_lowercase();
    if value.contains("year") {
        12
    } else if value.contains('6') {
        6
    } else if value.contains('3') {
        3
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        assert_eq!(DurationLabel::parse("1 Month").unwrap(), DurationLabel::OneMonth);
        assert_eq!(
            DurationLabel::parse("3 Months").unwrap(),
            DurationLabel::ThreeMonths
        );
        assert_eq!(
            DurationLabel::parse("6 Months").unwrap(),
            DurationLabel::SixMonths
        );
        assert_eq!(DurationLabel::parse("1 Year").unwrap(), DurationLabel::OneYear);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(
            DurationLabel::parse("  1 month  ").unwrap(),
            DurationLabel::OneMonth
        );
        assert_eq!(DurationLabel::parse("1 YEAR").unwrap(), DurationLabel::OneYear);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = DurationLabel::parse("2 Weeks").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDuration);
        // message enumerates the allowed values
        assert!(err.message.contains("1 Month"));
        assert!(err.message.contains("1 Year"));
    }

    #[test]
    fn test_months() {
        assert_eq!(DurationLabel::OneMonth.months(), 1);
        assert_eq!(DurationLabel::ThreeMonths.months(), 3);
        assert_eq!(DurationLabel::SixMonths.months(), 6);
        assert_eq!(DurationLabel::OneYear.months(), 12);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("6 months").unwrap(), "6 Months");
        assert!(normalize("fortnight").is_err());
    }

    #[test]
    fn test_months_for_label_legacy_heuristic() {
        // Compatibility shim for un-normalized stored data
        assert_eq!(months_for_label("Yearly"), 12);
        assert_eq!(months_for_label("6mo"), 6);
        assert_eq!(months_for_label("3-month plan"), 3);
        assert_eq!(months_for_label("Monthly"), 1);
        assert_eq!(months_for_label(""), 1);
    }

    #[test]
    fn test_months_for_label_canonical() {
        assert_eq!(months_for_label("1 Year"), 12);
        assert_eq!(months_for_label("1 Month"), 1);
    }
}
