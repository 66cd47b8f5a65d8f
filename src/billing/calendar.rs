use crate::entities::PeriodUnit;
use chrono::{DateTime, Duration, Months, Utc};

/// Shift `at` forward by `amount` days or months.
///
/// Month arithmetic clamps to the last valid day of the target month
/// (Jan 31 + 1 month = Feb 28/29). Total for any `amount`; dates past the
/// chrono range saturate instead of failing.
pub fn add_period(at: DateTime<Utc>, amount: u32, unit: PeriodUnit) -> DateTime<Utc> {
    match unit {
        PeriodUnit::Days => at + Duration::days(i64::from(amount)),
        PeriodUnit::Months => at
            .checked_add_months(Months::new(amount))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_period(utc(2024, 1, 1), 0, PeriodUnit::Days), utc(2024, 1, 1));
        assert_eq!(add_period(utc(2024, 1, 1), 14, PeriodUnit::Days), utc(2024, 1, 15));
        assert_eq!(add_period(utc(2024, 2, 28), 2, PeriodUnit::Days), utc(2024, 3, 1));
    }

    #[test]
    fn test_add_months_simple() {
        assert_eq!(add_period(utc(2024, 1, 1), 1, PeriodUnit::Months), utc(2024, 2, 1));
        assert_eq!(add_period(utc(2024, 11, 15), 3, PeriodUnit::Months), utc(2025, 2, 15));
        assert_eq!(add_period(utc(2024, 5, 10), 0, PeriodUnit::Months), utc(2024, 5, 10));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        // leap year
        assert_eq!(add_period(utc(2024, 1, 31), 1, PeriodUnit::Months), utc(2024, 2, 29));
        // non-leap year
        assert_eq!(add_period(utc(2023, 1, 31), 1, PeriodUnit::Months), utc(2023, 2, 28));
        assert_eq!(add_period(utc(2024, 3, 31), 1, PeriodUnit::Months), utc(2024, 4, 30));
    }

    #[test]
    fn test_add_months_no_cumulative_drift() {
        // A single 2-month jump from Jan 31 lands back on the 31st, unlike
        // two chained 1-month jumps which would stick at the 28th/29th.
        assert_eq!(add_period(utc(2024, 1, 31), 2, PeriodUnit::Months), utc(2024, 3, 31));
    }
}
