//! Owner console parameters.

use chrono::NaiveDate;

use crate::error::{DomainError, DomainResult};

/// Inclusive date range of a hotel report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl ReportPeriod {
    /// Builds a period. A single-day report has equal dates.
    ///
    /// # Errors
    ///
    /// Returns an error if `end_date` is before `start_date`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> DomainResult<Self> {
        if end_date < start_date {
            return Err(DomainError::InvalidBookingParameter(format!(
                "report end {end_date} is before start {start_date}"
            )));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// First day covered.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day covered.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// `startDate`/`endDate` query parameters, in that order.
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start_date.to_string()),
            ("endDate", self.end_date.to_string()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_day_period_is_allowed() {
        let day = date("2026-04-01");
        let period = ReportPeriod::new(day, day).unwrap();
        assert_eq!(period.start_date(), period.end_date());
    }

    #[test]
    fn test_reversed_period_is_rejected() {
        let err = ReportPeriod::new(date("2026-04-02"), date("2026-04-01")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidBookingParameter(_)));
    }

    #[test]
    fn test_query_pairs_use_camel_case() {
        let period = ReportPeriod::new(date("2026-04-01"), date("2026-04-30")).unwrap();
        assert_eq!(
            period.query_pairs(),
            [
                ("startDate", "2026-04-01".to_string()),
                ("endDate", "2026-04-30".to_string()),
            ]
        );
    }
}
