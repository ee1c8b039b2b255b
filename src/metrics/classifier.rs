use chrono::NaiveDate;

/// Sprint end date as it can arrive from the tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndDate<'a> {
    Text(&'a str),
    Date(NaiveDate),
    Missing,
}

impl<'a> From<Option<&'a str>> for EndDate<'a> {
    fn from(value: Option<&'a str>) -> Self {
        match value {
            Some(text) => EndDate::Text(text),
            None => EndDate::Missing,
        }
    }
}

impl From<NaiveDate> for EndDate<'_> {
    fn from(value: NaiveDate) -> Self {
        EndDate::Date(value)
    }
}

/// Parse `YYYY-MM-DD`, dropping any time component after `T`
pub fn parse_end_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.split('T').next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Whether a sprint ending on `end_date` belongs to the baseline period.
///
/// Baseline means the end date is strictly before `cutoff`. A missing or
/// unparseable end date counts as baseline; this is a known bias in the
/// comparison, kept so results match previously published reports.
pub fn is_baseline<'a>(end_date: impl Into<EndDate<'a>>, cutoff: NaiveDate) -> bool {
    let date = match end_date.into() {
        EndDate::Date(date) => date,
        EndDate::Text(text) => match parse_end_date(text) {
            Some(date) => date,
            None => return true,
        },
        EndDate::Missing => return true,
    };
    date < cutoff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_date_strings() {
        assert!(is_baseline(Some("2023-12-31"), cutoff()));
        assert!(!is_baseline(Some("2024-01-01"), cutoff()));
        assert!(!is_baseline(Some("2024-03-15"), cutoff()));
    }

    #[test]
    fn test_datetime_is_truncated_to_date() {
        assert!(is_baseline(Some("2023-12-31T23:59:59.000Z"), cutoff()));
        assert!(!is_baseline(Some("2024-01-01T00:00:00.000+0000"), cutoff()));
    }

    #[test]
    fn test_date_values() {
        let before = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert!(is_baseline(before, cutoff()));
        assert!(!is_baseline(cutoff(), cutoff()));
    }

    #[test]
    fn test_unparseable_or_missing_defaults_to_baseline() {
        assert!(is_baseline(Some("not a date"), cutoff()));
        assert!(is_baseline(Some("2024/05/01"), cutoff()));
        assert!(is_baseline(Some(""), cutoff()));
        assert!(is_baseline(None::<&str>, cutoff()));
        assert!(is_baseline(EndDate::Missing, cutoff()));
    }
}
