use chrono::{Duration, NaiveDate};

/// This is the standard way of converting a date to a string in daylog.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Number of whole days covered by a span, inclusive of both endpoints.
/// A task started and finished on the same day has a duration of 1.
pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Dates between start (inclusive) and end (inclusive).
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), move |current| {
        let next = *current + Duration::days(1);
        (next <= end).then_some(next)
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_range, span_days};

    #[test]
    fn span_is_inclusive_of_both_endpoints() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(span_days(day, day), 1);
        assert_eq!(span_days(day, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()), 3);
    }

    #[test]
    fn date_range_walks_both_endpoints() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let days: Vec<_> = date_range(start, end).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], start);
        assert_eq!(days[3], end);
    }
}
