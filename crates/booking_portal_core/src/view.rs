//! crates/booking_portal_core/src/view.rs
//!
//! The derived listing: a pure projection of a record collection through a
//! search term and a sort key. Nothing here holds state; callers recompute the
//! whole projection from the full collection whenever an input changes.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::domain::{Badge, Record, SortKey};

/// `Upcoming` when the record's date is today or later, `Past` otherwise.
/// A record without a date is `Past`.
pub fn classify(record: &Record, today: NaiveDate) -> Badge {
    match record.appointment_date {
        Some(date) if date >= today => Badge::Upcoming,
        _ => Badge::Past,
    }
}

/// Case-insensitive substring match on the record name. The term is taken as
/// typed, whitespace included. An empty term matches everything.
pub fn matches_search(record: &Record, term: &str) -> bool {
    let term = term.to_lowercase();
    term.is_empty() || record.name.to_lowercase().contains(&term)
}

/// Sorts `records` in place under `key`. The sort is stable, so records the key
/// considers equal keep the order they arrived in.
pub fn sort_records(records: &mut [Record], key: SortKey, today: NaiveDate) {
    match key {
        SortKey::Date => records.sort_by(compare_dates),
        SortKey::Name => records.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::Upcoming => records.sort_by_key(|r| classify(r, today) == Badge::Past),
        SortKey::Past => records.sort_by_key(|r| classify(r, today) == Badge::Upcoming),
    }
}

/// `sort(filter(collection, term), key)`, built fresh from `collection`.
pub fn project(collection: &[Record], term: &str, key: SortKey, today: NaiveDate) -> Vec<Record> {
    let mut derived: Vec<Record> = collection
        .iter()
        .filter(|r| matches_search(r, term))
        .cloned()
        .collect();
    sort_records(&mut derived, key, today);
    derived
}

// Dated records first, ascending; undated ones trail.
fn compare_dates(a: &Record, b: &Record) -> Ordering {
    match (a.appointment_date, b.appointment_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordKind;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(name: &str, date: Option<NaiveDate>) -> Record {
        Record {
            id: name.to_lowercase(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            appointment_date: date,
            appointment_time: None,
            kind: RecordKind::Appointment,
        }
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn today() -> NaiveDate {
        day(2024, 6, 1)
    }

    #[test]
    fn test_classify_boundary_is_inclusive() {
        assert_eq!(classify(&rec("Ann", Some(today())), today()), Badge::Upcoming);
        assert_eq!(classify(&rec("Ann", Some(day(2024, 5, 31))), today()), Badge::Past);
        assert_eq!(classify(&rec("Ann", None), today()), Badge::Past);
    }

    #[test]
    fn test_sort_by_name() {
        let collection = vec![rec("Bob", Some(day(2099, 1, 1))), rec("Ann", Some(day(2000, 1, 1)))];
        let derived = project(&collection, "", SortKey::Name, today());
        assert_eq!(names(&derived), vec!["Ann", "Bob"]);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let collection = vec![rec("bob", None), rec("Carl", None), rec("ann", None)];
        let derived = project(&collection, "", SortKey::Name, today());
        assert_eq!(names(&derived), vec!["ann", "bob", "Carl"]);
    }

    #[test]
    fn test_upcoming_and_past_partition() {
        let collection = vec![
            rec("Ann", Some(day(2000, 1, 1))),
            rec("Bob", Some(day(2099, 1, 1))),
            rec("Cid", Some(today())),
            rec("Dee", None),
        ];

        let upcoming = project(&collection, "", SortKey::Upcoming, today());
        assert_eq!(names(&upcoming), vec!["Bob", "Cid", "Ann", "Dee"]);

        let past = project(&collection, "", SortKey::Past, today());
        assert_eq!(names(&past), vec!["Ann", "Dee", "Bob", "Cid"]);
    }

    #[test]
    fn test_upcoming_puts_future_first() {
        let collection = vec![rec("Bob", Some(day(2099, 1, 1))), rec("Ann", Some(day(2000, 1, 1)))];
        let derived = project(&collection, "", SortKey::Upcoming, today());
        assert_eq!(names(&derived), vec!["Bob", "Ann"]);
    }

    #[test]
    fn test_sort_by_date_puts_undated_last() {
        let collection = vec![
            rec("Undated", None),
            rec("Later", Some(day(2024, 7, 1))),
            rec("Sooner", Some(day(2024, 6, 2))),
        ];
        let derived = project(&collection, "", SortKey::Date, today());
        assert_eq!(names(&derived), vec!["Sooner", "Later", "Undated"]);
    }

    #[test]
    fn test_sorting_is_idempotent() {
        let collection = vec![
            rec("Bob", Some(day(2099, 1, 1))),
            rec("Ann", Some(day(2000, 1, 1))),
            rec("Cid", None),
            rec("Dee", Some(today())),
        ];
        for key in [SortKey::Date, SortKey::Name, SortKey::Upcoming, SortKey::Past] {
            let first = project(&collection, "", key, today());
            let mut second = first.clone();
            sort_records(&mut second, key, today());
            assert_eq!(first, second, "{:?}", key);
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let collection = vec![rec("Ann", None), rec("Bob", None), rec("Joanna", None)];
        let derived = project(&collection, "AN", SortKey::Date, today());
        assert_eq!(names(&derived), vec!["Ann", "Joanna"]);
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let collection = vec![rec("Goldsmith", None), rec("Ann Smith", None)];
        let derived = project(&collection, " smith", SortKey::Name, today());
        assert_eq!(names(&derived), vec!["Ann Smith"]);

        let derived = project(&collection, "ann ", SortKey::Name, today());
        assert_eq!(names(&derived), vec!["Ann Smith"]);
    }

    #[test]
    fn test_clearing_search_restores_full_collection() {
        let collection = vec![rec("Ann", None), rec("Bob", None)];
        let filtered = project(&collection, "an", SortKey::Date, today());
        assert_eq!(names(&filtered), vec!["Ann"]);

        let restored = project(&collection, "", SortKey::Date, today());
        assert_eq!(names(&restored), vec!["Ann", "Bob"]);
    }
}
