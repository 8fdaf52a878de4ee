//! Session resolution scenarios.
//!
//! Reference dates:
//!   2023-01-01 Sun: New Year's Day (listed as holiday, also a weekend)
//!   2023-01-02 Mon
//!   2023-01-03 Tue
//!   2024-01-01 Mon: New Year's Day 2024
//!   2024-07-04 Thu: Independence Day
//!   2024-11-28 Thu: Thanksgiving
//!   2024-12-25 Wed: Christmas

use chrono::{Datelike, Days, NaiveDate, Weekday};
use sw_calendar::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn nyse_2024() -> HolidaySet {
    HolidaySet::from_records(
        2024,
        [
            "Monday, January 1",
            "Monday, January 15",
            "Monday, February 19",
            "Friday, March 29",
            "Monday, May 27",
            "Wednesday, June 19",
            "Thursday, July 4",
            "Monday, September 2",
            "Thursday, November 28",
            "Wednesday, December 25",
        ],
    )
    .unwrap()
}

fn nyse_2023() -> HolidaySet {
    HolidaySet::from_records(
        2023,
        [
            "Monday, January 2*",
            "Monday, January 16",
            "Monday, February 20",
            "Friday, April 7",
            "Monday, May 29",
            "Monday, June 19",
            "Tuesday, July 4",
            "Monday, September 4",
            "Thursday, November 23",
            "Monday, December 25",
        ],
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// is_open
// ---------------------------------------------------------------------------

#[test]
fn monday_jan_2_is_open_when_only_jan_1_is_a_holiday() {
    let set = HolidaySet::from_days(2023, [(1, 1)]).unwrap();
    assert!(is_open(d(2023, 1, 2), &set));
    assert!(!is_open(d(2023, 1, 1), &set));
}

#[test]
fn weekends_are_never_open() {
    let set = HolidaySet::empty(2024);
    let mut day = d(2024, 1, 1);
    while day.year() == 2024 {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            assert!(!is_open(day, &set), "{day} is a weekend");
        }
        day = day + Days::new(1);
    }
}

#[test]
fn listed_holidays_are_never_open_regardless_of_weekday() {
    let set = nyse_2024();
    for (month, day) in [(1, 1), (7, 4), (11, 28), (12, 25)] {
        assert!(!is_open(d(2024, month, day), &set));
        assert_eq!(
            market_status(d(2024, month, day), &set),
            MarketStatus::ClosedHoliday
        );
    }
}

// ---------------------------------------------------------------------------
// last_open_session
// ---------------------------------------------------------------------------

#[test]
fn tuesday_jan_3_reports_monday_jan_2() {
    let set = HolidaySet::from_days(2023, [(1, 1)]).unwrap();
    let w = last_open_session(d(2023, 1, 3), &set).unwrap();
    assert_eq!(w.start_date, d(2023, 1, 2));
    assert_eq!(w.end_date, d(2023, 1, 3));
}

#[test]
fn open_day_still_reports_the_previous_session() {
    let set = nyse_2024();
    // Wednesday 2024-01-10 is open; the completed session is Tuesday.
    assert!(is_open(d(2024, 1, 10), &set));
    let w = last_open_session(d(2024, 1, 10), &set).unwrap();
    assert_eq!(w.start_date, d(2024, 1, 9));
}

#[test]
fn holiday_after_weekend_is_skipped() {
    let set = nyse_2024();
    // Tue 2024-01-16: Mon 15th is MLK day, then the weekend, then Fri 12th.
    let w = last_open_session(d(2024, 1, 16), &set).unwrap();
    assert_eq!(w.start_date, d(2024, 1, 12));
    assert_eq!(w.end_date, d(2024, 1, 13));
}

#[test]
fn thanksgiving_is_skipped() {
    let set = nyse_2024();
    let w = last_open_session(d(2024, 11, 29), &set).unwrap();
    assert_eq!(w.start_date, d(2024, 11, 27));
}

#[test]
fn start_date_is_always_open() {
    let set = nyse_2024();
    let mut day = d(2024, 2, 1);
    while day < d(2024, 12, 31) {
        let w = last_open_session(day, &set).unwrap();
        assert!(is_open(w.start_date, &set), "{day} resolved to closed {}", w.start_date);
        assert!(w.start_date < day);
        assert_eq!(w.end_date, w.start_date + Days::new(1));
        day = day + Days::new(1);
    }
}

// ---------------------------------------------------------------------------
// Year coverage
// ---------------------------------------------------------------------------

#[test]
fn single_year_set_refuses_other_years() {
    let set = nyse_2024();
    assert_eq!(
        last_open_session(d(2025, 3, 3), &set).unwrap_err(),
        CalendarError::MissingYear { year: 2025 }
    );
}

#[test]
fn single_year_set_refuses_to_cross_into_unknown_year() {
    // Mon 2023-01-02 → Sun, Sat (weekends need no data) → Fri 2022-12-30.
    let set = HolidaySet::from_days(2023, [(1, 1)]).unwrap();
    assert_eq!(
        last_open_session(d(2023, 1, 2), &set).unwrap_err(),
        CalendarError::MissingYear { year: 2022 }
    );
}

#[test]
fn calendar_walks_across_new_year() {
    let cal = HolidayCalendar::new().with(nyse_2023()).with(nyse_2024());
    // Tue 2024-01-02: Jan 1 holiday, Dec 31 Sun, Dec 30 Sat, Dec 29 Fri.
    let w = cal.last_open_session(d(2024, 1, 2)).unwrap();
    assert_eq!(w.start_date, d(2023, 12, 29));
    assert_eq!(w.end_date, d(2023, 12, 30));
}

#[test]
fn calendar_without_previous_year_fails_at_the_boundary() {
    let cal = HolidayCalendar::new().with(nyse_2024());
    assert_eq!(
        cal.last_open_session(d(2024, 1, 2)).unwrap_err(),
        CalendarError::MissingYear { year: 2023 }
    );
}

#[test]
fn calendar_status_requires_data_only_for_weekdays() {
    let cal = HolidayCalendar::new();
    // Saturday 2026-10-17: closed without any holiday data.
    assert_eq!(
        cal.status(d(2026, 10, 17)).unwrap(),
        MarketStatus::ClosedWeekend
    );
    assert_eq!(
        cal.status(d(2026, 10, 19)).unwrap_err(),
        CalendarError::MissingYear { year: 2026 }
    );
}

#[test]
fn observed_marker_record_resolves() {
    let cal = HolidayCalendar::new().with(nyse_2023());
    assert_eq!(
        cal.status(d(2023, 1, 2)).unwrap(),
        MarketStatus::ClosedHoliday
    );
    // Tue 2023-01-03 → Mon 2nd (observed holiday) → weekend → Fri 2022-12-30.
    assert_eq!(
        cal.last_open_session(d(2023, 1, 3)).unwrap_err(),
        CalendarError::MissingYear { year: 2022 }
    );
}

#[test]
fn pathological_calendar_is_unresolvable_not_a_hang() {
    // Every weekday of 2024 and 2023 listed as a holiday.
    let all_days = |year| {
        let mut days = Vec::new();
        for month in 1..=12 {
            for day in 1..=31 {
                days.push((month, day));
            }
        }
        HolidaySet::from_days(year, days).unwrap()
    };
    let cal = HolidayCalendar::new().with(all_days(2023)).with(all_days(2024));
    assert_eq!(
        cal.last_open_session(d(2024, 12, 31)).unwrap_err(),
        CalendarError::Unresolvable {
            from: d(2024, 12, 31),
            max_steps: MAX_WALK_STEPS
        }
    );
}
