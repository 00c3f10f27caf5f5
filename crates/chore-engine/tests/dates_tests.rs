//! Tests for date token helpers.

use chore_engine::dates::{
    add_days, clamped_date, days_in_month, format_date, join_dates, parse_date, parse_date_list,
    to_text_list, week_start,
};
use chore_engine::ChoreError;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn parses_and_formats_fixed_tokens() {
    let d = parse_date("2024-01-05").expect("valid token");
    assert_eq!(d, date(2024, 1, 5));
    assert_eq!(format_date(d), "2024-01-05");
}

#[test]
fn malformed_token_is_a_parse_error() {
    for token in ["", "2024-13-01", "05/01/2024", "yesterday", "2023-02-29"] {
        match parse_date(token) {
            Err(ChoreError::Parse { token: t, .. }) => assert_eq!(t, token),
            other => panic!("expected parse error for {:?}, got {:?}", token, other),
        }
    }
}

#[test]
fn token_lists_are_space_delimited() {
    let dates = parse_date_list("2024-01-05  2024-02-01 ").unwrap();
    assert_eq!(dates, vec![date(2024, 1, 5), date(2024, 2, 1)]);
    assert_eq!(join_dates(dates.clone()), "2024-01-05 2024-02-01");
    assert_eq!(to_text_list(&dates), vec!["2024-01-05", "2024-02-01"]);
    assert!(parse_date_list("   ").unwrap().is_empty());
}

#[test]
fn one_bad_token_fails_the_whole_list() {
    assert!(parse_date_list("2024-01-05 nope").is_err());
}

#[test]
fn month_lengths_and_clamping() {
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2025, 2), 28);
    assert_eq!(days_in_month(2025, 12), 31);
    assert_eq!(clamped_date(2025, 2, 31), Some(date(2025, 2, 28)));
    assert_eq!(clamped_date(2025, 4, 31), Some(date(2025, 4, 30)));
}

#[test]
fn signed_day_shifts_and_week_start() {
    assert_eq!(add_days(date(2024, 1, 1), -1), Some(date(2023, 12, 31)));
    assert_eq!(add_days(date(2024, 2, 28), 2), Some(date(2024, 3, 1)));
    // 2026-01-01 is a Thursday.
    assert_eq!(week_start(date(2026, 1, 1)), date(2025, 12, 29));
}
