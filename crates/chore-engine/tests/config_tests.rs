//! Tests for option-bag decoding and schedule validation.

use chore_engine::{
    ActiveMonths, AnchorMode, ChoreError, ChoreSchedule, FrequencyUnit, MonthDay, Recurrence,
    StatusClass,
};
use chrono::{NaiveDate, Weekday};
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config_error(result: Result<ChoreSchedule, ChoreError>) -> (String, String) {
    match result {
        Err(ChoreError::Configuration { chore, message }) => (chore, message),
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[test]
fn every_n_days_with_numeric_string_period() {
    let schedule = ChoreSchedule::from_value(
        "fallback",
        &json!({
            "name": "Water plants",
            "frequency": "every-n-days",
            "period": "3",
            "start_date": "2024-01-01",
            "forecast_dates": 4.0,
        }),
    )
    .expect("valid options");

    assert_eq!(schedule.name, "Water plants");
    assert_eq!(schedule.frequency.unit, FrequencyUnit::Days);
    assert_eq!(schedule.frequency.anchor, AnchorMode::Fixed);
    assert_eq!(schedule.rule, Recurrence::EveryNDays { period: 3 });
    assert_eq!(schedule.start_date, Some(date(2024, 1, 1)));
    assert_eq!(schedule.forecast_dates, 4);
    assert!(!schedule.manual);
    assert_eq!(schedule.suppression_cap, 1000);
}

#[test]
fn missing_period_is_a_configuration_error() {
    let (chore, message) = config_error(ChoreSchedule::from_value(
        "Vacuum",
        &json!({"frequency": "after-n-days", "start_date": "2024-01-01"}),
    ));
    assert_eq!(chore, "Vacuum");
    assert!(message.contains("period"), "message: {}", message);
}

#[test]
fn non_positive_period_is_rejected() {
    let (_, message) = config_error(ChoreSchedule::from_value(
        "Vacuum",
        &json!({"frequency": "every-n-weeks", "period": 0, "start_date": "2024-01-01"}),
    ));
    assert!(message.contains("at least 1"));
}

#[test]
fn missing_start_date_is_rejected_for_interval_frequencies() {
    let (_, message) = config_error(ChoreSchedule::from_value(
        "Vacuum",
        &json!({"frequency": "every-n-days", "period": 2}),
    ));
    assert!(message.contains("start_date"));
}

#[test]
fn malformed_start_date_is_a_configuration_error() {
    config_error(ChoreSchedule::from_value(
        "Vacuum",
        &json!({"frequency": "every-n-days", "period": 2, "start_date": "01/02/2024"}),
    ));
}

#[test]
fn unknown_frequency_is_rejected() {
    let (_, message) = config_error(ChoreSchedule::from_value(
        "Vacuum",
        &json!({"frequency": "fortnightly"}),
    ));
    assert!(message.contains("Unknown frequency"));
}

#[test]
fn weekly_days_default_to_anchor_weekday() {
    // 2026-01-06 is a Tuesday.
    let schedule = ChoreSchedule::from_value(
        "Bins",
        &json!({"frequency": "every-n-weeks", "period": 1, "start_date": "2026-01-06"}),
    )
    .unwrap();
    assert_eq!(schedule.rule, Recurrence::weekly(1, [Weekday::Tue]));

    let schedule = ChoreSchedule::from_value(
        "Bins",
        &json!({
            "frequency": "every-n-weeks",
            "period": 2,
            "start_date": "2026-01-06",
            "chore_day": ["thu", "mon"],
        }),
    )
    .unwrap();
    assert_eq!(schedule.rule, Recurrence::weekly(2, [Weekday::Mon, Weekday::Thu]));
}

#[test]
fn invalid_weekday_name_is_rejected() {
    config_error(ChoreSchedule::from_value(
        "Bins",
        &json!({
            "frequency": "every-n-weeks",
            "period": 1,
            "start_date": "2026-01-06",
            "chore_day": "someday",
        }),
    ));
}

#[test]
fn monthly_variants_are_selected_from_options() {
    let base = |extra: serde_json::Value| {
        let mut value = json!({
            "frequency": "every-n-months",
            "period": 1,
            "start_date": "2026-01-01",
        });
        value
            .as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        ChoreSchedule::from_value("Filters", &value).unwrap().rule
    };

    assert_eq!(
        base(json!({})),
        Recurrence::Monthly {
            period: 1,
            day: MonthDay::AnchorDay
        }
    );
    assert_eq!(
        base(json!({"day_of_month": 15})),
        Recurrence::Monthly {
            period: 1,
            day: MonthDay::DayOfMonth(15)
        }
    );
    assert_eq!(
        base(json!({"chore_day": "fri", "weekday_order_number": "-1"})),
        Recurrence::Monthly {
            period: 1,
            day: MonthDay::NthWeekday {
                weekday: Weekday::Fri,
                order: -1
            }
        }
    );
    assert_eq!(
        base(json!({"chore_day": "wed", "weekday_order_number": 2, "force_week_numbers": true})),
        Recurrence::Monthly {
            period: 1,
            day: MonthDay::NthWeek {
                weekday: Weekday::Wed,
                order: 2
            }
        }
    );
}

#[test]
fn negative_day_of_month_is_rejected() {
    let (chore, message) = config_error(ChoreSchedule::from_value(
        "Filters",
        &json!({
            "frequency": "every-n-months",
            "period": 1,
            "start_date": "2024-01-10",
            "day_of_month": -5,
        }),
    ));
    assert_eq!(chore, "Filters");
    assert!(message.contains("-5"), "message: {}", message);
}

#[test]
fn zero_day_of_month_means_anchor_day() {
    let schedule = ChoreSchedule::from_value(
        "Filters",
        &json!({
            "frequency": "every-n-months",
            "period": 1,
            "start_date": "2024-01-10",
            "day_of_month": 0,
        }),
    )
    .unwrap();
    assert_eq!(
        schedule.rule,
        Recurrence::Monthly {
            period: 1,
            day: MonthDay::AnchorDay
        }
    );
}

#[test]
fn monthly_rejects_several_chore_days() {
    let (_, message) = config_error(ChoreSchedule::from_value(
        "Filters",
        &json!({
            "frequency": "every-n-months",
            "period": 1,
            "start_date": "2024-01-10",
            "chore_day": ["mon", "fri"],
            "weekday_order_number": 1,
        }),
    ));
    assert!(message.contains("single chore_day"), "message: {}", message);
}

#[test]
fn yearly_date_is_month_slash_day() {
    let schedule = ChoreSchedule::from_value(
        "Chimney",
        &json!({
            "frequency": "every-n-years",
            "period": 1,
            "start_date": "2024-01-01",
            "date": "10/15",
        }),
    )
    .unwrap();
    assert_eq!(
        schedule.rule,
        Recurrence::Yearly {
            period: 1,
            date: Some((10, 15))
        }
    );

    config_error(ChoreSchedule::from_value(
        "Chimney",
        &json!({
            "frequency": "every-n-years",
            "period": 1,
            "start_date": "2024-01-01",
            "date": "13/40",
        }),
    ));
}

#[test]
fn custom_dates_need_no_anchor_but_must_parse() {
    let schedule = ChoreSchedule::from_value(
        "Windows",
        &json!({"frequency": "custom-dates", "custom_dates": "2024-05-01 2024-03-01"}),
    )
    .unwrap();
    assert_eq!(
        schedule.rule,
        Recurrence::custom_dates([date(2024, 3, 1), date(2024, 5, 1)])
    );

    let err = ChoreSchedule::from_value(
        "Windows",
        &json!({"frequency": "custom-dates", "custom_dates": "2024-05-01 later"}),
    )
    .unwrap_err();
    assert!(matches!(err, ChoreError::Parse { .. }));
}

#[test]
fn month_window_and_icons() {
    let schedule = ChoreSchedule::from_value(
        "Mow lawn",
        &json!({
            "frequency": "every-n-days",
            "period": 7,
            "start_date": "2024-04-01",
            "first_month": "apr",
            "last_month": "October",
            "icon_overdue": "mdi:grass",
            "manual": true,
        }),
    )
    .unwrap();
    assert_eq!(schedule.active_months, ActiveMonths::new(4, 10));
    assert_eq!(schedule.icons.for_status(StatusClass::Overdue), "mdi:grass");
    assert_eq!(schedule.icons.for_status(StatusClass::Today), "mdi:bell");
    assert!(schedule.manual);

    config_error(ChoreSchedule::from_value(
        "Mow lawn",
        &json!({
            "frequency": "every-n-days",
            "period": 7,
            "start_date": "2024-04-01",
            "first_month": "smarch",
        }),
    ));
}

#[test]
fn wrongly_typed_option_is_a_configuration_error() {
    let (chore, _) = config_error(ChoreSchedule::from_value(
        "fallback",
        &json!({"name": "Dust", "frequency": "every-n-days", "period": "often"}),
    ));
    assert_eq!(chore, "Dust");
}
