use chrono::NaiveDate;
use rat_datepicker::options::{DatePickerError, DatePickerOptions};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

#[test]
fn test_defaults() {
    let resolved = DatePickerOptions::default().resolve().expect("resolve");

    assert_eq!(resolved.format, "%d/%m/%Y");
    assert_eq!(resolved.loc, chrono::Locale::en_US);
    assert_eq!(resolved.week_start, 0);
    assert!(!resolved.rtl);
    assert_eq!(resolved.min_date, None);
    assert_eq!(resolved.max_date, None);
    assert_eq!(resolved.default_date, None);
    assert!(resolved.show_picker);
    assert_eq!(resolved.year_start, 1950);
    assert_eq!(resolved.year_end, 2050);
}

#[test]
fn test_unknown_locale() {
    let options = DatePickerOptions {
        lang: "xx_XX".into(),
        ..Default::default()
    };
    assert_eq!(
        options.resolve(),
        Err(DatePickerError::Locale("xx_XX".into()))
    );
}

#[test]
fn test_bad_format() {
    let options = DatePickerOptions {
        format: "%q".into(),
        ..Default::default()
    };
    assert_eq!(options.resolve(), Err(DatePickerError::Format("%q".into())));
}

#[test]
fn test_week_start_normalized() {
    let options = DatePickerOptions {
        week_start: 13,
        ..Default::default()
    };
    assert_eq!(options.resolve().expect("resolve").week_start, 6);
}

#[test]
fn test_bounds() {
    let options = DatePickerOptions {
        format: "%Y-%m-%d".into(),
        min_date: Some("2023-12-15".into()),
        max_date: Some("2024-01-15".into()),
        ..Default::default()
    };
    let resolved = options.resolve().expect("resolve");
    assert_eq!(resolved.min_date, Some(date(2023, 12, 15)));
    assert_eq!(resolved.max_date, Some(date(2024, 1, 15)));
}

#[test]
fn test_malformed_bounds_are_dropped() {
    let options = DatePickerOptions {
        format: "%Y-%m-%d".into(),
        min_date: Some("soon".into()),
        max_date: Some("15/01/2024".into()),
        ..Default::default()
    };
    let resolved = options.resolve().expect("resolve");
    assert_eq!(resolved.min_date, None);
    assert_eq!(resolved.max_date, None);
}

#[test]
fn test_default_date() {
    let options = DatePickerOptions {
        format: "%Y-%m-%d".into(),
        default_date: Some("2023-12-01".into()),
        ..Default::default()
    };
    let resolved = options.resolve().expect("resolve");
    assert_eq!(resolved.default_date, Some(date(2023, 12, 1)));

    let options = DatePickerOptions {
        format: "%Y-%m-%d".into(),
        default_date: Some("12/2023".into()),
        ..Default::default()
    };
    let resolved = options.resolve().expect("resolve");
    assert_eq!(resolved.default_date, None);
}
