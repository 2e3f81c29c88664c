use chrono::{Local, NaiveDate};
use rat_datepicker::datepicker::{ActiveDropdown, DateChanged, DatePickerState};
use rat_datepicker::options::DatePickerOptions;
use std::cell::RefCell;
use std::rc::Rc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

/// Records every change notification.
#[derive(Debug, Default, Clone)]
struct Recorder {
    calls: Rc<RefCell<Vec<Option<NaiveDate>>>>,
}

impl DateChanged for Recorder {
    fn date_changed(&mut self, date: Option<NaiveDate>) {
        self.calls.borrow_mut().push(date);
    }
}

impl Recorder {
    fn calls(&self) -> Vec<Option<NaiveDate>> {
        self.calls.borrow().clone()
    }
}

fn iso_state(default_date: Option<&str>) -> DatePickerState {
    DatePickerState::named("test")
        .with_options(&DatePickerOptions {
            format: "%Y-%m-%d".into(),
            default_date: default_date.map(|v| v.to_string()),
            ..Default::default()
        })
        .expect("options")
}

#[test]
fn test_init_default_date() {
    let state = iso_state(Some("2023-12-01"));
    assert_eq!(state.date(), Some(date(2023, 12, 1)));
    assert_eq!(state.displayed(), date(2023, 12, 1));
    assert_eq!(state.text(), "2023-12-01");
}

#[test]
fn test_init_no_default() {
    let state = iso_state(None);
    assert_eq!(state.date(), None);
    assert_eq!(state.displayed(), Local::now().date_naive());
    assert_eq!(state.text(), "");
}

#[test]
fn test_init_garbage_default() {
    let state = iso_state(Some("01.12.2023"));
    assert_eq!(state.date(), None);
    assert_eq!(state.text(), "");
}

#[test]
fn test_pick() {
    let mut state = iso_state(Some("2023-12-01"));
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.set_popup_active(true);
    state.pick(date(2023, 12, 15));

    assert_eq!(state.date(), Some(date(2023, 12, 15)));
    assert_eq!(state.displayed(), date(2023, 12, 15));
    assert_eq!(state.text(), "2023-12-15");
    assert!(!state.is_popup_active());
    assert_eq!(recorder.calls(), vec![Some(date(2023, 12, 15))]);
}

#[test]
fn test_pick_same_date_is_idempotent() {
    let mut state = iso_state(Some("2023-12-15"));
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.set_popup_active(true);
    state.pick(date(2023, 12, 15));

    assert_eq!(state.date(), Some(date(2023, 12, 15)));
    // the popup still collapses, but no notification
    assert!(!state.is_popup_active());
    assert_eq!(recorder.calls(), vec![]);
}

#[test]
fn test_pick_out_of_bounds() {
    let mut state = DatePickerState::named("test")
        .with_options(&DatePickerOptions {
            format: "%Y-%m-%d".into(),
            min_date: Some("2023-12-15".into()),
            max_date: Some("2024-01-15".into()),
            ..Default::default()
        })
        .expect("options");
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.pick(date(2023, 12, 14));
    assert_eq!(state.date(), None);
    assert_eq!(state.text(), "");

    state.pick(date(2024, 1, 16));
    assert_eq!(state.date(), None);

    assert_eq!(recorder.calls(), vec![]);

    // inclusive bounds
    state.pick(date(2023, 12, 15));
    assert_eq!(state.date(), Some(date(2023, 12, 15)));
    state.pick(date(2024, 1, 15));
    assert_eq!(state.date(), Some(date(2024, 1, 15)));
    assert_eq!(
        recorder.calls(),
        vec![Some(date(2023, 12, 15)), Some(date(2024, 1, 15))]
    );
}

#[test]
fn test_input_partial_leaves_selection() {
    let mut state = iso_state(Some("2023-12-01"));

    state.input.set_text("2023-1");
    state.input_changed();

    assert_eq!(state.date(), Some(date(2023, 12, 1)));
    assert_eq!(state.text(), "2023-1");
}

#[test]
fn test_input_complete_selects() {
    let mut state = iso_state(None);
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.input.set_text("2023-12-25");
    state.input_changed();

    assert_eq!(state.date(), Some(date(2023, 12, 25)));
    assert_eq!(state.displayed(), date(2023, 12, 25));
    assert_eq!(recorder.calls(), vec![Some(date(2023, 12, 25))]);
}

#[test]
fn test_input_sanitized() {
    let mut state = iso_state(None);

    state.input.set_text("20a23-x12- 01");
    state.input_changed();

    assert_eq!(state.text(), "2023-12- 01");
}

#[test]
fn test_input_emptied_clears() {
    let mut state = iso_state(Some("2023-12-01"));
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.input.set_text("");
    state.input_changed();

    assert_eq!(state.date(), None);
    // the displayed month stays put
    assert_eq!(state.displayed(), date(2023, 12, 1));
    assert_eq!(recorder.calls(), vec![None]);
}

#[test]
fn test_commit_empty() {
    let mut state = iso_state(Some("2023-12-01"));

    state.input.set_text("   ");
    state.commit();

    assert_eq!(state.date(), None);
    assert_eq!(state.text(), "");
}

#[test]
fn test_commit_valid_normalizes() {
    let mut state = DatePickerState::named("test")
        .with_options(&DatePickerOptions {
            format: "%d/%m/%Y".into(),
            ..Default::default()
        })
        .expect("options");

    state.input.set_text("1/2/2023");
    state.commit();

    assert_eq!(state.date(), Some(date(2023, 2, 1)));
    assert_eq!(state.text(), "01/02/2023");
}

#[test]
fn test_commit_garbage_falls_back_to_today() {
    let mut state = iso_state(Some("2023-12-01"));
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.input.set_text("12-34");
    let before = Local::now().date_naive();
    state.commit();
    let after = Local::now().date_naive();

    let selected = state.date().expect("date");
    assert!(selected == before || selected == after);
    assert_eq!(state.displayed(), selected);
    assert_eq!(
        state.text(),
        selected.format("%Y-%m-%d").to_string()
    );
    assert_eq!(recorder.calls(), vec![Some(selected)]);
}

#[test]
fn test_commit_notifies_once() {
    let mut state = iso_state(None);
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.input.set_text("2023-12-15");
    state.commit();
    // committing the same date again is quiet
    state.commit();

    assert_eq!(recorder.calls(), vec![Some(date(2023, 12, 15))]);
}

#[test]
fn test_clear() {
    let mut state = iso_state(Some("2023-12-01"));
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.set_popup_active(true);
    state.flip_dropdown(ActiveDropdown::Month);
    state.clear();

    assert_eq!(state.date(), None);
    assert_eq!(state.text(), "");
    assert_eq!(state.displayed(), Local::now().date_naive());
    assert_eq!(state.dropdown(), ActiveDropdown::None);
    assert!(!state.is_popup_active());
    // no notification for the programmatic reset
    assert_eq!(recorder.calls(), vec![]);
}

#[test]
fn test_reset_to_today() {
    let mut state = iso_state(Some("2023-12-01"));
    let recorder = Recorder::default();
    state.set_on_change(Some(recorder.clone()));

    state.reset_to_today();

    let today = Local::now().date_naive();
    assert_eq!(state.date(), Some(today));
    assert_eq!(state.displayed(), today);
    assert_eq!(state.text(), today.format("%Y-%m-%d").to_string());
    assert_eq!(recorder.calls(), vec![Some(today)]);
}

#[test]
fn test_month_arithmetic_clamps() {
    let mut state = iso_state(Some("2023-01-31"));

    state.next_month(1);
    assert_eq!(state.displayed(), date(2023, 2, 28));

    let mut state = iso_state(Some("2024-01-31"));
    state.next_month(1);
    assert_eq!(state.displayed(), date(2024, 2, 29));

    let mut state = iso_state(Some("2023-03-31"));
    state.prev_month(1);
    assert_eq!(state.displayed(), date(2023, 2, 28));

    // the selection is untouched by navigation
    assert_eq!(state.date(), Some(date(2023, 3, 31)));
}

#[test]
fn test_select_month_and_year() {
    let mut state = iso_state(Some("2023-01-31"));

    state.select_month(1);
    assert_eq!(state.displayed(), date(2023, 2, 28));

    let mut state = iso_state(Some("2023-01-15"));
    state.select_month(5);
    assert_eq!(state.displayed(), date(2023, 6, 15));

    let mut state = iso_state(Some("2024-02-29"));
    state.select_year(2023);
    assert_eq!(state.displayed(), date(2023, 2, 28));

    let mut state = iso_state(Some("2024-02-29"));
    state.select_year(2028);
    assert_eq!(state.displayed(), date(2028, 2, 29));
}

#[test]
fn test_dropdown_exclusive() {
    let mut state = iso_state(None);

    state.flip_dropdown(ActiveDropdown::Month);
    assert_eq!(state.dropdown(), ActiveDropdown::Month);

    state.flip_dropdown(ActiveDropdown::Year);
    assert_eq!(state.dropdown(), ActiveDropdown::Year);

    state.flip_dropdown(ActiveDropdown::Year);
    assert_eq!(state.dropdown(), ActiveDropdown::None);

    // navigation closes the dropdown
    state.flip_dropdown(ActiveDropdown::Month);
    state.next_month(1);
    assert_eq!(state.dropdown(), ActiveDropdown::None);
}

#[test]
fn test_format_round_trip() {
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        let d = date(2023, 12, 1);
        let text = d.format(format).to_string();
        let parsed = NaiveDate::parse_from_str(&text, format).expect("date");
        assert_eq!(parsed, d);
    }
}
