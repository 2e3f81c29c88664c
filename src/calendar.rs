//!
//! Calendar computations for the date-picker.
//!
//! Everything here is a pure function of its arguments, the
//! widget state is not involved. The grid is regenerated
//! wholesale whenever the displayed month changes.
//!

use chrono::{Datelike, Days, Local, NaiveDate};
use std::array;

/// One cell of the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    /// Date of the cell.
    pub date: NaiveDate,
    /// The cell belongs to the displayed month.
    pub in_month: bool,
    /// The cell is the current date.
    pub today: bool,
}

/// The 6x7 grid of day-cells for one displayed month.
///
/// Cells are row-major, starting at the first grid day on/before
/// the 1st of the displayed month, aligned to the week-start.
/// With rtl the cells of each week-row are mirrored, the order
/// of the weeks stays top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    /// First day of the displayed month.
    pub month: NaiveDate,
    /// The day-cells.
    pub cells: [DayCell; 42],
}

impl Default for MonthGrid {
    fn default() -> Self {
        month_grid_as_of(NaiveDate::default(), 0, false, NaiveDate::default())
    }
}

impl MonthGrid {
    /// The cell for the given date, if it's on the grid.
    pub fn cell_for(&self, date: NaiveDate) -> Option<usize> {
        self.cells.iter().position(|v| v.date == date)
    }
}

/// Compute the grid for the month of the given date.
///
/// Uses the current local date to flag today's cell.
/// The week-start is a weekday index 0-6 with 0 as Sunday,
/// anything bigger wraps around.
pub fn month_grid(displayed: NaiveDate, week_start: u8, rtl: bool) -> MonthGrid {
    month_grid_as_of(displayed, week_start, rtl, Local::now().date_naive())
}

/// Compute the grid for the month of the given date, with an
/// explicit date acting as 'today'.
pub fn month_grid_as_of(
    displayed: NaiveDate,
    week_start: u8,
    rtl: bool,
    today: NaiveDate,
) -> MonthGrid {
    let week_start = (week_start % 7) as u32;

    let month = displayed.with_day(1).expect("date");
    let back = (month.weekday().num_days_from_sunday() + 7 - week_start) % 7;
    let anchor = month - Days::new(back as u64);

    let mut cells: [DayCell; 42] = array::from_fn(|i| {
        let date = anchor + Days::new(i as u64);
        DayCell {
            date,
            in_month: date.month() == month.month() && date.year() == month.year(),
            today: date == today,
        }
    });

    if rtl {
        for row in cells.chunks_mut(7) {
            row.reverse();
        }
    }

    MonthGrid { month, cells }
}

/// Localized short weekday names, starting at the week-start.
/// Reversed for rtl, matching the grid columns.
pub fn weekday_names(week_start: u8, rtl: bool, loc: chrono::Locale) -> [String; 7] {
    let week_start = (week_start % 7) as u32;

    // a known sunday
    let sunday = NaiveDate::from_ymd_opt(2023, 1, 1).expect("date");

    let mut names: [String; 7] = array::from_fn(|i| {
        let day = sunday + Days::new(((week_start + i as u32) % 7) as u64);
        day.format_localized("%a", loc).to_string()
    });

    if rtl {
        names.reverse();
    }

    names
}

/// Localized month names in calendar order.
/// The position in the array is the month index. Never reversed.
pub fn month_names(loc: chrono::Locale) -> [String; 12] {
    array::from_fn(|i| {
        let month = NaiveDate::from_ymd_opt(2023, i as u32 + 1, 1).expect("date");
        month.format_localized("%B", loc).to_string()
    })
}

/// The years for the year-dropdown, inclusive on both ends.
pub fn years(year_start: i32, year_end: i32) -> Vec<i32> {
    (year_start..=year_end).collect()
}
