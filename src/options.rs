//!
//! Configuration for the date-picker.
//!
//! [DatePickerOptions] is what the application hands over,
//! [ResolvedOptions] is the validated form the widget works with.
//! Resolving fails loudly for a bad locale or a bad format
//! pattern, both point at a configuration defect. Malformed
//! min/max bounds just drop the bound.
//!

use chrono::format::StrftimeItems;
use chrono::{Locale, NaiveDate};
use log::warn;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Configuration for the date-picker.
///
/// Construct with struct-update syntax over the default:
///
/// ```rust
/// use rat_datepicker::options::DatePickerOptions;
///
/// let options = DatePickerOptions {
///     format: "%Y-%m-%d".into(),
///     min_date: Some("2023-12-15".into()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatePickerOptions {
    /// chrono format pattern used for parsing and formatting
    /// the input text.
    pub format: String,
    /// Locale code for month- and weekday-names, e.g. "en_US",
    /// "de_AT".
    pub lang: String,
    /// First weekday of each grid row. 0 is Sunday, 1 is Monday, ...
    /// Values greater than 6 wrap around.
    pub week_start: u8,
    /// Mirror the day columns of each row for right-to-left
    /// layouts.
    pub rtl: bool,
    /// Lower bound for selectable days, parsed with `format`.
    /// Inclusive.
    pub min_date: Option<String>,
    /// Upper bound for selectable days, parsed with `format`.
    /// Inclusive.
    pub max_date: Option<String>,
    /// Preset date, parsed with `format`.
    pub default_date: Option<String>,
    /// Show the calendar popup at all. With false this is just
    /// a date text input.
    pub show_picker: bool,
    /// First year of the year-dropdown.
    pub year_start: i32,
    /// Last year of the year-dropdown.
    pub year_end: i32,
}

/// Resolving [DatePickerOptions] failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatePickerError {
    /// The locale code doesn't name a known locale.
    Locale(String),
    /// The format pattern didn't parse.
    Format(String),
}

impl Display for DatePickerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for DatePickerError {}

/// Validated options, as used by the widget.
///
/// Created with [DatePickerOptions::resolve].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    /// chrono format pattern.
    pub format: String,
    /// Resolved locale.
    pub loc: Locale,
    /// Week-start normalized to 0-6.
    pub week_start: u8,
    /// Right-to-left layout.
    pub rtl: bool,
    /// Lower bound, if it parsed.
    pub min_date: Option<NaiveDate>,
    /// Upper bound, if it parsed.
    pub max_date: Option<NaiveDate>,
    /// Preset date, if it parsed.
    pub default_date: Option<NaiveDate>,
    /// Popup enabled.
    pub show_picker: bool,
    /// First year of the year-dropdown.
    pub year_start: i32,
    /// Last year of the year-dropdown.
    pub year_end: i32,
}

impl Default for DatePickerOptions {
    fn default() -> Self {
        Self {
            format: "%d/%m/%Y".to_string(),
            lang: "en_US".to_string(),
            week_start: 0,
            rtl: false,
            min_date: None,
            max_date: None,
            default_date: None,
            show_picker: true,
            year_start: 1950,
            year_end: 2050,
        }
    }
}

impl DatePickerOptions {
    /// Validate the options.
    ///
    /// An unknown locale or an invalid format pattern are
    /// configuration defects and fail. Min/max/default dates
    /// that don't parse under the format are dropped, the
    /// bounds with a warning.
    pub fn resolve(&self) -> Result<ResolvedOptions, DatePickerError> {
        StrftimeItems::new(&self.format)
            .parse()
            .map_err(|_| DatePickerError::Format(self.format.clone()))?;

        let loc = Locale::try_from(self.lang.as_str())
            .map_err(|_| DatePickerError::Locale(self.lang.clone()))?;

        let min_date = self
            .min_date
            .as_deref()
            .and_then(|v| parse_bound(v, &self.format));
        let max_date = self
            .max_date
            .as_deref()
            .and_then(|v| parse_bound(v, &self.format));

        let default_date = self
            .default_date
            .as_deref()
            .and_then(|v| NaiveDate::parse_from_str(v, &self.format).ok());

        Ok(ResolvedOptions {
            format: self.format.clone(),
            loc,
            week_start: self.week_start % 7,
            rtl: self.rtl,
            min_date,
            max_date,
            default_date,
            show_picker: self.show_picker,
            year_start: self.year_start,
            year_end: self.year_end,
        })
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        DatePickerOptions::default()
            .resolve()
            .expect("valid default options")
    }
}

fn parse_bound(text: &str, format: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(text, format) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("dropping date bound {:?}: {}", text, e);
            None
        }
    }
}
