//!
//! Date-picker widget.
//!
//! A text input paired with a popup calendar. The input accepts
//! free text and parses it with a chrono format pattern, the
//! calendar picks a day with the mouse.
//!
//! This doesn't render as one piece. [into_widgets](DatePicker::into_widgets)
//! creates the base part and the popup part, which are rendered
//! separately. Render the popup after everything it may overlap.
//!
//! ```rust no_run
//! use rat_datepicker::datepicker::{DatePicker, DatePickerState};
//! use rat_datepicker::options::DatePickerOptions;
//! use ratatui::widgets::Block;
//! # use ratatui::buffer::Buffer;
//! # use ratatui::layout::Rect;
//! # use ratatui::widgets::StatefulWidget;
//! # let mut buf = Buffer::empty(Rect::new(0, 0, 80, 25));
//! # let buf = &mut buf;
//!
//! let mut state = DatePickerState::named("date")
//!     .with_options(&DatePickerOptions {
//!         format: "%Y-%m-%d".into(),
//!         ..Default::default()
//!     })
//!     .expect("valid options");
//!
//! let (widget, popup) = DatePicker::new()
//!     .block(Block::bordered())
//!     .into_widgets();
//! widget.render(Rect::new(3, 3, 15, 3), buf, &mut state);
//!
//! // ... render other widgets ...
//!
//! popup.render(Rect::new(3, 3, 15, 3), buf, &mut state);
//! ```
//!
use crate::_private::NonExhaustive;
use crate::calendar::{self, MonthGrid};
use crate::datepicker::event::PickerOutcome;
use crate::options::{DatePickerError, DatePickerOptions, ResolvedOptions};
use crate::util::{block_size, fill_buf_area, revert_style};
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use rat_event::util::{item_at, mouse_trap, MouseFlags};
use rat_event::{ct_event, ConsumedEvent, HandleEvent, MouseOnly, Popup, Regular};
use rat_focus::{FocusBuilder, FocusFlag, HasFocus, Navigation};
use rat_popup::event::PopupOutcome;
use rat_popup::{Placement, PopupCore, PopupCoreState, PopupStyle};
use rat_reloc::{relocate_area, relocate_areas, RelocatableState};
use rat_scrolled::event::ScrollOutcome;
use rat_scrolled::{ScrollAreaState, ScrollState};
use rat_text::event::TextOutcome;
use rat_text::text_input::{TextInput, TextInputState};
use rat_text::{HasScreenCursor, TextStyle};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Style, Stylize};
use ratatui::text::Span;
use ratatui::widgets::{Block, StatefulWidget, Widget};
use std::cmp::max;

/// Which dropdown of the popup is currently open.
///
/// There is one month-dropdown and one year-dropdown, at most
/// one of them can be open.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ActiveDropdown {
    /// No dropdown open.
    #[default]
    None,
    /// Month list.
    Month,
    /// Year list.
    Year,
}

/// Listener for changes of the picked date.
///
/// Called once for every user interaction that changes the
/// picked date, with the new date or None after clearing the
/// input. Not called for programmatic changes via
/// [set_date](DatePickerState::set_date) or
/// [clear](DatePickerState::clear).
pub trait DateChanged: std::fmt::Debug {
    /// The picked date changed.
    fn date_changed(&mut self, date: Option<NaiveDate>);
}

/// DatePicker.
///
/// This doesn't render itself. [into_widgets](DatePicker::into_widgets)
/// creates the base part and the popup part, which are rendered
/// separately.
#[derive(Debug, Clone)]
pub struct DatePicker<'a> {
    style: Style,
    text_style: Option<TextStyle>,
    focus_style: Option<Style>,
    select_style: Option<Style>,
    today_style: Option<Style>,
    disabled_style: Option<Style>,
    other_style: Option<Style>,
    weekday_style: Option<Style>,
    nav_style: Option<Style>,
    block: Option<Block<'a>>,

    popup_alignment: Alignment,
    popup_placement: Placement,
    popup: PopupCore<'a>,
}

/// Renders the input field.
#[derive(Debug)]
pub struct DatePickerWidget<'a> {
    input: TextInput<'a>,
}

/// Renders the calendar popup. This is rendered after the rest
/// of the area and overwrites to display itself.
#[derive(Debug)]
pub struct DatePickerPopup<'a> {
    style: Style,
    focus_style: Option<Style>,
    select_style: Option<Style>,
    today_style: Option<Style>,
    disabled_style: Option<Style>,
    other_style: Option<Style>,
    weekday_style: Option<Style>,
    nav_style: Option<Style>,

    popup_alignment: Alignment,
    popup_placement: Placement,
    popup: PopupCore<'a>,
}

/// Combined style.
#[derive(Debug, Clone)]
pub struct DatePickerStyle {
    pub style: Style,
    /// Styling for the text input.
    pub text: Option<TextStyle>,
    /// Weekday header.
    pub weekday: Option<Style>,
    /// Days outside the displayed month.
    pub other_month: Option<Style>,
    /// The current date.
    pub today: Option<Style>,
    /// Days outside the min/max bounds.
    pub disabled: Option<Style>,
    /// The picked day.
    pub select: Option<Style>,
    /// Navigation items in the popup header.
    pub nav: Option<Style>,
    /// Focus.
    pub focus: Option<Style>,
    /// Block for the input field.
    pub block: Option<Block<'static>>,

    pub popup: PopupStyle,

    pub non_exhaustive: NonExhaustive,
}

/// State & event-handling.
#[derive(Debug)]
pub struct DatePickerState {
    /// Total area of the input field.
    /// __read only__. renewed for each render.
    pub area: Rect,
    /// The embedded text input.
    pub input: TextInputState,
    /// Popup state.
    pub popup: PopupCoreState,

    /// Area of the prev-month button.
    /// __read only__. renewed for each render.
    pub area_prev: Rect,
    /// Area of the today button.
    /// __read only__. renewed for each render.
    pub area_today: Rect,
    /// Area of the month-dropdown button.
    /// __read only__. renewed for each render.
    pub area_month: Rect,
    /// Area of the year-dropdown button.
    /// __read only__. renewed for each render.
    pub area_year: Rect,
    /// Area of the next-month button.
    /// __read only__. renewed for each render.
    pub area_next: Rect,
    /// Area of the day grid.
    /// __read only__. renewed for each render.
    pub area_grid: Rect,
    /// Area of each day cell.
    /// __read only__. renewed for each render.
    pub area_days: [Rect; 42],
    /// Area of the open dropdown list.
    /// __read only__. renewed for each render.
    pub area_list: Rect,
    /// Visible items of the open dropdown list.
    /// __read only__. renewed for each render.
    pub area_list_items: Vec<Rect>,
    /// Scroll state for the dropdown lists.
    /// __read+write__
    pub list_scroll: ScrollState,

    /// The grid last shown in the popup.
    /// __read only__. renewed for each render.
    grid: MonthGrid,

    /// Resolved options.
    props: ResolvedOptions,
    /// Month shown in the calendar. Any day of that month.
    displayed: NaiveDate,
    /// The picked date.
    selected: Option<NaiveDate>,
    /// Open dropdown.
    dropdown: ActiveDropdown,
    /// Change listener.
    on_change: Option<Box<dyn DateChanged>>,

    /// Mouse util.
    pub mouse: MouseFlags,

    pub non_exhaustive: NonExhaustive,
}

pub(crate) mod event {
    use rat_event::{ConsumedEvent, Outcome};
    use rat_popup::event::PopupOutcome;
    use rat_text::event::TextOutcome;

    /// Result of event handling.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub enum PickerOutcome {
        /// The given event has not been used at all.
        Continue,
        /// The event has been recognized, but the result was nil.
        /// Further processing for this event may stop.
        Unchanged,
        /// The event has been recognized and there is some change
        /// due to it.
        /// Further processing for this event may stop.
        /// Rendering the ui is advised.
        Changed,
        /// The picked date changed.
        Picked,
    }

    impl ConsumedEvent for PickerOutcome {
        fn is_consumed(&self) -> bool {
            *self != PickerOutcome::Continue
        }
    }

    impl From<Outcome> for PickerOutcome {
        fn from(value: Outcome) -> Self {
            match value {
                Outcome::Continue => PickerOutcome::Continue,
                Outcome::Unchanged => PickerOutcome::Unchanged,
                Outcome::Changed => PickerOutcome::Changed,
            }
        }
    }

    impl From<PickerOutcome> for Outcome {
        fn from(value: PickerOutcome) -> Self {
            match value {
                PickerOutcome::Continue => Outcome::Continue,
                PickerOutcome::Unchanged => Outcome::Unchanged,
                PickerOutcome::Changed => Outcome::Changed,
                PickerOutcome::Picked => Outcome::Changed,
            }
        }
    }

    impl From<PopupOutcome> for PickerOutcome {
        fn from(value: PopupOutcome) -> Self {
            match value {
                PopupOutcome::Continue => PickerOutcome::Continue,
                PopupOutcome::Unchanged => PickerOutcome::Unchanged,
                PopupOutcome::Changed => PickerOutcome::Changed,
                PopupOutcome::Hide => PickerOutcome::Changed,
            }
        }
    }

    impl From<TextOutcome> for PickerOutcome {
        fn from(value: TextOutcome) -> Self {
            match value {
                TextOutcome::Continue => PickerOutcome::Continue,
                TextOutcome::Unchanged => PickerOutcome::Unchanged,
                TextOutcome::Changed => PickerOutcome::Changed,
                TextOutcome::TextChanged => PickerOutcome::Changed,
            }
        }
    }
}

impl Default for DatePickerStyle {
    fn default() -> Self {
        Self {
            style: Default::default(),
            text: None,
            weekday: None,
            other_month: None,
            today: None,
            disabled: None,
            select: None,
            nav: None,
            focus: None,
            block: None,
            popup: Default::default(),
            non_exhaustive: NonExhaustive,
        }
    }
}

impl Default for DatePicker<'_> {
    fn default() -> Self {
        Self {
            style: Default::default(),
            text_style: Default::default(),
            focus_style: Default::default(),
            select_style: Default::default(),
            today_style: Default::default(),
            disabled_style: Default::default(),
            other_style: Default::default(),
            weekday_style: Default::default(),
            nav_style: Default::default(),
            block: Default::default(),
            popup_alignment: Alignment::Left,
            popup_placement: Placement::BelowOrAbove,
            popup: Default::default(),
        }
    }
}

impl<'a> DatePicker<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combined styles.
    pub fn styles(mut self, styles: DatePickerStyle) -> Self {
        self.style = styles.style;
        if styles.text.is_some() {
            self.text_style = styles.text;
        }
        if styles.weekday.is_some() {
            self.weekday_style = styles.weekday;
        }
        if styles.other_month.is_some() {
            self.other_style = styles.other_month;
        }
        if styles.today.is_some() {
            self.today_style = styles.today;
        }
        if styles.disabled.is_some() {
            self.disabled_style = styles.disabled;
        }
        if styles.select.is_some() {
            self.select_style = styles.select;
        }
        if styles.nav.is_some() {
            self.nav_style = styles.nav;
        }
        if styles.focus.is_some() {
            self.focus_style = styles.focus;
        }
        if styles.block.is_some() {
            self.block = styles.block;
        }
        self.block = self.block.map(|v| v.style(self.style));
        if let Some(alignment) = styles.popup.alignment {
            self.popup_alignment = alignment;
        }
        if let Some(placement) = styles.popup.placement {
            self.popup_placement = placement;
        }
        self.popup = self.popup.styles(styles.popup);
        self
    }

    /// Base style.
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self.block = self.block.map(|v| v.style(self.style));
        self
    }

    /// Styling for the text input.
    pub fn text_style(mut self, style: TextStyle) -> Self {
        self.text_style = Some(style);
        self
    }

    /// Focused style.
    pub fn focus_style(mut self, style: Style) -> Self {
        self.focus_style = Some(style);
        self
    }

    /// Style for the picked day.
    pub fn select_style(mut self, style: Style) -> Self {
        self.select_style = Some(style);
        self
    }

    /// Style for the current date.
    pub fn today_style(mut self, style: Style) -> Self {
        self.today_style = Some(style);
        self
    }

    /// Style for days outside the min/max bounds.
    pub fn disabled_style(mut self, style: Style) -> Self {
        self.disabled_style = Some(style);
        self
    }

    /// Style for days outside the displayed month.
    pub fn other_month_style(mut self, style: Style) -> Self {
        self.other_style = Some(style);
        self
    }

    /// Style for the weekday header.
    pub fn weekday_style(mut self, style: Style) -> Self {
        self.weekday_style = Some(style);
        self
    }

    /// Style for the navigation items in the popup header.
    pub fn nav_style(mut self, style: Style) -> Self {
        self.nav_style = Some(style);
        self
    }

    /// Block for the input field.
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self.block = self.block.map(|v| v.style(self.style));
        self
    }

    /// Alignment of the popup.
    ///
    /// __Default__
    /// Default is Left.
    pub fn popup_alignment(mut self, alignment: Alignment) -> Self {
        self.popup_alignment = alignment;
        self
    }

    /// Placement of the popup.
    ///
    /// __Default__
    /// Default is BelowOrAbove.
    pub fn popup_placement(mut self, placement: Placement) -> Self {
        self.popup_placement = placement;
        self
    }

    /// Outer boundary for the popup.
    pub fn popup_boundary(mut self, boundary: Rect) -> Self {
        self.popup = self.popup.boundary(boundary);
        self
    }

    /// Base style for the popup.
    pub fn popup_style(mut self, style: Style) -> Self {
        self.popup = self.popup.style(style);
        self
    }

    /// Block for the popup.
    pub fn popup_block(mut self, block: Block<'a>) -> Self {
        self.popup = self.popup.block(block);
        self
    }

    /// Adds an extra offset to the popup area.
    pub fn popup_offset(mut self, offset: (i16, i16)) -> Self {
        self.popup = self.popup.offset(offset);
        self
    }

    /// Inherent width of the input field.
    pub fn width(&self, state: &DatePickerState) -> u16 {
        let sample = NaiveDate::from_ymd_opt(2024, 12, 28)
            .expect("date")
            .format_localized(&state.props.format, state.props.loc)
            .to_string();
        sample.chars().count() as u16 + 1 + block_size(&self.block).width
    }

    /// Inherent height of the input field.
    pub fn height(&self) -> u16 {
        1 + block_size(&self.block).height
    }

    /// DatePicker itself doesn't render.
    ///
    /// This builds the widgets from the parameters set for DatePicker.
    pub fn into_widgets(self) -> (DatePickerWidget<'a>, DatePickerPopup<'a>) {
        let mut input = TextInput::new();
        if let Some(text_style) = self.text_style {
            input = input.styles(text_style);
        } else {
            input = input.style(self.style);
            if let Some(focus_style) = self.focus_style {
                input = input.focus_style(focus_style);
            }
        }
        if let Some(block) = self.block {
            input = input.block(block);
        }

        (
            DatePickerWidget { input },
            DatePickerPopup {
                style: self.style,
                focus_style: self.focus_style,
                select_style: self.select_style,
                today_style: self.today_style,
                disabled_style: self.disabled_style,
                other_style: self.other_style,
                weekday_style: self.weekday_style,
                nav_style: self.nav_style,
                popup_alignment: self.popup_alignment,
                popup_placement: self.popup_placement,
                popup: self.popup,
            },
        )
    }
}

impl<'a> StatefulWidget for &DatePickerWidget<'a> {
    type State = DatePickerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_input(self, area, buf, state);
    }
}

impl StatefulWidget for DatePickerWidget<'_> {
    type State = DatePickerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_input(&self, area, buf, state);
    }
}

fn render_input(
    widget: &DatePickerWidget<'_>,
    area: Rect,
    buf: &mut Buffer,
    state: &mut DatePickerState,
) {
    state.area = area;
    (&widget.input).render(area, buf, &mut state.input);
}

impl DatePickerPopup<'_> {
    /// Calculate the layout for the popup before rendering.
    /// Area is the area of the input field, not the popup.
    pub fn layout(&self, area: Rect, buf: &mut Buffer, state: &mut DatePickerState) -> Rect {
        if state.popup.is_active() {
            let size = self.popup.get_block_size();
            let pop_area = Rect::new(0, 0, 21 + size.width, 8 + size.height);
            self.popup
                .ref_constraint(
                    self.popup_placement
                        .into_constraint(self.popup_alignment, area),
                )
                .layout(pop_area, buf)
        } else {
            Rect::default()
        }
    }
}

impl StatefulWidget for &DatePickerPopup<'_> {
    type State = DatePickerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_popup(self, area, buf, state);
    }
}

impl StatefulWidget for DatePickerPopup<'_> {
    type State = DatePickerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_popup(&self, area, buf, state);
    }
}

fn render_popup(
    widget: &DatePickerPopup<'_>,
    area: Rect,
    buf: &mut Buffer,
    state: &mut DatePickerState,
) {
    if !state.popup.is_active() {
        state.popup.clear_areas();
        clear_areas(state);
        return;
    }

    let size = widget.popup.get_block_size();
    let pop_area = Rect::new(0, 0, 21 + size.width, 8 + size.height);

    widget
        .popup
        .ref_constraint(
            widget
                .popup_placement
                .into_constraint(widget.popup_alignment, area),
        )
        .render(pop_area, buf, &mut state.popup);

    state.grid = calendar::month_grid(state.displayed, state.props.week_start, state.props.rtl);

    let inner = state.popup.widget_area;

    render_header(widget, inner, buf, state);
    render_weekdays(widget, inner, buf, state);
    render_days(widget, inner, buf, state);
    render_dropdown(widget, inner, buf, state);
}

fn clear_areas(state: &mut DatePickerState) {
    state.area_prev = Rect::default();
    state.area_today = Rect::default();
    state.area_month = Rect::default();
    state.area_year = Rect::default();
    state.area_next = Rect::default();
    state.area_grid = Rect::default();
    for area in &mut state.area_days {
        *area = Rect::default();
    }
    state.area_list = Rect::default();
    state.area_list_items.clear();
}

// header segment, x-mirrored for rtl
fn header_area(inner: Rect, x: u16, width: u16, rtl: bool) -> Rect {
    let x = if rtl {
        inner.x + inner.width.saturating_sub(x + width)
    } else {
        inner.x + x
    };
    Rect::new(x, inner.y, width, 1).intersection(inner)
}

fn render_header(
    widget: &DatePickerPopup<'_>,
    inner: Rect,
    buf: &mut Buffer,
    state: &mut DatePickerState,
) {
    let rtl = state.props.rtl;
    let loc = state.props.loc;

    let nav_style = widget.nav_style.unwrap_or(widget.style);

    state.area_prev = header_area(inner, 0, 2, rtl);
    state.area_today = header_area(inner, 3, 2, rtl);
    state.area_month = header_area(inner, 6, 9, rtl);
    state.area_year = header_area(inner, 15, 4, rtl);
    state.area_next = header_area(inner, 19, 2, rtl);

    let (prev, next) = if rtl { ("▸", "◂") } else { ("◂", "▸") };

    Span::from(prev).style(nav_style).render(state.area_prev, buf);
    Span::from("⌂").style(nav_style).render(state.area_today, buf);
    Span::from(state.displayed.format_localized("%B", loc).to_string())
        .style(nav_style)
        .render(state.area_month, buf);
    Span::from(state.displayed.year().to_string())
        .style(nav_style)
        .render(state.area_year, buf);
    Span::from(next).style(nav_style).render(state.area_next, buf);
}

fn render_weekdays(
    widget: &DatePickerPopup<'_>,
    inner: Rect,
    buf: &mut Buffer,
    state: &mut DatePickerState,
) {
    let weekday_style = widget.weekday_style.unwrap_or(widget.style);

    let names = calendar::weekday_names(state.props.week_start, state.props.rtl, state.props.loc);
    for (i, name) in names.iter().enumerate() {
        let area = Rect::new(inner.x + i as u16 * 3, inner.y + 1, 2, 1).intersection(inner);
        Span::from(format!("{:2}", name))
            .style(weekday_style)
            .render(area, buf);
    }
}

fn render_days(
    widget: &DatePickerPopup<'_>,
    inner: Rect,
    buf: &mut Buffer,
    state: &mut DatePickerState,
) {
    let day_style = widget.style;
    let other_style = widget.other_style.unwrap_or(day_style.dim());
    let today_style = widget.today_style.unwrap_or(day_style.underlined());
    let disabled_style = widget.disabled_style.unwrap_or(day_style.crossed_out());
    let focus_style = widget.focus_style.unwrap_or(revert_style(widget.style));
    let select_style = if state.is_focused() {
        focus_style
    } else {
        widget.select_style.unwrap_or(revert_style(widget.style))
    };

    state.area_grid = Rect::new(inner.x, inner.y + 2, 21, 6).intersection(inner);

    for (i, cell) in state.grid.cells.iter().enumerate() {
        let area = Rect::new(
            inner.x + (i % 7) as u16 * 3,
            inner.y + 2 + (i / 7) as u16,
            2,
            1,
        )
        .intersection(inner);
        state.area_days[i] = area;

        let mut style = if cell.in_month { day_style } else { other_style };
        if cell.today {
            style = style.patch(today_style);
        }
        if out_of_bounds(&state.props, cell.date) {
            style = style.patch(disabled_style);
        } else if state.selected == Some(cell.date) {
            style = style.patch(select_style);
        }

        Span::from(cell.date.format_localized("%e", state.props.loc).to_string())
            .style(style)
            .render(area, buf);
    }
}

fn render_dropdown(
    widget: &DatePickerPopup<'_>,
    inner: Rect,
    buf: &mut Buffer,
    state: &mut DatePickerState,
) {
    let list_style = widget.style;
    let select_style = widget.select_style.unwrap_or(revert_style(widget.style));

    let (items, current) = match state.dropdown {
        ActiveDropdown::None => {
            state.area_list = Rect::default();
            state.area_list_items.clear();
            return;
        }
        ActiveDropdown::Month => (
            Vec::from(calendar::month_names(state.props.loc)),
            state.displayed.month0() as usize,
        ),
        ActiveDropdown::Year => (
            calendar::years(state.props.year_start, state.props.year_end)
                .iter()
                .map(|v| v.to_string())
                .collect(),
            (state.displayed.year() - state.props.year_start).max(0) as usize,
        ),
    };

    let list_area = Rect::new(inner.x + 2, inner.y + 1, 17, 7).intersection(inner);
    state.area_list = list_area;
    state.list_scroll.max_offset = items.len().saturating_sub(list_area.height as usize);
    state.list_scroll.page_len = list_area.height as usize;

    fill_buf_area(buf, list_area, " ", list_style);

    state.area_list_items.clear();
    let mut row = list_area.y;
    let mut idx = state.list_scroll.offset;
    loop {
        if row >= list_area.bottom() {
            break;
        }

        let item_area = Rect::new(list_area.x, row, list_area.width, 1);
        state.area_list_items.push(item_area);

        if let Some(item) = items.get(idx) {
            let style = if idx == current {
                list_style.patch(select_style)
            } else {
                list_style
            };
            buf.set_style(item_area, style);
            Span::from(format!(" {}", item)).style(style).render(item_area, buf);
        }

        row += 1;
        idx += 1;
    }
}

impl Clone for DatePickerState {
    fn clone(&self) -> Self {
        Self {
            area: self.area,
            input: self.input.clone(),
            popup: self.popup.clone(),
            area_prev: self.area_prev,
            area_today: self.area_today,
            area_month: self.area_month,
            area_year: self.area_year,
            area_next: self.area_next,
            area_grid: self.area_grid,
            area_days: self.area_days,
            area_list: self.area_list,
            area_list_items: self.area_list_items.clone(),
            list_scroll: self.list_scroll.clone(),
            grid: self.grid.clone(),
            props: self.props.clone(),
            displayed: self.displayed,
            selected: self.selected,
            dropdown: self.dropdown,
            on_change: None,
            mouse: Default::default(),
            non_exhaustive: NonExhaustive,
        }
    }
}

impl Default for DatePickerState {
    fn default() -> Self {
        Self {
            area: Default::default(),
            input: Default::default(),
            popup: Default::default(),
            area_prev: Default::default(),
            area_today: Default::default(),
            area_month: Default::default(),
            area_year: Default::default(),
            area_next: Default::default(),
            area_grid: Default::default(),
            area_days: [Rect::default(); 42],
            area_list: Default::default(),
            area_list_items: Default::default(),
            list_scroll: Default::default(),
            grid: Default::default(),
            props: Default::default(),
            displayed: Local::now().date_naive(),
            selected: None,
            dropdown: Default::default(),
            on_change: None,
            mouse: Default::default(),
            non_exhaustive: NonExhaustive,
        }
    }
}

impl HasFocus for DatePickerState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.widget_with_flags(self.focus(), self.area(), 0, self.navigable());
        builder.widget_with_flags(self.focus(), self.popup.area, 1, Navigation::Mouse);
    }

    fn focus(&self) -> FocusFlag {
        self.input.focus.clone()
    }

    fn area(&self) -> Rect {
        self.area
    }
}

impl HasScreenCursor for DatePickerState {
    fn screen_cursor(&self) -> Option<(u16, u16)> {
        self.input.screen_cursor()
    }
}

impl RelocatableState for DatePickerState {
    fn relocate(&mut self, shift: (i16, i16), clip: Rect) {
        self.area = relocate_area(self.area, shift, clip);
        self.area_prev = relocate_area(self.area_prev, shift, clip);
        self.area_today = relocate_area(self.area_today, shift, clip);
        self.area_month = relocate_area(self.area_month, shift, clip);
        self.area_year = relocate_area(self.area_year, shift, clip);
        self.area_next = relocate_area(self.area_next, shift, clip);
        self.area_grid = relocate_area(self.area_grid, shift, clip);
        relocate_areas(&mut self.area_days, shift, clip);
        self.area_list = relocate_area(self.area_list, shift, clip);
        relocate_areas(&mut self.area_list_items, shift, clip);
        self.input.relocate(shift, clip);
        self.popup.relocate(shift, clip);
    }
}

impl DatePickerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        let mut state = Self::default();
        state.input.focus = FocusFlag::named(name);
        state.popup = PopupCoreState::named(format!("{}.popup", name).as_str());
        state
    }

    /// Apply the options and reset the state accordingly.
    ///
    /// If a default-date is set and parses, it becomes the
    /// selection. Otherwise the calendar starts at today with
    /// nothing selected.
    pub fn with_options(mut self, options: &DatePickerOptions) -> Result<Self, DatePickerError> {
        self.set_options(options)?;
        Ok(self)
    }

    /// Apply the options and reset the state accordingly.
    pub fn set_options(&mut self, options: &DatePickerOptions) -> Result<(), DatePickerError> {
        self.props = options.resolve()?;
        if let Some(date) = self.props.default_date {
            self.selected = Some(date);
            self.displayed = date;
            self.set_input_formatted(date);
        } else {
            self.selected = None;
            self.displayed = Local::now().date_naive();
            self.input.set_text("");
        }
        self.dropdown = ActiveDropdown::None;
        Ok(())
    }

    /// The resolved options.
    pub fn options(&self) -> &ResolvedOptions {
        &self.props
    }

    /// Listener for changes of the picked date.
    pub fn set_on_change(&mut self, on_change: Option<impl DateChanged + 'static>) {
        match on_change {
            Some(v) => self.on_change = Some(Box::new(v)),
            None => self.on_change = None,
        }
    }

    /// The picked date.
    pub fn date(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// Set the picked date.
    ///
    /// Programmatic change, doesn't call the change listener.
    pub fn set_date(&mut self, date: Option<NaiveDate>) -> bool {
        let old = self.selected;
        self.selected = date;
        if let Some(date) = date {
            self.displayed = date;
            self.set_input_formatted(date);
        } else {
            self.input.set_text("");
        }
        old != self.selected
    }

    /// The month shown in the calendar.
    pub fn displayed(&self) -> NaiveDate {
        self.displayed
    }

    /// Set the month shown in the calendar.
    pub fn set_displayed(&mut self, date: NaiveDate) -> bool {
        let old = self.displayed;
        self.displayed = date;
        old != self.displayed
    }

    /// Current input text.
    pub fn text(&self) -> &str {
        self.input.text()
    }

    /// The open dropdown.
    pub fn dropdown(&self) -> ActiveDropdown {
        self.dropdown
    }

    /// Popup is active?
    pub fn is_popup_active(&self) -> bool {
        self.popup.is_active()
    }

    /// Flip the popup state.
    pub fn flip_popup_active(&mut self) {
        self.set_popup_active(!self.is_popup_active());
    }

    /// Show the popup.
    ///
    /// Noop if the options disable the picker.
    pub fn set_popup_active(&mut self, active: bool) -> bool {
        if active && !self.props.show_picker {
            return false;
        }
        let old = self.popup.is_active();
        self.popup.set_active(active);
        if !active {
            self.dropdown = ActiveDropdown::None;
        }
        old != self.popup.is_active()
    }
}

impl DatePickerState {
    /// Scroll the calendar back n months.
    ///
    /// Keeps the day-of-month where possible, clamps to the end
    /// of the month otherwise. Closes any open dropdown.
    pub fn prev_month(&mut self, n: u32) -> PickerOutcome {
        self.dropdown = ActiveDropdown::None;
        if let Some(date) = self.displayed.checked_sub_months(Months::new(n)) {
            self.displayed = date;
            PickerOutcome::Changed
        } else {
            PickerOutcome::Unchanged
        }
    }

    /// Scroll the calendar forward n months.
    ///
    /// Keeps the day-of-month where possible, clamps to the end
    /// of the month otherwise. Closes any open dropdown.
    pub fn next_month(&mut self, n: u32) -> PickerOutcome {
        self.dropdown = ActiveDropdown::None;
        if let Some(date) = self.displayed.checked_add_months(Months::new(n)) {
            self.displayed = date;
            PickerOutcome::Changed
        } else {
            PickerOutcome::Unchanged
        }
    }

    /// Show the given month, by 0-based month index.
    ///
    /// Keeps the day-of-month where possible, clamps to the end
    /// of the month otherwise. Closes any open dropdown.
    pub fn select_month(&mut self, month0: u32) -> PickerOutcome {
        self.dropdown = ActiveDropdown::None;
        if month0 > 11 {
            return PickerOutcome::Unchanged;
        }

        let date = if let Some(date) = self.displayed.with_month0(month0) {
            date
        } else {
            let first = self
                .displayed
                .with_day(1)
                .expect("date")
                .with_month0(month0)
                .expect("date");
            first + Months::new(1) - Days::new(1)
        };

        if self.displayed != date {
            self.displayed = date;
            PickerOutcome::Changed
        } else {
            PickerOutcome::Unchanged
        }
    }

    /// Show the given year.
    ///
    /// Keeps the day-of-month where possible, clamps to the end
    /// of the month otherwise. Closes any open dropdown.
    pub fn select_year(&mut self, year: i32) -> PickerOutcome {
        self.dropdown = ActiveDropdown::None;

        let date = if let Some(date) = self.displayed.with_year(year) {
            date
        } else if let Some(first) = self.displayed.with_day(1).expect("date").with_year(year) {
            first + Months::new(1) - Days::new(1)
        } else {
            return PickerOutcome::Unchanged;
        };

        if self.displayed != date {
            self.displayed = date;
            PickerOutcome::Changed
        } else {
            PickerOutcome::Unchanged
        }
    }

    /// Pick today.
    ///
    /// Sets today as the picked date and shows it in the
    /// calendar. Unlike [clear](Self::clear) this always ends
    /// with a concrete selection.
    pub fn reset_to_today(&mut self) -> PickerOutcome {
        let today = Local::now().date_naive();
        self.dropdown = ActiveDropdown::None;

        let changed = self.selected != Some(today);
        self.selected = Some(today);
        self.displayed = today;
        self.set_input_formatted(today);

        if changed {
            self.notify();
            PickerOutcome::Picked
        } else {
            PickerOutcome::Changed
        }
    }

    /// Pick the given date.
    ///
    /// Noop for dates outside the min/max bounds. Otherwise
    /// the date becomes the selection, the input text is set
    /// to the formatted date and the popup closes.
    pub fn pick(&mut self, date: NaiveDate) -> PickerOutcome {
        if out_of_bounds(&self.props, date) {
            return PickerOutcome::Unchanged;
        }

        self.dropdown = ActiveDropdown::None;
        if self.selected != Some(date) {
            self.selected = Some(date);
            self.displayed = date;
            self.set_input_formatted(date);
            self.set_popup_active(false);
            self.notify();
            PickerOutcome::Picked
        } else {
            self.set_popup_active(false);
            PickerOutcome::Changed
        }
    }

    /// React to an edit of the input text.
    ///
    /// Strips everything but digits, spaces, slashes and
    /// hyphens. Empty text clears the selection, text that
    /// parses completely under the format sets it. Anything
    /// else leaves the selection alone until
    /// [commit](Self::commit).
    pub fn input_changed(&mut self) -> PickerOutcome {
        let clean = self
            .input
            .text()
            .chars()
            .filter(|c| is_date_char(*c))
            .collect::<String>();
        if clean != self.input.text() {
            self.input.set_text(clean.clone());
        }

        if clean.is_empty() {
            if self.selected.is_some() {
                self.selected = None;
                self.notify();
                PickerOutcome::Picked
            } else {
                PickerOutcome::Changed
            }
        } else {
            match NaiveDate::parse_from_str(&clean, &self.props.format) {
                Ok(date) => {
                    let changed = self.selected != Some(date);
                    self.selected = Some(date);
                    self.displayed = date;
                    if changed {
                        self.notify();
                        PickerOutcome::Picked
                    } else {
                        PickerOutcome::Changed
                    }
                }
                Err(_) => PickerOutcome::Changed,
            }
        }
    }

    /// Commit the input text. Wired to Enter and focus-loss.
    ///
    /// Empty text clears the selection. Valid text becomes the
    /// selection, rewritten in its canonical form. Invalid text
    /// falls back to the current date.
    pub fn commit(&mut self) -> PickerOutcome {
        let text = self.input.text().trim().to_string();

        if text.is_empty() {
            let changed = self.selected.is_some();
            self.selected = None;
            self.input.set_text("");
            if changed {
                self.notify();
                PickerOutcome::Picked
            } else {
                PickerOutcome::Unchanged
            }
        } else {
            let date = NaiveDate::parse_from_str(&text, &self.props.format)
                .unwrap_or_else(|_| Local::now().date_naive());

            let changed = self.selected != Some(date);
            self.selected = Some(date);
            self.displayed = date;
            self.set_input_formatted(date);

            if changed {
                self.notify();
                PickerOutcome::Picked
            } else {
                PickerOutcome::Changed
            }
        }
    }

    /// Reset to the unselected state.
    ///
    /// Clears the selection and the input text, shows the
    /// current month and closes popup and dropdowns.
    ///
    /// Programmatic change, doesn't call the change listener.
    pub fn clear(&mut self) -> PickerOutcome {
        self.selected = None;
        self.displayed = Local::now().date_naive();
        self.input.set_text("");
        self.dropdown = ActiveDropdown::None;
        self.set_popup_active(false);
        PickerOutcome::Changed
    }

    /// Toggle the given dropdown.
    ///
    /// Opens it with the current month/year scrolled into
    /// view, or closes it if it's the one already open. Only
    /// one dropdown can be open.
    pub fn flip_dropdown(&mut self, dropdown: ActiveDropdown) -> PickerOutcome {
        if self.dropdown == dropdown {
            self.dropdown = ActiveDropdown::None;
        } else {
            self.dropdown = dropdown;
            let (len, pos) = match dropdown {
                ActiveDropdown::Month => (12, self.displayed.month0() as usize),
                ActiveDropdown::Year => {
                    let len = calendar::years(self.props.year_start, self.props.year_end).len();
                    let pos = (self.displayed.year() - self.props.year_start).max(0) as usize;
                    (len, pos.min(len.saturating_sub(1)))
                }
                ActiveDropdown::None => (0, 0),
            };
            self.list_scroll.max_offset = len.saturating_sub(7);
            self.list_scroll.page_len = 7;
            self.list_scroll.scroll_to_pos(pos);
        }
        PickerOutcome::Changed
    }

    fn set_input_formatted(&mut self, date: NaiveDate) {
        self.input.set_text(
            date.format_localized(&self.props.format, self.props.loc)
                .to_string(),
        );
    }

    fn notify(&mut self) {
        if let Some(on_change) = self.on_change.as_mut() {
            on_change.date_changed(self.selected);
        }
    }
}

fn is_date_char(c: char) -> bool {
    c.is_ascii_digit() || c == ' ' || c == '/' || c == '-'
}

fn out_of_bounds(props: &ResolvedOptions, date: NaiveDate) -> bool {
    if let Some(min_date) = props.min_date {
        if date < min_date {
            return true;
        }
    }
    if let Some(max_date) = props.max_date {
        if date > max_date {
            return true;
        }
    }
    false
}

impl HandleEvent<crossterm::event::Event, Popup, PickerOutcome> for DatePickerState {
    fn handle(&mut self, event: &crossterm::event::Event, _qualifier: Popup) -> PickerOutcome {
        if self.lost_focus() {
            // commit stray text on leaving the widget
            self.commit();
            self.set_popup_active(false);
            // focus change triggers the repaint.
        }

        let r = if self.is_focused() {
            match event {
                ct_event!(keycode press Enter) => {
                    let r = self.commit();
                    self.set_popup_active(false);
                    max(r, PickerOutcome::Changed)
                }
                ct_event!(keycode press Esc) => {
                    if self.dropdown != ActiveDropdown::None {
                        self.dropdown = ActiveDropdown::None;
                        PickerOutcome::Changed
                    } else if self.set_popup_active(false) {
                        PickerOutcome::Changed
                    } else {
                        PickerOutcome::Continue
                    }
                }
                ct_event!(keycode press Down) => {
                    if self.set_popup_active(true) {
                        PickerOutcome::Changed
                    } else {
                        PickerOutcome::Unchanged
                    }
                }
                ct_event!(keycode press PageUp) => self.prev_month(1),
                ct_event!(keycode press PageDown) => self.next_month(1),
                ct_event!(keycode press CONTROL-Home) => self.reset_to_today(),
                ct_event!(key press c) if !is_date_char(*c) => PickerOutcome::Unchanged,
                ct_event!(key press SHIFT-c) if !is_date_char(*c) => PickerOutcome::Unchanged,
                crossterm::event::Event::Key(_) | crossterm::event::Event::Paste(_) => {
                    match self.input.handle(event, Regular) {
                        TextOutcome::TextChanged => self.input_changed(),
                        r => r.into(),
                    }
                }
                _ => PickerOutcome::Continue,
            }
        } else {
            PickerOutcome::Continue
        };

        if !r.is_consumed() {
            self.handle(event, MouseOnly)
        } else {
            r
        }
    }
}

impl HandleEvent<crossterm::event::Event, MouseOnly, PickerOutcome> for DatePickerState {
    fn handle(&mut self, event: &crossterm::event::Event, _qualifier: MouseOnly) -> PickerOutcome {
        let mut r = handle_dropdown(self, event);
        r = r.or_else(|| handle_nav(self, event));
        r = r.or_else(|| handle_days(self, event));
        r = r.or_else(|| handle_mouse(self, event));
        r = r.or_else(|| self.input.handle(event, MouseOnly).into());
        r = r.or_else(|| mouse_trap(event, self.popup.area).into());

        self.popup.active.set_lost(false);
        self.popup.active.set_gained(false);
        r
    }
}

fn handle_dropdown(state: &mut DatePickerState, event: &crossterm::event::Event) -> PickerOutcome {
    if state.dropdown == ActiveDropdown::None {
        return PickerOutcome::Continue;
    }

    let mut sas = ScrollAreaState::new()
        .area(state.area_list)
        .v_scroll(&mut state.list_scroll);
    let r = match sas.handle(event, MouseOnly) {
        ScrollOutcome::Up(n) => {
            if state.list_scroll.scroll_up(n) {
                PickerOutcome::Changed
            } else {
                PickerOutcome::Unchanged
            }
        }
        ScrollOutcome::Down(n) => {
            if state.list_scroll.scroll_down(n) {
                PickerOutcome::Changed
            } else {
                PickerOutcome::Unchanged
            }
        }
        ScrollOutcome::VPos(n) => {
            if state.list_scroll.set_offset(n) {
                PickerOutcome::Changed
            } else {
                PickerOutcome::Unchanged
            }
        }
        _ => PickerOutcome::Continue,
    };

    r.or_else(|| match event {
        ct_event!(mouse down Left for x,y) if state.area_list.contains((*x, *y).into()) => {
            if let Some(n) = item_at(&state.area_list_items, *x, *y) {
                let idx = state.list_scroll.offset + n;
                match state.dropdown {
                    ActiveDropdown::Month => state.select_month(idx as u32),
                    ActiveDropdown::Year => state.select_year(state.props.year_start + idx as i32),
                    ActiveDropdown::None => PickerOutcome::Unchanged,
                }
            } else {
                PickerOutcome::Unchanged
            }
        }
        ct_event!(mouse down Left for x,y) if state.popup.area.contains((*x, *y).into()) => {
            state.dropdown = ActiveDropdown::None;
            PickerOutcome::Changed
        }
        _ => PickerOutcome::Continue,
    })
}

fn handle_nav(state: &mut DatePickerState, event: &crossterm::event::Event) -> PickerOutcome {
    match event {
        ct_event!(mouse down Left for x,y) if state.area_prev.contains((*x, *y).into()) => {
            state.prev_month(1)
        }
        ct_event!(mouse down Left for x,y) if state.area_next.contains((*x, *y).into()) => {
            state.next_month(1)
        }
        ct_event!(mouse down Left for x,y) if state.area_today.contains((*x, *y).into()) => {
            state.reset_to_today()
        }
        ct_event!(mouse down Left for x,y) if state.area_month.contains((*x, *y).into()) => {
            state.flip_dropdown(ActiveDropdown::Month)
        }
        ct_event!(mouse down Left for x,y) if state.area_year.contains((*x, *y).into()) => {
            state.flip_dropdown(ActiveDropdown::Year)
        }
        _ => PickerOutcome::Continue,
    }
}

fn handle_days(state: &mut DatePickerState, event: &crossterm::event::Event) -> PickerOutcome {
    match event {
        ct_event!(mouse down Left for x,y) if state.area_grid.contains((*x, *y).into()) => {
            if let Some(n) = item_at(&state.area_days, *x, *y) {
                state.pick(state.grid.cells[n].date)
            } else {
                PickerOutcome::Unchanged
            }
        }
        ct_event!(scroll up for x,y) if state.area_grid.contains((*x, *y).into()) => {
            state.prev_month(1)
        }
        ct_event!(scroll down for x,y) if state.area_grid.contains((*x, *y).into()) => {
            state.next_month(1)
        }
        _ => PickerOutcome::Continue,
    }
}

fn handle_mouse(state: &mut DatePickerState, event: &crossterm::event::Event) -> PickerOutcome {
    match event {
        ct_event!(mouse down Left for x,y) if state.area.contains((*x, *y).into()) => {
            // let the input place its cursor
            state.input.handle(event, MouseOnly);
            if !state.gained_focus() && !state.popup.active.lost() {
                state.flip_popup_active();
                PickerOutcome::Changed
            } else {
                PickerOutcome::Unchanged
            }
        }
        ct_event!(mouse down Left for x,y)
        | ct_event!(mouse down Right for x,y)
        | ct_event!(mouse down Middle for x,y)
            if !state.area.contains((*x, *y).into()) =>
        {
            match state.popup.handle(event, Popup) {
                PopupOutcome::Hide => {
                    state.set_popup_active(false);
                    PickerOutcome::Changed
                }
                r => r.into(),
            }
        }
        _ => PickerOutcome::Continue,
    }
}

/// Handle events for the popup.
/// Call before other handlers to deal with intersections
/// with other widgets.
pub fn handle_events(
    state: &mut DatePickerState,
    focus: bool,
    event: &crossterm::event::Event,
) -> PickerOutcome {
    state.input.focus.set(focus);
    HandleEvent::handle(state, event, Popup)
}

/// Handle only mouse-events.
pub fn handle_mouse_events(
    state: &mut DatePickerState,
    event: &crossterm::event::Event,
) -> PickerOutcome {
    HandleEvent::handle(state, event, MouseOnly)
}
