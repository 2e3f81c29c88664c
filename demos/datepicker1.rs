//!
//! Stand-alone demo for the date-picker.
//!
//! Ctrl-Q quits.
//!

use anyhow::anyhow;
use crossterm::cursor::{DisableBlinking, EnableBlinking, SetCursorStyle};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::debug;
use rat_datepicker::datepicker::{DateChanged, DatePicker, DatePickerState};
use rat_datepicker::options::DatePickerOptions;
use rat_event::{ct_event, ConsumedEvent, HandleEvent, Outcome, Popup, Regular};
use rat_focus::{Focus, FocusBuilder};
use rat_text::HasScreenCursor;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Position};
use ratatui::style::{Style, Stylize};
use ratatui::text::Span;
use ratatui::widgets::{Block, StatefulWidget, Widget};
use ratatui::{Frame, Terminal};
use std::io::{stdout, Stdout};

fn main() -> Result<(), anyhow::Error> {
    setup_logging()?;

    let mut state = State {
        picker: DatePickerState::named("date").with_options(&DatePickerOptions {
            format: "%Y-%m-%d".into(),
            default_date: Some("2023-12-01".into()),
            min_date: Some("2020-01-01".into()),
            max_date: Some("2030-12-31".into()),
            ..Default::default()
        })?,
        quit: false,
    };
    state.picker.set_on_change(Some(LogChanges));

    let mut terminal = setup_terminal()?;

    focus(&state).first();

    terminal.draw(|frame| repaint(frame, &mut state))?;

    loop {
        let event = crossterm::event::read().map_err(|e| anyhow!(e))?;

        let f = focus(&state).handle(&event, Regular);
        let r = handle_input(&event, &mut state);

        if state.quit {
            break;
        }
        if f == Outcome::Changed || r.is_consumed() {
            terminal.draw(|frame| repaint(frame, &mut state))?;
        }
    }

    shutdown_terminal()?;

    Ok(())
}

struct State {
    picker: DatePickerState,
    quit: bool,
}

/// Write each change to the log.
#[derive(Debug)]
struct LogChanges;

impl DateChanged for LogChanges {
    fn date_changed(&mut self, date: Option<chrono::NaiveDate>) {
        debug!("date changed: {:?}", date);
    }
}

fn focus(state: &State) -> Focus {
    let mut fb = FocusBuilder::new(None);
    fb.widget(&state.picker);
    fb.build()
}

fn repaint(frame: &mut Frame<'_>, state: &mut State) {
    let l1 = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(frame.area());
    let l2 = Layout::horizontal([
        Constraint::Length(20),
        Constraint::Length(14),
        Constraint::Fill(1),
    ])
    .split(l1[0]);

    let (widget, popup) = DatePicker::new()
        .style(Style::new().black().on_gray())
        .focus_style(Style::new().black().on_cyan())
        .select_style(Style::new().black().on_yellow())
        .block(Block::bordered())
        .popup_boundary(frame.area())
        .into_widgets();
    widget.render(l2[1], frame.buffer_mut(), &mut state.picker);

    let status = match state.picker.date() {
        Some(date) => format!("picked {}", date),
        None => "nothing picked".to_string(),
    };
    Span::from(status).render(l1[2], frame.buffer_mut());

    // popups render last
    popup.render(l2[1], frame.buffer_mut(), &mut state.picker);

    if let Some((x, y)) = state.picker.screen_cursor() {
        frame.set_cursor_position(Position::new(x, y));
    }
}

fn handle_input(event: &crossterm::event::Event, state: &mut State) -> Outcome {
    match event {
        ct_event!(key press CONTROL-'q') => {
            state.quit = true;
            return Outcome::Changed;
        }
        ct_event!(resized) => {
            return Outcome::Changed;
        }
        _ => {}
    }

    state.picker.handle(event, Popup).into()
}

fn setup_logging() -> Result<(), anyhow::Error> {
    _ = std::fs::remove_file("log.log");
    fern::Dispatch::new()
        .format(|out, message, _record| out.finish(format_args!("{}", message)))
        .level(log::LevelFilter::Debug)
        .chain(fern::log_file("log.log")?)
        .apply()?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, anyhow::Error> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    stdout().execute(EnableBlinking)?;
    stdout().execute(SetCursorStyle::BlinkingBar)?;
    stdout().execute(EnableBracketedPaste)?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

fn shutdown_terminal() -> Result<(), anyhow::Error> {
    stdout().execute(DisableBracketedPaste)?;
    stdout().execute(SetCursorStyle::DefaultUserShape)?;
    stdout().execute(DisableBlinking)?;
    stdout().execute(DisableMouseCapture)?;
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}
