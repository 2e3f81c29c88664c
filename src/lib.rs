#![doc = include_str!("../readme.md")]
//
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::collapsible_if)]

pub mod calendar;
pub mod datepicker;
pub mod options;
pub mod util;

pub mod event {
    //!
    //! Event-handler traits and outcomes.
    //!
    //! See [rat-event](https://docs.rs/rat-event/latest/rat_event/)
    //!
    pub use rat_event::*;

    pub use crate::datepicker::event::PickerOutcome;
    pub use rat_popup::event::PopupOutcome;
    pub use rat_text::event::TextOutcome;
}

mod _private {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct NonExhaustive;
}
