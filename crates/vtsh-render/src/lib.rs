#![forbid(unsafe_code)]

//! Line rendering: VT100 byte generators and the presenter that keeps the
//! screen in step with the line editor.

pub mod ansi;
pub mod line_model;
pub mod presenter;

pub use presenter::LinePresenter;
