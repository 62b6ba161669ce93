//! Terminal report card for multi-step work across many applications.
//!
//! Each row is an application and each column a step. Workers report step
//! results as [`event::TaskResult`]s; the [`dashboard::Dashboard`] keeps the
//! row state machines, the status counts, paging and the output pane, and
//! [`tui::Renderer`] draws it with ratatui.

pub mod app;
pub mod buffer;
pub mod card;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod logging;
pub mod pagination;
pub mod pipeline;
pub mod selector;
pub mod tui;
pub mod viewport;

pub use error::{Error, Result};
