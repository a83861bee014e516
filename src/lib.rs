//! Core of the PreservaLife renal-perfusion monitor simulation.
//!
//! Raw blood-gas draws are sampled from quality-tiered ranges held in a
//! [`layout::LayoutTable`], turned into oxygen content and renal oxygen
//! consumption by [`logic`], and appended to a bounded [`history::HistoryBuffer`]
//! that feeds the charts and the spreadsheet export. All session state lives in
//! [`session::Session`] and changes only through the command handlers there.

pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod invariants;
pub mod layout;
pub mod logic;
pub mod replay;
pub mod sampler;
pub mod session;
pub mod simulator;
pub mod spreadsheet;
pub mod types;

pub use error::{MonitorError, Result};
