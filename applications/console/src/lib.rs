//! Cadence console front end
//!
//! Terminal rendition of the library and player screens on top of
//! `cadence-playback`. The binary in `main.rs` wires these pieces to a
//! simulated engine; the modules are public so they can be driven in tests.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod presenter;
pub mod view;

pub use config::AppConfig;
pub use error::{ConsoleError, Result};
pub use presenter::{LibraryPresenter, PlayerPresenter};
pub use view::{ConsoleView, LibraryView, PlayerView, Progress};
