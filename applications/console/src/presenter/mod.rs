//! Presenters for the library and player screens
//!
//! Each presenter owns its view and is driven from a single task; nothing in
//! here is shared across threads.

pub mod library;
pub mod player;

pub use library::LibraryPresenter;
pub use player::PlayerPresenter;
