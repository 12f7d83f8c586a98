//! FILENAME: app/demolens/src/commands/mod.rs
// PURPOSE: Command handlers behind the message protocol.
// CONTEXT: Each handler takes `&AppState`, returns a typed result, and
// persists the library after every successful mutation.

pub mod capture;
pub mod dashboard;
pub mod playback;
pub mod scenarios;

pub use capture::*;
pub use dashboard::*;
pub use playback::*;
pub use scenarios::*;
