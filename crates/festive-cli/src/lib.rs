//! Presentation helpers shared by the `festive` binary and its tests.

pub mod format;
pub mod settings;
