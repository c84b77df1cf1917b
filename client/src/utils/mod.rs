//! Small display helpers shared by the views and the CLI renderer.

pub mod format;
