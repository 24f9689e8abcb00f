//! boxdesk library
//!
//! Headless front end for the workspace engine in `boxdesk-app`.

pub mod headless;

// Re-export main entry points
pub use headless::runner::run_headless;
