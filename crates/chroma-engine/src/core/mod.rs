//! Startup sequence shared by the window runtime and tests.
//!
//! The rendering context is created by the caller-supplied acquisition step
//! and handed to scene setup by value; nothing is stored globally.

mod launch;

pub use launch::{launch, LaunchError, Launched, PendingLaunch};
