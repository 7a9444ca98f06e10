//! Scene setup.
//!
//! `quad` builds the program, uploads the static rectangle and draws it once.

pub mod quad;

pub use quad::{QuadLocations, QuadScene};
