//! Transport traits and abstractions
//!
//! This module defines the byte-oriented link the mode controller borrows
//! for each operation.

mod traits;

pub use traits::*;
