//! Travel-duration matrix.
//!
//! Provides a dense, read-only duration matrix with a name → index map built
//! once at load time.

mod matrix;

pub use matrix::DurationMatrix;
