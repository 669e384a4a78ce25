//! Route selection as a set-partitioning binary program.
//!
//! - [`BinaryProgram`]: solver-agnostic 0/1 program
//! - [`MipBackend`]: pluggable solver seam, with [`MicroLpBackend`] as default
//! - [`RouteSelector`]: formulates the exact cover and interprets the result

mod microlp;
mod program;
mod selector;

pub use microlp::MicroLpBackend;
pub use program::{BinaryProgram, LinearConstraint, MipBackend, MipSolution, MipStatus, Relation};
pub use selector::{RouteSelector, Selection, SelectionOutcome, SetPartitionProgram, DEFAULT_FLEET_SIZE};
