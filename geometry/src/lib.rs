#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path interpolation and collision primitives for the Garden Defence engine.
//!
//! The [`PathGeometry`] type converts a fractional progress value into a
//! coordinate on the polyline walked by units, while the [`collision`] module
//! hosts the point, circle and segment tests used by combat and placement.

pub mod collision;
mod path;

pub use path::{PathDraft, PathError, PathGeometry};
