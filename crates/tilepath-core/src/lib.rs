//! **tilepath-core**: core types for tile-map pathfinding.
//!
//! This crate provides the geometry primitives shared across the *tilepath*
//! workspace ([`Point`], [`Range`]) and ASCII tile layouts ([`Layout`]) for
//! loading blocked cells.

pub mod geom;
pub mod layout;

pub use geom::{Point, Range, RangeIter};
pub use layout::{Layout, LayoutError};
