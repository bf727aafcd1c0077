//! A* route search on rectangular tile grids.
//!
//! [`PathSearch`] owns grid-shaped node tables that are allocated once by
//! [`PathSearch::initialize`] and reused by every search, so repeated queries
//! do not allocate per cell. Cells can be locked (made impassable) one at a
//! time with [`PathSearch::set_lock`] or in bulk from a
//! [`Layout`](tilepath_core::Layout).
//!
//! A search is a [`RouteSearch`] that does its work in bounded batches:
//!
//! - [`RouteSearch::step`] runs one batch and returns `Poll::Pending` until
//!   the result is ready, which suits a frame-driven host loop;
//! - [`RouteSearch::run`] blocks until done;
//! - `RouteSearch` is a [`Future`](std::future::Future), so it can be
//!   awaited on any executor and yields between batches.
//!
//! Movement is either 4-way ([`Movement::Orthogonal`], Manhattan estimate) or
//! 8-way ([`Movement::Diagonal`], Chebyshev estimate, diagonal steps costing
//! [`SearchConfig::diagonal_cost`]).
//!
//! # Example
//!
//! ```
//! use tilepath_core::{Layout, Point};
//! use tilepath_search::{PathSearch, SearchConfig, SearchError};
//!
//! let layout = Layout::parse(
//!     "\
//! ......
//! .####.
//! ......",
//!     "#",
//! )
//! .unwrap();
//!
//! let mut engine = PathSearch::new(SearchConfig::new(6, 3, false));
//! engine.load_layout(&layout, Point::ZERO);
//!
//! let route = engine.find_route(Point::new(1, 0), Point::new(1, 2)).unwrap();
//! assert_eq!(route.cost(), 4.0);
//!
//! assert_eq!(
//!     engine.find_route(Point::new(2, 2), Point::new(2, 2)),
//!     Err(SearchError::SamePosition(Point::new(2, 2)))
//! );
//! ```

mod config;
mod engine;
mod error;
mod frontier;
mod neighbors;
mod node;
mod route;
mod search;

pub use config::{
    DEFAULT_BACKTRACK_LIMIT, DEFAULT_BATCH_SIZE, DEFAULT_DIAGONAL_COST, Movement, SearchConfig,
};
pub use engine::PathSearch;
pub use error::SearchError;
pub use node::{INVALID_POSITION, Node};
pub use route::Route;
pub use search::{RouteSearch, SearchPhase, SearchStats};
