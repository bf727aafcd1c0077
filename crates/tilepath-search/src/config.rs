use tilepath_core::Point;

/// Expansion iterations (and backtrack steps) run between two suspension
/// points of a [`RouteSearch`](crate::RouteSearch).
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Minimum bound on predecessor links followed while rebuilding a route.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1000;

/// Cost of a diagonal step unless configured otherwise.
pub const DEFAULT_DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// Adjacency rule of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Movement {
    /// Four cardinal directions; Manhattan heuristic.
    #[default]
    Orthogonal,
    /// Cardinal plus diagonal directions; Chebyshev heuristic.
    Diagonal,
}

impl Movement {
    /// `Diagonal` when `allow_diagonal` is set, `Orthogonal` otherwise.
    #[inline]
    pub const fn from_diagonal(allow_diagonal: bool) -> Self {
        if allow_diagonal {
            Self::Diagonal
        } else {
            Self::Orthogonal
        }
    }

    #[inline]
    pub const fn allows_diagonal(self) -> bool {
        matches!(self, Self::Diagonal)
    }

    /// Heuristic distance from `from` to `to` under this adjacency rule:
    /// Manhattan for orthogonal movement, Chebyshev for diagonal movement.
    #[inline]
    pub fn estimate(self, from: Point, to: Point) -> f32 {
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        match self {
            Self::Orthogonal => (dx + dy) as f32,
            Self::Diagonal => dx.max(dy) as f32,
        }
    }
}

/// Grid dimensions and movement rules of a [`PathSearch`](crate::PathSearch).
///
/// ```
/// use tilepath_search::{Movement, SearchConfig};
///
/// let config = SearchConfig::new(64, 48, true)
///     .with_diagonal_cost(1.5)
///     .with_batch_size(250);
/// assert_eq!(config.movement, Movement::Diagonal);
/// assert_eq!(config.batch_size, 250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    pub size_x: i32,
    pub size_y: i32,
    pub movement: Movement,
    /// Cost of one diagonal step. Orthogonal steps always cost 1. Values
    /// below 1 make the Chebyshev heuristic inadmissible.
    pub diagonal_cost: f32,
    pub batch_size: usize,
    pub backtrack_limit: usize,
}

impl SearchConfig {
    /// A `size_x × size_y` grid with default costs and batching.
    pub fn new(size_x: i32, size_y: i32, allow_diagonal: bool) -> Self {
        Self {
            size_x,
            size_y,
            movement: Movement::from_diagonal(allow_diagonal),
            diagonal_cost: DEFAULT_DIAGONAL_COST,
            batch_size: DEFAULT_BATCH_SIZE,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }

    #[must_use]
    pub fn with_diagonal_cost(mut self, cost: f32) -> Self {
        self.diagonal_cost = cost;
        self
    }

    /// Iterations per batch. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_backtrack_limit(mut self, limit: usize) -> Self {
        self.backtrack_limit = limit;
        self
    }

    #[inline]
    pub fn allows_diagonal(&self) -> bool {
        self.movement.allows_diagonal()
    }

    /// Batch size clamped to at least one iteration.
    #[inline]
    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
