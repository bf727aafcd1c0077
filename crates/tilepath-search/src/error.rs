use thiserror::Error;
use tilepath_core::Point;

/// Why a route search produced no route.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Start and goal are the same cell; nothing to search.
    #[error("start and goal are both {0}")]
    SamePosition(Point),
    /// Start or goal lies outside the grid.
    #[error("{0} is outside the grid")]
    OutOfBounds(Point),
    /// Every reachable cell was expanded without reaching the goal.
    #[error("no route from {start} to {goal}")]
    NoPathFound { start: Point, goal: Point },
    /// The predecessor chain looped, broke off, or ran past the step bound
    /// before reaching the start.
    #[error("predecessor chain corrupted at {at} after {steps} steps")]
    ReconstructionCycle { at: Point, steps: usize },
    /// The search already delivered its result.
    #[error("route search already finished")]
    Finished,
}
