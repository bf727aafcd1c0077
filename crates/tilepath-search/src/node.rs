use tilepath_core::Point;

use crate::config::Movement;

/// Sentinel for "no position": the goal of a cleared node and the
/// predecessor of a node that has none.
pub const INVALID_POSITION: Point = Point::new(-1, -1);

/// Search bookkeeping for one grid cell.
///
/// A node keeps its position for life. The movement cost, predecessor, and
/// active flag belong to the current search and are wiped by
/// [`clear`](Node::clear); the lock flag is a property of the cell and
/// survives every reset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    position: Point,
    from: Point,
    move_cost: f32,
    heuristic: f32,
    movement: Movement,
    active: bool,
    locked: bool,
}

impl Node {
    /// An inactive, unlocked node at `position` estimating towards `goal`.
    pub fn new(position: Point, goal: Point, allow_diagonal: bool) -> Self {
        let movement = Movement::from_diagonal(allow_diagonal);
        Self {
            position,
            from: INVALID_POSITION,
            move_cost: 0.0,
            heuristic: movement.estimate(position, goal),
            movement,
            active: false,
            locked: false,
        }
    }

    /// Recompute the heuristic against a new goal.
    #[inline]
    pub fn update_goal(&mut self, goal: Point) {
        self.heuristic = self.movement.estimate(self.position, goal);
    }

    /// Move cost plus heuristic.
    #[inline]
    pub fn score(&self) -> f32 {
        self.move_cost + self.heuristic
    }

    #[inline]
    pub fn set_move_cost(&mut self, cost: f32) {
        self.move_cost = cost;
    }

    #[inline]
    pub fn set_from(&mut self, position: Point) {
        self.from = position;
    }

    #[inline]
    pub fn activate(&mut self) {
        self.active = true;
    }

    #[inline]
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    #[inline]
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Forget the current search. The lock flag is kept.
    pub fn clear(&mut self) {
        self.clear_for(INVALID_POSITION);
    }

    /// [`clear`](Self::clear), then estimate towards `goal`, computing the
    /// heuristic once.
    pub fn clear_for(&mut self, goal: Point) {
        self.move_cost = 0.0;
        self.from = INVALID_POSITION;
        self.active = false;
        self.update_goal(goal);
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Predecessor on the best known route, or [`INVALID_POSITION`].
    #[inline]
    pub fn from(&self) -> Point {
        self.from
    }

    #[inline]
    pub fn move_cost(&self) -> f32 {
        self.move_cost
    }

    #[inline]
    pub fn heuristic(&self) -> f32 {
        self.heuristic
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn allows_diagonal(&self) -> bool {
        self.movement.allows_diagonal()
    }
}
