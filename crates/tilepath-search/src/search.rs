//! The in-flight route search and its cooperative stepping.
//!
//! A [`RouteSearch`] runs in batches of at most
//! [`SearchConfig::batch_size`](crate::SearchConfig::batch_size) iterations.
//! Between batches it hands control back to the caller, and the next call
//! resumes exactly where the previous one stopped:
//!
//! ```
//! use std::task::Poll;
//! use tilepath_core::Point;
//! use tilepath_search::{PathSearch, SearchConfig};
//!
//! let mut engine = PathSearch::new(SearchConfig::new(64, 64, true).with_batch_size(16));
//! let mut search = engine.search_route(Point::new(0, 0), Point::new(63, 40));
//! let route = loop {
//!     match search.step() {
//!         Poll::Ready(result) => break result.unwrap(),
//!         // The host does the rest of its frame here.
//!         Poll::Pending => continue,
//!     }
//! };
//! assert_eq!(route.goal(), Some(Point::new(63, 40)));
//! ```
//!
//! A search is also a [`Future`] that yields to the executor between
//! batches.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tilepath_core::Point;

use crate::engine::PathSearch;
use crate::error::SearchError;
use crate::frontier::Frontier;
use crate::node::INVALID_POSITION;
use crate::route::Route;

/// Where a [`RouteSearch`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Node tables not reset yet.
    Reset,
    /// Tables reset, start node not yet placed.
    Seeding,
    /// Best-first expansion in progress.
    Expanding,
    /// Goal reached; walking predecessor links back to the start.
    Reconstructing,
    /// A route was delivered.
    Succeeded,
    /// A failure was delivered.
    Failed,
}

/// Counters describing the work a search has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes moved from the open to the closed table.
    pub expanded: usize,
    /// Closed nodes moved back to the open table after a cheaper route to
    /// them was found.
    pub reopened: usize,
    /// Calls to [`RouteSearch::step`], i.e. batches started.
    pub batches: usize,
    /// Predecessor links followed during reconstruction.
    pub backtrack_steps: usize,
}

#[derive(Debug)]
enum State {
    Rejected(SearchError),
    Reset,
    Seeding,
    Expanding,
    Reconstructing { cursor: Point, previous: Point },
    Done { succeeded: bool },
}

/// A route search in progress. Created by
/// [`PathSearch::search_route`](crate::PathSearch::search_route).
///
/// Dropping it abandons the search; the next search on the engine starts
/// from a full reset.
#[derive(Debug)]
#[must_use = "a route search does nothing until stepped, run, or awaited"]
pub struct RouteSearch<'a> {
    engine: &'a mut PathSearch,
    start: Point,
    goal: Point,
    state: State,
    frontier: Frontier,
    waypoints: Vec<Point>,
    stats: SearchStats,
}

impl<'a> RouteSearch<'a> {
    pub(crate) fn new(engine: &'a mut PathSearch, start: Point, goal: Point) -> Self {
        let state = if start == goal {
            State::Rejected(SearchError::SamePosition(start))
        } else if engine.idx(start).is_none() {
            State::Rejected(SearchError::OutOfBounds(start))
        } else if engine.idx(goal).is_none() {
            State::Rejected(SearchError::OutOfBounds(goal))
        } else {
            log::debug!(
                "route search {start} -> {goal} on {} grid",
                engine.range()
            );
            State::Reset
        };

        Self {
            engine,
            start,
            goal,
            state,
            frontier: Frontier::default(),
            waypoints: Vec::new(),
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> Point {
        self.goal
    }

    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn phase(&self) -> SearchPhase {
        match self.state {
            State::Rejected(_) => SearchPhase::Reset,
            State::Reset => SearchPhase::Reset,
            State::Seeding => SearchPhase::Seeding,
            State::Expanding => SearchPhase::Expanding,
            State::Reconstructing { .. } => SearchPhase::Reconstructing,
            State::Done { succeeded: true } => SearchPhase::Succeeded,
            State::Done { succeeded: false } => SearchPhase::Failed,
        }
    }

    /// Whether the result has been delivered.
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Done { .. })
    }

    /// Run until the next suspension point.
    ///
    /// Returns `Poll::Pending` after a full batch if more work remains, and
    /// `Poll::Ready` once with the result. Stepping a finished search returns
    /// [`SearchError::Finished`].
    pub fn step(&mut self) -> Poll<Result<Route, SearchError>> {
        if self.is_finished() {
            return Poll::Ready(Err(SearchError::Finished));
        }

        self.stats.batches += 1;
        let mut budget = self.engine.config.effective_batch_size();

        loop {
            match self.state {
                State::Rejected(ref err) => {
                    let err = err.clone();
                    return Poll::Ready(self.fail(err));
                }
                State::Reset => {
                    self.engine.reset(self.goal);
                    self.state = State::Seeding;
                }
                State::Seeding => {
                    // Bounds were checked when the search was created.
                    let Some(si) = self.engine.idx(self.start) else {
                        return Poll::Ready(self.fail(SearchError::OutOfBounds(self.start)));
                    };
                    self.engine.seed(si, &mut self.frontier);
                    self.state = State::Expanding;
                }
                State::Expanding => {
                    if budget == 0 {
                        return self.suspend();
                    }
                    budget -= 1;

                    let Some(ci) = self.engine.select_best(&mut self.frontier) else {
                        return Poll::Ready(self.fail(SearchError::NoPathFound {
                            start: self.start,
                            goal: self.goal,
                        }));
                    };
                    self.engine.expand(ci, &mut self.frontier, &mut self.stats);

                    if self.engine.rng.point_at(ci) == self.goal {
                        self.state = State::Reconstructing {
                            cursor: self.goal,
                            previous: INVALID_POSITION,
                        };
                    }
                }
                State::Reconstructing { cursor, previous } => {
                    if cursor == self.start {
                        return Poll::Ready(Ok(self.succeed()));
                    }
                    if budget == 0 {
                        return self.suspend();
                    }
                    budget -= 1;

                    match self.backtrack(cursor, previous) {
                        Ok(next) => {
                            self.state = State::Reconstructing {
                                cursor: next,
                                previous: cursor,
                            };
                        }
                        Err(err) => {
                            log::warn!(
                                "route search {} -> {}: {err}",
                                self.start,
                                self.goal
                            );
                            return Poll::Ready(self.fail(err));
                        }
                    }
                }
                State::Done { .. } => return Poll::Ready(Err(SearchError::Finished)),
            }
        }
    }

    /// Drive the search to completion on the current thread.
    pub fn run(mut self) -> Result<Route, SearchError> {
        loop {
            if let Poll::Ready(result) = self.step() {
                return result;
            }
        }
    }

    /// Record `cursor` as a waypoint and return its predecessor.
    fn backtrack(&mut self, cursor: Point, previous: Point) -> Result<Point, SearchError> {
        let limit = self.engine.config.backtrack_limit.max(self.engine.len());
        let corrupted = |steps| SearchError::ReconstructionCycle { at: cursor, steps };

        if self.stats.backtrack_steps >= limit {
            return Err(corrupted(self.stats.backtrack_steps));
        }
        let Some(node) = self.engine.settled(cursor) else {
            return Err(corrupted(self.stats.backtrack_steps));
        };

        let next = node.from();
        self.waypoints.push(cursor);
        self.stats.backtrack_steps += 1;

        if next == cursor || next == previous || next == INVALID_POSITION {
            return Err(corrupted(self.stats.backtrack_steps));
        }
        Ok(next)
    }

    fn suspend(&self) -> Poll<Result<Route, SearchError>> {
        log::trace!(
            "route search {} -> {} yielding: {} expanded, {} queued, {} backtracked",
            self.start,
            self.goal,
            self.stats.expanded,
            self.frontier.len(),
            self.stats.backtrack_steps
        );
        Poll::Pending
    }

    fn succeed(&mut self) -> Route {
        self.state = State::Done { succeeded: true };
        let mut waypoints = std::mem::take(&mut self.waypoints);
        waypoints.reverse();

        // Accumulate along the route itself: with a diagonal cost below 1 a
        // node may be priced from a predecessor that was improved afterwards.
        let diagonal_cost = self.engine.config.diagonal_cost;
        let mut prev = self.start;
        let mut total = 0.0;
        let costs = waypoints
            .iter()
            .map(|&p| {
                total += if prev.is_diagonal_to(p) { diagonal_cost } else { 1.0 };
                prev = p;
                total
            })
            .collect();
        let route = Route::new(waypoints, costs);
        log::debug!(
            "route search {} -> {} found {} steps, cost {:.3}, {} expanded in {} batches",
            self.start,
            self.goal,
            route.len(),
            route.cost(),
            self.stats.expanded,
            self.stats.batches
        );
        route
    }

    fn fail(&mut self, err: SearchError) -> Result<Route, SearchError> {
        self.state = State::Done { succeeded: false };
        self.waypoints.clear();
        log::debug!(
            "route search {} -> {} failed after {} expansions: {err}",
            self.start,
            self.goal,
            self.stats.expanded
        );
        Err(err)
    }
}

impl Future for RouteSearch<'_> {
    type Output = Result<Route, SearchError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match this.step() {
            Poll::Pending => {
                // Ready to continue immediately; ask to be polled again after
                // the executor has run other tasks.
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            ready => ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use tilepath_core::{Layout, Range};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const DIAG: f32 = 1.414_213_56;

    fn assert_valid_route(engine: &PathSearch, start: Point, goal: Point, route: &Route) {
        assert_eq!(route.goal(), Some(goal));
        assert!(!route.contains(&start));
        let mut prev = start;
        let mut total = 0.0;
        for (i, &p) in route.iter().enumerate() {
            if engine.config().allows_diagonal() {
                assert!(prev.is_adjacent(p), "{prev} -> {p} is not one step");
            } else {
                assert!(prev.is_cardinal_to(p), "{prev} -> {p} is not one cardinal step");
            }
            assert!(!engine.is_locked(p), "{p} is locked");
            total += if prev.is_diagonal_to(p) {
                engine.config().diagonal_cost
            } else {
                1.0
            };
            assert!((route.costs()[i] - total).abs() < 1e-3);
            if i > 0 {
                assert!(route.costs()[i] >= route.costs()[i - 1]);
            }
            prev = p;
        }
        assert!((route.cost() - total).abs() < 1e-3);
    }

    // -----------------------------------------------------------------------
    // Reference scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn open_grid_orthogonal() {
        let mut engine = PathSearch::new(SearchConfig::new(5, 5, false));
        let (start, goal) = (Point::new(0, 0), Point::new(4, 4));
        let route = engine.find_route(start, goal).unwrap();
        assert_eq!(route.len(), 8);
        assert_eq!(route.cost(), 8.0);
        assert_valid_route(&engine, start, goal, &route);
    }

    #[test]
    fn open_grid_diagonal() {
        let mut engine = PathSearch::new(SearchConfig::new(5, 5, true).with_diagonal_cost(DIAG));
        let (start, goal) = (Point::new(0, 0), Point::new(4, 4));
        let route = engine.find_route(start, goal).unwrap();
        assert_eq!(
            route.waypoints(),
            &[
                Point::new(1, 1),
                Point::new(2, 2),
                Point::new(3, 3),
                Point::new(4, 4)
            ]
        );
        assert!((route.cost() - 5.657).abs() < 1e-3);
        assert_valid_route(&engine, start, goal, &route);
    }

    #[test]
    fn detour_around_locked_center() {
        let mut engine = PathSearch::new(SearchConfig::new(3, 3, false));
        engine.set_lock(Point::new(1, 1), true);
        let (start, goal) = (Point::new(0, 1), Point::new(2, 1));
        let route = engine.find_route(start, goal).unwrap();
        assert_eq!(route.len(), 4);
        assert_eq!(route.cost(), 4.0);
        assert!(!route.contains(&Point::new(1, 1)));
        assert_valid_route(&engine, start, goal, &route);
    }

    #[test]
    fn same_position_fails() {
        let mut engine = PathSearch::new(SearchConfig::new(5, 5, true));
        let err = engine.find_route(Point::new(2, 2), Point::new(2, 2)).unwrap_err();
        assert_eq!(err, SearchError::SamePosition(Point::new(2, 2)));

        // Even when the cell is locked and the grid is otherwise walled off.
        engine.set_lock(Point::new(2, 2), true);
        let err = engine.find_route(Point::new(2, 2), Point::new(2, 2)).unwrap_err();
        assert_eq!(err, SearchError::SamePosition(Point::new(2, 2)));
    }

    #[test]
    fn walled_in_start_has_no_path() {
        for diagonal in [false, true] {
            let mut engine = PathSearch::new(SearchConfig::new(3, 3, diagonal));
            let (start, goal) = (Point::new(0, 0), Point::new(2, 2));
            for p in engine.range() {
                if p != start && p != goal {
                    engine.set_lock(p, true);
                }
            }
            let err = engine.find_route(start, goal).unwrap_err();
            assert_eq!(err, SearchError::NoPathFound { start, goal });
        }
    }

    // -----------------------------------------------------------------------
    // Edge cases
    // -----------------------------------------------------------------------

    #[test]
    fn out_of_bounds_endpoints() {
        let mut engine = PathSearch::new(SearchConfig::new(4, 4, false));
        assert_eq!(
            engine.find_route(Point::new(-1, 0), Point::new(2, 2)),
            Err(SearchError::OutOfBounds(Point::new(-1, 0)))
        );
        assert_eq!(
            engine.find_route(Point::new(0, 0), Point::new(4, 0)),
            Err(SearchError::OutOfBounds(Point::new(4, 0)))
        );

        let mut empty = PathSearch::new(SearchConfig::new(0, 0, false));
        assert_eq!(
            empty.find_route(Point::new(0, 0), Point::new(1, 0)),
            Err(SearchError::OutOfBounds(Point::new(0, 0)))
        );
    }

    #[test]
    fn locked_goal_is_unreachable() {
        let mut engine = PathSearch::new(SearchConfig::new(4, 4, true));
        engine.set_lock(Point::new(3, 3), true);
        let err = engine.find_route(Point::new(0, 0), Point::new(3, 3)).unwrap_err();
        assert!(matches!(err, SearchError::NoPathFound { .. }));
    }

    #[test]
    fn locked_start_can_still_leave() {
        let mut engine = PathSearch::new(SearchConfig::new(4, 1, false));
        engine.set_lock(Point::new(0, 0), true);
        let route = engine.find_route(Point::new(0, 0), Point::new(3, 0)).unwrap();
        assert_eq!(route.len(), 3);
    }

    #[test]
    fn locking_the_only_bridge_fails() {
        let layout = Layout::parse(
            "\
.....
####.
.....",
            "#",
        )
        .unwrap();
        let mut engine = PathSearch::new(SearchConfig::new(5, 3, true));
        engine.load_layout(&layout, Point::ZERO);
        let (start, goal) = (Point::new(0, 0), Point::new(0, 2));

        let route = engine.find_route(start, goal).unwrap();
        assert!(route.contains(&Point::new(4, 1)));
        assert_valid_route(&engine, start, goal, &route);

        engine.set_lock(Point::new(4, 1), true);
        let err = engine.find_route(start, goal).unwrap_err();
        assert_eq!(err, SearchError::NoPathFound { start, goal });

        engine.set_lock(Point::new(4, 1), false);
        assert!(engine.find_route(start, goal).is_ok());
    }

    #[test]
    fn diagonal_may_pass_between_locked_corners() {
        let mut engine = PathSearch::new(SearchConfig::new(2, 2, true));
        engine.set_lock(Point::new(1, 0), true);
        engine.set_lock(Point::new(0, 1), true);
        let route = engine.find_route(Point::new(0, 0), Point::new(1, 1)).unwrap();
        assert_eq!(route.waypoints(), &[Point::new(1, 1)]);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let layout = Layout::parse(
            "\
..........
.####.....
....#.###.
.##.#...#.
..#.###.#.
..#.....#.
..######..
..........",
            "#",
        )
        .unwrap();
        for diagonal in [false, true] {
            let size = layout.size();
            let mut engine = PathSearch::new(SearchConfig::new(size.x, size.y, diagonal));
            engine.load_layout(&layout, Point::ZERO);
            let (start, goal) = (Point::new(0, 0), Point::new(5, 5));

            let first = engine.find_route(start, goal).unwrap();
            // An unrelated search in between must not leak state.
            engine.find_route(Point::new(9, 7), Point::new(0, 7)).unwrap();
            let second = engine.find_route(start, goal).unwrap();
            assert_eq!(first, second);
            assert_valid_route(&engine, start, goal, &first);
        }
    }

    #[test]
    fn long_corridor_beyond_default_backtrack_limit() {
        let mut engine = PathSearch::new(SearchConfig::new(1500, 1, false));
        let route = engine.find_route(Point::new(0, 0), Point::new(1499, 0)).unwrap();
        assert_eq!(route.len(), 1499);
        assert_eq!(route.cost(), 1499.0);
    }

    // -----------------------------------------------------------------------
    // Cooperative stepping
    // -----------------------------------------------------------------------

    #[test]
    fn stepping_yields_and_resumes() {
        let config = SearchConfig::new(30, 30, true).with_batch_size(10);
        let (start, goal) = (Point::new(0, 0), Point::new(29, 17));

        let mut engine = PathSearch::new(config);
        let expected = engine.find_route(start, goal).unwrap();

        let mut search = engine.search_route(start, goal);
        assert_eq!(search.phase(), SearchPhase::Reset);
        let mut pending = 0;
        let mut saw_reconstruction = false;
        let route = loop {
            match search.step() {
                Poll::Ready(result) => break result.unwrap(),
                Poll::Pending => {
                    pending += 1;
                    saw_reconstruction |= search.phase() == SearchPhase::Reconstructing;
                }
            }
        };
        assert!(pending > 0);
        assert!(saw_reconstruction);
        assert_eq!(search.phase(), SearchPhase::Succeeded);
        assert_eq!(search.stats().batches, pending + 1);
        assert_eq!(search.stats().backtrack_steps, route.len());
        assert_eq!(route, expected);

        // Exactly one result per search.
        assert_eq!(search.step(), Poll::Ready(Err(SearchError::Finished)));
    }

    #[test]
    fn batch_never_exceeds_budget() {
        let config = SearchConfig::new(20, 20, false).with_batch_size(7);
        let mut engine = PathSearch::new(config);
        let mut search = engine.search_route(Point::new(0, 0), Point::new(19, 19));
        let mut last = 0;
        while search.step().is_pending() {
            let s = search.stats();
            let work = s.expanded + s.backtrack_steps;
            assert!(work - last <= 7);
            last = work;
        }
    }

    #[test]
    fn rejected_search_delivers_failure_once() {
        let mut engine = PathSearch::new(SearchConfig::new(5, 5, false));
        let mut search = engine.search_route(Point::new(1, 1), Point::new(1, 1));
        assert_eq!(
            search.step(),
            Poll::Ready(Err(SearchError::SamePosition(Point::new(1, 1))))
        );
        assert_eq!(search.phase(), SearchPhase::Failed);
        assert_eq!(search.stats().expanded, 0);
        assert_eq!(search.step(), Poll::Ready(Err(SearchError::Finished)));
    }

    #[test]
    fn abandoned_search_does_not_leak() {
        let config = SearchConfig::new(40, 40, true).with_batch_size(5);
        let mut engine = PathSearch::new(config);
        let expected = engine
            .find_route(Point::new(3, 3), Point::new(30, 2))
            .unwrap();

        {
            let mut search = engine.search_route(Point::new(0, 39), Point::new(39, 0));
            for _ in 0..4 {
                assert!(search.step().is_pending());
            }
        }

        let route = engine.find_route(Point::new(3, 3), Point::new(30, 2)).unwrap();
        assert_eq!(route, expected);
    }

    #[tokio::test]
    async fn awaiting_a_search() {
        let config = SearchConfig::new(25, 25, true).with_batch_size(3);
        let mut engine = PathSearch::new(config);
        let (start, goal) = (Point::new(24, 0), Point::new(0, 24));
        let route = engine.search_route(start, goal).await.unwrap();
        assert_valid_route(&engine, start, goal, &route);
        assert_eq!(route.len(), 24);
    }

    #[tokio::test]
    async fn searches_interleave_on_one_thread() {
        let config = SearchConfig::new(30, 30, false).with_batch_size(4);
        let mut a = PathSearch::new(config);
        let mut b = PathSearch::new(config);
        let (ra, rb) = tokio::join!(
            a.search_route(Point::new(0, 0), Point::new(29, 29)),
            b.search_route(Point::new(29, 0), Point::new(0, 29)),
        );
        assert_eq!(ra.unwrap().cost(), 58.0);
        assert_eq!(rb.unwrap().cost(), 58.0);
    }

    // -----------------------------------------------------------------------
    // Reconstruction guard
    // -----------------------------------------------------------------------

    fn reconstructing(engine: &mut PathSearch, start: Point, goal: Point) -> RouteSearch<'_> {
        let mut search = RouteSearch::new(engine, start, goal);
        search.state = State::Reconstructing {
            cursor: goal,
            previous: INVALID_POSITION,
        };
        search
    }

    fn close(engine: &mut PathSearch, p: Point, from: Point) {
        let i = engine.idx(p).unwrap();
        engine.closed[i].set_from(from);
        engine.closed[i].activate();
    }

    #[test]
    fn two_cycle_is_detected() {
        let mut engine = PathSearch::new(SearchConfig::new(4, 1, false));
        let (start, goal) = (Point::new(0, 0), Point::new(3, 0));
        engine.reset(goal);
        close(&mut engine, goal, Point::new(2, 0));
        close(&mut engine, Point::new(2, 0), goal);

        let err = reconstructing(&mut engine, start, goal).run().unwrap_err();
        assert_eq!(
            err,
            SearchError::ReconstructionCycle {
                at: Point::new(2, 0),
                steps: 2
            }
        );
    }

    #[test]
    fn self_link_is_detected() {
        let mut engine = PathSearch::new(SearchConfig::new(4, 1, false));
        let (start, goal) = (Point::new(0, 0), Point::new(3, 0));
        engine.reset(goal);
        close(&mut engine, goal, goal);

        let err = reconstructing(&mut engine, start, goal).run().unwrap_err();
        assert!(matches!(err, SearchError::ReconstructionCycle { at, .. } if at == goal));
    }

    #[test]
    fn broken_link_is_detected() {
        let mut engine = PathSearch::new(SearchConfig::new(4, 1, false));
        let (start, goal) = (Point::new(0, 0), Point::new(3, 0));
        engine.reset(goal);
        // (2, 0) was never settled.
        close(&mut engine, goal, Point::new(2, 0));

        let err = reconstructing(&mut engine, start, goal).run().unwrap_err();
        assert_eq!(
            err,
            SearchError::ReconstructionCycle {
                at: Point::new(2, 0),
                steps: 1
            }
        );
    }

    #[test]
    fn long_cycle_hits_step_bound() {
        // A 4-cell loop that never reaches the start.
        let mut engine = PathSearch::new(SearchConfig::new(3, 3, true).with_backtrack_limit(0));
        let (start, goal) = (Point::new(0, 0), Point::new(2, 2));
        engine.reset(goal);
        close(&mut engine, goal, Point::new(2, 1));
        close(&mut engine, Point::new(2, 1), Point::new(1, 1));
        close(&mut engine, Point::new(1, 1), Point::new(1, 2));
        close(&mut engine, Point::new(1, 2), goal);

        // The bound is raised to the 9 cells of the grid.
        let err = reconstructing(&mut engine, start, goal).run().unwrap_err();
        assert!(matches!(err, SearchError::ReconstructionCycle { steps: 9, .. }));
    }

    // -----------------------------------------------------------------------
    // Randomized grids
    // -----------------------------------------------------------------------

    /// Exact shortest-path costs from `start` by repeated relaxation.
    fn reference_costs(engine: &PathSearch, start: Point) -> Vec<Option<f32>> {
        let rng: Range = engine.range();
        let mut cost = vec![None; rng.len()];
        cost[rng.index_of(start).unwrap()] = Some(0.0f32);
        let diagonal = engine.config().allows_diagonal();
        let diagonal_cost = engine.config().diagonal_cost;
        let mut changed = true;
        while changed {
            changed = false;
            for p in rng {
                let Some(c) = cost[rng.index_of(p).unwrap()] else {
                    continue;
                };
                let steps: Vec<Point> = if diagonal {
                    p.neighbors_8().to_vec()
                } else {
                    p.neighbors_4().to_vec()
                };
                for n in steps {
                    if !rng.contains(n) || engine.is_locked(n) {
                        continue;
                    }
                    let edge = if p.is_diagonal_to(n) { diagonal_cost } else { 1.0 };
                    let ni = rng.index_of(n).unwrap();
                    if cost[ni].is_none_or(|old| c + edge < old - 1e-4) {
                        cost[ni] = Some(c + edge);
                        changed = true;
                    }
                }
            }
        }
        cost
    }

    #[test]
    fn random_grids_find_shortest_routes() {
        let mut rng = StdRng::seed_from_u64(7);
        for round in 0..40 {
            let diagonal = round % 2 == 1;
            let (w, h) = (rng.random_range(4..14), rng.random_range(4..14));
            let mut engine = PathSearch::new(SearchConfig::new(w, h, diagonal).with_batch_size(13));
            for p in engine.range() {
                if rng.random_bool(0.3) {
                    engine.set_lock(p, true);
                }
            }
            let start = Point::new(rng.random_range(0..w), rng.random_range(0..h));
            let goal = Point::new(rng.random_range(0..w), rng.random_range(0..h));
            let reference = reference_costs(&engine, start);
            let best = reference[engine.range().index_of(goal).unwrap()];

            match engine.find_route(start, goal) {
                Ok(route) => {
                    assert_valid_route(&engine, start, goal, &route);
                    let best = best.expect("route found to an unreachable goal");
                    assert!((route.cost() - best).abs() < 1e-3, "round {round}");
                }
                Err(SearchError::SamePosition(p)) => assert_eq!(p, start),
                Err(SearchError::NoPathFound { .. }) => {
                    assert!(best.is_none() || engine.is_locked(goal), "round {round}")
                }
                Err(err) => panic!("round {round}: unexpected {err}"),
            }
        }
    }

    #[test]
    fn cheap_diagonals_reopen_closed_nodes() {
        // Diagonal steps cheaper than cardinal ones make the Chebyshev
        // estimate inconsistent, so settled nodes get improved later.
        let mut rng = StdRng::seed_from_u64(11);
        let mut reopened = 0;
        for round in 0..300 {
            let (w, h) = (rng.random_range(4..16), rng.random_range(4..16));
            let config = SearchConfig::new(w, h, true)
                .with_diagonal_cost(0.3)
                .with_batch_size(9);
            let mut engine = PathSearch::new(config);
            for p in engine.range() {
                if rng.random_bool(0.25) {
                    engine.set_lock(p, true);
                }
            }
            let start = Point::new(rng.random_range(0..w), rng.random_range(0..h));
            let goal = Point::new(rng.random_range(0..w), rng.random_range(0..h));
            let reachable = reference_costs(&engine, start)[engine.range().index_of(goal).unwrap()];

            let (result, stats) = {
                let mut search = engine.search_route(start, goal);
                let result = loop {
                    if let Poll::Ready(result) = search.step() {
                        break result;
                    }
                };
                (result, search.stats())
            };
            reopened += stats.reopened;

            match result {
                Ok(route) => {
                    assert_valid_route(&engine, start, goal, &route);
                    let best = reachable.expect("route found to an unreachable goal");
                    assert!(route.cost() >= best - 1e-3, "round {round}");
                }
                Err(SearchError::SamePosition(p)) => assert_eq!(p, start),
                Err(SearchError::NoPathFound { .. }) => {
                    assert!(reachable.is_none() || engine.is_locked(goal), "round {round}")
                }
                Err(err) => panic!("round {round}: unexpected {err}"),
            }
        }
        assert!(reopened > 0);
    }
}
