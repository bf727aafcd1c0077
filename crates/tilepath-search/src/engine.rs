use tilepath_core::{Layout, Point, Range};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::frontier::Frontier;
use crate::neighbors::Neighbors;
use crate::node::{INVALID_POSITION, Node};
use crate::route::Route;
use crate::search::{RouteSearch, SearchStats};

// ---------------------------------------------------------------------------
// PathSearch
// ---------------------------------------------------------------------------

/// Route-search engine for one tile grid.
///
/// `PathSearch` owns three grid-shaped node tables, allocated once and
/// reused by every search:
///
/// - the *template* table holds tentative costs while neighbours are being
///   reconciled, and the persistent lock flag of every cell;
/// - the *open* table holds the frontier;
/// - the *closed* table holds nodes whose neighbours have been expanded.
///
/// A search borrows the engine mutably until it is finished or dropped, so
/// an engine runs at most one search at a time and locks cannot change under
/// an in-flight search.
///
/// ```
/// use tilepath_core::Point;
/// use tilepath_search::{PathSearch, SearchConfig};
///
/// let mut engine = PathSearch::new(SearchConfig::new(3, 3, false));
/// engine.set_lock(Point::new(1, 1), true);
///
/// let route = engine.find_route(Point::new(0, 1), Point::new(2, 1)).unwrap();
/// assert_eq!(route.len(), 4);
/// assert_eq!(route.goal(), Some(Point::new(2, 1)));
/// ```
#[derive(Debug)]
pub struct PathSearch {
    pub(crate) config: SearchConfig,
    pub(crate) rng: Range,
    pub(crate) template: Vec<Node>,
    pub(crate) open: Vec<Node>,
    pub(crate) closed: Vec<Node>,
    nbuf: Neighbors,
}

impl PathSearch {
    /// Create an engine with every cell unlocked.
    pub fn new(config: SearchConfig) -> Self {
        let mut engine = Self {
            config,
            rng: Range::default(),
            template: Vec::new(),
            open: Vec::new(),
            closed: Vec::new(),
            nbuf: Neighbors::new(),
        };
        engine.initialize(config);
        engine
    }

    /// Reallocate the node tables for `config`, discarding all lock state.
    pub fn initialize(&mut self, config: SearchConfig) {
        let rng = Range::with_size(config.size_x, config.size_y);
        if rng.is_empty() {
            log::warn!(
                "path search initialized with an empty {}x{} grid",
                config.size_x,
                config.size_y
            );
        }

        let diagonal = config.allows_diagonal();
        let table: Vec<Node> = rng
            .iter()
            .map(|p| Node::new(p, INVALID_POSITION, diagonal))
            .collect();

        self.config = config;
        self.rng = rng;
        self.open = table.clone();
        self.closed = table.clone();
        self.template = table;
    }

    /// Lock or unlock the cell at `p`. Locked cells are never expanded into.
    ///
    /// Returns `false` if `p` is outside the grid.
    pub fn set_lock(&mut self, p: Point, locked: bool) -> bool {
        match self.idx(p) {
            Some(i) => {
                self.template[i].set_locked(locked);
                true
            }
            None => false,
        }
    }

    /// Whether the cell at `p` is impassable. Cells outside the grid are.
    pub fn is_locked(&self, p: Point) -> bool {
        self.idx(p).is_none_or(|i| self.template[i].is_locked())
    }

    /// Unlock every cell.
    pub fn clear_locks(&mut self) {
        for node in self.template.iter_mut() {
            node.set_locked(false);
        }
    }

    /// Lock every blocked cell of `layout`, placed with its top-left corner
    /// at `origin`. Cells falling outside the grid are skipped. Returns the
    /// number of cells locked.
    pub fn load_layout(&mut self, layout: &Layout, origin: Point) -> usize {
        let mut count = 0;
        for p in layout.blocked() {
            if self.set_lock(p + origin, true) {
                count += 1;
            }
        }
        log::debug!(
            "loaded {count} locked cells from a {}x{} layout at {origin}",
            layout.size().x,
            layout.size().y
        );
        count
    }

    /// Iterator over the locked cells, row-major.
    pub fn locked_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.template
            .iter()
            .filter(|n| n.is_locked())
            .map(|n| n.position())
    }

    /// Start searching for a route from `start` to `goal`.
    ///
    /// The returned [`RouteSearch`] does the work in batches: drive it with
    /// [`step`](RouteSearch::step), [`run`](RouteSearch::run), or `.await`
    /// it. It delivers exactly one result.
    pub fn search_route(&mut self, start: Point, goal: Point) -> RouteSearch<'_> {
        RouteSearch::new(self, start, goal)
    }

    /// Search for a route and block until it is found or fails.
    pub fn find_route(&mut self, start: Point, goal: Point) -> Result<Route, SearchError> {
        self.search_route(start, goal).run()
    }

    /// The grid rectangle, `[0, size_x) × [0, size_y)`.
    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Number of cells in the grid.
    #[inline]
    pub fn len(&self) -> usize {
        self.template.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    // -----------------------------------------------------------------------
    // Search internals
    // -----------------------------------------------------------------------

    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        self.rng.index_of(p)
    }

    /// Forget the previous search and aim every node at `goal`.
    pub(crate) fn reset(&mut self, goal: Point) {
        for table in [&mut self.template, &mut self.open, &mut self.closed] {
            for node in table.iter_mut() {
                node.clear_for(goal);
            }
        }
    }

    /// Put the start node into the open table.
    pub(crate) fn seed(&mut self, start_idx: usize, frontier: &mut Frontier) {
        let node = &mut self.open[start_idx];
        node.set_move_cost(0.0);
        node.activate();
        frontier.push(start_idx, node.score(), node.move_cost());
    }

    /// Index of the best active open node, or `None` if the open set is
    /// empty.
    pub(crate) fn select_best(&self, frontier: &mut Frontier) -> Option<usize> {
        frontier.pop_live(|i| {
            let node = &self.open[i];
            node.is_active().then(|| node.move_cost())
        })
    }

    /// Expand the open node at `ci` and move it to the closed table.
    pub(crate) fn expand(&mut self, ci: usize, frontier: &mut Frontier, stats: &mut SearchStats) {
        let current = self.open[ci];
        let movement = self.config.movement;
        let diagonal_cost = self.config.diagonal_cost;

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let rng = self.rng;
        let template = &self.template;
        let neighbors = nbuf.around(current.position(), movement, diagonal_cost, |n| {
            rng.index_of(n).is_some_and(|i| !template[i].is_locked())
        });

        for &(np, edge_cost) in neighbors {
            let Some(ni) = rng.index_of(np) else {
                continue;
            };

            let scratch = &mut self.template[ni];
            scratch.set_move_cost(current.move_cost() + edge_cost);
            scratch.set_from(current.position());
            let tentative = *scratch;

            if self.open[ni].is_active() {
                if tentative.score() < self.open[ni].score() {
                    let node = &mut self.open[ni];
                    node.set_move_cost(tentative.move_cost());
                    node.set_from(tentative.from());
                    frontier.push(ni, node.score(), node.move_cost());
                }
            } else if self.closed[ni].is_active() {
                if tentative.score() < self.closed[ni].score() {
                    self.closed[ni].deactivate();
                    let node = &mut self.open[ni];
                    node.set_move_cost(tentative.move_cost());
                    node.set_from(tentative.from());
                    node.activate();
                    frontier.push(ni, node.score(), node.move_cost());
                    stats.reopened += 1;
                }
            } else {
                let node = &mut self.open[ni];
                node.set_move_cost(tentative.move_cost());
                node.set_from(tentative.from());
                node.activate();
                frontier.push(ni, node.score(), node.move_cost());
            }
        }

        self.nbuf = nbuf;

        self.open[ci].deactivate();
        self.closed[ci] = current;
        stats.expanded += 1;
    }

    /// The settled node at `p`: closed if expanded, otherwise open.
    pub(crate) fn settled(&self, p: Point) -> Option<&Node> {
        let i = self.idx(p)?;
        if self.closed[i].is_active() {
            Some(&self.closed[i])
        } else if self.open[i].is_active() {
            Some(&self.open[i])
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization: configuration plus locked cells
// ---------------------------------------------------------------------------

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct Snapshot {
    config: SearchConfig,
    locked: Vec<Point>,
}

#[cfg(feature = "serde")]
impl serde::Serialize for PathSearch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let snapshot = Snapshot {
            config: self.config,
            locked: self.locked_cells().collect(),
        };
        serde::Serialize::serialize(&snapshot, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PathSearch {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = <Snapshot as serde::Deserialize>::deserialize(deserializer)?;
        let mut engine = PathSearch::new(snapshot.config);
        for p in snapshot.locked {
            engine.set_lock(p, true);
        }
        Ok(engine)
    }
}
