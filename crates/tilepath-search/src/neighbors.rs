use tilepath_core::Point;

use crate::config::Movement;

/// Reusable buffer of `(neighbour, edge cost)` pairs for node expansion.
#[derive(Debug, Default)]
pub(crate) struct Neighbors {
    buf: Vec<(Point, f32)>,
}

impl Neighbors {
    pub(crate) fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Neighbours of `p` under `movement`, keeping only those for which
    /// `keep` returns `true`. Cardinal steps cost 1, diagonal steps cost
    /// `diagonal_cost`.
    pub(crate) fn around(
        &mut self,
        p: Point,
        movement: Movement,
        diagonal_cost: f32,
        keep: impl Fn(Point) -> bool,
    ) -> &[(Point, f32)] {
        self.buf.clear();
        match movement {
            Movement::Orthogonal => {
                for n in p.neighbors_4() {
                    if keep(n) {
                        self.buf.push((n, 1.0));
                    }
                }
            }
            Movement::Diagonal => {
                for n in p.neighbors_8() {
                    if keep(n) {
                        let cost = if p.is_diagonal_to(n) { diagonal_cost } else { 1.0 };
                        self.buf.push((n, cost));
                    }
                }
            }
        }
        &self.buf
    }
}
