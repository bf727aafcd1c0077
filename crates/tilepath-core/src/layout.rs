//! Tile layouts built from ASCII art.
//!
//! A [`Layout`] reads a text map, one line per row, and records which cells
//! are blocked. It is the usual way to feed level data or test fixtures into
//! a path search:
//!
//! ```
//! use tilepath_core::{Layout, Point};
//!
//! let layout = Layout::parse(
//!     "\
//! ..#
//! .##
//! ...",
//!     "#",
//! )
//! .unwrap();
//! assert_eq!(layout.size(), Point::new(3, 3));
//! assert!(layout.is_blocked(Point::new(2, 0)));
//! assert_eq!(layout.blocked().count(), 3);
//! ```

use thiserror::Error;

use crate::geom::{Point, Range};

/// A rectangular tile map where every cell is either open or blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    size: Point,
    cells: Vec<bool>,
}

impl Layout {
    /// Parse `text`, marking every character found in `blocked` as a blocked
    /// cell. Any other character is an open cell.
    ///
    /// Leading and trailing line breaks of the whole text are dropped, and a
    /// trailing `'\r'` on each line is ignored. Spaces are cells like any
    /// other character. All lines must have the same width.
    pub fn parse(text: &str, blocked: &str) -> Result<Self, LayoutError> {
        Self::parse_with(text, blocked, None)
    }

    /// Like [`parse`](Self::parse), but rejects characters that are not in
    /// `runes`.
    pub fn with_runes(text: &str, blocked: &str, runes: &str) -> Result<Self, LayoutError> {
        Self::parse_with(text, blocked, Some(runes))
    }

    fn parse_with(text: &str, blocked: &str, runes: Option<&str>) -> Result<Self, LayoutError> {
        let text = text.trim_matches(|c: char| c == '\n' || c == '\r');
        if text.is_empty() {
            return Ok(Self {
                size: Point::ZERO,
                cells: Vec::new(),
            });
        }

        let mut cells = Vec::with_capacity(text.len());
        let mut width: Option<i32> = None;
        let mut height = 0;

        for (y, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let mut x = 0;
            for ch in line.chars() {
                if runes.is_some_and(|r| !r.contains(ch)) {
                    return Err(LayoutError::InvalidRune {
                        ch,
                        pos: Point::new(x, y as i32),
                    });
                }
                cells.push(blocked.contains(ch));
                x += 1;
            }
            match width {
                None => width = Some(x),
                Some(w) if w != x => {
                    return Err(LayoutError::InconsistentSize {
                        line: y as i32,
                        expected: w,
                        found: x,
                    });
                }
                Some(_) => {}
            }
            height += 1;
        }

        Ok(Self {
            size: Point::new(width.unwrap_or(0), height),
            cells,
        })
    }

    /// Size of the layout as (width, height).
    #[inline]
    pub fn size(&self) -> Point {
        self.size
    }

    /// The range `[0, width) × [0, height)` covered by the layout.
    #[inline]
    pub fn range(&self) -> Range {
        Range::with_size(self.size.x, self.size.y)
    }

    /// Whether the cell at `p` is blocked. Cells outside the layout are not.
    pub fn is_blocked(&self, p: Point) -> bool {
        self.range()
            .index_of(p)
            .is_some_and(|idx| self.cells[idx])
    }

    /// Row-major iterator over the blocked cells.
    pub fn blocked(&self) -> impl Iterator<Item = Point> + '_ {
        let rng = self.range();
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(move |(idx, _)| rng.point_at(idx))
    }
}

/// Errors that can occur when parsing a [`Layout`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A line's width differs from the first line's.
    #[error("layout line {line} is {found} cells wide, expected {expected}")]
    InconsistentSize { line: i32, expected: i32, found: i32 },
    /// A character outside the permitted set was found.
    #[error("layout contains invalid rune \u{201c}{ch}\u{201d} at {pos}")]
    InvalidRune { ch: char, pos: Point },
}
