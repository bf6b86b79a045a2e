//! Position tracking for repeated output blocks.
//!
//! An [`IterationCursor`] walks an ordered slice and reports, for the current item,
//! its index, whether it is the first one, whether it is the last one, and the
//! total length. Emission routines use the snapshot to decide where separators go
//! between consecutive blocks.
//!
//! The `last` flag is recomputed on every [`advance`](IterationCursor::advance) as
//! `index == length - 1`, and set to `length == 1` on creation. Generated
//! skeletons depend on this for blank-line placement, so it must not change.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TegelError};

/// Read-only snapshot of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub first: bool,
    pub last: bool,
    pub length: usize,
}

/// Bookkeeping over an ordered slice being expanded into repeated blocks.
#[derive(Debug, Clone)]
pub struct IterationCursor<'a, T> {
    items: &'a [T],
    index: usize,
    first: bool,
    last: bool,
}

impl<'a, T> IterationCursor<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self {
            items,
            index: 0,
            first: true,
            last: items.len() == 1,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            index: self.index,
            first: self.first,
            last: self.last,
            length: self.items.len(),
        }
    }

    /// Move to the next item.
    ///
    /// Must not be called once the cursor sits on the final item.
    pub fn advance(&mut self) {
        debug_assert!(
            self.index + 1 < self.items.len(),
            "advanced past the last item"
        );
        self.index += 1;
        self.first = false;
        self.last = self.index + 1 == self.items.len();
    }

    /// The item under the cursor, `None` for an empty slice.
    pub fn current(&self) -> Option<&'a T> {
        self.items.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Iterate `items` together with the cursor position of each one.
///
/// The cursor is advanced between items only, never past the final one.
pub fn positioned<T>(items: &[T]) -> Positioned<'_, T> {
    Positioned {
        cursor: IterationCursor::new(items),
        started: false,
    }
}

/// Iterator returned by [`positioned`].
pub struct Positioned<'a, T> {
    cursor: IterationCursor<'a, T>,
    started: bool,
}

impl<'a, T> Iterator for Positioned<'a, T> {
    type Item = (Position, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.started {
            if self.cursor.position().index + 1 >= self.cursor.len() {
                return None;
            }
            self.cursor.advance();
        }
        self.started = true;
        let item = self.cursor.current()?;
        Some((self.cursor.position(), item))
    }
}

fn flag(b: bool) -> char {
    if b {
        'y'
    } else {
        'n'
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.index,
            flag(self.first),
            flag(self.last),
            self.length
        )
    }
}

/// Parses the `index:first:last:length` form, e.g. `0:y:n:3`.
impl FromStr for Position {
    type Err = TegelError;

    fn from_str(s: &str) -> Result<Self> {
        const EXPECTED: &str = "expected a string of type int:[y/n]:[y/n]:int";

        let fields: Vec<&str> = s.split(':').collect();
        let &[index, first, last, length] = fields.as_slice() else {
            return Err(TegelError::invalid("position", EXPECTED));
        };
        let parse_int = |v: &str| {
            v.parse::<usize>()
                .map_err(|_| TegelError::invalid("position", EXPECTED))
        };
        // Anything other than y/Y reads as "no".
        let parse_flag = |v: &str| v.eq_ignore_ascii_case("y");

        Ok(Self {
            index: parse_int(index)?,
            first: parse_flag(first),
            last: parse_flag(last),
            length: parse_int(length)?,
        })
    }
}
