//! Timestamped commands and the sorted album that stores them
//!
//! A `Moment` is an immutable record of something that happened at a fixed
//! time. Replaying forward applies it, rewinding undoes it. A `MomentAlbum`
//! keeps moments sorted by time so recorders can fetch exactly the moments
//! crossed between two ticks.
//!
//! # Example
//!
//! ```rust
//! use rewind_core::{Moment, MomentAlbum, Time};
//!
//! #[derive(Clone)]
//! struct Add { time: Time, amount: i32 }
//!
//! impl Moment for Add {
//!     type Target = i32;
//!     fn time(&self) -> Time { self.time }
//!     fn apply(&self, target: &mut i32) { *target += self.amount }
//!     fn undo(&self, target: &mut i32) { *target -= self.amount }
//! }
//!
//! let mut album = MomentAlbum::new();
//! album.add_moment(Add { time: 3.0, amount: 1 });
//! album.add_moment(Add { time: 1.0, amount: 2 });
//!
//! assert_eq!(album.latest_time(), Some(3.0));
//! assert_eq!(album.get(0.0, 2.0).len(), 1);
//! ```

use crate::Time;
use std::cmp::Ordering;

/// An immutable, timestamped command
///
/// `apply` is the forward ("do") direction. Moments act on an associated
/// target so they stay independent of any particular object model.
pub trait Moment: Clone {
    /// What the moment mutates when applied or undone
    type Target;

    /// The time this moment happened; fixed at construction
    fn time(&self) -> Time;

    /// Apply the recorded effect
    fn apply(&self, target: &mut Self::Target);

    /// Reverse the recorded effect
    fn undo(&self, target: &mut Self::Target);

    /// Release anything the moment owns when it is discarded at `time`
    fn destroy(self, _time: Time) {}
}

fn cmp_time(a: Time, b: Time) -> Ordering {
    a.total_cmp(&b)
}

/// Moments sorted ascending by time
///
/// Moments sharing a time are allowed; their relative order is whatever the
/// binary search produced on insertion.
#[derive(Debug, Clone)]
pub struct MomentAlbum<M> {
    moments: Vec<M>,
}

impl<M: Moment> MomentAlbum<M> {
    /// Create an empty album
    pub fn new() -> Self {
        Self {
            moments: Vec::new(),
        }
    }

    /// Insert a moment, keeping the album sorted
    ///
    /// Returns the index the moment landed at. If a moment with the same time
    /// exists, the new one goes directly before the match the search found.
    pub fn add_moment(&mut self, moment: M) -> usize {
        let index = match self.binary_search(moment.time()) {
            Ok(found) => found,
            Err(insert_at) => insert_at,
        };
        self.moments.insert(index, moment);
        index
    }

    /// Look up a time
    ///
    /// `Ok(i)` means `moments()[i]` has exactly this time (not necessarily the
    /// first of several). `Err(i)` is the index where a moment with this time
    /// would have to be inserted to keep the album sorted.
    pub fn binary_search(&self, time: Time) -> Result<usize, usize> {
        let mut lo = 0;
        let mut hi = self.moments.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match cmp_time(self.moments[mid].time(), time) {
                Ordering::Equal => return Ok(mid),
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
            }
        }

        Err(lo)
    }

    /// Moments in `[lower, upper)`, ascending
    ///
    /// When `lower == upper` the upper bound is dropped within the search
    /// window: the result is the earliest moment at or after `lower`, along
    /// with any moments sharing its time. `lower > upper` yields nothing.
    pub fn get(&self, lower: Time, upper: Time) -> &[M] {
        let start = self.first_index_at_or_after(lower);
        let end = if lower == upper {
            match self.moments.get(start) {
                Some(first) => self.first_index_after(first.time()),
                None => start,
            }
        } else {
            self.first_index_at_or_after(upper)
        };

        if start >= end {
            &[]
        } else {
            &self.moments[start..end]
        }
    }

    /// Time of the last moment, `None` when empty
    pub fn latest_time(&self) -> Option<Time> {
        self.moments.last().map(Moment::time)
    }

    /// The last moment by time
    pub fn latest_moment(&self) -> Option<&M> {
        self.moments.last()
    }

    /// The latest moment with `moment.time() <= time`
    pub fn moment_before_or_at(&self, time: Time) -> Option<&M> {
        match self.first_index_after(time) {
            0 => None,
            index => self.moments.get(index - 1),
        }
    }

    /// The earliest moment with `moment.time() > time`
    pub fn moment_after(&self, time: Time) -> Option<&M> {
        self.moments.get(self.first_index_after(time))
    }

    /// Remove every moment strictly after `time`
    ///
    /// Each removed moment is destroyed at `time`. Returns how many were
    /// removed.
    pub fn remove_moments_after(&mut self, time: Time) -> usize {
        let keep = self.first_index_after(time);
        let removed = self.moments.len() - keep;
        for moment in self.moments.drain(keep..) {
            moment.destroy(time);
        }
        removed
    }

    /// All moments in time order
    pub fn moments(&self) -> &[M] {
        &self.moments
    }

    pub fn iter(&self) -> impl Iterator<Item = &M> {
        self.moments.iter()
    }

    pub fn len(&self) -> usize {
        self.moments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Earliest and latest moment times
    pub fn time_range(&self) -> Option<(Time, Time)> {
        match (self.moments.first(), self.moments.last()) {
            (Some(first), Some(last)) => Some((first.time(), last.time())),
            _ => None,
        }
    }

    /// Drop every moment, destroying each at its own time
    pub fn clear(&mut self) {
        for moment in self.moments.drain(..) {
            let time = moment.time();
            moment.destroy(time);
        }
    }

    fn first_index_at_or_after(&self, time: Time) -> usize {
        self.moments
            .partition_point(|m| cmp_time(m.time(), time) == Ordering::Less)
    }

    fn first_index_after(&self, time: Time) -> usize {
        self.moments
            .partition_point(|m| cmp_time(m.time(), time) != Ordering::Greater)
    }
}

impl<M: Moment> Default for MomentAlbum<M> {
    fn default() -> Self {
        Self::new()
    }
}
