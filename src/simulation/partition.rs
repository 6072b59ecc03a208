//! Work partitioning for the parallel phases
//!
//! Two ways to split a phase across the worker pool:
//! - contiguous index ranges (`chunk_len`), used by integration
//! - vertical world strips (`Strips`), used by collision resolve
//!
//! Strips are processed in two passes, even strips then odd strips. A
//! contact probe only reaches particles whose indexed x is within
//! `CONTACT_DISTANCE` of the probe, so while strip `k` runs it can only touch
//! particles indexed in strips `k - 1`, `k` and `k + 1`, and only the parts of
//! the neighbours within `CONTACT_DISTANCE` of the shared edge. With strips at
//! least `MIN_STRIP_WIDTH` wide, strips `k` and `k + 2` never touch the same
//! particle, which is what lets the passes run without locks.

use crate::simulation::states::{NVec2, CONTACT_DISTANCE};

/// Narrowest strip for which the two-pass schedule keeps writers disjoint.
/// `2 * CONTACT_DISTANCE` is the hard bound; the rest absorbs rounding.
pub const MIN_STRIP_WIDTH: f32 = 3.0 * CONTACT_DISTANCE;

/// Length of each contiguous chunk when splitting `len` items over `tasks`.
pub fn chunk_len(len: usize, tasks: usize) -> usize {
    len.div_ceil(tasks.max(1)).max(1)
}

/// Vertical strips covering `[0, world_width)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strips {
    pub width: f32,
    pub count: usize,
}

impl Strips {
    /// `2 * tasks` strips, or fewer if they would be narrower than
    /// [`MIN_STRIP_WIDTH`].
    pub fn new(world_width: f32, tasks: usize) -> Self {
        let wanted = 2 * tasks.max(1);
        let widest = (world_width / MIN_STRIP_WIDTH).floor().max(1.0) as usize;
        let count = wanted.min(widest);
        Self {
            width: world_width / count as f32,
            count,
        }
    }

    /// Strip holding `x`; values outside the world land in the edge strips.
    pub fn strip_of(&self, x: f32) -> usize {
        // `as usize` saturates negatives and NaN to 0
        ((x / self.width) as usize).min(self.count - 1)
    }

    /// True if fewer strips than requested had to be used.
    pub fn is_reduced(&self, tasks: usize) -> bool {
        self.count < 2 * tasks.max(1)
    }

    /// Group `(id, indexed position)` entries by strip.
    pub fn bucket<I>(&self, entries: I) -> Vec<Vec<(usize, NVec2)>>
    where
        I: IntoIterator<Item = (usize, NVec2)>,
    {
        let mut strips = vec![Vec::new(); self.count];
        for (id, position) in entries {
            strips[self.strip_of(position.x)].push((id, position));
        }
        strips
    }
}
