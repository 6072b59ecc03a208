//! Contact resolution between unit-radius particles
//!
//! Overlapping pairs are pushed apart along the line between their centers,
//! each particle moving half of the overlap. Candidates come from the
//! quadtree: every indexed entry probes the tree with a unit-radius circle
//! around its indexed position.
//!
//! Pairs are not deduplicated. A pair usually shows up once from each side;
//! the second visit sees the corrected distance and does nothing unless a
//! third particle pushed them together again in between.

use std::marker::PhantomData;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::simulation::partition::Strips;
use crate::simulation::quadtree::{Probe, QuadTree};
use crate::simulation::states::{NVec2, Particle, CONTACT_DISTANCE};

/// Distances below this are treated as coincident centers.
pub const DEGENERATE_DISTANCE: f32 = 1.0e-6;

/// Push `a` and `b` apart if they overlap. Returns true if anything moved.
///
/// Coincident centers have no direction; they are separated along +x
/// (`a` to the right) instead of dividing by zero.
pub fn solve_contact(a: &mut Particle, b: &mut Particle) -> bool {
    let diff = a.position - b.position;
    let dist = diff.norm();
    if dist >= CONTACT_DISTANCE {
        return false;
    }

    let (normal, dist) = if dist < DEGENERATE_DISTANCE {
        (NVec2::new(1.0, 0.0), 0.0)
    } else {
        (diff / dist, dist)
    };

    let delta = 0.5 * (CONTACT_DISTANCE - dist);
    let correction = normal * delta;
    a.position += correction;
    b.position -= correction;
    true
}

/// Two distinct elements of `particles` mutably.
pub fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    assert_ne!(i, j, "a particle cannot collide with itself");
    if i < j {
        let (lo, hi) = particles.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = particles.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

/// Resolve every indexed entry against its neighbours on the calling thread.
/// Returns the number of corrections applied.
pub fn resolve_serial(particles: &mut [Particle], tree: &QuadTree) -> usize {
    let mut found = Vec::new();
    let mut contacts = 0;

    for (_, entry) in tree.objects.iter() {
        found.clear();
        tree.query_into(&Probe::new(entry.position), &mut found);
        for &other in &found {
            if other == entry.id {
                continue;
            }
            let (a, b) = pair_mut(particles, other, entry.id);
            if solve_contact(a, b) {
                contacts += 1;
            }
        }
    }

    contacts
}

/// Resolve on `pool`, one task per strip, even strips first then odd strips.
/// Returns the number of corrections applied.
///
/// Requires `strips.width >= MIN_STRIP_WIDTH` (or a single strip); see
/// [`crate::simulation::partition`] for why concurrent strips never share a
/// particle.
pub fn resolve_strips(pool: &ThreadPool, strips: &Strips, particles: &mut [Particle], tree: &QuadTree) -> usize {
    let buckets = strips.bucket(tree.objects.iter().map(|(_, entry)| (entry.id, entry.position)));
    let shared = SharedParticles::new(particles);
    let mut contacts = 0;

    for pass in 0..2 {
        let batch: Vec<&Vec<(usize, NVec2)>> = buckets.iter().skip(pass).step_by(2).collect();
        contacts += pool.install(|| {
            batch
                .par_iter()
                .map_init(Vec::new, |found, strip| {
                    let mut n = 0;
                    for &(id, position) in strip.iter() {
                        found.clear();
                        tree.query_into(&Probe::new(position), found);
                        for &other in found.iter() {
                            if other == id {
                                continue;
                            }
                            // SAFETY: `other` and `id` are indexed in this strip or
                            // within CONTACT_DISTANCE of its edges; no strip running in
                            // this pass can reach them.
                            let (a, b) = unsafe { shared.pair(other, id) };
                            if solve_contact(a, b) {
                                n += 1;
                            }
                        }
                    }
                    n
                })
                .sum::<usize>()
        });
    }

    contacts
}

/// Raw view of the particle array shared by the strip tasks of one pass.
struct SharedParticles<'a> {
    ptr: *mut Particle,
    len: usize,
    _marker: PhantomData<&'a mut [Particle]>,
}

// Tasks only write through `pair`, on particles no other task of the same pass
// can reach.
unsafe impl Send for SharedParticles<'_> {}
unsafe impl Sync for SharedParticles<'_> {}

impl<'a> SharedParticles<'a> {
    fn new(particles: &'a mut [Particle]) -> Self {
        Self {
            ptr: particles.as_mut_ptr(),
            len: particles.len(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// No other live reference may point at element `i` or `j`.
    #[allow(clippy::mut_from_ref)]
    unsafe fn pair(&self, i: usize, j: usize) -> (&mut Particle, &mut Particle) {
        assert!(i != j && i < self.len && j < self.len);
        (&mut *self.ptr.add(i), &mut *self.ptr.add(j))
    }
}
