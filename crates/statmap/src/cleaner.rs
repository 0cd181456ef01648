use std::collections::HashSet;

use formats::RawRegion;
use foundation::ids::RegionId;
use foundation::math::Vec3;

/// A region part with usable rings: outer ring of at least three distinct
/// points, every kept hole likewise.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRegion {
    pub id: RegionId,
    pub vertices: Vec<Vec3>,
    pub holes: Vec<Vec<Vec3>>,
}

/// Result of cleaning one level's raw regions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanedBoundaries {
    pub regions: Vec<CleanRegion>,
    /// Distinct surviving ids, first-seen order.
    pub ids: Vec<RegionId>,
    pub dropped_regions: usize,
    pub dropped_holes: usize,
}

/// Minimum distinct points for a ring to enclose an area.
pub const MIN_RING_POINTS: usize = 3;

/// Drops consecutive exact duplicates, including a closing point equal to the
/// first one.
pub fn remove_duplicates(ring: &[Vec3]) -> Vec<Vec3> {
    let mut out: Vec<Vec3> = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Number of distinct points in `ring`, compared exactly.
pub fn distinct_points(ring: &[Vec3]) -> usize {
    // `+ 0.0` folds -0.0 into 0.0 before comparing bit patterns.
    ring.iter()
        .map(|p| ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()))
        .collect::<HashSet<_>>()
        .len()
}

/// Deduplicated ring, or `None` when fewer than three distinct points remain.
fn usable_ring(ring: &[Vec3]) -> Option<Vec<Vec3>> {
    let ring = remove_duplicates(ring);
    (distinct_points(&ring) >= MIN_RING_POINTS).then_some(ring)
}

pub fn clean_region(raw: &RawRegion) -> Option<(CleanRegion, usize)> {
    let vertices = usable_ring(&raw.outer_ring)?;

    let mut dropped_holes = 0;
    let mut holes = Vec::with_capacity(raw.holes.len());
    for hole in &raw.holes {
        match usable_ring(hole) {
            Some(hole) => holes.push(hole),
            None => dropped_holes += 1,
        }
    }

    Some((
        CleanRegion {
            id: raw.id.clone(),
            vertices,
            holes,
        },
        dropped_holes,
    ))
}

pub fn clean_regions(raw: &[RawRegion]) -> CleanedBoundaries {
    let mut out = CleanedBoundaries::default();
    let mut seen: HashSet<&RegionId> = HashSet::new();

    for region in raw {
        let Some((clean, dropped_holes)) = clean_region(region) else {
            out.dropped_regions += 1;
            continue;
        };
        out.dropped_holes += dropped_holes;
        if seen.insert(&region.id) {
            out.ids.push(region.id.clone());
        }
        out.regions.push(clean);
    }

    out
}
