use std::collections::HashMap;

use earcutr::earcut;
use foundation::ids::{LevelIndex, RegionId};
use foundation::math::{Vec3, WGS84_B, centroid, ellipsoid_normal};
use tracing::warn;

use crate::cleaner::CleanRegion;

/// Indexed triangle mesh of one extruded region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solid {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Baked extrusion per vertex: 0 on the base, the extrusion height on the
    /// top. Renderers use it to tell top vertices apart.
    pub extrusion: Vec<f64>,
    pub indices: Vec<u32>,
}

impl Solid {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends `other`, rebasing its indices.
    pub fn append(&mut self, other: Solid) {
        let base = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.extrusion.extend(other.extrusion);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }
}

/// Tessellation backend. Implementations must be deterministic and pure.
pub trait GeometryService: Send + Sync {
    fn extrude(&self, outer: &[Vec3], holes: &[Vec<Vec3>], extrusion_height: f64) -> Solid;
    fn merge_solids(&self, solids: Vec<Solid>) -> Solid;
}

/// Ear-clipping extruder.
///
/// Rings are triangulated in the tangent plane at the outer ring's centroid
/// and pushed out along the surface normal, so both geocentric and planar
/// sources produce a closed prism.
#[derive(Debug, Default, Copy, Clone)]
pub struct EarcutExtruder;

impl GeometryService for EarcutExtruder {
    fn extrude(&self, outer: &[Vec3], holes: &[Vec<Vec3>], extrusion_height: f64) -> Solid {
        let Some(origin) = centroid(outer) else {
            return Solid::default();
        };
        if outer.len() < 3 {
            return Solid::default();
        }

        let geocentric = origin.length() > WGS84_B * 0.5;
        let mut n = newell_normal(outer);
        if n == Vec3::ZERO {
            n = ellipsoid_normal(origin);
        }
        // Geocentric solids grow away from the earth centre, planar ones
        // towards +z, whatever the ring winding.
        let flip = if geocentric {
            n.dot(origin) < 0.0
        } else {
            n.z < 0.0
        };
        if flip {
            n = -n;
        }

        let up = if n.z.abs() < 0.99 {
            Vec3::new(0.0, 0.0, 1.0)
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        };
        let east = up.cross(n).normalize();
        let north = n.cross(east);

        let mut base: Vec<Vec3> = Vec::new();
        let mut coords_2d: Vec<f64> = Vec::new();
        let mut hole_indices: Vec<usize> = Vec::new();
        let mut ring_ranges: Vec<(usize, usize)> = Vec::new();

        let rings = std::iter::once(outer).chain(holes.iter().map(Vec::as_slice));
        for (ring_i, ring) in rings.enumerate() {
            if ring.len() < 3 {
                continue;
            }
            let start = base.len();
            if ring_i > 0 {
                hole_indices.push(start);
            }
            for p in ring {
                let v = *p - origin;
                coords_2d.push(v.dot(east));
                coords_2d.push(v.dot(north));
                base.push(*p);
            }
            ring_ranges.push((start, base.len()));
        }

        let triangles = match earcut(&coords_2d, &hole_indices, 2) {
            Ok(ix) => ix,
            Err(e) => {
                warn!(error = ?e, vertices = base.len(), "triangulation failed");
                return Solid::default();
            }
        };
        if triangles.is_empty() {
            return Solid::default();
        }

        let m = base.len();
        let mut solid = Solid::default();
        for p in &base {
            solid.positions.push(*p);
            solid.normals.push(-vertex_up(*p, n, geocentric));
            solid.extrusion.push(0.0);
        }
        for p in &base {
            let up_p = vertex_up(*p, n, geocentric);
            solid.positions.push(*p + up_p.scale(extrusion_height));
            solid.normals.push(up_p);
            solid.extrusion.push(extrusion_height);
        }

        for tri in triangles.chunks_exact(3) {
            let (a, mut b, mut c) = (tri[0], tri[1], tri[2]);
            if signed_area_2d(&coords_2d, a, b, c) < 0.0 {
                std::mem::swap(&mut b, &mut c);
            }
            // Base faces away from the top.
            solid.indices.extend([a as u32, c as u32, b as u32]);
            solid
                .indices
                .extend([(a + m) as u32, (b + m) as u32, (c + m) as u32]);
        }

        // Walls face out of the solid: outer rings counter-clockwise and
        // holes clockwise when seen from the top.
        for (ring_i, (start, end)) in ring_ranges.into_iter().enumerate() {
            let reverse = (ring_area_2d(&coords_2d, start, end) < 0.0) == (ring_i == 0);
            for i in start..end {
                let j = if i + 1 == end { start } else { i + 1 };
                let (a, b) = if reverse { (j, i) } else { (i, j) };
                let (at, bt) = ((a + m) as u32, (b + m) as u32);
                let (a, b) = (a as u32, b as u32);
                solid.indices.extend([a, b, bt, a, bt, at]);
            }
        }

        solid
    }

    fn merge_solids(&self, solids: Vec<Solid>) -> Solid {
        let mut out = Solid::default();
        for solid in solids {
            out.append(solid);
        }
        out
    }
}

fn vertex_up(p: Vec3, plane_normal: Vec3, geocentric: bool) -> Vec3 {
    if geocentric {
        ellipsoid_normal(p)
    } else {
        plane_normal
    }
}

fn newell_normal(ring: &[Vec3]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.normalize()
}

/// Twice the signed area of the ring stored at `start..end`; positive when
/// counter-clockwise.
fn ring_area_2d(coords: &[f64], start: usize, end: usize) -> f64 {
    let mut area = 0.0;
    for i in start..end {
        let j = if i + 1 == end { start } else { i + 1 };
        area += coords[2 * i] * coords[2 * j + 1] - coords[2 * j] * coords[2 * i + 1];
    }
    area
}

fn signed_area_2d(coords: &[f64], a: usize, b: usize, c: usize) -> f64 {
    let (ax, ay) = (coords[2 * a], coords[2 * a + 1]);
    let (bx, by) = (coords[2 * b], coords[2 * b + 1]);
    let (cx, cy) = (coords[2 * c], coords[2 * c + 1]);
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

/// Merged solid of every part of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
    pub id: RegionId,
    pub solid: Solid,
}

/// All region solids of one boundary level; immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGeometry {
    pub level: LevelIndex,
    pub regions: Vec<RegionGeometry>,
}

impl LevelGeometry {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region_ids(&self) -> impl Iterator<Item = &RegionId> + '_ {
        self.regions.iter().map(|r| &r.id)
    }

    pub fn region(&self, id: &RegionId) -> Option<&RegionGeometry> {
        self.regions.iter().find(|r| &r.id == id)
    }
}

pub struct BoundaryGeometryBuilder<'a> {
    service: &'a dyn GeometryService,
    extrusion_height: f64,
}

impl<'a> BoundaryGeometryBuilder<'a> {
    pub fn new(service: &'a dyn GeometryService, extrusion_height: f64) -> Self {
        Self {
            service,
            extrusion_height,
        }
    }

    /// Extrudes and merges every part of `id`; `None` when no part matches.
    pub fn build_region(&self, cleaned: &[CleanRegion], id: &RegionId) -> Option<RegionGeometry> {
        let parts: Vec<&CleanRegion> = cleaned.iter().filter(|r| &r.id == id).collect();
        self.build_parts(id, &parts)
    }

    /// One entry per distinct id, in first-seen order.
    pub fn build_level(&self, level: LevelIndex, cleaned: &[CleanRegion]) -> LevelGeometry {
        let mut order: Vec<&RegionId> = Vec::new();
        let mut parts: HashMap<&RegionId, Vec<&CleanRegion>> = HashMap::new();
        for region in cleaned {
            parts
                .entry(&region.id)
                .or_insert_with(|| {
                    order.push(&region.id);
                    Vec::new()
                })
                .push(region);
        }

        let regions = order
            .into_iter()
            .filter_map(|id| self.build_parts(id, parts.get(id)?))
            .collect();
        LevelGeometry { level, regions }
    }

    fn build_parts(&self, id: &RegionId, parts: &[&CleanRegion]) -> Option<RegionGeometry> {
        if parts.is_empty() {
            return None;
        }
        let solids = parts
            .iter()
            .map(|part| {
                self.service
                    .extrude(&part.vertices, &part.holes, self.extrusion_height)
            })
            .collect();
        Some(RegionGeometry {
            id: id.clone(),
            solid: self.service.merge_solids(solids),
        })
    }
}
