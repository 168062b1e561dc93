// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Injection Line Tracer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Exact cell decomposition of a straight injection line.
//!
//! The line `(z0 + t·cosθ, r0 − t·sinθ)` is clipped to the grid's bounding
//! rectangle and split into the ordered cells it crosses, each with the exact
//! path length spent inside. Axis-aligned lines take a closed-form branch;
//! oblique lines are walked cell by cell from the origin in both directions
//! and the two halves are joined at the origin cell.

use injection_types::constants::{ANGLE_EPS, CORNER_REL_TOL, MIN_SEGMENT_REL};
use injection_types::error::{InjectionError, InjectionResult};
use injection_types::grid::{AxisKind, Grid};
use injection_types::state::{InjectionLine, Segment, Traversal};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Towards the entry side: decreasing z, increasing r.
    Backward,
    /// Towards the exit side: increasing z, decreasing r.
    Forward,
}

/// Parametric injection line with a unit direction vector.
#[derive(Debug, Clone, Copy)]
struct Ray {
    z0: f64,
    r0: f64,
    cos: f64,
    sin: f64,
}

impl Ray {
    /// Distance along the ray at which it reaches `z`.
    fn t_at_z(&self, z: f64) -> f64 {
        (z - self.z0) / self.cos
    }

    /// Distance along the ray at which it reaches `r`.
    fn t_at_r(&self, r: f64) -> f64 {
        (self.r0 - r) / self.sin
    }
}

/// Decompose `line` into the ordered `(iz, ir, length)` cells it crosses.
///
/// Segments run from the line's entry into the grid rectangle to its exit,
/// lengths are strictly positive, no cell repeats, and the lengths add up to
/// [`chord_length`].
///
/// # Errors
/// - [`InjectionError::OriginOutOfBounds`] if the origin is outside the grid
///   on either axis.
/// - [`InjectionError::NoIntersection`] if the line only touches the grid at
///   a point.
pub fn trace_injection_line(grid: &Grid, line: &InjectionLine) -> InjectionResult<Traversal> {
    let (iz0, ir0) = locate_origin(grid, line)?;
    let (cos, sin) = line.direction();

    let segments = if sin.abs() < ANGLE_EPS {
        along_z(grid, ir0)
    } else if cos.abs() < ANGLE_EPS {
        along_r(grid, iz0)
    } else {
        let ray = Ray {
            z0: line.z0,
            r0: line.r0,
            cos,
            sin,
        };
        let backward = march(grid, &ray, (iz0, ir0), Direction::Backward);
        let forward = march(grid, &ray, (iz0, ir0), Direction::Forward);
        merge_halves(backward, forward, MIN_SEGMENT_REL * grid.extent())
    };

    if segments.is_empty() {
        return Err(InjectionError::NoIntersection {
            z: line.z0,
            r: line.r0,
            theta_deg: line.theta_deg,
        });
    }

    let traversal = Traversal::new(segments);
    debug!(
        "traced injection line from (z={}, r={}) at {} deg: {} cells, path length {:.6e}",
        line.z0,
        line.r0,
        line.theta_deg,
        traversal.len(),
        traversal.total_length()
    );
    Ok(traversal)
}

/// Euclidean length of the part of `line` inside the grid bounding rectangle.
pub fn chord_length(grid: &Grid, line: &InjectionLine) -> f64 {
    let (cos, sin) = line.direction();
    let ((z_min, z_max), (r_min, r_max)) = grid.bounding_box();

    let mut t_in = f64::NEG_INFINITY;
    let mut t_out = f64::INFINITY;

    if cos.abs() >= ANGLE_EPS {
        let a = (z_min - line.z0) / cos;
        let b = (z_max - line.z0) / cos;
        t_in = t_in.max(a.min(b));
        t_out = t_out.min(a.max(b));
    } else if line.z0 < z_min || line.z0 > z_max {
        return 0.0;
    }

    if sin.abs() >= ANGLE_EPS {
        let a = (line.r0 - r_max) / sin;
        let b = (line.r0 - r_min) / sin;
        t_in = t_in.max(a.min(b));
        t_out = t_out.min(a.max(b));
    } else if line.r0 < r_min || line.r0 > r_max {
        return 0.0;
    }

    (t_out - t_in).max(0.0)
}

/// Cell containing the line origin, with the failing axis on error.
pub fn locate_origin(grid: &Grid, line: &InjectionLine) -> InjectionResult<(usize, usize)> {
    let origin_error = |axis: AxisKind| InjectionError::OriginOutOfBounds {
        axis,
        z: line.z0,
        r: line.r0,
    };
    let iz = grid
        .locate_z(line.z0)
        .map_err(|_| origin_error(AxisKind::Z))?;
    let ir = grid
        .locate_r(line.r0)
        .map_err(|_| origin_error(AxisKind::R))?;
    Ok((iz, ir))
}

/// θ = 0: every z cell of radial column `ir`.
fn along_z(grid: &Grid, ir: usize) -> Vec<Segment> {
    (0..grid.nz())
        .map(|iz| Segment {
            iz,
            ir,
            length: grid.z().width(iz),
        })
        .collect()
}

/// θ = 90: every r cell of axial slice `iz`, outermost first.
fn along_r(grid: &Grid, iz: usize) -> Vec<Segment> {
    (0..grid.nr())
        .rev()
        .map(|ir| Segment {
            iz,
            ir,
            length: grid.r().width(ir),
        })
        .collect()
}

/// Walk from the origin cell to the grid edge in one direction.
///
/// The first entry is the origin cell with the part of its length on this
/// side of the origin (possibly zero). Lengths are differences of successive
/// boundary distances, so they telescope to the distance from the origin to
/// the edge.
fn march(grid: &Grid, ray: &Ray, start: (usize, usize), direction: Direction) -> Vec<Segment> {
    let nz = grid.nz() as isize;
    let nr = grid.nr() as isize;
    let extent = grid.extent();
    let step: isize = match direction {
        Direction::Forward => 1,
        Direction::Backward => -1,
    };

    let mut iz = start.0 as isize;
    let mut ir = start.1 as isize;
    let mut t = 0.0_f64;
    let mut out = Vec::new();

    while (0..nz).contains(&iz) && (0..nr).contains(&ir) {
        let (cz, cr) = (iz as usize, ir as usize);
        let (t_z, t_r) = match direction {
            Direction::Forward => (
                ray.t_at_z(grid.z().bound(cz + 1)),
                ray.t_at_r(grid.r().bound(cr)),
            ),
            Direction::Backward => (
                ray.t_at_z(grid.z().bound(cz)),
                ray.t_at_r(grid.r().bound(cr + 1)),
            ),
        };
        let t_next = match direction {
            Direction::Forward => t_z.min(t_r),
            Direction::Backward => t_z.max(t_r),
        };

        out.push(Segment {
            iz: cz,
            ir: cr,
            length: (t_next - t).abs(),
        });

        // Both tests may pass at a grid vertex: the ray then moves diagonally
        // and the cell touched only at that vertex is skipped.
        let tol = CORNER_REL_TOL * t_z.abs().max(t_r.abs()).max(extent);
        if (t_z - t_next).abs() <= tol {
            iz += step;
        }
        if (t_r - t_next).abs() <= tol {
            ir -= step;
        }
        t = t_next;
    }
    out
}

/// Join the two half-walks at the origin cell, entry side first.
fn merge_halves(backward: Vec<Segment>, forward: Vec<Segment>, min_length: f64) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(backward.len() + forward.len());
    let mut back = backward.into_iter();
    let mut fwd = forward.into_iter();
    let origin_back = back.next();
    let origin_fwd = fwd.next();

    segments.extend(back.rev());
    match (origin_back, origin_fwd) {
        (Some(b), Some(f)) => segments.push(Segment {
            length: b.length + f.length,
            ..b
        }),
        (Some(s), None) | (None, Some(s)) => segments.push(s),
        (None, None) => {}
    }
    segments.extend(fwd);

    segments.retain(|s| s.length > min_length);
    segments
}
