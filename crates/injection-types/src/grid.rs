// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Non-uniform axisymmetric (z, r) grid with per-slice ion density.
//!
//! Cells are half-open: cell `i` of an axis covers `[bounds[i], bounds[i+1])`,
//! so a coordinate sitting on a shared boundary belongs to the upper cell.

use crate::error::{InjectionError, InjectionResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which grid axis a value or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Z,
    R,
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKind::Z => write!(f, "z"),
            AxisKind::R => write!(f, "r"),
        }
    }
}

/// Strictly increasing partition of one coordinate axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    kind: AxisKind,
    bounds: Array1<f64>, // [n + 1] cell boundaries
}

impl Axis {
    /// Axis from an explicit boundary list of `n + 1` values, `n >= 1`.
    pub fn new(kind: AxisKind, bounds: Vec<f64>) -> InjectionResult<Self> {
        if bounds.len() < 2 {
            return Err(InjectionError::InvalidAxis {
                axis: kind,
                message: format!(
                    "at least 2 boundaries (1 cell) required, got {}",
                    bounds.len()
                ),
            });
        }
        if let Some(idx) = bounds.iter().position(|b| !b.is_finite()) {
            return Err(InjectionError::InvalidAxis {
                axis: kind,
                message: format!("boundary[{idx}] must be finite, got {}", bounds[idx]),
            });
        }
        for i in 1..bounds.len() {
            if bounds[i] <= bounds[i - 1] {
                return Err(InjectionError::InvalidAxis {
                    axis: kind,
                    message: format!(
                        "boundaries must be strictly increasing: boundary[{}]={} <= boundary[{}]={}",
                        i,
                        bounds[i],
                        i - 1,
                        bounds[i - 1]
                    ),
                });
            }
        }
        Ok(Axis {
            kind,
            bounds: Array1::from_vec(bounds),
        })
    }

    /// Axis of `n` equal cells spanning `[min, max]`.
    pub fn uniform(kind: AxisKind, min: f64, max: f64, n: usize) -> InjectionResult<Self> {
        if n == 0 {
            return Err(InjectionError::InvalidAxis {
                axis: kind,
                message: "cell count must be >= 1".to_string(),
            });
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(InjectionError::InvalidAxis {
                axis: kind,
                message: format!("min and max must be finite, got min={min}, max={max}"),
            });
        }
        if max <= min {
            return Err(InjectionError::InvalidAxis {
                axis: kind,
                message: format!("max must exceed min, got min={min}, max={max}"),
            });
        }
        let step = (max - min) / n as f64;
        let bounds = (0..=n)
            .map(|i| if i == n { max } else { min + step * i as f64 })
            .collect();
        Self::new(kind, bounds)
    }

    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Always false: construction rejects empty axes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bounds(&self) -> &Array1<f64> {
        &self.bounds
    }

    /// Boundary `i`, `0 <= i <= len()`.
    pub fn bound(&self, i: usize) -> f64 {
        self.bounds[i]
    }

    pub fn min(&self) -> f64 {
        self.bounds[0]
    }

    pub fn max(&self) -> f64 {
        self.bounds[self.len()]
    }

    pub fn span(&self) -> f64 {
        self.max() - self.min()
    }

    /// Width of cell `i`.
    pub fn width(&self, i: usize) -> f64 {
        self.bounds[i + 1] - self.bounds[i]
    }

    pub fn widths(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.width(i)).collect()
    }

    /// Index of the cell whose half-open interval contains `x`.
    pub fn locate(&self, x: f64) -> InjectionResult<usize> {
        if !x.is_finite() || x < self.min() || x >= self.max() {
            return Err(InjectionError::OutOfRange {
                axis: self.kind,
                value: x,
                min: self.min(),
                max: self.max(),
            });
        }
        // bounds[lo] <= x < bounds[hi]
        let (mut lo, mut hi) = (0, self.len());
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.bounds[mid] <= x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }
}

/// (z, r) grid with radially uniform ion density per z-slice.
///
/// Only constructible through [`Grid::new`] and immutable afterwards, so
/// `ni.len() == nz` and every density is finite and non-negative.
#[derive(Debug, Clone)]
pub struct Grid {
    z: Axis,
    r: Axis,
    ni: Array1<f64>, // ion density [nz]
}

impl Grid {
    pub fn new(z: Axis, r: Axis, ni: Array1<f64>) -> InjectionResult<Self> {
        if z.kind() != AxisKind::Z || r.kind() != AxisKind::R {
            return Err(InjectionError::ConfigError(format!(
                "grid axes must be (z, r), got ({}, {})",
                z.kind(),
                r.kind()
            )));
        }
        if ni.len() != z.len() {
            return Err(InjectionError::ConfigError(format!(
                "ion density length mismatch: ni_len={}, nz={}",
                ni.len(),
                z.len()
            )));
        }
        for (iz, &n) in ni.iter().enumerate() {
            if !n.is_finite() || n < 0.0 {
                return Err(InjectionError::PhysicsViolation(format!(
                    "ni[{iz}] must be finite and >= 0, got {n}"
                )));
            }
        }
        Ok(Grid { z, r, ni })
    }

    /// Uniform `nz x nr` grid with constant density, handy for tests and benches.
    pub fn uniform(
        nz: usize,
        nr: usize,
        z_min: f64,
        z_max: f64,
        r_min: f64,
        r_max: f64,
        ni: f64,
    ) -> InjectionResult<Self> {
        let z = Axis::uniform(AxisKind::Z, z_min, z_max, nz)?;
        let r = Axis::uniform(AxisKind::R, r_min, r_max, nr)?;
        Self::new(z, r, Array1::from_elem(nz, ni))
    }

    pub fn z(&self) -> &Axis {
        &self.z
    }

    pub fn r(&self) -> &Axis {
        &self.r
    }

    /// Ion density per z-slice, `[nz]`.
    pub fn ni(&self) -> &Array1<f64> {
        &self.ni
    }

    pub fn nz(&self) -> usize {
        self.z.len()
    }

    pub fn nr(&self) -> usize {
        self.r.len()
    }

    pub fn axis(&self, kind: AxisKind) -> &Axis {
        match kind {
            AxisKind::Z => &self.z,
            AxisKind::R => &self.r,
        }
    }

    pub fn locate_z(&self, z: f64) -> InjectionResult<usize> {
        self.z.locate(z)
    }

    pub fn locate_r(&self, r: f64) -> InjectionResult<usize> {
        self.r.locate(r)
    }

    /// Cell `(iz, ir)` containing `(z, r)`.
    pub fn locate(&self, z: f64, r: f64) -> InjectionResult<(usize, usize)> {
        Ok((self.locate_z(z)?, self.locate_r(r)?))
    }

    /// Ion density of z-slice `iz`.
    pub fn density(&self, iz: usize) -> f64 {
        self.ni[iz]
    }

    /// ((z_min, z_max), (r_min, r_max)).
    pub fn bounding_box(&self) -> ((f64, f64), (f64, f64)) {
        ((self.z.min(), self.z.max()), (self.r.min(), self.r.max()))
    }

    /// Largest absolute coordinate or span, used to scale geometric tolerances.
    pub fn extent(&self) -> f64 {
        [
            self.z.min().abs(),
            self.z.max().abs(),
            self.r.min().abs(),
            self.r.max().abs(),
            self.z.span(),
            self.r.span(),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Grid {
        let z = Axis::new(AxisKind::Z, vec![0.0, 1.0, 2.0]).unwrap();
        let r = Axis::new(AxisKind::R, vec![0.0, 1.0, 2.0]).unwrap();
        Grid::new(z, r, Array1::from_vec(vec![1.0, 1.0])).unwrap()
    }

    #[test]
    fn test_explicit_axis_accessors() {
        let axis = Axis::new(AxisKind::Z, vec![-1.0, 0.0, 0.5, 3.0]).unwrap();
        assert_eq!(axis.len(), 3);
        assert!(!axis.is_empty());
        assert_eq!(axis.min(), -1.0);
        assert_eq!(axis.max(), 3.0);
        assert!((axis.span() - 4.0).abs() < 1e-15);
        assert_eq!(axis.widths(), vec![1.0, 0.5, 2.5]);
    }

    #[test]
    fn test_explicit_axis_rejects_non_increasing() {
        let err = Axis::new(AxisKind::R, vec![0.0, 1.0, 1.0]).unwrap_err();
        match err {
            InjectionError::InvalidAxis { axis, .. } => assert_eq!(axis, AxisKind::R),
            other => panic!("Unexpected error: {other:?}"),
        }
        assert!(Axis::new(AxisKind::R, vec![2.0, 1.0]).is_err());
    }

    #[test]
    fn test_explicit_axis_rejects_single_bound_and_nan() {
        assert!(Axis::new(AxisKind::Z, vec![1.0]).is_err());
        assert!(Axis::new(AxisKind::Z, vec![]).is_err());
        assert!(Axis::new(AxisKind::Z, vec![0.0, f64::NAN, 2.0]).is_err());
    }

    #[test]
    fn test_uniform_axis_expansion() {
        let axis = Axis::uniform(AxisKind::Z, 1.0, 3.0, 4).unwrap();
        assert_eq!(axis.len(), 4);
        assert_eq!(axis.bounds().len(), 5);
        assert_eq!(axis.bound(0), 1.0);
        assert_eq!(axis.bound(4), 3.0);
        for w in axis.widths() {
            assert!((w - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uniform_axis_pins_last_bound() {
        let axis = Axis::uniform(AxisKind::R, 0.1, 0.7, 3).unwrap();
        assert_eq!(axis.max(), 0.7);
    }

    #[test]
    fn test_uniform_axis_rejects_bad_input() {
        assert!(Axis::uniform(AxisKind::Z, 0.0, 1.0, 0).is_err());
        assert!(Axis::uniform(AxisKind::Z, 1.0, 1.0, 2).is_err());
        assert!(Axis::uniform(AxisKind::Z, 2.0, 1.0, 2).is_err());
        assert!(Axis::uniform(AxisKind::Z, 0.0, f64::INFINITY, 2).is_err());
    }

    #[test]
    fn test_locate_half_open() {
        let axis = Axis::new(AxisKind::Z, vec![0.0, 1.0, 2.5, 4.0]).unwrap();
        assert_eq!(axis.locate(0.0).unwrap(), 0);
        assert_eq!(axis.locate(0.999).unwrap(), 0);
        assert_eq!(axis.locate(1.0).unwrap(), 1);
        assert_eq!(axis.locate(2.5).unwrap(), 2);
        assert_eq!(axis.locate(3.999).unwrap(), 2);

        let single = Axis::new(AxisKind::R, vec![-1.0, 1.0]).unwrap();
        assert_eq!(single.locate(-1.0).unwrap(), 0);
        assert_eq!(single.locate(0.999).unwrap(), 0);
    }

    #[test]
    fn test_locate_out_of_range() {
        let axis = Axis::new(AxisKind::R, vec![0.0, 1.0, 2.0]).unwrap();
        for x in [-0.1, 2.0, 5.0, f64::NAN] {
            match axis.locate(x).unwrap_err() {
                InjectionError::OutOfRange { axis, min, max, .. } => {
                    assert_eq!(axis, AxisKind::R);
                    assert_eq!(min, 0.0);
                    assert_eq!(max, 2.0);
                }
                other => panic!("Unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_grid_locate() {
        let grid = two_by_two();
        assert_eq!(grid.nz(), 2);
        assert_eq!(grid.nr(), 2);
        assert_eq!(grid.locate(0.5, 1.5).unwrap(), (0, 1));
        assert_eq!(grid.locate(1.0, 1.0).unwrap(), (1, 1));
        assert!(grid.locate(2.0, 0.5).is_err());
        assert_eq!(grid.bounding_box(), ((0.0, 2.0), (0.0, 2.0)));
    }

    #[test]
    fn test_grid_rejects_density_mismatch() {
        let z = Axis::new(AxisKind::Z, vec![0.0, 1.0, 2.0]).unwrap();
        let r = Axis::new(AxisKind::R, vec![0.0, 1.0]).unwrap();
        let err = Grid::new(z, r, Array1::from_vec(vec![1.0])).unwrap_err();
        assert!(matches!(err, InjectionError::ConfigError(_)));
    }

    #[test]
    fn test_grid_rejects_negative_density() {
        let z = Axis::new(AxisKind::Z, vec![0.0, 1.0]).unwrap();
        let r = Axis::new(AxisKind::R, vec![0.0, 1.0]).unwrap();
        let err = Grid::new(z, r, Array1::from_vec(vec![-1.0])).unwrap_err();
        assert!(matches!(err, InjectionError::PhysicsViolation(_)));
    }

    #[test]
    fn test_grid_bad_density_only_surfaces_as_error() {
        let axes = || {
            (
                Axis::new(AxisKind::Z, vec![0.0, 1.0, 2.0]).unwrap(),
                Axis::new(AxisKind::R, vec![0.0, 1.0, 2.0]).unwrap(),
            )
        };
        for ni in [
            vec![1.0],
            vec![1.0, 1.0, 1.0],
            vec![-5.0, 1.0],
            vec![1.0, f64::NAN],
            vec![f64::INFINITY, 1.0],
        ] {
            let (z, r) = axes();
            assert!(Grid::new(z, r, Array1::from_vec(ni.clone())).is_err(), "accepted {ni:?}");
        }

        let (z, r) = axes();
        let grid = Grid::new(z, r, Array1::from_vec(vec![0.0, 2.5])).unwrap();
        assert_eq!(grid.ni().to_vec(), vec![0.0, 2.5]);
        assert_eq!(grid.density(1), 2.5);
        assert_eq!(grid.z().kind(), AxisKind::Z);
        assert_eq!(grid.r().kind(), AxisKind::R);
    }

    #[test]
    fn test_grid_rejects_swapped_axes() {
        let z = Axis::new(AxisKind::Z, vec![0.0, 1.0]).unwrap();
        let r = Axis::new(AxisKind::R, vec![0.0, 1.0]).unwrap();
        assert!(Grid::new(r, z, Array1::from_vec(vec![1.0])).is_err());
    }

    #[test]
    fn test_grid_extent() {
        let grid = Grid::uniform(4, 4, -3.0, 1.0, 0.5, 1.5, 0.0).unwrap();
        assert!((grid.extent() - 4.0).abs() < 1e-15);
    }
}
