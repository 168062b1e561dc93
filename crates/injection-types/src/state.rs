// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::THETA_MAX_DEG;
use crate::error::{InjectionError, InjectionResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Straight injection path through the (z, r) plane.
///
/// Points along the line are `(z0 + t·cosθ, r0 − t·sinθ)` with `t` the
/// Euclidean distance from the origin, so the beam moves towards larger z
/// and smaller r.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InjectionLine {
    pub z0: f64,
    pub r0: f64,
    pub theta_deg: f64,
}

impl InjectionLine {
    pub fn new(z0: f64, r0: f64, theta_deg: f64) -> InjectionResult<Self> {
        if !z0.is_finite() || !r0.is_finite() {
            return Err(InjectionError::ConfigError(format!(
                "injection origin must be finite, got z={z0}, r={r0}"
            )));
        }
        if !theta_deg.is_finite() || !(0.0..=THETA_MAX_DEG).contains(&theta_deg) {
            return Err(InjectionError::ConfigError(format!(
                "injection angle theta must be in [0, {THETA_MAX_DEG}] deg, got {theta_deg}"
            )));
        }
        Ok(InjectionLine { z0, r0, theta_deg })
    }

    pub fn theta_rad(&self) -> f64 {
        self.theta_deg.to_radians()
    }

    /// (cos θ, sin θ).
    pub fn direction(&self) -> (f64, f64) {
        let theta = self.theta_rad();
        (theta.cos(), theta.sin())
    }
}

/// One traversed cell and the path length spent inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub iz: usize,
    pub ir: usize,
    pub length: f64,
}

/// Ordered cell decomposition of an injection line, entry to exit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Traversal {
    segments: Vec<Segment>,
}

impl Traversal {
    pub fn new(segments: Vec<Segment>) -> Self {
        Traversal { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn lengths(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.length).collect()
    }

    pub fn cells(&self) -> Vec<(usize, usize)> {
        self.segments.iter().map(|s| (s.iz, s.ir)).collect()
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// True if any (iz, ir) cell is listed twice.
    pub fn has_duplicate_cells(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.segments.len());
        !self.segments.iter().all(|s| seen.insert((s.iz, s.ir)))
    }

    /// True if every successive pair of cells shares an edge or a vertex.
    pub fn is_contiguous(&self) -> bool {
        self.segments.windows(2).all(|w| {
            let dz = w[0].iz.abs_diff(w[1].iz);
            let dr = w[0].ir.abs_diff(w[1].ir);
            dz <= 1 && dr <= 1 && dz + dr >= 1
        })
    }
}

impl<'a> IntoIterator for &'a Traversal {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Scalar inputs of the capture estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureParams {
    /// Capture cross-section.
    pub sigma: f64,
    /// Ion density normalization applied inside the optical-depth integral.
    pub norma_density: f64,
    pub n_particles: u64,
}

impl CaptureParams {
    pub fn new(sigma: f64, norma_density: f64, n_particles: u64) -> InjectionResult<Self> {
        let params = CaptureParams {
            sigma,
            norma_density,
            n_particles,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> InjectionResult<()> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(InjectionError::PhysicsViolation(format!(
                "sigma must be finite and >= 0, got {}",
                self.sigma
            )));
        }
        if !self.norma_density.is_finite() || self.norma_density <= 0.0 {
            return Err(InjectionError::PhysicsViolation(format!(
                "norma_density must be finite and > 0, got {}",
                self.norma_density
            )));
        }
        if self.n_particles == 0 {
            return Err(InjectionError::PhysicsViolation(
                "n_particles must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Optical depth per unit (length x density).
    pub fn attenuation_coefficient(&self) -> f64 {
        self.sigma * self.norma_density
    }
}

/// Per-cell capture counts and flyby count of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub n_cap: Array2<u64>, // [nz, nr]; flat index iz*nr + ir
    pub n_flyby: u64,
    pub n_particles: u64,
}

impl CaptureResult {
    pub fn new(nz: usize, nr: usize) -> Self {
        CaptureResult {
            n_cap: Array2::zeros((nz, nr)),
            n_flyby: 0,
            n_particles: 0,
        }
    }

    pub fn reset(&mut self) {
        self.n_cap.fill(0);
        self.n_flyby = 0;
        self.n_particles = 0;
    }

    pub fn record_capture(&mut self, iz: usize, ir: usize) {
        self.n_cap[[iz, ir]] += 1;
        self.n_particles += 1;
    }

    pub fn record_flyby(&mut self) {
        self.n_flyby += 1;
        self.n_particles += 1;
    }

    /// Add another run's counts (same grid shape) into this one.
    pub fn merge(&mut self, other: &CaptureResult) -> InjectionResult<()> {
        if self.n_cap.dim() != other.n_cap.dim() {
            return Err(InjectionError::PhysicsViolation(format!(
                "capture result shape mismatch: {:?} vs {:?}",
                self.n_cap.dim(),
                other.n_cap.dim()
            )));
        }
        self.n_cap += &other.n_cap;
        self.n_flyby += other.n_flyby;
        self.n_particles += other.n_particles;
        Ok(())
    }

    pub fn total_captured(&self) -> u64 {
        self.n_cap.sum()
    }

    /// Counts in row-major order, `iz*nr + ir`.
    pub fn n_cap_flat(&self) -> Vec<u64> {
        self.n_cap.iter().copied().collect()
    }

    pub fn capture_fraction(&self, iz: usize, ir: usize) -> f64 {
        if self.n_particles == 0 {
            return 0.0;
        }
        self.n_cap[[iz, ir]] as f64 / self.n_particles as f64
    }

    pub fn capture_fractions(&self) -> Array2<f64> {
        if self.n_particles == 0 {
            return Array2::zeros(self.n_cap.dim());
        }
        let n = self.n_particles as f64;
        self.n_cap.mapv(|c| c as f64 / n)
    }

    pub fn flyby_fraction(&self) -> f64 {
        if self.n_particles == 0 {
            return 0.0;
        }
        self.n_flyby as f64 / self.n_particles as f64
    }
}
