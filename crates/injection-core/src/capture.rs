// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Capture Simulator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Monte Carlo capture counting along a traversal.
//!
//! Each particle draws one uniform `γ ∈ [0, 1)` and is captured in the first
//! segment `k` with `P(k−1) ≤ γ < P(k)`, where `P(k) = 1 − exp(−I(k))` and
//! `I(k)` is the optical depth accumulated up to the end of segment `k`.
//! Particles with `γ` beyond the last segment fly by. This is inverse-CDF
//! sampling of the piecewise-exponential attenuation law, unbiased for any
//! mix of segment lengths and densities.

use injection_types::error::{InjectionError, InjectionResult};
use injection_types::grid::Grid;
use injection_types::state::{CaptureParams, CaptureResult, Traversal};
use log::{info, warn};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Cumulative capture probability of every traversed cell.
#[derive(Debug, Clone)]
pub struct AttenuationProfile {
    shape: (usize, usize),
    cells: Vec<(usize, usize)>,
    optical_depth: Vec<f64>,
    cumulative: Vec<f64>,
}

impl AttenuationProfile {
    pub fn new(
        grid: &Grid,
        traversal: &Traversal,
        params: &CaptureParams,
    ) -> InjectionResult<Self> {
        params.validate()?;
        let coeff = params.attenuation_coefficient();

        let mut cells = Vec::with_capacity(traversal.len());
        let mut optical_depth = Vec::with_capacity(traversal.len());
        let mut cumulative = Vec::with_capacity(traversal.len());
        let mut integral = 0.0;

        for (k, seg) in traversal.iter().enumerate() {
            if seg.iz >= grid.nz() || seg.ir >= grid.nr() {
                return Err(InjectionError::PhysicsViolation(format!(
                    "segment[{k}] cell ({}, {}) outside {}x{} grid",
                    seg.iz,
                    seg.ir,
                    grid.nz(),
                    grid.nr()
                )));
            }
            if !seg.length.is_finite() || seg.length <= 0.0 {
                return Err(InjectionError::PhysicsViolation(format!(
                    "segment[{k}] length must be finite and > 0, got {}",
                    seg.length
                )));
            }
            integral += seg.length * grid.density(seg.iz) * coeff;
            cells.push((seg.iz, seg.ir));
            optical_depth.push(integral);
            cumulative.push(1.0 - (-integral).exp());
        }

        Ok(AttenuationProfile {
            shape: (grid.nz(), grid.nr()),
            cells,
            optical_depth,
            cumulative,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Grid shape `(nz, nr)` the profile was built for.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Running optical depth at the end of each segment.
    pub fn optical_depth(&self) -> &[f64] {
        &self.optical_depth
    }

    /// Cumulative capture probability at the end of each segment.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Optical depth of the whole path.
    pub fn total_optical_depth(&self) -> f64 {
        self.optical_depth.last().copied().unwrap_or(0.0)
    }

    /// True when no particle can be captured along the path.
    pub fn is_transparent(&self) -> bool {
        self.total_optical_depth() == 0.0
    }

    pub fn flyby_probability(&self) -> f64 {
        (-self.total_optical_depth()).exp()
    }

    /// Cell capturing a particle with uniform draw `gamma`, or `None` for a flyby.
    pub fn capture_cell(&self, gamma: f64) -> Option<(usize, usize)> {
        let k = self.cumulative.partition_point(|&p| p <= gamma);
        self.cells.get(k).copied()
    }

    /// Run one particle trial.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, usize)> {
        let gamma: f64 = rng.gen();
        self.capture_cell(gamma)
    }

    /// Analytic per-cell capture probability `[nz, nr]` and flyby probability.
    pub fn expected_fractions(&self) -> (Array2<f64>, f64) {
        let mut mass = Array2::zeros(self.shape);
        let mut previous = 0.0;
        for (&(iz, ir), &p) in self.cells.iter().zip(&self.cumulative) {
            mass[[iz, ir]] += p - previous;
            previous = p;
        }
        (mass, self.flyby_probability())
    }
}

/// Sequential reference run: `n_particles` independent trials drawn from `rng`.
pub fn simulate_capture<R: Rng + ?Sized>(
    profile: &AttenuationProfile,
    n_particles: u64,
    rng: &mut R,
    result: &mut CaptureResult,
) {
    for _ in 0..n_particles {
        match profile.sample(rng) {
            Some((iz, ir)) => result.record_capture(iz, ir),
            None => result.record_flyby(),
        }
    }
}

/// Split `n_particles` into `workers` shares differing by at most one.
pub fn partition_particles(n_particles: u64, workers: usize) -> Vec<u64> {
    let w = workers.max(1) as u64;
    let base = n_particles / w;
    let extra = n_particles % w;
    (0..w).map(|k| base + u64::from(k < extra)).collect()
}

/// Seeded capture counter.
///
/// Worker `k` draws from ChaCha stream `k` of the configured seed and counts
/// into its own [`CaptureResult`]; the partial results are summed once at the
/// end. A fixed `(seed, workers)` pair reproduces the same counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSimulator {
    seed: u64,
    workers: usize,
}

impl CaptureSimulator {
    pub fn new(seed: u64) -> Self {
        CaptureSimulator { seed, workers: 1 }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Independent random stream of worker `worker`.
    pub fn worker_rng(&self, worker: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(worker as u64);
        rng
    }

    /// Count captures of `params.n_particles` particles along `traversal`.
    pub fn run(
        &self,
        grid: &Grid,
        traversal: &Traversal,
        params: &CaptureParams,
    ) -> InjectionResult<CaptureResult> {
        let profile = AttenuationProfile::new(grid, traversal, params)?;
        let mut result = CaptureResult::new(grid.nz(), grid.nr());
        self.run_into(&profile, params.n_particles, &mut result)?;
        Ok(result)
    }

    /// Reset `result` and fill it with a fresh run over `profile`.
    pub fn run_into(
        &self,
        profile: &AttenuationProfile,
        n_particles: u64,
        result: &mut CaptureResult,
    ) -> InjectionResult<()> {
        if n_particles == 0 {
            return Err(InjectionError::PhysicsViolation(
                "n_particles must be >= 1".to_string(),
            ));
        }
        if result.n_cap.dim() != profile.shape() {
            return Err(InjectionError::PhysicsViolation(format!(
                "capture result shape {:?} does not match profile grid {:?}",
                result.n_cap.dim(),
                profile.shape()
            )));
        }
        result.reset();
        if profile.is_transparent() {
            warn!("traversal has zero optical depth: every particle will fly by");
        }
        info!(
            "capture run: {} particles over {} cells, {} worker(s), seed {}",
            n_particles,
            profile.len(),
            self.workers,
            self.seed
        );

        if self.workers == 1 {
            let mut rng = self.worker_rng(0);
            simulate_capture(profile, n_particles, &mut rng, result);
        } else {
            let (nz, nr) = profile.shape();
            let partials: Vec<CaptureResult> = partition_particles(n_particles, self.workers)
                .into_par_iter()
                .enumerate()
                .map(|(worker, share)| {
                    let mut rng = self.worker_rng(worker);
                    let mut local = CaptureResult::new(nz, nr);
                    simulate_capture(profile, share, &mut rng, &mut local);
                    local
                })
                .collect();
            for partial in &partials {
                result.merge(partial)?;
            }
        }

        info!(
            "capture run done: captured {}, flyby {} ({:.4}%)",
            result.total_captured(),
            result.n_flyby,
            100.0 * result.flyby_fraction()
        );
        Ok(())
    }
}
