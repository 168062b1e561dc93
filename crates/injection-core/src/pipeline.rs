// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Capture Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Configuration → traversal → capture counts → report.
//!
//! Geometry is built and checked before any particle is sampled; a failing
//! run produces an error and no partial counts.

use crate::capture::{AttenuationProfile, CaptureSimulator};
use crate::report::{CaptureReport, RunInputs};
use crate::tracer::{chord_length, trace_injection_line};
use injection_types::config::RunConfig;
use injection_types::error::InjectionResult;
use injection_types::state::CaptureResult;
use log::{debug, info};

/// Execute a full capture estimate described by `config`.
pub fn run(config: &RunConfig) -> InjectionResult<CaptureReport> {
    let grid = config.build_grid()?;
    let line = config.injection_line()?;
    let params = config.capture_params()?;
    let sampling = config.sampling()?;

    info!(
        "run '{}': {}x{} grid, origin (z={}, r={}), theta={} deg",
        config.run_name,
        grid.nz(),
        grid.nr(),
        line.z0,
        line.r0,
        line.theta_deg
    );

    let traversal = trace_injection_line(&grid, &line)?;
    debug!(
        "chord length {:.6e}, traversal length {:.6e}",
        chord_length(&grid, &line),
        traversal.total_length()
    );

    let profile = AttenuationProfile::new(&grid, &traversal, &params)?;
    let simulator = CaptureSimulator::new(sampling.seed).with_workers(sampling.workers);
    let mut result = CaptureResult::new(grid.nz(), grid.nr());
    simulator.run_into(&profile, params.n_particles, &mut result)?;

    let inputs = RunInputs {
        grid: &grid,
        line: &line,
        params: &params,
        seed: simulator.seed(),
        workers: simulator.workers(),
    };
    CaptureReport::new(&config.run_name, inputs, &traversal, &profile, &result)
}

/// Load a JSON run file and execute it.
pub fn run_from_file(path: &str) -> InjectionResult<CaptureReport> {
    let config = RunConfig::from_file(path)?;
    run(&config)
}
