// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Capture Report
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Data handed to external reporters and heat-map renderers.

use crate::capture::AttenuationProfile;
use injection_types::error::{InjectionError, InjectionResult};
use injection_types::grid::Grid;
use injection_types::state::{CaptureParams, CaptureResult, InjectionLine, Traversal};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Run inputs echoed back alongside the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEcho {
    pub nz: usize,
    pub nr: usize,
    pub sigma: f64,
    pub norma_density: f64,
    pub n_particles: u64,
    pub theta_deg: f64,
    pub origin: (f64, f64), // (z, r)
    pub seed: u64,
    pub workers: usize,
}

/// Everything a reporter needs to draw a per-cell heat map and a flyby figure.
///
/// All probabilities are fractions of `n_particles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    #[serde(default)]
    pub run_name: String,
    pub echo: RunEcho,
    pub z_bounds: Vec<f64>,
    pub r_bounds: Vec<f64>,
    pub ni: Vec<f64>,
    pub traversal: Traversal,
    pub optical_depth: f64,
    /// Empirical capture probability per cell, `[nz, nr]`.
    pub capture_fraction: Array2<f64>,
    pub flyby_fraction: f64,
    /// Analytic capture probability per cell for the same traversal.
    pub expected_capture_fraction: Array2<f64>,
    pub expected_flyby_fraction: f64,
}

/// Borrowed inputs of a finished run.
#[derive(Debug, Clone, Copy)]
pub struct RunInputs<'a> {
    pub grid: &'a Grid,
    pub line: &'a InjectionLine,
    pub params: &'a CaptureParams,
    pub seed: u64,
    pub workers: usize,
}

impl CaptureReport {
    pub fn new(
        run_name: &str,
        inputs: RunInputs<'_>,
        traversal: &Traversal,
        profile: &AttenuationProfile,
        result: &CaptureResult,
    ) -> InjectionResult<Self> {
        let grid = inputs.grid;
        if result.n_cap.dim() != (grid.nz(), grid.nr()) {
            return Err(InjectionError::PhysicsViolation(format!(
                "capture result shape {:?} does not match grid ({}, {})",
                result.n_cap.dim(),
                grid.nz(),
                grid.nr()
            )));
        }
        if result.n_particles != inputs.params.n_particles {
            return Err(InjectionError::PhysicsViolation(format!(
                "capture result counted {} particles, run requested {}",
                result.n_particles, inputs.params.n_particles
            )));
        }
        let (expected, expected_flyby) = profile.expected_fractions();

        Ok(CaptureReport {
            run_name: run_name.to_string(),
            echo: RunEcho {
                nz: grid.nz(),
                nr: grid.nr(),
                sigma: inputs.params.sigma,
                norma_density: inputs.params.norma_density,
                n_particles: inputs.params.n_particles,
                theta_deg: inputs.line.theta_deg,
                origin: (inputs.line.z0, inputs.line.r0),
                seed: inputs.seed,
                workers: inputs.workers,
            },
            z_bounds: grid.z().bounds().to_vec(),
            r_bounds: grid.r().bounds().to_vec(),
            ni: grid.ni().to_vec(),
            traversal: traversal.clone(),
            optical_depth: profile.total_optical_depth(),
            capture_fraction: result.capture_fractions(),
            flyby_fraction: result.flyby_fraction(),
            expected_capture_fraction: expected,
            expected_flyby_fraction: expected_flyby,
        })
    }

    /// Sum of all per-cell capture fractions.
    pub fn captured_fraction(&self) -> f64 {
        self.capture_fraction.sum()
    }

    /// Largest |empirical − analytic| over cells and flyby.
    pub fn max_deviation(&self) -> f64 {
        let cells = self
            .capture_fraction
            .iter()
            .zip(self.expected_capture_fraction.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        cells.max((self.flyby_fraction - self.expected_flyby_fraction).abs())
    }

    pub fn to_json_pretty(&self) -> InjectionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &str) -> InjectionResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSimulator;
    use crate::tracer::trace_injection_line;
    use tempfile::NamedTempFile;

    fn finished_run(n: u64) -> CaptureReport {
        let grid = Grid::uniform(3, 2, 0.0, 3.0, 0.0, 1.0, 0.7).unwrap();
        let line = InjectionLine::new(0.5, 0.9, 15.0).unwrap();
        let params = CaptureParams::new(1.2, 1.0, n).unwrap();
        let traversal = trace_injection_line(&grid, &line).unwrap();
        let profile = AttenuationProfile::new(&grid, &traversal, &params).unwrap();
        let sim = CaptureSimulator::new(8).with_workers(2);
        let result = sim.run(&grid, &traversal, &params).unwrap();
        let inputs = RunInputs {
            grid: &grid,
            line: &line,
            params: &params,
            seed: sim.seed(),
            workers: sim.workers(),
        };
        CaptureReport::new("report-test", inputs, &traversal, &profile, &result).unwrap()
    }

    #[test]
    fn test_report_echoes_inputs() {
        let report = finished_run(50_000);
        assert_eq!(report.echo.nz, 3);
        assert_eq!(report.echo.nr, 2);
        assert_eq!(report.echo.origin, (0.5, 0.9));
        assert_eq!(report.echo.workers, 2);
        assert_eq!(report.z_bounds.len(), 4);
        assert_eq!(report.r_bounds.len(), 3);
        assert_eq!(report.ni, vec![0.7, 0.7, 0.7]);
        assert_eq!(report.capture_fraction.dim(), (3, 2));
    }

    #[test]
    fn test_report_fractions_sum_to_one() {
        let report = finished_run(50_000);
        assert!((report.captured_fraction() + report.flyby_fraction - 1.0).abs() < 1e-12);
        assert!(report.max_deviation() < 2e-2);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let report = finished_run(1_000);
        let json = report.to_json_pretty().unwrap();
        let back: CaptureReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_name, "report-test");
        assert_eq!(back.traversal, report.traversal);
        assert_eq!(back.capture_fraction, report.capture_fraction);
    }

    #[test]
    fn test_write_json_round_trip() {
        let report = finished_run(2_000);
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("json");
        report.write_json(path.to_str().unwrap()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let back: CaptureReport = serde_json::from_str(&contents).unwrap();
        assert_eq!(back.run_name, report.run_name);
        assert_eq!(back.echo.n_particles, 2_000);
        assert_eq!(back.z_bounds, report.z_bounds);
        assert_eq!(back.traversal, report.traversal);
        assert_eq!(back.capture_fraction, report.capture_fraction);
        assert_eq!(back.flyby_fraction, report.flyby_fraction);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_to_missing_directory_is_io_error() {
        let report = finished_run(10);
        let err = report
            .write_json("/nonexistent/injection_report/out.json")
            .unwrap_err();
        assert!(matches!(err, InjectionError::Io(_)));
    }

    #[test]
    fn test_report_rejects_mismatched_result() {
        let grid = Grid::uniform(2, 2, 0.0, 2.0, 0.0, 2.0, 1.0).unwrap();
        let line = InjectionLine::new(0.5, 0.5, 0.0).unwrap();
        let params = CaptureParams::new(1.0, 1.0, 10).unwrap();
        let traversal = trace_injection_line(&grid, &line).unwrap();
        let profile = AttenuationProfile::new(&grid, &traversal, &params).unwrap();
        let result = CaptureResult::new(2, 2);
        let inputs = RunInputs {
            grid: &grid,
            line: &line,
            params: &params,
            seed: 0,
            workers: 1,
        };
        assert!(CaptureReport::new("bad", inputs, &traversal, &profile, &result).is_err());
    }
}
