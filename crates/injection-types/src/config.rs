// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{DEFAULT_NORMA_DENSITY, DEFAULT_SEED};
use crate::error::{InjectionError, InjectionResult};
use crate::grid::{Axis, AxisKind, Grid};
use crate::state::{CaptureParams, InjectionLine};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Top-level capture run configuration (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub run_name: String,
    /// Density normalization inside the optical-depth integral (default: 1.0).
    #[serde(default = "default_norma_density")]
    pub norma_density: f64,
    pub mesh: MeshConfig,
    pub count: CountConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    pub z_axis: AxisConfig,
    pub r_axis: AxisConfig,
    /// Ion density per z-slice, one value per z cell.
    pub ni: Vec<f64>,
}

/// Axis partition: either every boundary, or `n` equal cells on `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisConfig {
    Explicit(Vec<f64>),
    Uniform { min: f64, max: f64, n: usize },
}

impl AxisConfig {
    pub fn build(&self, kind: AxisKind) -> InjectionResult<Axis> {
        match self {
            AxisConfig::Explicit(bounds) => Axis::new(kind, bounds.clone()),
            AxisConfig::Uniform { min, max, n } => Axis::uniform(kind, *min, *max, *n),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountConfig {
    pub particles: u64,
    pub sigma: f64,
    /// Injection angle [deg], 0 = along +z, 90 = along -r.
    #[serde(default)]
    pub theta_deg: f64,
    pub position: PositionConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionConfig {
    pub z: f64,
    pub r: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Parallel workers, each with its own random stream (default: 1).
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_norma_density() -> f64 {
    DEFAULT_NORMA_DENSITY
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}
fn default_workers() -> usize {
    1
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            seed: default_seed(),
            workers: default_workers(),
        }
    }
}

impl RunConfig {
    /// Load from JSON file.
    pub fn from_file(path: &str) -> InjectionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> InjectionResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Validated grid from the mesh section.
    pub fn build_grid(&self) -> InjectionResult<Grid> {
        let z = self.mesh.z_axis.build(AxisKind::Z)?;
        let r = self.mesh.r_axis.build(AxisKind::R)?;
        Grid::new(z, r, Array1::from_vec(self.mesh.ni.clone()))
    }

    pub fn injection_line(&self) -> InjectionResult<InjectionLine> {
        InjectionLine::new(
            self.count.position.z,
            self.count.position.r,
            self.count.theta_deg,
        )
    }

    pub fn capture_params(&self) -> InjectionResult<CaptureParams> {
        CaptureParams::new(self.count.sigma, self.norma_density, self.count.particles)
    }

    pub fn sampling(&self) -> InjectionResult<SamplingConfig> {
        if self.sampling.workers == 0 {
            return Err(InjectionError::ConfigError(
                "sampling.workers must be >= 1".to_string(),
            ));
        }
        Ok(self.sampling)
    }
}
