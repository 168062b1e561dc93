// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// |sin θ| or |cos θ| below this selects the axis-aligned tracing branch.
pub const ANGLE_EPS: f64 = 1e-10;

/// Relative tolerance for treating a z- and r-boundary crossing as one vertex.
pub const CORNER_REL_TOL: f64 = 1e-12;

/// Segments shorter than this (relative to the grid extent) are dropped.
pub const MIN_SEGMENT_REL: f64 = 1e-12;

/// Largest accepted injection angle [deg].
pub const THETA_MAX_DEG: f64 = 90.0;

/// Density normalization used when a run does not set one.
pub const DEFAULT_NORMA_DENSITY: f64 = 1.0;

/// Seed used when a run does not set one.
pub const DEFAULT_SEED: u64 = 0;
