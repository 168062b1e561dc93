// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Injection Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Beam-injection capture estimates on non-uniform (z, r) grids.
//!
//! Injection-line tracing, Monte Carlo capture counting and the report
//! handed to external renderers.

pub mod capture;
pub mod pipeline;
pub mod report;
pub mod tracer;
