// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Injection Types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Shared vocabulary for beam-injection capture estimates.
//!
//! Grid model over a non-uniform (z, r) mesh, injection-line and capture
//! state, JSON run configuration and the error taxonomy.

pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod state;
