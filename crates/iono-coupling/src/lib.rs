// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Coupling Crate
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Two-way coupling between the ionospheric mesh and the external 3-D
//! simulation grid.
//!
//! Field lines traced from mesh elements ([`dipole`]) thread cells of
//! the structured grid ([`fsgrid`]); the cached (cell, weight) lists
//! ([`coupling`]) carry field-aligned currents down onto the mesh and
//! boundary potentials back up. [`boundary`] owns the per-timestep
//! orchestration.

pub mod boundary;
pub mod coupling;
pub mod dipole;
pub mod fsgrid;
