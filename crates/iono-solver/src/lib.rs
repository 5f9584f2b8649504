// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Solver Crate
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Matrix-free solution of the ionospheric potential equation.
//!
//! The discretized operator is never assembled: each node carries a
//! bounded dependency list ([`dependencies`]) and the preconditioned
//! biconjugate-gradient solver ([`cg`]) applies it row by row. Rank
//! partition and collective primitives live in [`comm`]; the serial
//! reference implementation runs the identical call sequence a
//! distributed run would.

pub mod cg;
pub mod comm;
pub mod dependencies;
