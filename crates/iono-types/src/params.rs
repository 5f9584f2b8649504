// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Node Parameters
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Named scalar parameters carried by every mesh node.
//!
//! Semantically a small fixed-size record, addressed by index so the
//! matrix-free solver can be pointed at any parameter as its unknown,
//! right-hand side or scratch vector.

/// Index into a node's parameter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum NodeParam {
    /// Electrostatic potential (the solver unknown).
    Potential = 0,
    /// Best iterate seen so far (lowest residual), restored on exit.
    BestPotential,
    /// Field-aligned current source term (right-hand side).
    Source,
    /// Height-integrated Pedersen conductance.
    SigmaPedersen,
    /// Height-integrated Hall conductance.
    SigmaHall,
    /// Field-parallel conductance.
    SigmaParallel,
    // 3x3 conductance tensor, row-major. Must stay contiguous.
    Sigma11,
    Sigma12,
    Sigma13,
    Sigma21,
    Sigma22,
    Sigma23,
    Sigma31,
    Sigma32,
    Sigma33,
    // Biconjugate-gradient scratch vectors.
    Residual,
    ResidualT,
    PSearch,
    PSearchT,
    ZPrecond,
    ZPrecondT,
}

/// Size of the per-node parameter record.
pub const N_NODE_PARAMS: usize = NodeParam::ZPrecondT as usize + 1;

/// First index of the 3x3 conductance tensor block.
pub const SIGMA_BASE: usize = NodeParam::Sigma11 as usize;

impl NodeParam {
    /// Parameter index of conductance tensor component (row, col),
    /// row and col in 0..3.
    #[inline]
    pub fn sigma_index(row: usize, col: usize) -> usize {
        debug_assert!(row < 3 && col < 3);
        SIGMA_BASE + 3 * row + col
    }
}
