// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Node Dependency Graph
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Construction of the per-node dependency lists that stand in for the
//! assembled stiffness matrix.
//!
//! Row `n` of the operator is the set of `(node, coeff, coeff_t)`
//! entries on node `n`: the forward coefficient feeds `A x`, the
//! transposed one `Aᵀ x`. Entries accumulate additively because a node
//! pair shares up to two elements; the lists must be rebuilt from
//! scratch after any topology or conductance change.

use iono_mesh::grid::{Dependency, SphericalTriGrid, MAX_DEPENDING_NODES};
use iono_types::error::{IonoError, IonoResult};

/// Accumulate `(coeff, coeff_t)` onto node `node`'s dependency on
/// `depends_on`, inserting a new entry when none exists yet.
pub fn add_matrix_dependency(
    grid: &mut SphericalTriGrid,
    node: u32,
    depends_on: u32,
    coeff: f64,
    coeff_t: f64,
) -> IonoResult<()> {
    let deps = &mut grid.nodes[node as usize].dependencies;
    if let Some(existing) = deps.iter_mut().find(|d| d.node == depends_on) {
        existing.coeff += coeff;
        existing.coeff_t += coeff_t;
        return Ok(());
    }
    if deps.len() >= MAX_DEPENDING_NODES {
        return Err(IonoError::CapacityExceeded {
            node: node as usize,
            what: "depending nodes",
            limit: MAX_DEPENDING_NODES,
        });
    }
    deps.push(Dependency {
        node: depends_on,
        coeff,
        coeff_t,
    });
    Ok(())
}

/// Rebuild one node's dependency list from its touching elements.
///
/// For every touching element the node contributes one row index `i`;
/// each corner `j` of that element adds the stiffness integrals
/// `∫ ∇λᵢ · σ ∇λⱼ dA` (forward) and its transposed counterpart.
pub fn add_all_matrix_dependencies(grid: &mut SphericalTriGrid, node: u32) -> IonoResult<()> {
    grid.nodes[node as usize].dependencies.clear();
    let touching = grid.nodes[node as usize].touching_elements.clone();
    for e in touching {
        let corners = grid.elements[e as usize].corners;
        let i = corners
            .iter()
            .position(|&c| c == node)
            .ok_or_else(|| {
                IonoError::TopologyBroken(format!(
                    "node {node} lists element {e} but is not one of its corners"
                ))
            })?;
        for (j, &cj) in corners.iter().enumerate() {
            let coeff = grid.element_integral(e, i, j, false);
            let coeff_t = grid.element_integral(e, i, j, true);
            add_matrix_dependency(grid, node, cj, coeff, coeff_t)?;
        }
    }
    Ok(())
}

/// Rebuild the whole dependency graph. Mandatory after refinement,
/// connectivity updates, or any conductance change.
pub fn build_matrix_dependencies(grid: &mut SphericalTriGrid) -> IonoResult<()> {
    for node in 0..grid.nodes.len() as u32 {
        add_all_matrix_dependencies(grid, node)?;
    }
    Ok(())
}

// ═══════════════════════════════ tests ═══════════════════════════════
