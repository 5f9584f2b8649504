// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Field-Line Coupling
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Downward and upward mapping between the mesh and the external grid.
//!
//! [`calculate_fsgrid_coupling`] traces field lines from deterministic
//! barycentric sample points of every element and caches the resulting
//! (cell, weight) pairs on the corner nodes. The cache is the sole data
//! channel thereafter: [`map_down_fac`] pulls field-aligned currents
//! down onto the node source term with flux-area conservation,
//! [`offset_fac`] removes the net injected current, and
//! [`map_up_boundary`] pushes the solved potential back per cell.

use ndarray::Array3;

use iono_mesh::geometry::{self, Vec3};
use iono_mesh::grid::{CellCoupling, SphericalTriGrid};
use iono_types::error::{IonoError, IonoResult};
use iono_types::params::NodeParam;

use crate::dipole::{conductance_tensor, FieldLineTracer, MagneticField};
use crate::fsgrid::FsGridGeometry;

/// Barycentric sample points per element: centroid plus one point
/// biased toward each corner. Deterministic, so coupling rebuilds are
/// reproducible.
const ELEMENT_SAMPLES: [[f64; 3]; 4] = [
    [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
    [0.5, 0.25, 0.25],
    [0.25, 0.5, 0.25],
    [0.25, 0.25, 0.5],
];

/// Fill every node's conductance tensor from the local field direction
/// and the configured scalar conductances.
pub fn assign_conductance_tensors<F: MagneticField>(
    grid: &mut SphericalTriGrid,
    field: &F,
    sigma_p: f64,
    sigma_h: f64,
    sigma_par: f64,
) {
    for node in &mut grid.nodes {
        node.parameters[NodeParam::SigmaPedersen as usize] = sigma_p;
        node.parameters[NodeParam::SigmaHall as usize] = sigma_h;
        node.parameters[NodeParam::SigmaParallel as usize] = sigma_par;
        let b = field.field_at(&node.x);
        let sigma = conductance_tensor(&b, sigma_p, sigma_h, sigma_par);
        for (k, &s) in sigma.iter().enumerate() {
            node.parameters[NodeParam::sigma_index(k / 3, k % 3)] = s;
        }
    }
}

fn accumulate_coupling(
    grid: &mut SphericalTriGrid,
    node: u32,
    cell: [i32; 3],
    weight: f64,
    scaled_weight: f64,
) {
    let list = &mut grid.nodes[node as usize].coupling;
    if let Some(existing) = list.iter_mut().find(|c| c.cell == cell) {
        existing.weight += weight;
        existing.scaled_weight += scaled_weight;
    } else {
        list.push(CellCoupling {
            cell,
            weight,
            scaled_weight,
        });
    }
}

/// Rebuild the element-to-cell coupling cache. Run once per topology or
/// background-field change, never per timestep.
///
/// Two passes: first every node's mapped position is refreshed (zero
/// sentinel when its line does not reach the coupled domain), then each
/// element traces its sample points and books the threaded cells onto
/// its corner nodes. Sample weights are the barycentric fractions; the
/// scaled weight additionally carries the element's flux-tube area
/// ratio `mapped_element_area / element_area`.
pub fn calculate_fsgrid_coupling<F: MagneticField>(
    grid: &mut SphericalTriGrid,
    tracer: &FieldLineTracer<F>,
    fsgrid: &FsGridGeometry,
) -> IonoResult<()> {
    for node in &mut grid.nodes {
        node.x_mapped = match tracer.trace(&node.x) {
            Some((mapped, _)) => mapped,
            None => [0.0; 3],
        };
        node.coupling.clear();
    }

    for e in 0..grid.elements.len() as u32 {
        let corners = grid.elements[e as usize].corners;
        let area = grid.element_area(e);
        if area <= 0.0 {
            return Err(IonoError::TopologyBroken(format!(
                "element {e} has non-positive area"
            )));
        }
        let area_ratio = grid.mapped_element_area(e) / area;

        let positions: [Vec3; 3] = [
            grid.nodes[corners[0] as usize].x,
            grid.nodes[corners[1] as usize].x,
            grid.nodes[corners[2] as usize].x,
        ];
        for bary in ELEMENT_SAMPLES {
            let mut p = [0.0; 3];
            for (k, pos) in positions.iter().enumerate() {
                p = geometry::add(&p, &geometry::scale(pos, bary[k]));
            }
            // Barycentric blends of shell points land inside the
            // sphere; project back out so the trace starts on the
            // shell instead of below the inner-radius cutoff.
            let p = geometry::scale(&p, grid.radius / geometry::norm(&p));
            let Some((mapped, _)) = tracer.trace(&p) else {
                continue;
            };
            let Some(cell) = fsgrid.cell_of(&mapped) else {
                continue;
            };
            // 1/4 of the element per sample, spread over 3 corners.
            let weight = 1.0 / (ELEMENT_SAMPLES.len() as f64 * 3.0);
            for &corner in &corners {
                accumulate_coupling(grid, corner, cell, weight, weight * area_ratio);
            }
        }
    }
    Ok(())
}

fn check_field_shape(fsgrid: &FsGridGeometry, field: &Array3<f64>) -> IonoResult<()> {
    let dim = field.dim();
    if [dim.0, dim.1, dim.2] != fsgrid.cells {
        return Err(IonoError::InvalidInput(format!(
            "cell field shape {:?} does not match the grid {:?}",
            dim, fsgrid.cells
        )));
    }
    Ok(())
}

/// Pull the external field-aligned current density down onto the node
/// source term.
///
/// Each node takes the coupling-weighted mean of its cells' FAC values,
/// scaled by the flux-tube area ratio folded into the scaled weights:
/// current density grows as the flux tube narrows toward the
/// ionosphere. A node with zero total weight (unmapped neighbourhood)
/// sources nothing.
pub fn map_down_fac(
    grid: &mut SphericalTriGrid,
    fsgrid: &FsGridGeometry,
    fac: &Array3<f64>,
) -> IonoResult<()> {
    check_field_shape(fsgrid, fac)?;
    for node in &mut grid.nodes {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for c in &node.coupling {
            let value = fac[[c.cell[0] as usize, c.cell[1] as usize, c.cell[2] as usize]];
            weighted += c.scaled_weight * value;
            total_weight += c.weight;
        }
        node.parameters[NodeParam::Source as usize] = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        };
    }
    Ok(())
}

/// Subtract the area-weighted global mean from the source term so the
/// net injected current is exactly zero (the elliptic problem is
/// unsolvable otherwise). Returns the removed mean.
pub fn offset_fac(grid: &mut SphericalTriGrid) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_area = 0.0;
    for n in 0..grid.nodes.len() as u32 {
        let area = grid.node_neighbour_area(n);
        weighted_sum += area * grid.nodes[n as usize].parameters[NodeParam::Source as usize];
        total_area += area;
    }
    if total_area == 0.0 {
        return 0.0;
    }
    let mean = weighted_sum / total_area;
    for node in &mut grid.nodes {
        node.parameters[NodeParam::Source as usize] -= mean;
    }
    mean
}

/// Push the solved node potential back up onto the external grid as a
/// per-cell boundary value: every coupled cell receives the
/// coupling-weighted mean potential of the nodes threading it.
pub fn map_up_boundary(
    grid: &SphericalTriGrid,
    fsgrid: &FsGridGeometry,
    boundary: &mut Array3<f64>,
) -> IonoResult<()> {
    check_field_shape(fsgrid, boundary)?;
    let mut weights = Array3::<f64>::zeros(boundary.dim());
    boundary.fill(0.0);
    for node in &grid.nodes {
        let potential = node.parameters[NodeParam::Potential as usize];
        for c in &node.coupling {
            let idx = [c.cell[0] as usize, c.cell[1] as usize, c.cell[2] as usize];
            boundary[idx] += c.weight * potential;
            weights[idx] += c.weight;
        }
    }
    for (b, &w) in boundary.iter_mut().zip(weights.iter()) {
        if w > 0.0 {
            *b /= w;
        }
    }
    Ok(())
}

/// Push the node source term back up onto the external grid as a
/// per-cell field-aligned current density, undoing the flux-area
/// scaling of [`map_down_fac`]: each coupled cell receives the raw
/// weighted node current over the flux-scaled weight total, so a
/// density mapped down and straight back up reproduces itself.
pub fn map_up_current(
    grid: &SphericalTriGrid,
    fsgrid: &FsGridGeometry,
    current: &mut Array3<f64>,
) -> IonoResult<()> {
    check_field_shape(fsgrid, current)?;
    let mut scaled_weights = Array3::<f64>::zeros(current.dim());
    current.fill(0.0);
    for node in &grid.nodes {
        let source = node.parameters[NodeParam::Source as usize];
        for c in &node.coupling {
            let idx = [c.cell[0] as usize, c.cell[1] as usize, c.cell[2] as usize];
            current[idx] += c.weight * source;
            scaled_weights[idx] += c.scaled_weight;
        }
    }
    for (j, &w) in current.iter_mut().zip(scaled_weights.iter()) {
        if w > 0.0 {
            *j /= w;
        } else {
            *j = 0.0;
        }
    }
    Ok(())
}

// ═══════════════════════════════ tests ═══════════════════════════════
