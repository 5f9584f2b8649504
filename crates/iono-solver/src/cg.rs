// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Preconditioned BiCG Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Matrix-free preconditioned biconjugate-gradient solver for the
//! ionospheric potential.
//!
//! The operator is applied row by row from the node dependency lists
//! ([`atimes`]); the transposed coefficients drive the shadow recurrence,
//! so the solver is correct for the anisotropic (non-symmetric)
//! conductance tensor. Preconditioning is Jacobi: the self-dependency is
//! the diagonal.
//!
//! All solver state lives in the named node parameters: residual pair,
//! search-direction pair, preconditioned pair, potential and the best
//! potential seen so far. The system is singular (constants are in the
//! null space), so potentials are meaningful up to a gauge; callers
//! compare differences, and the right-hand side must have zero
//! area-weighted mean.

use rayon::prelude::*;

use crate::comm::SolverComm;
use iono_mesh::grid::SphericalTriGrid;
use iono_types::config::SolverOptions;
use iono_types::params::NodeParam;

// ───────────────────────────── configuration ─────────────────────────

/// Configuration for the BiCG solve.
#[derive(Debug, Clone)]
pub struct CgConfig {
    /// Maximum number of BiCG iterations (default: 2000).
    pub max_iter: usize,
    /// Convergence tolerance on the relative residual norm (default: 1e-9).
    pub tol: f64,
}

impl Default for CgConfig {
    fn default() -> Self {
        CgConfig {
            max_iter: 2000,
            tol: 1e-9,
        }
    }
}

impl From<&SolverOptions> for CgConfig {
    fn from(opts: &SolverOptions) -> Self {
        CgConfig {
            max_iter: opts.max_iterations,
            tol: opts.tolerance,
        }
    }
}

/// Result of a BiCG solve.
#[derive(Debug, Clone)]
pub struct CgResult {
    /// Number of BiCG iterations performed.
    pub iterations: usize,
    /// Best relative residual norm reached (the returned potential).
    pub residual: f64,
    /// Whether the tolerance was met. Hitting the iteration cap is a
    /// status, not an error: the best iterate is still returned.
    pub converged: bool,
}

// ──────────────────────── row-wise operator apply ────────────────────

/// One row of the implicit matvec: `Σ coeff · value[dep]` over node
/// `n`'s dependency list, reading parameter `param`. `transpose`
/// selects the transposed coefficients.
#[inline]
pub fn atimes(grid: &SphericalTriGrid, n: u32, param: NodeParam, transpose: bool) -> f64 {
    grid.nodes[n as usize]
        .dependencies
        .iter()
        .map(|d| {
            let c = if transpose { d.coeff_t } else { d.coeff };
            c * grid.nodes[d.node as usize].parameters[param as usize]
        })
        .sum()
}

/// One row of the Jacobi preconditioner: divide by the self-dependency.
/// A vanishing diagonal passes the value through unchanged.
#[inline]
pub fn asolve(grid: &SphericalTriGrid, n: u32, param: NodeParam, transpose: bool) -> f64 {
    let value = grid.nodes[n as usize].parameters[param as usize];
    let diag = grid.nodes[n as usize]
        .dependencies
        .iter()
        .find(|d| d.node == n)
        .map(|d| if transpose { d.coeff_t } else { d.coeff })
        .unwrap_or(0.0);
    if diag.abs() > 1e-300 {
        value / diag
    } else {
        value
    }
}

/// Full operator sweep `dst = A · src` (or `Aᵀ · src`). One halo
/// exchange precedes the sweep: every rank needs current remote copies
/// of `src` before its rows read them.
fn atimes_sweep(
    grid: &mut SphericalTriGrid,
    comm: &SolverComm,
    src: NodeParam,
    dst: NodeParam,
    transpose: bool,
) {
    comm.exchange_halos(grid, src);
    let out: Vec<f64> = (0..grid.nodes.len() as u32)
        .into_par_iter()
        .map(|n| atimes(grid, n, src, transpose))
        .collect();
    for (node, v) in grid.nodes.iter_mut().zip(out) {
        node.parameters[dst as usize] = v;
    }
}

/// Preconditioner sweep `dst = M⁻¹ · src`. Purely local, no exchange.
fn asolve_sweep(grid: &mut SphericalTriGrid, src: NodeParam, dst: NodeParam, transpose: bool) {
    let out: Vec<f64> = (0..grid.nodes.len() as u32)
        .map(|n| asolve(grid, n, src, transpose))
        .collect();
    for (node, v) in grid.nodes.iter_mut().zip(out) {
        node.parameters[dst as usize] = v;
    }
}

// ─────────────────── parameter-vector BLAS helpers ───────────────────

/// Global inner product of two node parameters, reduced across rank
/// partials the way a distributed run would.
fn dot_param(grid: &SphericalTriGrid, comm: &SolverComm, a: NodeParam, b: NodeParam) -> f64 {
    let partials: Vec<f64> = comm
        .partitions
        .iter()
        .map(|part| {
            grid.nodes[part.start..part.end]
                .iter()
                .map(|n| n.parameters[a as usize] * n.parameters[b as usize])
                .sum()
        })
        .collect();
    comm.all_reduce_sum(&partials)
}

fn norm_param(grid: &SphericalTriGrid, comm: &SolverComm, a: NodeParam) -> f64 {
    dot_param(grid, comm, a, a).sqrt()
}

/// `dst = src` for every node.
fn copy_param(grid: &mut SphericalTriGrid, src: NodeParam, dst: NodeParam) {
    for node in &mut grid.nodes {
        node.parameters[dst as usize] = node.parameters[src as usize];
    }
}

/// `y += alpha * x`.
fn axpy_param(grid: &mut SphericalTriGrid, alpha: f64, x: NodeParam, y: NodeParam) {
    for node in &mut grid.nodes {
        node.parameters[y as usize] += alpha * node.parameters[x as usize];
    }
}

/// `y = x + beta * y` (search-direction update).
fn xpby_param(grid: &mut SphericalTriGrid, x: NodeParam, beta: f64, y: NodeParam) {
    for node in &mut grid.nodes {
        node.parameters[y as usize] =
            node.parameters[x as usize] + beta * node.parameters[y as usize];
    }
}

fn fill_param(grid: &mut SphericalTriGrid, p: NodeParam, value: f64) {
    for node in &mut grid.nodes {
        node.parameters[p as usize] = value;
    }
}

// ─────────────────────────── main solver ─────────────────────────────

/// Solve `A · potential = source` by preconditioned BiCG.
///
/// `NodeParam::Potential` is the initial guess on entry and the best
/// iterate on exit; `NodeParam::Source` is the fixed right-hand side.
/// Dependency lists must be current (see
/// [`crate::dependencies::build_matrix_dependencies`]).
///
/// # Algorithm
///
/// ```text
/// r  = b - A·x          rr = r
/// z  = M⁻¹ r
/// loop:
///   zz     = M⁻ᵀ rr
///   bknum  = <z, rr>
///   p  = z + bk·p       pp = zz + bk·pp     (bk = bknum/bkden)
///   z  = A·p            akden = <z, pp>     (ak = bknum/akden)
///   zz = Aᵀ·pp
///   x += ak·p           r -= ak·z           rr -= ak·zz
///   z  = M⁻¹ r
///   err = ‖r‖ / ‖b‖     track best iterate
/// ```
pub fn solve(grid: &mut SphericalTriGrid, comm: &SolverComm, config: &CgConfig) -> CgResult {
    use NodeParam::{
        BestPotential, PSearch, PSearchT, Potential, Residual, ResidualT, Source, ZPrecond,
        ZPrecondT,
    };

    let bnrm = norm_param(grid, comm, Source);
    if bnrm < 1e-300 {
        // Zero right-hand side: zero potential is the exact solution.
        fill_param(grid, Potential, 0.0);
        fill_param(grid, BestPotential, 0.0);
        return CgResult {
            iterations: 0,
            residual: 0.0,
            converged: true,
        };
    }

    // r = b - A·x, rr = r
    atimes_sweep(grid, comm, Potential, Residual, false);
    for node in &mut grid.nodes {
        node.parameters[Residual as usize] =
            node.parameters[Source as usize] - node.parameters[Residual as usize];
    }
    copy_param(grid, Residual, ResidualT);

    asolve_sweep(grid, Residual, ZPrecond, false);

    let mut best_err = norm_param(grid, comm, Residual) / bnrm;
    copy_param(grid, Potential, BestPotential);
    if best_err < config.tol {
        return CgResult {
            iterations: 0,
            residual: best_err,
            converged: true,
        };
    }

    let mut bkden = 1.0;
    let mut iterations = 0usize;

    for iter in 1..=config.max_iter {
        iterations = iter;

        asolve_sweep(grid, ResidualT, ZPrecondT, true);
        let bknum = dot_param(grid, comm, ZPrecond, ResidualT);
        if bknum == 0.0 {
            break; // breakdown: shadow residual orthogonal to z
        }

        if iter == 1 {
            copy_param(grid, ZPrecond, PSearch);
            copy_param(grid, ZPrecondT, PSearchT);
        } else {
            let bk = bknum / bkden;
            xpby_param(grid, ZPrecond, bk, PSearch);
            xpby_param(grid, ZPrecondT, bk, PSearchT);
        }
        bkden = bknum;

        atimes_sweep(grid, comm, PSearch, ZPrecond, false);
        let akden = dot_param(grid, comm, ZPrecond, PSearchT);
        if akden == 0.0 {
            break;
        }
        let ak = bknum / akden;

        atimes_sweep(grid, comm, PSearchT, ZPrecondT, true);

        axpy_param(grid, ak, PSearch, Potential);
        axpy_param(grid, -ak, ZPrecond, Residual);
        axpy_param(grid, -ak, ZPrecondT, ResidualT);

        asolve_sweep(grid, Residual, ZPrecond, false);

        let err = norm_param(grid, comm, Residual) / bnrm;
        if err < best_err {
            best_err = err;
            copy_param(grid, Potential, BestPotential);
        }
        if err < config.tol {
            break;
        }
    }

    // Restore the best iterate seen, whatever the exit path.
    copy_param(grid, BestPotential, Potential);
    CgResult {
        iterations,
        residual: best_err,
        converged: best_err < config.tol,
    }
}

// ═══════════════════════════════ tests ═══════════════════════════════
