// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Rank Partition Scaffolding
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Deterministic node partition metadata and the collective primitives
//! the solver is written against.
//!
//! The serial reference implementation keeps all nodes in one address
//! space, so halo exchange moves no data, but the solver still calls
//! [`SolverComm::exchange_halos`] before every operator sweep and routes
//! every inner product through [`SolverComm::all_reduce_sum`]. Wiring to
//! rsmpi in a later phase replaces the bodies of those two calls only.

use iono_mesh::grid::SphericalTriGrid;
use iono_types::error::{IonoError, IonoResult};
use iono_types::params::NodeParam;

/// Contiguous node range owned by one rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePartition {
    pub rank: usize,
    pub nranks: usize,
    pub n_nodes: usize,
    /// First owned node (inclusive).
    pub start: usize,
    /// Past-the-end owned node.
    pub end: usize,
}

impl NodePartition {
    #[inline]
    pub fn owns(&self, node: u32) -> bool {
        (node as usize) >= self.start && (node as usize) < self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `n_nodes` into `nranks` contiguous ranges, remainder spread
/// over the leading ranks.
pub fn decompose_nodes(n_nodes: usize, nranks: usize) -> IonoResult<Vec<NodePartition>> {
    if n_nodes == 0 {
        return Err(IonoError::InvalidInput(
            "node partition requires at least one node".to_string(),
        ));
    }
    if nranks < 1 {
        return Err(IonoError::InvalidInput(
            "node partition requires at least one rank".to_string(),
        ));
    }
    if nranks > n_nodes {
        return Err(IonoError::InvalidInput(format!(
            "cannot split {n_nodes} nodes across {nranks} ranks"
        )));
    }
    let base = n_nodes / nranks;
    let rem = n_nodes % nranks;
    let mut out = Vec::with_capacity(nranks);
    let mut cursor = 0usize;
    for rank in 0..nranks {
        let len = base + usize::from(rank < rem);
        out.push(NodePartition {
            rank,
            nranks,
            n_nodes,
            start: cursor,
            end: cursor + len,
        });
        cursor += len;
    }
    Ok(out)
}

/// Partition plus halo metadata for the whole communicator.
#[derive(Debug, Clone)]
pub struct SolverComm {
    pub partitions: Vec<NodePartition>,
    /// Per rank: remote nodes whose parameters the rank's owned rows
    /// read through their dependency lists. Sorted, deduplicated.
    pub halo_nodes: Vec<Vec<u32>>,
}

impl SolverComm {
    /// Build partition and halo lists for `nranks` ranks from the
    /// mesh's dependency graph. Dependencies must already be built.
    pub fn new(grid: &SphericalTriGrid, nranks: usize) -> IonoResult<Self> {
        let partitions = decompose_nodes(grid.nodes.len(), nranks)?;
        let mut halo_nodes = Vec::with_capacity(nranks);
        for part in &partitions {
            let mut halo: Vec<u32> = grid.nodes[part.start..part.end]
                .iter()
                .flat_map(|n| n.dependencies.iter().map(|d| d.node))
                .filter(|&d| !part.owns(d))
                .collect();
            halo.sort_unstable();
            halo.dedup();
            if halo.iter().any(|&d| d as usize >= grid.nodes.len()) {
                return Err(IonoError::TopologyBroken(format!(
                    "rank {} halo references a node outside the mesh",
                    part.rank
                )));
            }
            halo_nodes.push(halo);
        }
        Ok(SolverComm {
            partitions,
            halo_nodes,
        })
    }

    /// Single-rank communicator (no halos).
    pub fn serial(grid: &SphericalTriGrid) -> IonoResult<Self> {
        Self::new(grid, 1)
    }

    #[inline]
    pub fn nranks(&self) -> usize {
        self.partitions.len()
    }

    /// Refresh halo copies of `param` on every rank. Serial reference:
    /// all ranks share the node array, so the values are already
    /// current; the call marks the collective point in the algorithm.
    pub fn exchange_halos(&self, _grid: &SphericalTriGrid, _param: NodeParam) {
        // rsmpi phase: post irecv/isend per neighbouring rank here.
    }

    /// Sum one partial value per rank into the global value every rank
    /// would hold after an MPI all-reduce.
    #[inline]
    pub fn all_reduce_sum(&self, partials: &[f64]) -> f64 {
        debug_assert_eq!(partials.len(), self.nranks());
        partials.iter().sum()
    }
}

// ═══════════════════════════════ tests ═══════════════════════════════
