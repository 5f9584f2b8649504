// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Spherical Triangle Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The ionospheric finite-element mesh: nodes and triangular elements on
//! a sphere, built by recursive subdivision of a base polyhedron and
//! optionally refined further inside latitude bands.
//!
//! Elements are the source of truth for topology; node adjacency is
//! derived by [`SphericalTriGrid::update_connectivity`] and never edited
//! directly. Per-timestep mutation touches only node parameter values.

use std::ops::{Index, IndexMut};

use iono_types::config::{BaseShape, IonosphereConfig};
use iono_types::error::{IonoError, IonoResult};
use iono_types::params::{NodeParam, N_NODE_PARAMS, SIGMA_BASE};

use crate::geometry::{self, Vec3};

/// Maximum number of elements touching one node.
pub const MAX_TOUCHING_ELEMENTS: usize = 6;
/// Maximum number of depending nodes (dependency-list capacity).
pub const MAX_DEPENDING_NODES: usize = 10;

/// Identifier of a cell in the external structured simulation grid.
pub type CellId = [i32; 3];

/// One algebraic dependency of a node on another node. The forward and
/// transposed coefficients are stored as a pair because the discretized
/// operator is not symmetric under an anisotropic conductance tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dependency {
    pub node: u32,
    pub coeff: f64,
    pub coeff_t: f64,
}

/// One (external cell, weight) coupling entry. `scaled_weight` carries
/// the flux-tube area correction of the contributing elements and is
/// what the downward FAC mapping uses; the raw `weight` drives the
/// upward mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCoupling {
    pub cell: CellId,
    pub weight: f64,
    pub scaled_weight: f64,
}

/// One grid node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Position on the reference sphere. Invariant once the mesh is final.
    pub x: Vec3,
    /// Where this node's field line enters the simulation volume.
    /// The exact zero vector is the "unmapped" sentinel.
    pub x_mapped: Vec3,
    /// Named scalar parameters (potential, source, conductances, solver
    /// scratch), see [`NodeParam`].
    pub parameters: [f64; N_NODE_PARAMS],
    /// Elements touching this node (derived, bounded).
    pub touching_elements: Vec<u32>,
    /// Nodes this node algebraically depends on (bounded).
    pub dependencies: Vec<Dependency>,
    /// External cells this node couples to, via its touching elements.
    pub coupling: Vec<CellCoupling>,
}

impl Node {
    pub fn at(x: Vec3) -> Self {
        Node {
            x,
            x_mapped: [0.0; 3],
            parameters: [0.0; N_NODE_PARAMS],
            touching_elements: Vec::with_capacity(MAX_TOUCHING_ELEMENTS),
            dependencies: Vec::with_capacity(MAX_DEPENDING_NODES),
            coupling: Vec::new(),
        }
    }

    /// Whether this node's field line reaches the coupled domain.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        geometry::norm(&self.x_mapped) != 0.0
    }
}

impl Index<NodeParam> for Node {
    type Output = f64;
    #[inline]
    fn index(&self, p: NodeParam) -> &f64 {
        &self.parameters[p as usize]
    }
}

impl IndexMut<NodeParam> for Node {
    #[inline]
    fn index_mut(&mut self, p: NodeParam) -> &mut f64 {
        &mut self.parameters[p as usize]
    }
}

/// One finite element, spanned between 3 nodes. Immutable after creation
/// except for being replaced by 4 children during subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub ref_level: u32,
    pub corners: [u32; 3],
}

/// The ionospheric finite-element grid.
#[derive(Debug, Clone)]
pub struct SphericalTriGrid {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    /// Reference sphere radius (m).
    pub radius: f64,
}

impl SphericalTriGrid {
    /// Build the mesh a configuration describes: base polyhedron,
    /// uniform subdivision passes, latitude-band passes, then radius
    /// normalization and connectivity in that order.
    pub fn from_config(cfg: &IonosphereConfig) -> IonoResult<Self> {
        cfg.validate()?;
        let mut grid = match cfg.base_shape {
            BaseShape::Tetrahedron => Self::initialize_tetrahedron(cfg.radius),
            BaseShape::Icosahedron => Self::initialize_icosahedron(cfg.radius),
        };
        for _ in 0..cfg.base_refinements {
            grid.refine_uniform()?;
        }
        for (&lo, &hi) in cfg
            .refine_min_latitudes
            .iter()
            .zip(cfg.refine_max_latitudes.iter())
        {
            grid.refine_latitude_band(lo, hi)?;
        }
        grid.normalize_radius();
        grid.update_connectivity()?;
        Ok(grid)
    }

    /// Base tetrahedron: 4 nodes, 4 triangles, all on the sphere.
    pub fn initialize_tetrahedron(radius: f64) -> Self {
        let s = radius / 3.0_f64.sqrt();
        let nodes = vec![
            Node::at([s, s, s]),
            Node::at([s, -s, -s]),
            Node::at([-s, s, -s]),
            Node::at([-s, -s, s]),
        ];
        let elements = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]]
            .iter()
            .map(|&corners| Element {
                ref_level: 0,
                corners,
            })
            .collect();
        SphericalTriGrid {
            nodes,
            elements,
            radius,
        }
    }

    /// Base icosahedron: 12 nodes, 20 triangles, all on the sphere.
    pub fn initialize_icosahedron(radius: f64) -> Self {
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let s = radius / (1.0 + phi * phi).sqrt();
        let p = phi * s;
        let nodes = vec![
            Node::at([-s, p, 0.0]),
            Node::at([s, p, 0.0]),
            Node::at([-s, -p, 0.0]),
            Node::at([s, -p, 0.0]),
            Node::at([0.0, -s, p]),
            Node::at([0.0, s, p]),
            Node::at([0.0, -s, -p]),
            Node::at([0.0, s, -p]),
            Node::at([p, 0.0, -s]),
            Node::at([p, 0.0, s]),
            Node::at([-p, 0.0, -s]),
            Node::at([-p, 0.0, s]),
        ];
        let faces: [[u32; 3]; 20] = [
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];
        let elements = faces
            .iter()
            .map(|&corners| Element {
                ref_level: 0,
                corners,
            })
            .collect();
        SphericalTriGrid {
            nodes,
            elements,
            radius,
        }
    }

    // ───────────────────────── geometry on the mesh ──────────────────

    /// Surface area of one element on the sphere shell.
    pub fn element_area(&self, e: u32) -> f64 {
        let c = self.elements[e as usize].corners;
        geometry::triangle_area(
            &self.nodes[c[0] as usize].x,
            &self.nodes[c[1] as usize].x,
            &self.nodes[c[2] as usize].x,
        )
    }

    /// Projected area of one element, mapped along the field to the
    /// simulation boundary. If any corner maps nowhere, returns 0: an
    /// element straddling mapped/unmapped nodes has no meaningful
    /// projected area.
    pub fn mapped_element_area(&self, e: u32) -> f64 {
        let c = self.elements[e as usize].corners;
        let a = &self.nodes[c[0] as usize];
        let b = &self.nodes[c[1] as usize];
        let d = &self.nodes[c[2] as usize];
        if !a.is_mapped() || !b.is_mapped() || !d.is_mapped() {
            return 0.0;
        }
        geometry::triangle_area(&a.x_mapped, &b.x_mapped, &d.x_mapped)
    }

    /// Summed area of all elements touching a node.
    pub fn node_neighbour_area(&self, n: u32) -> f64 {
        self.nodes[n as usize]
            .touching_elements
            .iter()
            .map(|&e| self.element_area(e))
            .sum()
    }

    /// Summed mapped area of all elements touching a node.
    pub fn node_neighbour_mapped_area(&self, n: u32) -> f64 {
        self.nodes[n as usize]
            .touching_elements
            .iter()
            .map(|&e| self.mapped_element_area(e))
            .sum()
    }

    /// Barycenter of an element.
    pub fn element_barycenter(&self, e: u32) -> Vec3 {
        let c = self.elements[e as usize].corners;
        let mut bc = [0.0; 3];
        for &ci in &c {
            bc = geometry::add(&bc, &self.nodes[ci as usize].x);
        }
        geometry::scale(&bc, 1.0 / 3.0)
    }

    /// Representative |latitude| of an element in degrees.
    pub fn element_latitude_deg(&self, e: u32) -> f64 {
        let bc = self.element_barycenter(e);
        let r = geometry::norm(&bc);
        if r == 0.0 {
            return 0.0;
        }
        (bc[2] / r).asin().to_degrees().abs()
    }

    /// Element-averaged conductance tensor (9 components, row-major).
    pub fn sigma_average(&self, e: u32) -> [f64; 9] {
        let c = self.elements[e as usize].corners;
        let mut sigma = [0.0; 9];
        for &ci in &c {
            let node = &self.nodes[ci as usize];
            for (k, s) in sigma.iter_mut().enumerate() {
                *s += node.parameters[SIGMA_BASE + k];
            }
        }
        for s in sigma.iter_mut() {
            *s /= 3.0;
        }
        sigma
    }

    /// Stiffness integral between local basis functions `i` and `j` of
    /// element `e` under the element-averaged conductance tensor.
    /// `transpose` swaps the roles of `i` and `j`, yielding the entry of
    /// the transposed operator.
    pub fn element_integral(&self, e: u32, i: usize, j: usize, transpose: bool) -> f64 {
        let c = self.elements[e as usize].corners;
        let corners = [
            self.nodes[c[0] as usize].x,
            self.nodes[c[1] as usize].x,
            self.nodes[c[2] as usize].x,
        ];
        let grads = geometry::basis_gradients(&corners);
        let sigma = self.sigma_average(e);
        let (gi, gj) = if transpose {
            (&grads[j], &grads[i])
        } else {
            (&grads[i], &grads[j])
        };
        self.element_area(e) * geometry::dot(gi, &geometry::tensor_apply(&sigma, gj))
    }

    // ──────────────────────────── refinement ─────────────────────────

    /// The other element sharing the edge (n1, n2) of element `e`, or
    /// `None` if no whole element spans that edge (the far side has been
    /// subdivided, or the mesh has a boundary, which a closed sphere
    /// does not have).
    pub fn find_element_neighbour(&self, e: u32, n1: u32, n2: u32) -> Option<u32> {
        self.elements.iter().enumerate().find_map(|(idx, el)| {
            if idx as u32 != e && el.corners.contains(&n1) && el.corners.contains(&n2) {
                Some(idx as u32)
            } else {
                None
            }
        })
    }

    /// Index of the node sitting exactly at `pos`, if any. Midpoints are
    /// deterministic functions of their edge endpoints, so bitwise
    /// equality is the correct dedup test.
    fn node_at(&self, pos: &Vec3) -> Option<u32> {
        self.nodes
            .iter()
            .position(|n| n.x == *pos)
            .map(|i| i as u32)
    }

    /// Midpoint node of edge (a, b) of element `e`: reuse the node the
    /// neighbour's earlier subdivision created, or insert a fresh one.
    /// A missing edge partner without an existing midpoint means the
    /// mesh is not watertight -- fatal.
    fn midpoint_node(&mut self, e: u32, a: u32, b: u32) -> IonoResult<u32> {
        let pos = geometry::midpoint(&self.nodes[a as usize].x, &self.nodes[b as usize].x);
        if let Some(existing) = self.node_at(&pos) {
            return Ok(existing);
        }
        if self.find_element_neighbour(e, a, b).is_none() {
            return Err(IonoError::TopologyBroken(format!(
                "element {e}: edge ({a}, {b}) has neither an edge partner nor an existing midpoint"
            )));
        }
        self.nodes.push(Node::at(pos));
        Ok(self.nodes.len() as u32 - 1)
    }

    /// Replace element `e` with its 4 children, inserting midpoint nodes
    /// on each edge. Midpoints stay at the chord midpoint; projection
    /// onto the sphere happens in one pass after all subdivision, which
    /// keeps cross-edge midpoint dedup exact.
    pub fn subdivide_element(&mut self, e: u32) -> IonoResult<()> {
        let el = self.elements[e as usize];
        let [c0, c1, c2] = el.corners;
        let m01 = self.midpoint_node(e, c0, c1)?;
        let m12 = self.midpoint_node(e, c1, c2)?;
        let m20 = self.midpoint_node(e, c2, c0)?;
        let level = el.ref_level + 1;

        // Parent is logically removed: its slot becomes the first child.
        self.elements[e as usize] = Element {
            ref_level: level,
            corners: [c0, m01, m20],
        };
        self.elements.push(Element {
            ref_level: level,
            corners: [m01, c1, m12],
        });
        self.elements.push(Element {
            ref_level: level,
            corners: [m20, m12, c2],
        });
        self.elements.push(Element {
            ref_level: level,
            corners: [m01, m12, m20],
        });
        Ok(())
    }

    /// One uniform whole-sphere subdivision pass.
    pub fn refine_uniform(&mut self) -> IonoResult<()> {
        let snapshot: Vec<u32> = (0..self.elements.len() as u32).collect();
        for e in snapshot {
            self.subdivide_element(e)?;
        }
        Ok(())
    }

    /// One subdivision pass restricted to elements whose representative
    /// |latitude| falls inside [min_lat, max_lat] degrees.
    pub fn refine_latitude_band(&mut self, min_lat: f64, max_lat: f64) -> IonoResult<()> {
        let snapshot: Vec<u32> = (0..self.elements.len() as u32)
            .filter(|&e| {
                let lat = self.element_latitude_deg(e);
                lat >= min_lat && lat <= max_lat
            })
            .collect();
        for e in snapshot {
            self.subdivide_element(e)?;
        }
        Ok(())
    }

    /// Project all node positions back onto the exact target sphere
    /// radius (midpoint insertion leaves points slightly inside).
    pub fn normalize_radius(&mut self) {
        for node in &mut self.nodes {
            let r = geometry::norm(&node.x);
            if r > 0.0 {
                node.x = geometry::scale(&node.x, self.radius / r);
            }
        }
    }

    /// Rebuild every node's touching-element list from the authoritative
    /// element corner arrays. Must run after refinement is final and
    /// before dependency or coupling construction.
    pub fn update_connectivity(&mut self) -> IonoResult<()> {
        let n_nodes = self.nodes.len();
        for node in &mut self.nodes {
            node.touching_elements.clear();
        }
        for (idx, el) in self.elements.iter().enumerate() {
            for &c in &el.corners {
                if c as usize >= n_nodes {
                    return Err(IonoError::IndexOutOfBounds {
                        what: "element corner node",
                        index: c as usize,
                        len: n_nodes,
                    });
                }
                let touching = &mut self.nodes[c as usize].touching_elements;
                if touching.len() >= MAX_TOUCHING_ELEMENTS {
                    return Err(IonoError::CapacityExceeded {
                        node: c as usize,
                        what: "touching elements",
                        limit: MAX_TOUCHING_ELEMENTS,
                    });
                }
                touching.push(idx as u32);
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════ tests ═══════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use iono_types::params::NodeParam;

    fn identity_sigma(grid: &mut SphericalTriGrid) {
        for node in &mut grid.nodes {
            node[NodeParam::Sigma11] = 1.0;
            node[NodeParam::Sigma22] = 1.0;
            node[NodeParam::Sigma33] = 1.0;
        }
    }

    #[test]
    fn test_tetrahedron_counts_and_radius() {
        let grid = SphericalTriGrid::initialize_tetrahedron(2.0);
        assert_eq!(grid.nodes.len(), 4);
        assert_eq!(grid.elements.len(), 4);
        for node in &grid.nodes {
            assert!((geometry::norm(&node.x) - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_icosahedron_counts_and_radius() {
        let grid = SphericalTriGrid::initialize_icosahedron(1.0);
        assert_eq!(grid.nodes.len(), 12);
        assert_eq!(grid.elements.len(), 20);
        for node in &grid.nodes {
            assert!((geometry::norm(&node.x) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uniform_refinement_counts() {
        // Closed icosphere: V=42, F=80 after one pass (E=30 midpoints).
        let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
        grid.refine_uniform().unwrap();
        assert_eq!(grid.elements.len(), 80);
        assert_eq!(grid.nodes.len(), 42);
    }

    #[test]
    fn test_subdivision_conserves_area() {
        let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
        let parent_area = grid.element_area(7);
        let n_before = grid.elements.len();
        grid.subdivide_element(7).unwrap();
        let children = [7, n_before as u32, n_before as u32 + 1, n_before as u32 + 2];
        let child_sum: f64 = children.iter().map(|&c| grid.element_area(c)).sum();
        assert!(
            (child_sum - parent_area).abs() < 1e-14 * parent_area,
            "child areas {child_sum} != parent area {parent_area}"
        );
    }

    #[test]
    fn test_midpoints_are_deduplicated() {
        let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
        grid.refine_uniform().unwrap();
        // Watertight mesh: no two nodes share a position.
        for i in 0..grid.nodes.len() {
            for j in (i + 1)..grid.nodes.len() {
                assert_ne!(
                    grid.nodes[i].x, grid.nodes[j].x,
                    "duplicate node position at {i} and {j}"
                );
            }
        }
    }

    #[test]
    fn test_uniformly_refined_mesh_is_closed() {
        let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
        grid.refine_uniform().unwrap();
        // Every edge of a closed uniformly refined sphere is shared by
        // exactly 2 elements.
        use std::collections::HashMap;
        let mut edges: HashMap<(u32, u32), usize> = HashMap::new();
        for el in &grid.elements {
            let c = el.corners;
            for (a, b) in [(c[0], c[1]), (c[1], c[2]), (c[2], c[0])] {
                let key = (a.min(b), a.max(b));
                *edges.entry(key).or_insert(0) += 1;
            }
        }
        assert!(edges.values().all(|&n| n == 2));
    }

    #[test]
    fn test_find_element_neighbour_symmetric() {
        let grid = SphericalTriGrid::initialize_icosahedron(1.0);
        let c = grid.elements[0].corners;
        let n = grid
            .find_element_neighbour(0, c[0], c[1])
            .expect("closed mesh edge must have a partner");
        assert_ne!(n, 0);
        let back = grid.find_element_neighbour(n, c[0], c[1]);
        assert_eq!(back, Some(0));
    }

    #[test]
    fn test_broken_mesh_fails_subdivision() {
        let mut grid = SphericalTriGrid::initialize_tetrahedron(1.0);
        // Rip out an element: edges of the removed face lose their
        // partner, which subdivision must flag as fatal.
        grid.elements.pop();
        let err = grid.subdivide_element(0).unwrap_err();
        match err {
            IonoError::TopologyBroken(msg) => assert!(msg.contains("edge")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_connectivity_bounded_and_consistent() {
        let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
        grid.refine_uniform().unwrap();
        grid.refine_uniform().unwrap();
        grid.update_connectivity().unwrap();
        for (n, node) in grid.nodes.iter().enumerate() {
            assert!(node.touching_elements.len() <= MAX_TOUCHING_ELEMENTS);
            assert!(!node.touching_elements.is_empty());
            for &e in &node.touching_elements {
                assert!(
                    grid.elements[e as usize].corners.contains(&(n as u32)),
                    "element {e} does not actually touch node {n}"
                );
            }
        }
        // The 12 original icosahedron vertices keep degree 5, the
        // refinement-created nodes have degree 6.
        for n in 0..12 {
            assert_eq!(grid.nodes[n].touching_elements.len(), 5);
        }
        for n in 12..grid.nodes.len() {
            assert_eq!(grid.nodes[n].touching_elements.len(), 6);
        }
    }

    #[test]
    fn test_normalize_radius_projects_all_nodes() {
        let mut grid = SphericalTriGrid::initialize_icosahedron(3.5);
        grid.refine_uniform().unwrap();
        grid.normalize_radius();
        for node in &grid.nodes {
            assert!((geometry::norm(&node.x) - 3.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_latitude_band_refinement_is_local() {
        let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
        grid.refine_uniform().unwrap();
        grid.refine_latitude_band(60.0, 90.0).unwrap();
        let mut refined = 0usize;
        for e in 0..grid.elements.len() as u32 {
            let el = grid.elements[e as usize];
            if el.ref_level == 2 {
                refined += 1;
            } else {
                // Level-1 elements must lie outside the band.
                assert!(
                    grid.element_latitude_deg(e) < 60.0 + 1e-9,
                    "unrefined element {e} inside the band"
                );
            }
        }
        assert!(refined > 0, "band refinement refined nothing");
        assert!(refined < grid.elements.len(), "band refinement refined everything");
    }

    #[test]
    fn test_from_config_builds_polar_mesh() {
        let mut cfg = IonosphereConfig::default();
        cfg.radius = 1.0;
        cfg.base_refinements = 1;
        cfg.refine_min_latitudes = vec![55.0];
        cfg.refine_max_latitudes = vec![80.0];
        let grid = SphericalTriGrid::from_config(&cfg).unwrap();
        assert!(grid.elements.len() > 80);
        for node in &grid.nodes {
            assert!((geometry::norm(&node.x) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mapped_area_zero_propagation() {
        let mut grid = SphericalTriGrid::initialize_tetrahedron(1.0);
        grid.update_connectivity().unwrap();
        for node in &mut grid.nodes {
            node.x_mapped = geometry::scale(&node.x, 4.0);
        }
        let full = grid.mapped_element_area(0);
        assert!(
            (full - 16.0 * grid.element_area(0)).abs() < 1e-12,
            "uniform radial mapping scales areas by 16"
        );
        // Unmap one corner of element 0: its mapped area collapses, and
        // the corner's neighbourhood loses every touching element.
        let c0 = grid.elements[0].corners[0] as usize;
        grid.nodes[c0].x_mapped = [0.0; 3];
        assert_eq!(grid.mapped_element_area(0), 0.0);
        assert_eq!(grid.node_neighbour_mapped_area(c0 as u32), 0.0);
        // Any other node still touches the one element avoiding c0.
        let other = (0..4).find(|&n| n != c0).unwrap();
        assert!(grid.node_neighbour_mapped_area(other as u32) > 0.0);
    }

    #[test]
    fn test_node_neighbour_area_tetrahedron() {
        let mut grid = SphericalTriGrid::initialize_tetrahedron(1.0);
        grid.update_connectivity().unwrap();
        // Each tetrahedron node touches 3 congruent faces.
        let face = grid.element_area(0);
        for n in 0..4u32 {
            assert_eq!(grid.nodes[n as usize].touching_elements.len(), 3);
            assert!((grid.node_neighbour_area(n) - 3.0 * face).abs() < 1e-12);
        }
    }

    #[test]
    fn test_element_integral_identity_sigma_symmetric() {
        let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
        grid.update_connectivity().unwrap();
        identity_sigma(&mut grid);
        for e in 0..grid.elements.len() as u32 {
            for i in 0..3 {
                for j in 0..3 {
                    let fwd = grid.element_integral(e, i, j, false);
                    let swp = grid.element_integral(e, j, i, false);
                    let tr = grid.element_integral(e, i, j, true);
                    assert!((fwd - swp).abs() < 1e-13, "identity tensor must be symmetric");
                    assert!((tr - swp).abs() < 1e-13, "transpose must equal swapped indices");
                }
            }
        }
    }

    #[test]
    fn test_element_integral_rows_sum_to_zero() {
        // Constant fields are in the null space of the stiffness matrix.
        let mut grid = SphericalTriGrid::initialize_icosahedron(1.0);
        grid.update_connectivity().unwrap();
        identity_sigma(&mut grid);
        for e in 0..grid.elements.len() as u32 {
            for i in 0..3 {
                let row: f64 = (0..3).map(|j| grid.element_integral(e, i, j, false)).sum();
                assert!(row.abs() < 1e-12, "row sum {row} for element {e}");
            }
        }
    }
}
