// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Boundary Façade
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Owned orchestration of the ionospheric boundary condition.
//!
//! One [`IonosphereBoundary`] instance holds the mesh, its dependency
//! graph and the tracer; there is no global grid. Lifecycle: build once,
//! rebuild the coupling cache whenever the background field or topology
//! changes, then per timestep run map-down, offset, solve and map-up in
//! that order.

use ndarray::Array3;

use iono_mesh::grid::SphericalTriGrid;
use iono_solver::cg::{self, CgConfig, CgResult};
use iono_solver::comm::SolverComm;
use iono_solver::dependencies::build_matrix_dependencies;
use iono_types::config::IonosphereConfig;
use iono_types::error::{IonoError, IonoResult};

use crate::coupling::{
    assign_conductance_tensors, calculate_fsgrid_coupling, map_down_fac, map_up_boundary,
    map_up_current, offset_fac,
};
use crate::dipole::{FieldLineTracer, MagneticField};
use crate::fsgrid::FsGridGeometry;

pub struct IonosphereBoundary<F: MagneticField> {
    pub config: IonosphereConfig,
    pub grid: SphericalTriGrid,
    pub comm: SolverComm,
    tracer: FieldLineTracer<F>,
    coupling_ready: bool,
}

impl<F: MagneticField> IonosphereBoundary<F> {
    /// Build the mesh, assign conductance tensors from the field, and
    /// finalize the dependency graph. Coupling is built separately
    /// ([`Self::rebuild_coupling`]) because it needs the external grid.
    pub fn new(config: IonosphereConfig, field: F) -> IonoResult<Self> {
        let mut grid = SphericalTriGrid::from_config(&config)?;
        assign_conductance_tensors(
            &mut grid,
            &field,
            config.sigma_pedersen,
            config.sigma_hall,
            config.sigma_parallel,
        );
        build_matrix_dependencies(&mut grid)?;
        let comm = SolverComm::serial(&grid)?;
        let tracer = FieldLineTracer::new(field, &config.tracing, config.radius);
        Ok(IonosphereBoundary {
            config,
            grid,
            comm,
            tracer,
            coupling_ready: false,
        })
    }

    /// Retrace all field lines and rebuild the coupling cache. Must run
    /// once before the first timestep and again after any background
    /// field change.
    pub fn rebuild_coupling(&mut self, fsgrid: &FsGridGeometry) -> IonoResult<()> {
        calculate_fsgrid_coupling(&mut self.grid, &self.tracer, fsgrid)?;
        self.coupling_ready = true;
        Ok(())
    }

    pub fn is_coupled(&self) -> bool {
        self.coupling_ready
    }

    /// One boundary update: pull the FAC field down into the source
    /// term, rebalance it to zero net current, solve for the potential,
    /// and push the result back up as per-cell boundary values.
    ///
    /// A solve that hits the iteration cap is reported through the
    /// returned status; the best iterate is still mapped up.
    pub fn timestep(
        &mut self,
        fsgrid: &FsGridGeometry,
        fac: &Array3<f64>,
        boundary_potential: &mut Array3<f64>,
    ) -> IonoResult<CgResult> {
        if !self.coupling_ready {
            return Err(IonoError::InvalidInput(
                "coupling cache not built; call rebuild_coupling first".to_string(),
            ));
        }
        map_down_fac(&mut self.grid, fsgrid, fac)?;
        offset_fac(&mut self.grid);
        let result = cg::solve(
            &mut self.grid,
            &self.comm,
            &CgConfig::from(&self.config.solver),
        );
        map_up_boundary(&self.grid, fsgrid, boundary_potential)?;
        Ok(result)
    }

    /// Per-cell field-aligned current density mapped back up from the
    /// node source term, for callers imposing both boundary values.
    pub fn boundary_current(
        &self,
        fsgrid: &FsGridGeometry,
        current: &mut Array3<f64>,
    ) -> IonoResult<()> {
        if !self.coupling_ready {
            return Err(IonoError::InvalidInput(
                "coupling cache not built; call rebuild_coupling first".to_string(),
            ));
        }
        map_up_current(&self.grid, fsgrid, current)
    }
}

// ═══════════════════════════════ tests ═══════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use iono_mesh::geometry::{self, Vec3};
    use iono_types::config::{BaseShape, TracingOptions};
    use iono_types::params::NodeParam;

    struct RadialField;

    impl MagneticField for RadialField {
        fn field_at(&self, x: &Vec3) -> Vec3 {
            let r = geometry::norm(x);
            if r == 0.0 {
                return [0.0; 3];
            }
            geometry::scale(x, (1.0 / r).powi(3))
        }
    }

    fn small_config() -> IonosphereConfig {
        let mut cfg = IonosphereConfig::default();
        cfg.base_shape = BaseShape::Icosahedron;
        cfg.radius = 1.0;
        cfg.base_refinements = 1;
        cfg.refine_min_latitudes = vec![];
        cfg.refine_max_latitudes = vec![];
        cfg.tracing = TracingOptions {
            step_fraction: 0.02,
            max_steps: 10_000,
            coupling_radius: 4.0,
        };
        cfg
    }

    #[test]
    fn test_build_finalizes_dependencies() {
        let boundary = IonosphereBoundary::new(small_config(), RadialField).unwrap();
        assert!(!boundary.is_coupled());
        for node in &boundary.grid.nodes {
            assert!(!node.dependencies.is_empty());
        }
    }

    #[test]
    fn test_timestep_requires_coupling() {
        let mut boundary = IonosphereBoundary::new(small_config(), RadialField).unwrap();
        let fsgrid = FsGridGeometry::centered_cube(6.0, 12).unwrap();
        let fac = Array3::zeros((12, 12, 12));
        let mut out = Array3::zeros((12, 12, 12));
        assert!(boundary.timestep(&fsgrid, &fac, &mut out).is_err());
    }

    #[test]
    fn test_end_to_end_timestep() {
        let mut boundary = IonosphereBoundary::new(small_config(), RadialField).unwrap();
        let fsgrid = FsGridGeometry::centered_cube(6.0, 12).unwrap();
        boundary.rebuild_coupling(&fsgrid).unwrap();
        assert!(boundary.is_coupled());

        // Dipole-like FAC pattern: current in at +z cells, out at -z.
        let fac = Array3::from_shape_fn((12, 12, 12), |(_, _, k)| {
            if k >= 6 {
                1.0e-7
            } else {
                -1.0e-7
            }
        });
        let mut out = Array3::zeros((12, 12, 12));
        let result = boundary.timestep(&fsgrid, &fac, &mut out).unwrap();

        assert!(result.residual.is_finite());
        for node in &boundary.grid.nodes {
            assert!(node[NodeParam::Potential].is_finite());
        }
        // The antisymmetric drive must produce a nontrivial potential
        // on the boundary grid.
        let max_out = out.iter().fold(0.0f64, |a, &b| a.max(b.abs()));
        assert!(max_out > 0.0, "boundary potential never written");

        // Both boundary values are available: the current map carries
        // the sign pattern of the drive back up.
        let mut current = Array3::zeros((12, 12, 12));
        boundary.boundary_current(&fsgrid, &mut current).unwrap();
        let max_j = current.iter().fold(0.0f64, |a, &b| a.max(b.abs()));
        assert!(max_j > 0.0, "boundary current never written");
        assert!(current.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_zero_fac_gives_flat_potential() {
        let mut boundary = IonosphereBoundary::new(small_config(), RadialField).unwrap();
        let fsgrid = FsGridGeometry::centered_cube(6.0, 12).unwrap();
        boundary.rebuild_coupling(&fsgrid).unwrap();
        let fac = Array3::zeros((12, 12, 12));
        let mut out = Array3::zeros((12, 12, 12));
        let result = boundary.timestep(&fsgrid, &fac, &mut out).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        for &v in out.iter() {
            assert_eq!(v, 0.0);
        }
    }
}
