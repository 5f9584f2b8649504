// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{IonoError, IonoResult};

/// Base polyhedron the spherical mesh is subdivided from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseShape {
    Tetrahedron,
    Icosahedron,
}

/// Top-level ionosphere boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IonosphereConfig {
    /// Base mesh shape (icosahedron / tetrahedron).
    #[serde(default = "default_base_shape")]
    pub base_shape: BaseShape,
    /// Radius of the ionospheric shell (m).
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Number of uniform whole-sphere subdivision passes.
    #[serde(default = "default_base_refinements")]
    pub base_refinements: usize,
    /// Lower bounds of the refinement latitude bands (degrees, applied to
    /// |latitude|). Paired entrywise with `refine_max_latitudes`; each
    /// pair is one extra subdivision pass inside the band.
    #[serde(default)]
    pub refine_min_latitudes: Vec<f64>,
    /// Upper bounds of the refinement latitude bands (degrees).
    #[serde(default)]
    pub refine_max_latitudes: Vec<f64>,
    /// Uniform Pedersen conductance (S).
    #[serde(default = "default_sigma_pedersen")]
    pub sigma_pedersen: f64,
    /// Uniform Hall conductance (S).
    #[serde(default = "default_sigma_hall")]
    pub sigma_hall: f64,
    /// Field-parallel conductance (S).
    #[serde(default = "default_sigma_parallel")]
    pub sigma_parallel: f64,
    #[serde(default)]
    pub solver: SolverOptions,
    #[serde(default)]
    pub tracing: TracingOptions,
}

/// Conjugate-gradient solver controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Iteration cap per solve (reaching it is reported, not fatal).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Relative residual tolerance.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

/// Field-line tracing controls for the mesh <-> simulation-volume coupling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingOptions {
    /// Integration step length as a fraction of the ionosphere radius.
    #[serde(default = "default_trace_step")]
    pub step_fraction: f64,
    /// Step cap before a field line is declared unmapped.
    #[serde(default = "default_trace_max_steps")]
    pub max_steps: usize,
    /// Radius of the coupled inner boundary of the simulation volume (m).
    #[serde(default = "default_coupling_radius")]
    pub coupling_radius: f64,
}

fn default_base_shape() -> BaseShape {
    BaseShape::Icosahedron
}
fn default_radius() -> f64 {
    constants::R_IONOSPHERE
}
fn default_base_refinements() -> usize {
    2
}
fn default_sigma_pedersen() -> f64 {
    constants::SIGMA_PEDERSEN_DEFAULT
}
fn default_sigma_hall() -> f64 {
    constants::SIGMA_HALL_DEFAULT
}
fn default_sigma_parallel() -> f64 {
    constants::SIGMA_PARALLEL_DEFAULT
}
fn default_max_iterations() -> usize {
    2000
}
fn default_tolerance() -> f64 {
    1e-9
}
fn default_trace_step() -> f64 {
    0.02
}
fn default_trace_max_steps() -> usize {
    10_000
}
fn default_coupling_radius() -> f64 {
    5.0 * constants::R_EARTH
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

impl Default for TracingOptions {
    fn default() -> Self {
        TracingOptions {
            step_fraction: default_trace_step(),
            max_steps: default_trace_max_steps(),
            coupling_radius: default_coupling_radius(),
        }
    }
}

impl Default for IonosphereConfig {
    fn default() -> Self {
        IonosphereConfig {
            base_shape: default_base_shape(),
            radius: default_radius(),
            base_refinements: default_base_refinements(),
            refine_min_latitudes: Vec::new(),
            refine_max_latitudes: Vec::new(),
            sigma_pedersen: default_sigma_pedersen(),
            sigma_hall: default_sigma_hall(),
            sigma_parallel: default_sigma_parallel(),
            solver: SolverOptions::default(),
            tracing: TracingOptions::default(),
        }
    }
}

impl IonosphereConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> IonoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the mesh builder cannot honour.
    pub fn validate(&self) -> IonoResult<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(IonoError::ConfigError(format!(
                "Ionosphere radius must be finite > 0, got {}",
                self.radius
            )));
        }
        if self.refine_min_latitudes.len() != self.refine_max_latitudes.len() {
            return Err(IonoError::ConfigError(format!(
                "Refinement band bounds must pair up: {} min vs {} max",
                self.refine_min_latitudes.len(),
                self.refine_max_latitudes.len()
            )));
        }
        for (lo, hi) in self
            .refine_min_latitudes
            .iter()
            .zip(self.refine_max_latitudes.iter())
        {
            if !(0.0..=90.0).contains(lo) || !(0.0..=90.0).contains(hi) || lo >= hi {
                return Err(IonoError::ConfigError(format!(
                    "Bad refinement band [{lo}, {hi}]: need 0 <= min < max <= 90"
                )));
            }
        }
        if self.solver.max_iterations == 0 {
            return Err(IonoError::ConfigError(
                "Solver iteration cap must be >= 1".to_string(),
            ));
        }
        if !self.solver.tolerance.is_finite() || self.solver.tolerance <= 0.0 {
            return Err(IonoError::ConfigError(format!(
                "Solver tolerance must be finite > 0, got {}",
                self.solver.tolerance
            )));
        }
        if self.tracing.step_fraction <= 0.0 || self.tracing.max_steps == 0 {
            return Err(IonoError::ConfigError(
                "Tracing step and step cap must be positive".to_string(),
            ));
        }
        if self.tracing.coupling_radius <= self.radius {
            return Err(IonoError::ConfigError(format!(
                "Coupling radius {} must exceed the ionosphere radius {}",
                self.tracing.coupling_radius, self.radius
            )));
        }
        Ok(())
    }
}
