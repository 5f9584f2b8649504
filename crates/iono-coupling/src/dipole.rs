// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Dipole Field and Field-Line Tracer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Background magnetic field evaluation and field-line tracing.
//!
//! The mesh consumes the field as a capability: given a point, return
//! the field vector. [`FieldLineTracer`] integrates along the local
//! direction, away from the planet, until the line pierces the coupled
//! inner boundary of the simulation volume or gives up. A line that
//! never reaches the boundary (closed low-latitude loop, step cap)
//! yields `None` and the node keeps the zero "unmapped" sentinel.

use iono_mesh::geometry::{self, Vec3};
use iono_types::config::TracingOptions;
use iono_types::constants;

/// A background magnetic field sampled pointwise.
pub trait MagneticField {
    /// Field vector (T) at `x` (m, planet-centred).
    fn field_at(&self, x: &Vec3) -> Vec3;
}

/// Centred dipole with moment along -z (Earth-like polarity).
#[derive(Debug, Clone)]
pub struct DipoleField {
    /// Dipole moment magnitude (A m^2).
    pub moment: f64,
}

impl Default for DipoleField {
    fn default() -> Self {
        DipoleField {
            moment: constants::EARTH_DIPOLE_MOMENT,
        }
    }
}

impl MagneticField for DipoleField {
    fn field_at(&self, x: &Vec3) -> Vec3 {
        let r = geometry::norm(x);
        if r == 0.0 {
            return [0.0; 3];
        }
        let m: Vec3 = [0.0, 0.0, -self.moment];
        let prefactor = constants::MU0_SI / (4.0 * std::f64::consts::PI * r.powi(3));
        let rhat = geometry::scale(x, 1.0 / r);
        let m_dot_r = geometry::dot(&m, &rhat);
        // B = (mu0 / 4 pi r^3) (3 (m·r̂) r̂ - m)
        geometry::scale(
            &geometry::sub(&geometry::scale(&rhat, 3.0 * m_dot_r), &m),
            prefactor,
        )
    }
}

/// Integrates field lines outward from the ionospheric shell.
#[derive(Debug, Clone)]
pub struct FieldLineTracer<F: MagneticField> {
    field: F,
    /// Step length as a fraction of the current radial distance.
    step_fraction: f64,
    max_steps: usize,
    /// Shell radius; dipping back below it ends the trace unmapped.
    inner_radius: f64,
    /// Radius of the coupled inner boundary of the simulation volume.
    coupling_radius: f64,
}

impl<F: MagneticField> FieldLineTracer<F> {
    pub fn new(field: F, opts: &TracingOptions, inner_radius: f64) -> Self {
        FieldLineTracer {
            field,
            step_fraction: opts.step_fraction,
            max_steps: opts.max_steps,
            inner_radius,
            coupling_radius: opts.coupling_radius,
        }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// Unit step direction at `x` for a fixed line orientation `sign`.
    /// `None` in a field null.
    fn step_direction(&self, x: &Vec3, sign: f64) -> Option<Vec3> {
        let b = self.field.field_at(x);
        let bn = geometry::norm(&b);
        if bn == 0.0 {
            return None;
        }
        Some(geometry::scale(&b, sign / bn))
    }

    /// Trace the field line through `start` out to the coupling radius.
    ///
    /// The orientation is fixed once at the footpoint: along the field
    /// if it points away from the planet there, against it otherwise.
    /// The same orientation is kept through the apex of a closed line,
    /// so the integrator rides the return leg back below the shell and
    /// the `inner_radius` cutoff reports the line unmapped instead of
    /// hopping onto a neighbouring line.
    ///
    /// Midpoint (RK2) integration with a step proportional to the
    /// current radius. Returns the crossing point and the local field
    /// magnitude there, or `None` when the line never gets there.
    pub fn trace(&self, start: &Vec3) -> Option<(Vec3, f64)> {
        let b0 = self.field.field_at(start);
        let outward = geometry::dot(&b0, start);
        if outward == 0.0 {
            // Field null or exactly tangential at the footpoint.
            return None;
        }
        let sign = if outward > 0.0 { 1.0 } else { -1.0 };
        let mut x = *start;
        for _ in 0..self.max_steps {
            let r = geometry::norm(&x);
            if r >= self.coupling_radius {
                let b_mag = geometry::norm(&self.field.field_at(&x));
                return Some((x, b_mag));
            }
            if r < 0.99 * self.inner_radius {
                return None;
            }
            let h = self.step_fraction * r;
            let d1 = self.step_direction(&x, sign)?;
            let mid = geometry::add(&x, &geometry::scale(&d1, 0.5 * h));
            let d2 = self.step_direction(&mid, sign)?;
            x = geometry::add(&x, &geometry::scale(&d2, h));
        }
        None
    }
}

/// Anisotropic height-integrated conductance tensor from the local unit
/// field direction `b`:
///
/// ```text
/// sigma = sigma_P (I - b bᵀ) + sigma_H (b ×) + sigma_par b bᵀ
/// ```
///
/// Row-major 9-component layout matching the node parameter record.
pub fn conductance_tensor(b: &Vec3, sigma_p: f64, sigma_h: f64, sigma_par: f64) -> [f64; 9] {
    let bn = geometry::norm(b);
    if bn == 0.0 {
        // No field direction: isotropic Pedersen conductance.
        return [sigma_p, 0.0, 0.0, 0.0, sigma_p, 0.0, 0.0, 0.0, sigma_p];
    }
    let u = geometry::scale(b, 1.0 / bn);
    let mut sigma = [0.0; 9];
    for row in 0..3 {
        for col in 0..3 {
            let delta = if row == col { 1.0 } else { 0.0 };
            let bb = u[row] * u[col];
            sigma[3 * row + col] = sigma_p * (delta - bb) + sigma_par * bb;
        }
    }
    // Hall part: the cross-product matrix of u.
    sigma[1] -= sigma_h * u[2];
    sigma[2] += sigma_h * u[1];
    sigma[3] += sigma_h * u[2];
    sigma[5] -= sigma_h * u[0];
    sigma[6] -= sigma_h * u[1];
    sigma[7] += sigma_h * u[0];
    sigma
}

// ═══════════════════════════════ tests ═══════════════════════════════
