// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Vacuum permeability (H/m) - real SI value.
pub const MU0_SI: f64 = 1.2566370614e-6;

/// Earth radius (m).
pub const R_EARTH: f64 = 6.371e6;

/// Nominal altitude of the ionospheric shell above ground (m).
pub const IONOSPHERE_ALTITUDE: f64 = 1.0e5;

/// Default radius of the ionospheric mesh sphere (m).
pub const R_IONOSPHERE: f64 = R_EARTH + IONOSPHERE_ALTITUDE;

/// Earth dipole moment (A m^2), pointing along -z.
pub const EARTH_DIPOLE_MOMENT: f64 = 8.0e22;

/// Equatorial surface field of the dipole above (T).
/// B_eq = mu0 * m / (4 pi R_E^3)
pub const B_EQUATORIAL: f64 = 3.12e-5;

/// Default uniform Pedersen conductance (S).
pub const SIGMA_PEDERSEN_DEFAULT: f64 = 5.0;

/// Default uniform Hall conductance (S).
pub const SIGMA_HALL_DEFAULT: f64 = 10.0;

/// Default field-parallel conductance (S). Large: field lines are treated
/// as near-equipotentials.
pub const SIGMA_PARALLEL_DEFAULT: f64 = 1.0e3;
