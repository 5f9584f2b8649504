//! Adaptively refined spherical triangle mesh for the ionospheric
//! electrodynamic boundary problem.

pub mod geometry;
pub mod grid;
