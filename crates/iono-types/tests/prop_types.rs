// ─────────────────────────────────────────────────────────────────────
// SCPN Ionosphere Core — Property-Based Tests (proptest) for iono-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for iono-types using proptest.
//!
//! Covers: configuration validation and serialization roundtrip,
//! node-parameter record indexing.

use iono_types::config::IonosphereConfig;
use iono_types::params::{NodeParam, N_NODE_PARAMS, SIGMA_BASE};
use proptest::prelude::*;

proptest! {
    /// Any well-formed band list validates; serialization roundtrips.
    #[test]
    fn config_bands_roundtrip(
        n_bands in 0usize..4,
        lo in 10.0f64..60.0,
        width in 5.0f64..25.0,
    ) {
        let mut cfg = IonosphereConfig::default();
        for i in 0..n_bands {
            let band_lo = lo + i as f64;
            cfg.refine_min_latitudes.push(band_lo);
            cfg.refine_max_latitudes.push(band_lo + width);
        }
        prop_assert!(cfg.validate().is_ok());

        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: IonosphereConfig = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(cfg2.refine_min_latitudes.len(), n_bands);
        for i in 0..n_bands {
            prop_assert!((cfg2.refine_min_latitudes[i] - cfg.refine_min_latitudes[i]).abs() < 1e-12);
            prop_assert!((cfg2.refine_max_latitudes[i] - cfg.refine_max_latitudes[i]).abs() < 1e-12);
        }
    }

    /// Non-positive radii never validate.
    #[test]
    fn config_rejects_bad_radius(radius in -1.0e7f64..=0.0) {
        let mut cfg = IonosphereConfig::default();
        cfg.radius = radius;
        prop_assert!(cfg.validate().is_err());
    }

    /// The sigma tensor block indexes stay inside the record and are
    /// unique per (row, col).
    #[test]
    fn sigma_indices_unique_and_bounded(row in 0usize..3, col in 0usize..3) {
        let idx = NodeParam::sigma_index(row, col);
        prop_assert!(idx < N_NODE_PARAMS);
        prop_assert_eq!(idx, SIGMA_BASE + 3 * row + col);
        for r in 0..3 {
            for c in 0..3 {
                if (r, c) != (row, col) {
                    prop_assert_ne!(NodeParam::sigma_index(r, c), idx);
                }
            }
        }
    }
}
