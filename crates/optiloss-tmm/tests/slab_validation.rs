//! Integration test: incoherent TMM vs closed-form single-slab results.
//!
//! For a thick, lossless slab of index $n$ in air the incoherent sum of
//! multiple reflections gives $R = 2R_1/(1+R_1)$ and $T = (1-R_1)/(1+R_1)$,
//! with $R_1 = ((n-1)/(n+1))^2$ the single-interface reflectance.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use num_complex::Complex64;
use optiloss_core::{sweep, CoherencyTags, SweepOptions};
use optiloss_materials::{ConstantMaterial, MaterialProvider};
use optiloss_tmm::IncoherentTmm;

fn constant(name: &str, re: f64, im: f64) -> Arc<dyn MaterialProvider> {
    Arc::new(ConstantMaterial::new(name, Complex64::new(re, im)))
}

#[test]
fn lossless_slab_matches_closed_form() {
    for n in [1.3_f64, 1.5, 2.4, 3.9] {
        let r1 = ((n - 1.0) / (n + 1.0)).powi(2);
        let result = sweep(
            &IncoherentTmm,
            &[400.0, 500.0, 600.0],
            &[100.0],
            &CoherencyTags::all_incoherent(1),
            &[constant("slab", n, 0.0)],
            &SweepOptions::default(),
        )
        .unwrap();

        for i in 0..3 {
            assert_abs_diff_eq!(result.reflectance[i], 2.0 * r1 / (1.0 + r1), epsilon = 1e-12);
            assert_abs_diff_eq!(result.transmittance[i], (1.0 - r1) / (1.0 + r1), epsilon = 1e-12);
            assert_abs_diff_eq!(result.absorption[[0, i]], 0.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn glass_slab_reference_values() {
    let result = sweep(
        &IncoherentTmm,
        &[500.0],
        &[100.0],
        &CoherencyTags::all_incoherent(1),
        &[constant("glass", 1.5, 0.0)],
        &SweepOptions::default(),
    )
    .unwrap();
    assert_abs_diff_eq!(result.reflectance[0], 0.0769231, epsilon = 1e-7);
    assert_abs_diff_eq!(result.transmittance[0], 0.9230769, epsilon = 1e-7);
}

#[test]
fn thin_vacuum_layer_is_invisible() {
    let result = sweep(
        &IncoherentTmm,
        &[350.0, 700.0],
        &[1e-6],
        &CoherencyTags::all_incoherent(1),
        &[Arc::new(ConstantMaterial::vacuum()) as Arc<dyn MaterialProvider>],
        &SweepOptions::default(),
    )
    .unwrap();
    for i in 0..2 {
        assert_abs_diff_eq!(result.reflectance[i], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(result.transmittance[i], 1.0, epsilon = 1e-15);
    }
}

#[test]
fn absorbing_multilayer_conserves_energy_at_oblique_incidence() {
    let materials = [
        constant("ITO", 1.9, 0.02),
        constant("absorber", 2.0, 0.1),
        constant("oxide", 1.46, 0.0),
        constant("silicon", 4.3, 0.07),
    ];
    let grid: Vec<f64> = (0..40).map(|i| 300.0 + 15.0 * i as f64).collect();

    for angle_deg in [0.0_f64, 30.0, 65.0] {
        let result = sweep(
            &IncoherentTmm,
            &grid,
            &[80.0, 100.0, 20.0, 2000.0],
            &CoherencyTags::all_incoherent(4),
            &materials,
            &SweepOptions {
                angle_rad: angle_deg.to_radians(),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(result.max_energy_residual() < 1e-9);
        for i in 0..grid.len() {
            for j in 0..4 {
                assert!(result.absorption[[j, i]] >= -1e-12);
            }
            assert!(result.reflectance[i] > 0.0 && result.transmittance[i] > 0.0);
        }
        // The oxide is lossless.
        assert!(result.layer_absorption(2).iter().all(|a| a.abs() < 1e-12));
    }
}

#[test]
fn absorption_decreases_with_wavelength_for_constant_k() {
    // Single-pass loss scales as exp(-4πkd/λ): shorter wavelengths absorb more.
    let result = sweep(
        &IncoherentTmm,
        &[400.0, 600.0, 800.0],
        &[150.0],
        &CoherencyTags::all_incoherent(1),
        &[constant("absorber", 2.0, 0.1)],
        &SweepOptions::default(),
    )
    .unwrap();
    let a = result.layer_absorption(0);
    assert!(a[0] > a[1] && a[1] > a[2]);
}
