//! End-to-end: materials → sweep → photocurrent report.

use std::sync::Arc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use num_complex::Complex64;
use optiloss_core::constants::charge_per_joule;
use optiloss_core::{analyse, Layer, PipelineError, ReferenceSpectrum, SweepOptions};
use optiloss_materials::{ConstantMaterial, Interpolation, MaterialLibrary, TabulatedMaterial};
use optiloss_tmm::IncoherentTmm;

fn flat_spectrum() -> ReferenceSpectrum {
    ReferenceSpectrum::parse("flat", "wl,pw\n280,1.0\n1000,1.0\n").unwrap()
}

#[test]
fn single_glass_slab() {
    let layers = [Layer {
        name: "glass".into(),
        material: Arc::new(ConstantMaterial::new("glass", Complex64::new(1.5, 0.0))),
        thickness_nm: 100.0,
    }];
    let grid = [400.0, 500.0, 600.0];
    let analysis = analyse(
        &IncoherentTmm,
        &layers,
        &grid,
        &flat_spectrum(),
        &SweepOptions::default(),
    )
    .unwrap();

    let r1: f64 = 0.04;
    let r = 2.0 * r1 / (1.0 + r1);
    let t = (1.0 - r1) / (1.0 + r1);
    for i in 0..3 {
        assert_abs_diff_eq!(analysis.sweep.reflectance[i], r, epsilon = 1e-12);
        assert_abs_diff_eq!(analysis.sweep.transmittance[i], t, epsilon = 1e-12);
    }

    // Flat flux: the integrand q·λ/(hc) is linear in λ, so the trapezoid
    // rule gives the exact integral.
    let reference = 0.5 * (charge_per_joule(400.0) + charge_per_joule(600.0)) * 200.0;
    let report = &analysis.report;
    let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["glass", "Transmission", "Reflection"]);
    assert_relative_eq!(report.reference_current, reference, max_relative = 1e-12);
    assert_relative_eq!(report.get("Reflection").unwrap(), r * reference, max_relative = 1e-9);
    assert_relative_eq!(report.get("Transmission").unwrap(), t * reference, max_relative = 1e-9);
    assert_abs_diff_eq!(report.get("glass").unwrap(), 0.0, epsilon = 1e-9);
    assert_relative_eq!(report.total(), reference, max_relative = 1e-9);
}

#[test]
fn tabulated_absorber_on_palik_oxide() {
    let absorber = TabulatedMaterial::parse(
        "absorber",
        "\"λ,n (nm)\",n,k\n300,2.6,0.9\n500,2.3,0.3\n700,2.1,0.05\n900,2.0,0.0\n",
        Interpolation::Linear,
    )
    .unwrap();
    let library = MaterialLibrary::new(Interpolation::Linear);
    let layers = [
        Layer {
            name: "absorber".into(),
            material: Arc::new(absorber),
            thickness_nm: 60.0,
        },
        Layer {
            name: "SiO2".into(),
            material: library.load("SiO2_Palik").unwrap(),
            thickness_nm: 100.0,
        },
    ];
    let grid: Vec<f64> = (0..=62).map(|i| 280.0 + 10.0 * i as f64).collect();

    let analysis = analyse(
        &IncoherentTmm,
        &layers,
        &grid,
        &flat_spectrum(),
        &SweepOptions {
            parallel: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert!(analysis.sweep.max_energy_residual() < 1e-9);
    let report = &analysis.report;
    let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["SiO2", "absorber", "Transmission", "Reflection"]);
    assert!(report.get("absorber").unwrap() > 0.0);
    assert_abs_diff_eq!(report.get("SiO2").unwrap(), 0.0, epsilon = 1e-9);
    assert_relative_eq!(report.total(), report.reference_current, max_relative = 1e-9);

    let fractions: f64 = names.iter().filter_map(|n| report.fraction(n)).sum();
    assert_abs_diff_eq!(fractions, 1.0, epsilon = 1e-9);
}

#[test]
fn grid_outside_spectrum_fails_before_sweeping() {
    let spectrum = ReferenceSpectrum::new("visible", vec![400.0, 700.0], vec![1.0, 1.0]).unwrap();
    let layers = [Layer {
        name: "glass".into(),
        material: Arc::new(ConstantMaterial::new("glass", Complex64::new(1.5, 0.0))),
        thickness_nm: 100.0,
    }];
    let err = analyse(
        &IncoherentTmm,
        &layers,
        &[300.0, 500.0, 900.0],
        &spectrum,
        &SweepOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
}
