//! Incoherent transfer-matrix method.
//!
//! Every layer is treated as optically thick: only intensities propagate, so
//! thin-film interference is averaged out. Forward and backward intensities
//! on either side of an interface are related by
//!
//! $$\begin{pmatrix}F\\B\end{pmatrix}_{\text{before}} = \frac{1}{T}
//! \begin{pmatrix}1 & -R' \\ R & TT' - RR'\end{pmatrix}
//! \begin{pmatrix}F\\B\end{pmatrix}_{\text{after}}$$
//!
//! and across a layer by $\mathrm{diag}(1/P, P)$, with single-pass
//! transmission $P = \exp(-4\pi\,\mathrm{Im}(n\cos\theta)\,d/\lambda)$.

use std::f64::consts::{FRAC_PI_2, PI};

use num_complex::Complex64;
use optiloss_core::{
    Coherency, CoherencyTags, IncoherentSolution, LayerPower, LayerStack, OpticalSolver,
    Polarization, SolverError,
};

use crate::fresnel::{snell_cosine, InterfacePower};

type Mat2 = [[f64; 2]; 2];

/// Floor on the single-pass transmission, so that very thick absorbers do
/// not overflow $1/P$.
pub const MIN_PASS_TRANSMISSION: f64 = 1e-30;

/// Interfaces transmitting less than this are treated as opaque.
pub const MIN_INTERFACE_TRANSMISSION: f64 = 1e-12;

fn matmul(a: &Mat2, b: &Mat2) -> Mat2 {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

fn apply(m: &Mat2, v: [f64; 2]) -> [f64; 2] {
    [
        m[0][0] * v[0] + m[0][1] * v[1],
        m[1][0] * v[0] + m[1][1] * v[1],
    ]
}

/// Intensity matrix of one interface, seen from the incident side.
fn interface_matrix(forward: InterfacePower, backward: InterfacePower) -> Mat2 {
    let (r, t) = (forward.reflectance, forward.transmittance);
    let (rb, tb) = (backward.reflectance, backward.transmittance);
    [
        [1.0 / t, -rb / t],
        [r / t, (t * tb - r * rb) / t],
    ]
}

fn layer_matrix(pass: f64) -> Mat2 {
    [[1.0 / pass, 0.0], [0.0, pass]]
}

/// Solver for fully incoherent stacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncoherentTmm;

impl IncoherentTmm {
    pub fn new() -> Self {
        Self
    }

    fn check_inputs(
        stack: &LayerStack,
        coherency: &CoherencyTags,
        angle_rad: f64,
    ) -> Result<(), SolverError> {
        if !stack.is_well_formed() {
            return Err(SolverError::InvalidStack(format!(
                "{} indices, {} thicknesses; boundaries must be infinite and layers finite",
                stack.indices.len(),
                stack.thicknesses_nm.len()
            )));
        }
        if coherency.len() != stack.len() {
            return Err(SolverError::InvalidStack(format!(
                "{} coherency tags for a stack of {}",
                coherency.len(),
                stack.len()
            )));
        }
        if let Some(j) = coherency
            .as_slice()
            .iter()
            .position(|&c| c == Coherency::Coherent)
        {
            return Err(SolverError::Unsupported(format!(
                "Entry {} is tagged coherent; this solver handles incoherent stacks only",
                j
            )));
        }
        if !angle_rad.is_finite() || angle_rad.abs() >= FRAC_PI_2 {
            return Err(SolverError::Unsupported(format!(
                "Incidence angle {} rad is outside (-π/2, π/2)",
                angle_rad
            )));
        }
        if stack.indices[0].im != 0.0 && angle_rad != 0.0 {
            return Err(SolverError::Unsupported(
                "Oblique incidence from an absorbing medium".into(),
            ));
        }
        if let Some(j) = stack.indices.iter().position(|n| n.norm() == 0.0) {
            return Err(SolverError::Degenerate(format!("Entry {} has zero index", j)));
        }
        Ok(())
    }
}

impl OpticalSolver for IncoherentTmm {
    fn solve_incoherent(
        &self,
        polarization: Polarization,
        stack: &LayerStack,
        coherency: &CoherencyTags,
        angle_rad: f64,
        wavelength_nm: f64,
    ) -> Result<IncoherentSolution, SolverError> {
        Self::check_inputs(stack, coherency, angle_rad)?;
        let n = stack.len();
        let indices = &stack.indices;

        let kx = indices[0] * angle_rad.sin();
        let cosines: Vec<Complex64> = indices.iter().map(|&nj| snell_cosine(nj, kx)).collect();

        let pass: Vec<f64> = (0..n)
            .map(|j| {
                if j == 0 || j == n - 1 {
                    return 1.0;
                }
                let decay = 4.0 * PI * (indices[j] * cosines[j]).im * stack.thicknesses_nm[j]
                    / wavelength_nm;
                (-decay).exp().max(MIN_PASS_TRANSMISSION)
            })
            .collect();

        let interfaces: Vec<Mat2> = (0..n - 1)
            .map(|k| {
                let forward = InterfacePower::new(
                    polarization,
                    indices[k],
                    indices[k + 1],
                    cosines[k],
                    cosines[k + 1],
                );
                let backward = InterfacePower::new(
                    polarization,
                    indices[k + 1],
                    indices[k],
                    cosines[k + 1],
                    cosines[k],
                );
                if forward.transmittance < MIN_INTERFACE_TRANSMISSION {
                    return Err(SolverError::Degenerate(format!(
                        "Interface {} transmits no power (R = {:.6})",
                        k, forward.reflectance
                    )));
                }
                Ok(interface_matrix(forward, backward))
            })
            .collect::<Result<_, _>>()?;

        let mut total = interfaces[0];
        for j in 1..n - 1 {
            total = matmul(&total, &layer_matrix(pass[j]));
            total = matmul(&total, &interfaces[j]);
        }

        let transmittance = 1.0 / total[0][0];
        let reflectance = total[1][0] / total[0][0];
        if !(transmittance.is_finite() && reflectance.is_finite()) {
            return Err(SolverError::NonFinite(format!(
                "R = {}, T = {}",
                reflectance, transmittance
            )));
        }

        // Walk back from the exit medium, where only the transmitted beam
        // travels, recording net flow at both faces of each layer.
        let mut layer_power = vec![
            LayerPower {
                entering: 0.0,
                leaving: 0.0,
            };
            n
        ];
        layer_power[0] = LayerPower {
            entering: 1.0,
            leaving: 1.0 - reflectance,
        };
        layer_power[n - 1] = LayerPower {
            entering: transmittance,
            leaving: transmittance,
        };
        let mut start_of_next = [transmittance, 0.0];
        for j in (1..n - 1).rev() {
            let end = apply(&interfaces[j], start_of_next);
            let start = apply(&layer_matrix(pass[j]), end);
            layer_power[j] = LayerPower {
                entering: start[0] - start[1],
                leaving: end[0] - end[1],
            };
            start_of_next = start;
        }

        Ok(IncoherentSolution {
            polarization,
            wavelength_nm,
            angle_rad,
            reflectance,
            transmittance,
            layer_power,
        })
    }

    fn method_name(&self) -> &str {
        "incoherent TMM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn stack(layers: &[(Complex64, f64)]) -> LayerStack {
        let mut indices = vec![c(1.0, 0.0)];
        let mut thicknesses_nm = vec![f64::INFINITY];
        for &(n, d) in layers {
            indices.push(n);
            thicknesses_nm.push(d);
        }
        indices.push(c(1.0, 0.0));
        thicknesses_nm.push(f64::INFINITY);
        LayerStack {
            indices,
            thicknesses_nm,
        }
    }

    fn solve(s: &LayerStack, pol: Polarization, angle: f64) -> IncoherentSolution {
        IncoherentTmm
            .solve_incoherent(pol, s, &CoherencyTags::all_incoherent(s.layer_count()), angle, 500.0)
            .unwrap()
    }

    #[test]
    fn test_bare_interface_pair_has_no_layers() {
        let s = stack(&[]);
        let sol = solve(&s, Polarization::S, 0.0);
        assert_abs_diff_eq!(sol.reflectance, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(sol.transmittance, 1.0, epsilon = 1e-15);
        assert_eq!(sol.layer_power.len(), 2);
    }

    #[test]
    fn test_lossless_slab_multiple_reflections() {
        let r1: f64 = 0.04;
        let sol = solve(&stack(&[(c(1.5, 0.0), 1000.0)]), Polarization::S, 0.0);
        assert_abs_diff_eq!(sol.reflectance, 2.0 * r1 / (1.0 + r1), epsilon = 1e-12);
        assert_abs_diff_eq!(sol.transmittance, (1.0 - r1) / (1.0 + r1), epsilon = 1e-12);

        let absorbed = IncoherentTmm.absorption_per_layer(&sol).unwrap();
        assert_abs_diff_eq!(absorbed[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_absorbing_layers_conserve_energy() {
        let s = stack(&[(c(2.0, 0.1), 100.0), (c(1.46, 0.0), 50.0), (c(3.5, 0.8), 20.0)]);
        for pol in Polarization::BOTH {
            for angle in [0.0, 0.3, 1.0] {
                let sol = solve(&s, pol, angle);
                let absorbed = IncoherentTmm.absorption_per_layer(&sol).unwrap();
                assert_eq!(absorbed.len(), 5);
                assert_abs_diff_eq!(absorbed.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
                assert!(absorbed[1] > 0.0 && absorbed[3] > 0.0);
                assert_abs_diff_eq!(absorbed[2], 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_single_pass_absorption_without_reflection() {
        // Index-matched absorber: only Beer-Lambert attenuation remains.
        let s = stack(&[(c(1.0, 0.05), 200.0)]);
        let sol = solve(&s, Polarization::P, 0.0);
        let pass = (-4.0 * PI * 0.05 * 200.0 / 500.0_f64).exp();
        assert!(sol.reflectance < 1e-3);
        assert_abs_diff_eq!(sol.transmittance, pass, epsilon = 2e-3);
    }

    #[test]
    fn test_brewster_slab_is_transparent_for_p() {
        let s = stack(&[(c(1.5, 0.0), 300.0)]);
        let sol = solve(&s, Polarization::P, 1.5_f64.atan());
        assert_abs_diff_eq!(sol.reflectance, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.transmittance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejected_inputs() {
        let s = stack(&[(c(1.5, 0.0), 100.0)]);
        let mixed = CoherencyTags::from_vec(vec![
            Coherency::Incoherent,
            Coherency::Coherent,
            Coherency::Incoherent,
        ]);
        let err = IncoherentTmm
            .solve_incoherent(Polarization::S, &s, &mixed, 0.0, 500.0)
            .unwrap_err();
        assert!(matches!(err, SolverError::Unsupported(_)));

        let tags = CoherencyTags::all_incoherent(1);
        let err = IncoherentTmm
            .solve_incoherent(Polarization::S, &s, &tags, FRAC_PI_2, 500.0)
            .unwrap_err();
        assert!(matches!(err, SolverError::Unsupported(_)));

        let mut lossy_ambient = s.clone();
        lossy_ambient.indices[0] = c(1.0, 0.1);
        let err = IncoherentTmm
            .solve_incoherent(Polarization::S, &lossy_ambient, &tags, 0.2, 500.0)
            .unwrap_err();
        assert!(matches!(err, SolverError::Unsupported(_)));

        let mut open = s.clone();
        open.thicknesses_nm[0] = 10.0;
        let err = IncoherentTmm
            .solve_incoherent(Polarization::S, &open, &tags, 0.0, 500.0)
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidStack(_)));
    }

    #[test]
    fn test_total_internal_reflection_is_degenerate() {
        // Glass incidence at 60° onto a glass layer backed by air.
        let mut s = stack(&[(c(1.5, 0.0), 100.0)]);
        s.indices[0] = c(1.5, 0.0);
        let err = IncoherentTmm
            .solve_incoherent(
                Polarization::S,
                &s,
                &CoherencyTags::all_incoherent(1),
                60.0_f64.to_radians(),
                500.0,
            )
            .unwrap_err();
        assert!(matches!(err, SolverError::Degenerate(_)));
    }
}
