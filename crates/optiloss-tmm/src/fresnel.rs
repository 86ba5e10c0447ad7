//! Snell's law and Fresnel coefficients for planar interfaces.
//!
//! Angles are carried as complex cosines so that absorbing media and
//! evanescent waves need no special handling.

use num_complex::Complex64;
use optiloss_core::Polarization;

/// Threshold on $|\mathrm{Im}(n\cos\theta)|$ below which the real part
/// decides the propagation direction.
const DIRECTION_EPS: f64 = 100.0 * f64::EPSILON;

/// Whether a wave with index `n` and cosine `cos_theta` travels (or decays)
/// in the forward direction.
pub fn is_forward(n: Complex64, cos_theta: Complex64) -> bool {
    let ncos = n * cos_theta;
    if ncos.im.abs() > DIRECTION_EPS {
        ncos.im > 0.0
    } else {
        ncos.re > 0.0
    }
}

/// Cosine of the propagation angle in a medium of index `n`, given the
/// conserved quantity $n_0 \sin\theta_0$, on the forward branch.
pub fn snell_cosine(n: Complex64, n0_sin_theta0: Complex64) -> Complex64 {
    let sin_theta = n0_sin_theta0 / n;
    let cos_theta = (Complex64::new(1.0, 0.0) - sin_theta * sin_theta).sqrt();
    if is_forward(n, cos_theta) {
        cos_theta
    } else {
        -cos_theta
    }
}

/// Amplitude reflection coefficient going from medium `i` into medium `f`.
pub fn reflection_amplitude(
    polarization: Polarization,
    n_i: Complex64,
    n_f: Complex64,
    cos_i: Complex64,
    cos_f: Complex64,
) -> Complex64 {
    match polarization {
        Polarization::S => (n_i * cos_i - n_f * cos_f) / (n_i * cos_i + n_f * cos_f),
        Polarization::P => (n_f * cos_i - n_i * cos_f) / (n_f * cos_i + n_i * cos_f),
    }
}

/// Power reflectance and transmittance of one interface.
///
/// Transmittance is taken as $1 - R$. This is the Fresnel power
/// transmittance whenever the incident medium is lossless, and keeps the
/// intensity balance exact when it is not. Between two absorbing media it
/// differs from the $|t|^2$-based power transmittance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfacePower {
    pub reflectance: f64,
    pub transmittance: f64,
}

impl InterfacePower {
    pub fn new(
        polarization: Polarization,
        n_i: Complex64,
        n_f: Complex64,
        cos_i: Complex64,
        cos_f: Complex64,
    ) -> Self {
        let reflectance = reflection_amplitude(polarization, n_i, n_f, cos_i, cos_f).norm_sqr();
        Self {
            reflectance,
            transmittance: 1.0 - reflectance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_normal_incidence_glass() {
        for pol in Polarization::BOTH {
            let p = InterfacePower::new(pol, c(1.0, 0.0), c(1.5, 0.0), c(1.0, 0.0), c(1.0, 0.0));
            assert_abs_diff_eq!(p.reflectance, 0.04, epsilon = 1e-15);
            assert_abs_diff_eq!(p.transmittance, 0.96, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_absorbing_incident_side_uses_complement_of_reflectance() {
        let (n_i, n_f) = (c(2.6, 0.9), c(1.46, 0.0));
        let one = c(1.0, 0.0);
        let p = InterfacePower::new(Polarization::S, n_i, n_f, one, one);
        assert_abs_diff_eq!(p.reflectance + p.transmittance, 1.0, epsilon = 1e-15);

        // |t|^2 Re(n_f) / Re(n_i) gives a different value here.
        let t = 2.0 * n_i / (n_i + n_f);
        let fresnel_t = t.norm_sqr() * n_f.re / n_i.re;
        assert!((p.transmittance - fresnel_t).abs() / p.transmittance > 0.05);
    }

    #[test]
    fn test_brewster_angle_p_reflectance_vanishes() {
        let n0 = c(1.0, 0.0);
        let n1 = c(1.5, 0.0);
        let theta_b = 1.5_f64.atan();
        let cos0 = c(theta_b.cos(), 0.0);
        let cos1 = snell_cosine(n1, n0 * theta_b.sin());

        let p = InterfacePower::new(Polarization::P, n0, n1, cos0, cos1);
        let s = InterfacePower::new(Polarization::S, n0, n1, cos0, cos1);
        assert_abs_diff_eq!(p.reflectance, 0.0, epsilon = 1e-14);
        assert!(s.reflectance > 0.1);
    }

    #[test]
    fn test_reverse_direction_has_same_reflectance() {
        let (n0, n1) = (c(1.0, 0.0), c(2.0, 0.3));
        let kx = n0 * 0.4_f64.sin();
        let (cos0, cos1) = (snell_cosine(n0, kx), snell_cosine(n1, kx));
        for pol in Polarization::BOTH {
            let forward = InterfacePower::new(pol, n0, n1, cos0, cos1);
            let backward = InterfacePower::new(pol, n1, n0, cos1, cos0);
            assert_abs_diff_eq!(forward.reflectance, backward.reflectance, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_absorbing_medium_decays_forward() {
        let n = c(2.0, 0.5);
        let cos = snell_cosine(n, c(0.7, 0.0));
        assert!((n * cos).im > 0.0);
        assert!(is_forward(n, cos));
    }

    #[test]
    fn test_total_internal_reflection() {
        // Glass to air beyond the critical angle: evanescent, forward-decaying.
        let (n_glass, n_air) = (c(1.5, 0.0), c(1.0, 0.0));
        let kx = n_glass * 60.0_f64.to_radians().sin();
        let cos_air = snell_cosine(n_air, kx);
        assert!(cos_air.im > 0.0);

        let p = InterfacePower::new(
            Polarization::S,
            n_glass,
            n_air,
            snell_cosine(n_glass, kx),
            cos_air,
        );
        assert_abs_diff_eq!(p.reflectance, 1.0, epsilon = 1e-12);
    }
}
