//! Physical-optics evaluator: Fresnel reflection and the scattered-field
//! integral (spec.md §4.5). Generalised from the teacher pack's scalar
//! dielectric/conductor formulas in
//! `examples/justinliew-rs_pbrt_edge/src/core/reflection.rs`'s
//! `fr_dielectric`/`fr_conductor` to a single complex-`(eta, mu)` Fresnel
//! pair, since this engine always models a full complex relative
//! permittivity and permeability rather than a separate dielectric/conductor
//! split.

use num_complex::Complex;

use crate::geom::Vec3;
use crate::mesh::Material;

/// TE (`r_s`) and TM (`r_p`) reflection coefficients of `material` against
/// free space, at incidence angle whose cosine is `cos_theta_i` (spec.md
/// §4.4, §4.5). PEC is canonicalised to `r_s = -1, r_p = +1` exactly.
pub fn fresnel_coefficients(cos_theta_i: f64, material: &Material) -> (Complex<f64>, Complex<f64>) {
    if material.is_pec() {
        return (Complex::new(-1.0, 0.0), Complex::new(1.0, 0.0));
    }
    let n1 = Complex::new(1.0, 0.0);
    let n2 = (material.permittivity * material.permeability).sqrt();

    let cos_i = Complex::new(cos_theta_i.clamp(-1.0, 1.0), 0.0);
    let sin_theta_i2 = 1.0 - cos_theta_i * cos_theta_i;
    let sin_theta_t = (n1 / n2) * Complex::new(sin_theta_i2.max(0.0).sqrt(), 0.0);
    let cos_theta_t = (Complex::new(1.0, 0.0) - sin_theta_t * sin_theta_t).sqrt();

    let r_s = (n1 * cos_i - n2 * cos_theta_t) / (n1 * cos_i + n2 * cos_theta_t);
    let r_p = (n2 * cos_i - n1 * cos_theta_t) / (n2 * cos_i + n1 * cos_theta_t);
    (r_s, r_p)
}

/// Mirror reflection of `incident` (pointing toward the surface) about unit
/// `normal`.
pub fn reflect_direction(incident: Vec3<f64>, normal: Vec3<f64>) -> Vec3<f64> {
    incident - normal * (2.0 * incident.dot(normal))
}

/// Decomposes a complex polarisation vector `e_inc` into TE (perpendicular
/// to the plane of incidence) and TM (in-plane) scalar components, given the
/// incident direction and face normal (spec.md §4.5).
///
/// Returns `(te_basis, te_component, tm_basis, tm_component)`, where the
/// bases are unit real-valued vectors and the components are the complex
/// projections of `e_inc` onto them.
pub fn decompose_polarisation(
    e_inc: Vec3<Complex<f64>>,
    incident_dir: Vec3<f64>,
    normal: Vec3<f64>,
) -> (Vec3<f64>, Complex<f64>, Vec3<f64>, Complex<f64>) {
    let te_basis = {
        let raw = incident_dir.cross(normal);
        let len = raw.length();
        if len > 1e-12 {
            raw / len
        } else {
            // Normal incidence: plane of incidence is undefined; pick an
            // arbitrary basis orthogonal to the propagation direction.
            let helper = if incident_dir.x.abs() < 0.9 {
                Vec3::new(1.0, 0.0, 0.0)
            } else {
                Vec3::new(0.0, 1.0, 0.0)
            };
            incident_dir.cross(helper).normalise()
        }
    };
    let tm_basis = incident_dir.cross(te_basis).normalise();

    let project = |e: Vec3<Complex<f64>>, basis: Vec3<f64>| -> Complex<f64> {
        e.x * basis.x + e.y * basis.y + e.z * basis.z
    };
    let te_component = project(e_inc, te_basis);
    let tm_component = project(e_inc, tm_basis);
    (te_basis, te_component, tm_basis, tm_component)
}

/// Result of reflecting an incident field at a hit: the outgoing direction
/// and the reflected complex E-field (spec.md §4.4).
pub struct ReflectedField {
    pub direction: Vec3<f64>,
    pub field: Vec3<Complex<f64>>,
}

/// Applies Fresnel reflection at a hit with face `normal` and `material`:
/// the outgoing field retains the TE component times `r_s` and the TM
/// component times `r_p`, in the mirror-reflected direction (spec.md §4.4,
/// §4.5). `ground` suppresses contributions whose reflected direction points
/// into the half-space below the face.
pub fn reflect(
    e_inc: Vec3<Complex<f64>>,
    incident_dir: Vec3<f64>,
    normal: Vec3<f64>,
    material: &Material,
    ground: bool,
) -> Option<ReflectedField> {
    let direction = reflect_direction(incident_dir, normal);
    if ground && direction.dot(normal) < 0.0 {
        return None;
    }

    let cos_theta_i = (-incident_dir.dot(normal)).clamp(-1.0, 1.0);
    let (r_s, r_p) = fresnel_coefficients(cos_theta_i, material);
    let (te_basis, te, tm_basis, tm) = decompose_polarisation(e_inc, incident_dir, normal);

    let te_out = te * r_s;
    let tm_out = tm * r_p;
    let field = Vec3::new(
        Complex::<f64>::from(te_basis.x) * te_out + Complex::<f64>::from(tm_basis.x) * tm_out,
        Complex::<f64>::from(te_basis.y) * te_out + Complex::<f64>::from(tm_basis.y) * tm_out,
        Complex::<f64>::from(te_basis.z) * te_out + Complex::<f64>::from(tm_basis.z) * tm_out,
    );
    Some(ReflectedField { direction, field })
}

/// The scattered field toward an observation point: the aperture-radiation
/// form of `face_area * surface_current * exp(-jkR) / R` (spec.md §4.5),
/// with the standard far-field prefactor `j*k/(2*pi)` that a uniform-current
/// aperture integral carries (needed to reproduce the flat-plate RCS
/// invariant `4*pi*A^2/lambda^2`, spec.md §8 scenario S4). `r` is the
/// distance hit -> observer and `k = 2*pi*f/c`.
pub fn scattered_field(
    surface_current: Vec3<Complex<f64>>,
    face_area: f64,
    r: f64,
    k: f64,
) -> Vec3<Complex<f64>> {
    if r <= 0.0 {
        let z = Complex::new(0.0, 0.0);
        return Vec3::new(z, z, z);
    }
    let phase = Complex::new(0.0, -k * r);
    let prefactor = Complex::new(0.0, k / (2.0 * std::f64::consts::PI)) * face_area / r;
    let factor = prefactor * phase.exp();
    surface_current * factor
}
