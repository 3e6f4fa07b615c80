//! Mesh and target entities: spec.md §3.

use num_complex::Complex;

use crate::error::{Error, Result};
use crate::geom::{Triangle, Vec3};
use crate::motion::MotionModel;
use crate::param::ParamGrid;
use crate::scalar::Real;

/// A triangulated target, immutable after construction (spec.md §3).
#[derive(Debug, Clone)]
pub struct Mesh {
    points: Vec<Vec3<Real>>,
    cells: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new(points: Vec<Vec3<Real>>, cells: Vec<[u32; 3]>) -> Result<Self> {
        if points.is_empty() || cells.is_empty() {
            return Err(Error::invalid_input("mesh must have at least one face"));
        }
        for c in &cells {
            for &idx in c {
                if idx as usize >= points.len() {
                    return Err(Error::invalid_input(format!(
                        "cell index {idx} out of bounds for {} points",
                        points.len()
                    )));
                }
            }
        }
        for p in &points {
            if !p.to_f64().is_finite() {
                return Err(Error::invalid_input("mesh contains a non-finite vertex"));
            }
        }
        Ok(Self { points, cells })
    }

    pub fn points(&self) -> &[Vec3<Real>] {
        &self.points
    }

    pub fn cells(&self) -> &[[u32; 3]] {
        &self.cells
    }

    pub fn num_faces(&self) -> usize {
        self.cells.len()
    }

    /// World-space triangle for a face, given already-transformed world
    /// vertices (one per mesh point, same order as `points()`).
    pub fn face_triangle(&self, face: usize, world_vertices: &[Vec3<f64>]) -> Triangle {
        let [i0, i1, i2] = self.cells[face];
        Triangle {
            v0: world_vertices[i0 as usize],
            v1: world_vertices[i1 as usize],
            v2: world_vertices[i2 as usize],
        }
    }
}

/// Complex relative permittivity/permeability of a face's material
/// (spec.md §3, §9 Open Questions on PEC encoding).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub permittivity: Complex<f64>,
    pub permeability: Complex<f64>,
}

impl Material {
    /// Perfect electric conductor: canonicalised to `r_s = -1, r_p = +1`
    /// exactly by the physical-optics evaluator (spec.md §9 Open Questions
    /// resolves the dual `(-1, 0)` / `(1e38, 0)` source encodings to a
    /// single explicit sentinel rather than a numerically approximate one).
    pub const PEC: Material = Material {
        permittivity: Complex::new(f64::INFINITY, 0.0),
        permeability: Complex::new(1.0, 0.0),
    };

    pub fn is_pec(&self) -> bool {
        self.permittivity.re.is_infinite()
    }

    pub fn dielectric(permittivity: Complex<f64>, permeability: Complex<f64>) -> Self {
        Self {
            permittivity,
            permeability,
        }
    }
}

/// A mesh-scattering target, with time-resolved rigid-body motion.
pub struct Target {
    pub mesh: Mesh,
    pub origin: Vec3<f64>,
    pub motion: MotionModel,
    pub material: Material,
    /// Suppresses bounces whose reflected direction points into the
    /// half-space below the face (spec.md §4.5).
    pub is_ground: bool,
}

impl Target {
    pub fn new(mesh: Mesh, origin: Vec3<f64>, motion: MotionModel, material: Material) -> Self {
        Self {
            mesh,
            origin,
            motion,
            material,
            is_ground: false,
        }
    }
}

/// A closed-form point target (spec.md §3, §4.6).
#[derive(Debug, Clone)]
pub struct PointTarget {
    pub location: ParamGrid<Vec3<f64>>,
    pub velocity: ParamGrid<Vec3<f64>>,
    pub rcs_dbsm: ParamGrid<f64>,
    pub phase_deg: ParamGrid<f64>,
}

impl PointTarget {
    pub fn constant(location: Vec3<f64>, velocity: Vec3<f64>, rcs_dbsm: f64, phase_deg: f64) -> Self {
        Self {
            location: ParamGrid::Constant(location),
            velocity: ParamGrid::Constant(velocity),
            rcs_dbsm: ParamGrid::Constant(rcs_dbsm),
            phase_deg: ParamGrid::Constant(phase_deg),
        }
    }

    pub fn rcs_linear(dbsm: f64) -> f64 {
        10f64.powf(dbsm / 10.0)
    }
}
