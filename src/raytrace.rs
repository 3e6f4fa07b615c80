//! Shoot-and-bounce-rays tracer (spec.md §4.3, §4.4). The teacher has no ray
//! tracer of its own; the explicit work-queue shape below (rather than a
//! recursive bounce function) follows the teacher's general preference for
//! flattened iterative loops over recursion in hot paths
//! (`examples/cjordan-mwa_hyperdrive/src/model/mod.rs`'s iterator chains).

use num_complex::Complex;

use crate::bvh::{Bvh, IndexedTriangle};
use crate::config::Config;
use crate::constants::{RAY_EPSILON_SCALE, RAY_GAIN_FLOOR_DB, VEL_C};
use crate::error::RayBudgetExhausted;
use crate::geom::{Ray, Vec3};
use crate::mesh::{Material, Target};
use crate::motion::Pose;
use crate::physical_optics::{reflect, scattered_field};
use crate::raylog::RayLogRecord;
use crate::waveform::TxChannel;

/// Per-face static attributes needed by the PO evaluator at a hit, indexed
/// in parallel with the BVH's `(target_idx, face_idx)`.
#[derive(Clone, Copy)]
struct FaceAttrib {
    normal: Vec3<f64>,
    area: f64,
    material: Material,
    is_ground: bool,
}

/// A ray-traceable snapshot of the scene: every mesh target's faces, already
/// transformed to world space for this snapshot's pose, plus the resulting
/// BVH (spec.md §4.7: poses are held constant for the ray tracer between
/// snapshots).
pub struct SceneSnapshot {
    bvh: Bvh,
    faces: Vec<Vec<FaceAttrib>>,
}

impl SceneSnapshot {
    pub fn build(targets: &[Target], poses: &[Pose]) -> Self {
        let mut prims = Vec::new();
        let mut faces = Vec::with_capacity(targets.len());

        for (target_idx, (target, pose)) in targets.iter().zip(poses).enumerate() {
            let world_vertices: Vec<Vec3<f64>> = target
                .mesh
                .points()
                .iter()
                .map(|p| crate::motion::vertex_to_world(p.to_f64(), target.origin, pose))
                .collect();

            let mut target_faces = Vec::with_capacity(target.mesh.num_faces());
            for face_idx in 0..target.mesh.num_faces() {
                let tri = target.mesh.face_triangle(face_idx, &world_vertices);
                target_faces.push(FaceAttrib {
                    normal: tri.normal(),
                    area: tri.area(),
                    material: target.material,
                    is_ground: target.is_ground,
                });
                prims.push(IndexedTriangle {
                    triangle: tri,
                    target_idx,
                    face_idx,
                });
            }
            faces.push(target_faces);
        }

        Self {
            bvh: Bvh::build(prims),
            faces,
        }
    }

    fn attrib(&self, target_idx: usize, face_idx: usize) -> &FaceAttrib {
        &self.faces[target_idx][face_idx]
    }

    pub fn scene_extent(&self) -> f64 {
        self.bvh.scene_extent()
    }

    /// Exposes the underlying BVH query for other evaluators built on top of
    /// a scene snapshot (`rcs`, spec.md §4.10).
    pub fn intersect(&self, ray: &Ray, epsilon: f64, t_min: f64, t_max: f64) -> Option<crate::bvh::BvhHit> {
        self.bvh.intersect(ray, epsilon, t_min, t_max)
    }

    pub fn face_normal(&self, target_idx: usize, face_idx: usize) -> Vec3<f64> {
        self.attrib(target_idx, face_idx).normal
    }

    pub fn face_material(&self, target_idx: usize, face_idx: usize) -> Material {
        self.attrib(target_idx, face_idx).material
    }

    pub fn face_is_ground(&self, target_idx: usize, face_idx: usize) -> bool {
        self.attrib(target_idx, face_idx).is_ground
    }
}

/// A completed contribution from the ray tracer, reaching one Rx channel
/// through a scattering path of known total length (spec.md §4.4).
pub struct RayReturn {
    pub rx_idx: usize,
    /// Scalar field already projected onto the Rx channel's polarisation.
    pub field: Complex<f64>,
    /// Total path length, Tx -> ... -> Rx, metres.
    pub path_length: f64,
    pub reflections: u32,
    /// The target whose face produced the terminal hit, for the baseband
    /// integrator's per-sample Doppler correction (spec.md §4.7).
    pub target_idx: usize,
}

struct WorkItem {
    ray: Ray,
    field: Vec3<Complex<f64>>,
    path_length: f64,
    reflections: u32,
}

/// Traces all rays emitted by one Tx channel at `tx_pose` against `scene`,
/// returning every contribution that reaches an Rx channel (at `rx_world`,
/// body-relative polarisations `rx_pol`) within `config.ray_filter`.
/// `freq_hz` is the instantaneous carrier used to size the ray grid and the
/// PO wavenumber; `radar_origin_world` is used only when
/// `config.back_propagating` is set. The second tuple element is `Some` only
/// when the per-snapshot ray budget is exhausted before the sweep finishes;
/// the first element still holds every contribution accumulated up to that
/// point, since the budget cap is a warning, not a fatal error (spec.md §7).
/// `on_ray_log`, when given, is called once per accepted reflection with a
/// record suitable for appending to the on-disk ray log (spec.md §6
/// operation 5).
#[allow(clippy::too_many_arguments)]
pub fn trace_tx_channel(
    tx_ch: &TxChannel,
    tx_pose: Pose,
    rx_world: &[(Vec3<f64>, Vec3<Complex<f64>>)],
    scene: &SceneSnapshot,
    config: &Config,
    freq_hz: f64,
    radar_origin_world: Vec3<f64>,
    snapshot_index: usize,
    mut on_ray_log: Option<&mut dyn FnMut(RayLogRecord)>,
) -> (Vec<RayReturn>, Option<RayBudgetExhausted>) {
    let lambda = VEL_C / freq_hz;
    let epsilon = RAY_EPSILON_SCALE * scene.scene_extent().max(1.0);

    let az_range = std::f64::consts::PI;
    let el_range = std::f64::consts::FRAC_PI_2;

    // Tessellate the antenna's solid angle: spacing = min(configured grid
    // spacing, lambda / density / target extent) (spec.md §4.3). The target
    // extent is approximated by the scene's bounding diagonal. The gain floor
    // below only prunes directions outside a narrow-beam pattern's main lobe;
    // for a wide or isotropic pattern nothing is pruned, so spacing is also
    // floored to whatever keeps the full sweep inside the per-snapshot ray
    // budget (a 5% margin covers the `ceil` rounding on `n_az`/`n_el`).
    let target_extent = scene.scene_extent().max(lambda);
    let full_sphere = (2.0 * az_range) * (2.0 * el_range);
    let budget_spacing = (full_sphere / config.ray_budget_per_snapshot.max(1) as f64).sqrt() * 1.05;
    let spacing = tx_ch
        .grid_spacing_rad
        .min(lambda / config.density / target_extent)
        .max(budget_spacing)
        .max(1e-4);

    let n_az = ((2.0 * az_range) / spacing).ceil().max(1.0) as usize;
    let n_el = ((2.0 * el_range) / spacing).ceil().max(1.0) as usize;

    let mut returns = Vec::new();
    let mut rays_emitted: usize = 0;

    for iaz in 0..n_az {
        let phi = -az_range + (iaz as f64 + 0.5) * spacing;
        for iel in 0..n_el {
            let el = -el_range + (iel as f64 + 0.5) * spacing;
            let gain = tx_ch.pattern.gain_linear(phi, el);
            let gain_db = 10.0 * gain.log10();
            if gain_db - tx_ch.pattern.peak_gain_dbi() < RAY_GAIN_FLOOR_DB {
                continue;
            }

            rays_emitted += 1;
            if rays_emitted > config.ray_budget_per_snapshot {
                return (
                    returns,
                    Some(RayBudgetExhausted {
                        snapshot_index,
                        rays_emitted,
                        ray_budget: config.ray_budget_per_snapshot,
                    }),
                );
            }

            let local_dir = crate::geom::dir_from_az_el(phi, el);
            let world_dir = tx_pose.rotation.rotate(local_dir);
            let ray = Ray::new(tx_pose.location, world_dir);
            let amp = gain.sqrt();
            let field = tx_ch.polarization * Complex::new(amp, 0.0);

            let mut stack = vec![WorkItem {
                ray,
                field,
                path_length: 0.0,
                reflections: 0,
            }];

            while let Some(item) = stack.pop() {
                if item.reflections >= config.ray_filter.max {
                    continue;
                }
                let Some(hit) = scene.bvh.intersect(&item.ray, epsilon, epsilon, f64::INFINITY) else {
                    continue;
                };
                let hit_point = item.ray.at(hit.t);
                let path_so_far = item.path_length + hit.t;
                let attrib = scene.attrib(hit.target_idx, hit.face_idx);
                let reflections = item.reflections + 1;

                let Some(reflected) =
                    reflect(item.field, item.ray.direction, attrib.normal, &attrib.material, attrib.is_ground)
                else {
                    continue;
                };

                if let Some(cb) = on_ray_log.as_mut() {
                    cb(RayLogRecord {
                        snapshot_id: snapshot_index as u64,
                        ray_idx: (rays_emitted - 1) as u64,
                        hit_xyz: hit_point,
                        direction: reflected.direction,
                        reflections,
                    });
                }

                if config.ray_filter.contains(reflections) {
                    for (rx_idx, (rx_pos, rx_pol)) in rx_world.iter().enumerate() {
                        let to_rx = *rx_pos - hit_point;
                        let r = to_rx.length();
                        if r <= 0.0 {
                            continue;
                        }
                        let k = std::f64::consts::TAU * freq_hz / VEL_C;
                        let scattered =
                            scattered_field(reflected.field, attrib.area, r, k);
                        let proj = scattered.x * rx_pol.x.conj()
                            + scattered.y * rx_pol.y.conj()
                            + scattered.z * rx_pol.z.conj();
                        returns.push(RayReturn {
                            rx_idx,
                            field: proj,
                            path_length: path_so_far + r,
                            reflections,
                            target_idx: hit.target_idx,
                        });
                    }

                    if config.back_propagating {
                        let to_radar = radar_origin_world - hit_point;
                        let r = to_radar.length();
                        if r > epsilon {
                            let shadow = Ray::new(hit_point + attrib.normal * (epsilon * 10.0), to_radar);
                            let blocked = scene
                                .bvh
                                .intersect(&shadow, epsilon, epsilon, r - epsilon)
                                .is_some();
                            if !blocked {
                                for (rx_idx, (rx_pos, rx_pol)) in rx_world.iter().enumerate() {
                                    let to_rx = *rx_pos - hit_point;
                                    let rr = to_rx.length();
                                    if rr <= 0.0 {
                                        continue;
                                    }
                                    let k = std::f64::consts::TAU * freq_hz / VEL_C;
                                    let scattered =
                                        scattered_field(reflected.field, attrib.area, rr, k);
                                    let proj = scattered.x * rx_pol.x.conj()
                                        + scattered.y * rx_pol.y.conj()
                                        + scattered.z * rx_pol.z.conj();
                                    returns.push(RayReturn {
                                        rx_idx,
                                        field: proj,
                                        path_length: path_so_far + rr,
                                        reflections,
                                        target_idx: hit.target_idx,
                                    });
                                }
                            }
                        }
                    }
                }

                stack.push(WorkItem {
                    ray: Ray::new(hit_point + attrib.normal * (epsilon * 10.0), reflected.direction),
                    field: reflected.field,
                    path_length: path_so_far,
                    reflections,
                });
            }
        }
    }

    (returns, None)
}
