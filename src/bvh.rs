//! A binary bounding-volume hierarchy over triangles, built top-down with
//! median splits along the longest axis (spec.md §4.2).
//!
//! No teacher file covers ray acceleration (hyperdrive has no ray tracer);
//! the node layout and traversal order below are grounded on
//! `examples/justinliew-rs_pbrt_edge/src/accelerators/bvh.rs`'s `BVHAccel`
//! (recursive build over primitive centroids, flattened linear node array,
//! nearer-child-pushed-last stack traversal), reimplemented here for
//! triangle-only primitives and this crate's own `Ray`/`Vec3` types.

use crate::geom::{Aabb, Ray, Triangle, TriangleHit};

/// Maximum primitives stored in a single leaf (spec.md §4.2: "typical 4").
const LEAF_SIZE: usize = 4;

/// A triangle annotated with which target/face it came from, so a hit can be
/// routed back to the owning target's material.
#[derive(Debug, Clone, Copy)]
pub struct IndexedTriangle {
    pub triangle: Triangle,
    pub target_idx: usize,
    pub face_idx: usize,
}

enum Node {
    Leaf {
        bounds: Aabb,
        prims: Vec<usize>,
    },
    Internal {
        bounds: Aabb,
        left: Box<Node>,
        right: Box<Node>,
    },
}

pub struct Bvh {
    root: Option<Node>,
    prims: Vec<IndexedTriangle>,
}

#[derive(Debug, Clone, Copy)]
pub struct BvhHit {
    pub t: f64,
    pub u: f64,
    pub v: f64,
    pub target_idx: usize,
    pub face_idx: usize,
}

impl Bvh {
    pub fn build(prims: Vec<IndexedTriangle>) -> Self {
        if prims.is_empty() {
            return Self { root: None, prims };
        }
        let mut indices: Vec<usize> = (0..prims.len()).collect();
        let root = Some(Self::build_node(&prims, &mut indices));
        Self { root, prims }
    }

    fn bounds_of(prims: &[IndexedTriangle], indices: &[usize]) -> Aabb {
        let mut b = Aabb::empty();
        for &i in indices {
            let t = &prims[i].triangle;
            b.grow(t.v0);
            b.grow(t.v1);
            b.grow(t.v2);
        }
        b
    }

    fn build_node(prims: &[IndexedTriangle], indices: &mut [usize]) -> Node {
        let bounds = Self::bounds_of(prims, indices);
        if indices.len() <= LEAF_SIZE {
            return Node::Leaf {
                bounds,
                prims: indices.to_vec(),
            };
        }

        let centroid_bounds = {
            let mut b = Aabb::empty();
            for &i in indices.iter() {
                let t = &prims[i].triangle;
                let c = Triangle {
                    v0: t.v0,
                    v1: t.v1,
                    v2: t.v2,
                }
                .centroid();
                b.grow(c);
            }
            b
        };
        let axis = centroid_bounds.longest_axis();

        indices.sort_by(|&a, &b| {
            let ca = centroid_of(&prims[a].triangle, axis);
            let cb = centroid_of(&prims[b].triangle, axis);
            ca.partial_cmp(&cb).unwrap()
        });

        let mid = indices.len() / 2;
        let (left_idx, right_idx) = indices.split_at_mut(mid);
        let left = Box::new(Self::build_node(prims, left_idx));
        let right = Box::new(Self::build_node(prims, right_idx));
        Node::Internal {
            bounds,
            left,
            right,
        }
    }

    /// Scene extent, used by callers to scale the ray-triangle epsilon
    /// (spec.md §4.2).
    pub fn scene_extent(&self) -> f64 {
        match &self.root {
            None => 0.0,
            Some(Node::Leaf { bounds, .. }) => bounds.diagonal_length(),
            Some(Node::Internal { bounds, .. }) => bounds.diagonal_length(),
        }
    }

    /// Closest hit along the ray within `[t_min, t_max]`. Coincident hits:
    /// the lower `t` wins; exact ties are broken by `(target_idx, face_idx)`
    /// order (spec.md §4.2).
    pub fn intersect(&self, ray: &Ray, epsilon: f64, t_min: f64, t_max: f64) -> Option<BvhHit> {
        let root = self.root.as_ref()?;
        let mut stack = vec![root];
        let mut best: Option<BvhHit> = None;
        let mut closest_t = t_max;

        while let Some(node) = stack.pop() {
            let bounds = match node {
                Node::Leaf { bounds, .. } => bounds,
                Node::Internal { bounds, .. } => bounds,
            };
            if bounds.hit(ray, t_min, closest_t).is_none() {
                continue;
            }
            match node {
                Node::Leaf { prims, .. } => {
                    for &i in prims {
                        let it = &self.prims[i];
                        if let Some(TriangleHit { t, u, v }) =
                            it.triangle.intersect(ray, epsilon, closest_t)
                        {
                            let better = match &best {
                                None => true,
                                Some(b) => {
                                    t < b.t - 1e-12
                                        || ((t - b.t).abs() <= 1e-12
                                            && (it.target_idx, it.face_idx)
                                                < (b.target_idx, b.face_idx))
                                }
                            };
                            if better {
                                closest_t = t;
                                best = Some(BvhHit {
                                    t,
                                    u,
                                    v,
                                    target_idx: it.target_idx,
                                    face_idx: it.face_idx,
                                });
                            }
                        }
                    }
                }
                Node::Internal { left, right, .. } => {
                    // Nearer child pushed last so it is popped first
                    // (spec.md §4.2).
                    let left_t = left_bounds(left).hit(ray, t_min, closest_t);
                    let right_t = left_bounds(right).hit(ray, t_min, closest_t);
                    match (left_t, right_t) {
                        (Some(lt), Some(rt)) if lt <= rt => {
                            stack.push(right);
                            stack.push(left);
                        }
                        (Some(_), Some(_)) => {
                            stack.push(left);
                            stack.push(right);
                        }
                        (Some(_), None) => stack.push(left),
                        (None, Some(_)) => stack.push(right),
                        (None, None) => {}
                    }
                }
            }
        }
        best
    }
}

fn left_bounds(n: &Node) -> &Aabb {
    match n {
        Node::Leaf { bounds, .. } => bounds,
        Node::Internal { bounds, .. } => bounds,
    }
}

fn centroid_of(t: &Triangle, axis: usize) -> f64 {
    let c = t.centroid();
    match axis {
        0 => c.x,
        1 => c.y,
        _ => c.z,
    }
}

trait TriangleExt {
    fn centroid(&self) -> crate::geom::Vec3<f64>;
}

impl TriangleExt for Triangle {
    fn centroid(&self) -> crate::geom::Vec3<f64> {
        (self.v0 + self.v1 + self.v2) * (1.0 / 3.0)
    }
}
