//! Per-frame camera state exchanged with the rendering collaborator.

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Camera and projection state for one frame.
///
/// Owned by the rendering collaborator and passed into the core by value;
/// the core consumes it without mutation. None of the gravity math depends
/// on it; it exists so view-dependent level-of-detail decisions have the
/// data they need, and so the renderer can read back a coherent snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub camera_position: Point3<f64>,
    pub view: Matrix4<f64>,
    pub projection: Matrix4<f64>,
}

impl FrameState {
    pub fn new(camera_position: Point3<f64>, view: Matrix4<f64>, projection: Matrix4<f64>) -> Self {
        Self {
            camera_position,
            view,
            projection,
        }
    }

    /// Right-handed look-at view with a perspective projection.
    pub fn look_at(
        eye: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        aspect: f64,
        fovy: f64,
        znear: f64,
        zfar: f64,
    ) -> Self {
        Self {
            camera_position: eye,
            view: Matrix4::look_at_rh(&eye, &target, &up),
            projection: Perspective3::new(aspect, fovy, znear, zfar).to_homogeneous(),
        }
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            camera_position: Point3::origin(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        }
    }
}
