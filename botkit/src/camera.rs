// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

//! Where the phone camera sits on the robot.
//!
//! With the phone flat in portrait, screen up, the camera frame has X towards
//! the volume button edge, Y towards the headphone jack edge and Z out of the
//! camera. Mounting it on the front of the robot looking forward would be -90
//! about Z then -90 about X; the competition robot leaves it unrotated.

use crate::config::CameraConfig;
use nalgebra::{Isometry3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};
use std::sync::LazyLock;

pub const MM_PER_INCH: f64 = 25.4;

static DEFAULT_POSE: LazyLock<CameraPose> =
    LazyLock::new(|| CameraPose::from_config(&CameraConfig::default()));

/// Camera pose in the robot frame, millimeters and radians.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraPose {
    orientation: Rotation3<f64>,
    translation_mm: Vector3<f64>,
}

impl CameraPose {
    /// Builds a pose from an offset in inches and extrinsic X, Y, Z rotations
    /// in degrees.
    #[must_use]
    pub fn new(offset_in: [f64; 3], rotation_deg: [f64; 3]) -> Self {
        let [x, y, z] = offset_in;
        let [rx, ry, rz] = rotation_deg;

        Self {
            // Extrinsic XYZ is Rz * Ry * Rx, which is what nalgebra's
            // roll/pitch/yaw constructor produces.
            orientation: Rotation3::from_euler_angles(
                rx.to_radians(),
                ry.to_radians(),
                rz.to_radians(),
            ),
            translation_mm: Vector3::new(x, y, z) * MM_PER_INCH,
        }
    }

    #[must_use]
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new([config.x_in, config.y_in, config.z_in], config.rotation_deg)
    }

    /// The pose of the competition robot, computed once per process.
    #[must_use]
    pub fn default_pose() -> &'static Self {
        &DEFAULT_POSE
    }

    #[must_use]
    pub fn orientation(&self) -> &Rotation3<f64> {
        &self.orientation
    }

    #[must_use]
    pub fn translation_mm(&self) -> &Vector3<f64> {
        &self.translation_mm
    }

    /// Translation applied after the rotation.
    #[must_use]
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.translation_mm),
            UnitQuaternion::from_rotation_matrix(&self.orientation),
        )
    }

    /// Homogeneous 4x4 form of [`CameraPose::isometry`].
    #[must_use]
    pub fn location_on_robot(&self) -> Matrix4<f64> {
        self.isometry().to_homogeneous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_pose_is_identity() {
        let pose = CameraPose::default_pose();

        assert_eq!(pose.orientation(), &Rotation3::identity());
        assert_eq!(pose.location_on_robot(), Matrix4::identity());
    }

    #[test]
    fn inches_become_millimeters() {
        let pose = CameraPose::new([1f64, 2f64, 11f64], [0f64; 3]);
        let t = pose.translation_mm();

        assert!(close(t.x, 25.4));
        assert!(close(t.y, 50.8));
        assert!(close(t.z, 279.4));

        let m = pose.location_on_robot();
        assert!(close(m[(0, 3)], 25.4));
        assert!(close(m[(2, 3)], 279.4));
        assert!(close(m[(3, 3)], 1f64));
    }

    #[test]
    fn translation_applies_after_rotation() {
        let pose = CameraPose::new([0f64, 9f64, 0f64], [0f64, 0f64, 90f64]);
        let p = pose.isometry() * Point3::new(10f64, 0f64, 0f64);

        // +X rotated 90 about Z lands on +Y, then shifted by the offset.
        assert!(close(p.x, 0f64));
        assert!(close(p.y, 10f64 + 9f64 * MM_PER_INCH));
        assert!(close(p.z, 0f64));
    }

    #[test]
    fn extrinsic_order() {
        // X then Z: +Y -> +Z (about X) -> stays +Z (about Z).
        let pose = CameraPose::new([0f64; 3], [90f64, 0f64, 90f64]);
        let v = pose.orientation() * Vector3::new(0f64, 1f64, 0f64);

        assert!(close(v.x, 0f64));
        assert!(close(v.y, 0f64));
        assert!(close(v.z, 1f64));
    }
}
