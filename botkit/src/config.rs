// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

//! Robot configuration, loadable from JSON. Every key is optional and falls
//! back to the values of the competition robot.

use crate::kinematics::Kinematics;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};
use std::{fs, io, path::Path, time::Duration};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub kinematics: Kinematics,
    pub geometry: Geometry,
    pub gyro: GyroConfig,
    pub camera: CameraConfig,
}

impl RobotConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).context(ParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the JSON configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).context(ReadSnafu {
            path: path.display().to_string(),
        })?;

        Self::from_json_str(&json)
    }

    /// Rejects constants no physical robot could have. A zero drive gear is
    /// allowed through, it only zeroes counts per inch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let k = &self.kinematics;

        ensure!(
            k.counts_per_motor_rev.is_finite() && k.counts_per_motor_rev > 0f64,
            InvalidSnafu {
                reason: "counts_per_motor_rev must be positive"
            }
        );
        ensure!(
            k.wheel_diameter_in.is_finite() && k.wheel_diameter_in > 0f64,
            InvalidSnafu {
                reason: "wheel_diameter_in must be positive"
            }
        );
        ensure!(
            k.tune.is_finite() && k.tune > 0f64,
            InvalidSnafu {
                reason: "tune must be positive"
            }
        );
        ensure!(
            k.drive_gears.iter().all(|g| g.is_finite()),
            InvalidSnafu {
                reason: "drive_gears must be finite"
            }
        );
        ensure!(
            self.gyro.poll_interval_ms > 0,
            InvalidSnafu {
                reason: "gyro poll_interval_ms must be non-zero"
            }
        );

        Ok(())
    }
}

/// Chassis dimensions in inches. The frame origin is the center of the rear
/// axle, the pivot point of the drop center drive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Width at the rear wheels.
    pub bot_width_in: f64,
    pub bot_length_in: f64,

    /// Distance from the center of the rear wheel to the tail.
    pub rear_offset_in: f64,
}

impl Geometry {
    /// Distance from the center of the rear wheel to the nose.
    #[must_use]
    pub fn front_offset_in(&self) -> f64 {
        self.bot_length_in - self.rear_offset_in
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            bot_width_in: 16.8f64,
            bot_length_in: 18f64,
            rear_offset_in: 9f64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GyroConfig {
    /// The gyro is mounted upside down.
    pub inverted: bool,
    pub calibration_timeout_ms: u64,
    pub poll_interval_ms: u64,

    /// Substitute the last good reading for a lone zero reading.
    pub filter_zero_readings: bool,

    /// Magnitude the last good reading must exceed for a zero to be
    /// considered spurious.
    pub zero_filter_threshold_deg: i32,
}

impl GyroConfig {
    #[must_use]
    pub fn calibration_timeout(&self) -> Duration {
        Duration::from_millis(self.calibration_timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            inverted: true,
            calibration_timeout_ms: 5000,
            poll_interval_ms: 50,
            filter_zero_readings: false,
            zero_filter_threshold_deg: 30,
        }
    }
}

/// Camera placement on the robot, in inches and degrees.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub x_in: f64,
    pub y_in: f64,
    pub z_in: f64,

    /// Extrinsic rotations about X, then Y, then Z.
    pub rotation_deg: [f64; 3],
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("could not read config \"{path}\": {source}"))]
    Read { path: String, source: io::Error },

    #[snafu(display("could not parse config: {source}"))]
    Parse { source: serde_json::Error },

    #[snafu(display("invalid config: {reason}"))]
    Invalid { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use aprox_eq::assert_aprox_eq;

    #[test]
    fn defaults() {
        let config = RobotConfig::default();

        assert_eq!(config.kinematics.counts_per_motor_rev, 28f64);
        assert_eq!(config.kinematics.drive_gears, vec![40f64, 0.5f64]);
        assert_eq!(config.kinematics.wheel_diameter_in, 4.1875f64);
        assert_eq!(config.kinematics.tune, 1f64);
        assert_eq!(config.geometry.bot_width_in, 16.8f64);
        assert_aprox_eq!(config.geometry.front_offset_in(), 9f64);
        assert!(config.gyro.inverted);
        assert_eq!(config.gyro.calibration_timeout(), Duration::from_secs(5));
        assert_eq!(config.gyro.poll_interval(), Duration::from_millis(50));
        assert!(!config.gyro.filter_zero_readings);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RobotConfig::from_json_str(
            r#"{ "kinematics": { "tune": 1.1 }, "gyro": { "inverted": false } }"#,
        )
        .unwrap();

        assert_eq!(config.kinematics.tune, 1.1f64);
        assert_eq!(config.kinematics.drive_gears, vec![40f64, 0.5f64]);
        assert!(!config.gyro.inverted);
        assert_eq!(config.gyro.calibration_timeout_ms, 5000);
        assert_eq!(config.geometry, Geometry::default());
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(RobotConfig::from_json_str("{}").unwrap(), RobotConfig::default());
    }

    #[test]
    fn rejects_bad_constants() {
        let err = RobotConfig::from_json_str(r#"{ "kinematics": { "wheel_diameter_in": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = RobotConfig::from_json_str(r#"{ "kinematics": { "tune": -1 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn zero_gear_is_allowed() {
        assert!(
            RobotConfig::from_json_str(r#"{ "kinematics": { "drive_gears": [40, 0] } }"#).is_ok()
        );
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            RobotConfig::from_json_str("{ kinematics"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            RobotConfig::load("/nonexistent/shelby.json"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let config = RobotConfig::default();
        let json = serde_json::to_string(&config).unwrap();

        assert_eq!(RobotConfig::from_json_str(&json).unwrap(), config);
    }
}
