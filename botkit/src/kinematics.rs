// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use serde::{Deserialize, Serialize};
use std::f64;

/// Drive train constants from which encoder counts per inch of wheel travel
/// are derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kinematics {
    /// Encoder edges per revolution of the motor shaft before the gearbox.
    pub counts_per_motor_rev: f64,

    /// Every reduction between motor shaft and wheel, in order.
    pub drive_gears: Vec<f64>,

    pub wheel_diameter_in: f64,

    /// Empirical correction for wheel slip and tread compression.
    pub tune: f64,
}

impl Kinematics {
    /// Product of all drive gear ratios.
    #[must_use]
    pub fn total_gear_ratio(&self) -> f64 {
        self.drive_gears.iter().product()
    }

    /// Encoder counts per inch of wheel travel. A zero gear ratio yields zero,
    /// guarding against that is left to motion code.
    #[must_use]
    pub fn counts_per_inch(&self) -> f64 {
        (self.counts_per_motor_rev * self.total_gear_ratio())
            / (self.wheel_diameter_in * self.tune * f64::consts::PI)
    }
}

impl Default for Kinematics {
    /// Neverest motors have 7 rising edges of channel A per revolution, with
    /// quadrature that is 28 counts per shaft revolution. 40:1 gearbox into a
    /// 1:2 chain on 4 3/16" wheels.
    fn default() -> Self {
        Self {
            counts_per_motor_rev: 28f64,
            drive_gears: vec![40f64, 0.5f64],
            wheel_diameter_in: 4.1875f64,
            tune: 1f64,
        }
    }
}
