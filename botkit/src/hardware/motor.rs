// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use super::{DeviceResult, HardwareDevice, InvalidPowerSnafu};
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// A DC motor with an optional quadrature encoder.
pub trait DcMotor: HardwareDevice {
    fn set_direction(&mut self, direction: Direction) -> DeviceResult<()>;

    /// Sets motor power. Implementations should pass the value through
    /// [`checked_power`] before applying it.
    fn set_power(&mut self, power: f64) -> DeviceResult<()>;

    fn set_zero_power_behavior(&mut self, behavior: ZeroPowerBehavior) -> DeviceResult<()>;

    fn set_mode(&mut self, mode: RunMode) -> DeviceResult<()>;

    /// Encoder position in counts.
    fn current_position(&self) -> DeviceResult<i32>;
}

/// Maximum power a motor can be set to, finite numbers greater than this are
/// clamped within range.
pub const MAX_POWER: f64 = 1f64;

/// Minimum power a motor can be set to, finite numbers less than this are
/// clamped within range.
pub const MIN_POWER: f64 = -MAX_POWER;

/// Validates a requested power. Returns an error if `power` is infinite or
/// `NaN`, otherwise the power clamped between [`MIN_POWER`] and [`MAX_POWER`].
pub fn checked_power(power: f64) -> DeviceResult<f64> {
    ensure!(power.is_finite(), InvalidPowerSnafu { power });
    Ok(power.clamp(MIN_POWER, MAX_POWER))
}

/// Which way the motor shaft turns for positive power.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Reverse,
}

/// What the motor does when commanded to zero power.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroPowerBehavior {
    Brake,
    Float,
}

/// Motor controller mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Zeroes the encoder and holds the motor still.
    StopAndResetEncoder,

    /// Closed loop speed control using the encoder.
    RunUsingEncoder,

    /// Open loop, power is applied directly.
    RunWithoutEncoder,
}
