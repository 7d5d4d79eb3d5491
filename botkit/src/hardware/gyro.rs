// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use super::{DeviceResult, HardwareDevice};

/// A single axis rate gyro that integrates heading about its Z axis.
pub trait GyroSensor: HardwareDevice {
    /// Starts calibration, the gyro should not be moved until
    /// [`GyroSensor::is_calibrating`] returns `false`.
    fn calibrate(&mut self) -> DeviceResult<()>;

    fn is_calibrating(&self) -> DeviceResult<bool>;

    /// Zeroes the integrated Z value.
    fn reset_z_axis_integrator(&mut self) -> DeviceResult<()>;

    /// Integrated heading in whole degrees, positive counter clockwise when
    /// the gyro is mounted upright.
    fn integrated_z_value(&self) -> DeviceResult<i32>;
}
