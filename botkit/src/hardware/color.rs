// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use super::{DeviceResult, HardwareDevice};

/// A color sensor with an illumination LED.
pub trait ColorSensor: HardwareDevice {
    fn enable_led(&mut self, enabled: bool) -> DeviceResult<()>;
}
