// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

//! Ports to the robot controller SDK. Everything the rest of the crate knows
//! about physical devices goes through the traits in this module, which makes
//! them the seam for swapping the real SDK for the simulated backend in
//! [`crate::sim`].

pub mod color;
pub mod gyro;
pub mod motor;

use snafu::Snafu;
use std::{fmt, time::Duration};

pub use color::ColorSensor;
pub use gyro::GyroSensor;
pub use motor::{DcMotor, Direction, RunMode, ZeroPowerBehavior};

/// Symbolic names devices must be configured under on the robot controller.
pub mod names {
    pub const LEFT_DRIVE: &str = "leftdrive";
    pub const RIGHT_DRIVE: &str = "rightdrive";
    pub const ELEVATOR: &str = "elevmotor";
    pub const SWEEPER: &str = "sweepmotor";
    pub const LEFT_SHOOTER: &str = "leftshooter";
    pub const RIGHT_SHOOTER: &str = "rightshooter";
    pub const LEFT_PUSHER: &str = "lpusher";
    pub const RIGHT_PUSHER: &str = "rpusher";
    pub const GYRO: &str = "gyro";
    pub const COLOR: &str = "color";
    pub const DIM: &str = "dim";
}

/// Common surface of every device handle.
pub trait HardwareDevice {
    /// Human readable description of where the device is attached.
    fn connection_info(&self) -> String;
}

/// A positional servo.
pub trait Servo: HardwareDevice {
    /// Commands the servo to a position between 0 and 1.
    fn set_position(&mut self, position: f64) -> DeviceResult<()>;
}

/// A device interface module, only ever bound so its presence can be checked.
pub trait DeviceInterfaceModule: HardwareDevice {}

/// Name indexed lookup of device handles, split into one namespace per device
/// kind. Handles are returned by value; what a handle actually is (a proxy, a
/// shared reference, ...) is up to the implementation.
pub trait HardwareMap {
    type Motor: DcMotor;
    type Servo: Servo;
    type Gyro: GyroSensor;
    type Color: ColorSensor;
    type Dim: DeviceInterfaceModule;

    fn dc_motor(&mut self, name: &str) -> Result<Self::Motor, LookupError>;
    fn servo(&mut self, name: &str) -> Result<Self::Servo, LookupError>;
    fn gyro_sensor(&mut self, name: &str) -> Result<Self::Gyro, LookupError>;
    fn color_sensor(&mut self, name: &str) -> Result<Self::Color, LookupError>;
    fn device_interface_module(&mut self, name: &str) -> Result<Self::Dim, LookupError>;
}

/// Passage of time as seen by the running opmode.
pub trait Timebase {
    /// Monotonic time since the opmode started.
    fn elapsed(&self) -> Duration;

    /// Cooperatively yields for the given duration.
    fn sleep(&mut self, duration: Duration);
}

/// The running opmode: hands out the hardware map, lets the robot sleep and
/// tells it when the driver station asked for a stop.
pub trait OpMode: Timebase {
    type Hardware: HardwareMap;

    fn hardware_map(&mut self) -> &mut Self::Hardware;

    fn is_stop_requested(&self) -> bool;
}

/// The namespaces of a [`HardwareMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    DcMotor,
    Servo,
    GyroSensor,
    ColorSensor,
    DeviceInterfaceModule,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DcMotor => "dc motor",
            Self::Servo => "servo",
            Self::GyroSensor => "gyro sensor",
            Self::ColorSensor => "color sensor",
            Self::DeviceInterfaceModule => "device interface module",
        })
    }
}

/// A symbolic name did not resolve to a device of the requested kind.
#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
#[snafu(display("no {kind} named \"{name}\" in hardware map"))]
pub struct LookupError {
    pub kind: DeviceKind,
    pub name: String,
}

impl LookupError {
    pub fn new(kind: DeviceKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
        }
    }
}

/// Result of an operation on a device handle.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// A device handle refused an operation.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum DeviceError {
    /// The device stopped responding.
    #[snafu(display("device \"{name}\" is disconnected"))]
    Disconnected { name: String },

    /// Power was infinite or `NaN`.
    #[snafu(display("invalid power {power}, must be a real number"))]
    InvalidPower { power: f64 },
}
