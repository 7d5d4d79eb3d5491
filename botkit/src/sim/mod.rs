// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

//! Simulated robot controller. Devices record every command they receive and
//! hand out clones that share state, so a test can keep one handle for
//! inspection while the robot owns another.

mod devices;

pub use devices::{ColorState, GyroState, MotorState, SimColor, SimDim, SimGyro, SimMotor, SimServo};

use crate::hardware::{names, DeviceKind, HardwareMap, LookupError, OpMode, Timebase};
use std::{collections::HashMap, time::Duration};

/// A hardware map holding simulated devices.
#[derive(Clone, Debug, Default)]
pub struct SimHardwareMap {
    motors: HashMap<String, SimMotor>,
    servos: HashMap<String, SimServo>,
    gyros: HashMap<String, SimGyro>,
    colors: HashMap<String, SimColor>,
    dims: HashMap<String, SimDim>,
}

impl SimHardwareMap {
    /// Map with no devices at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map with every device the robot expects, under its expected name. The
    /// gyro finishes calibrating after a few polls.
    #[must_use]
    pub fn fully_populated() -> Self {
        let mut map = Self::empty();

        for name in [
            names::LEFT_DRIVE,
            names::RIGHT_DRIVE,
            names::ELEVATOR,
            names::SWEEPER,
            names::LEFT_SHOOTER,
            names::RIGHT_SHOOTER,
        ] {
            map.insert_motor(name);
        }

        map.insert_servo(names::LEFT_PUSHER);
        map.insert_servo(names::RIGHT_PUSHER);
        map.insert_gyro(names::GYRO, SimGyro::new(names::GYRO));
        map.insert_color(names::COLOR);
        map.insert_dim(names::DIM);
        map
    }

    /// Removes the named devices from every namespace.
    #[must_use]
    pub fn without(mut self, names: &[&str]) -> Self {
        for name in names {
            self.motors.remove(*name);
            self.servos.remove(*name);
            self.gyros.remove(*name);
            self.colors.remove(*name);
            self.dims.remove(*name);
        }

        self
    }

    pub fn insert_motor(&mut self, name: &str) -> SimMotor {
        let motor = SimMotor::new(name);
        self.motors.insert(name.to_owned(), motor.clone());
        motor
    }

    pub fn insert_servo(&mut self, name: &str) -> SimServo {
        let servo = SimServo::new(name);
        self.servos.insert(name.to_owned(), servo.clone());
        servo
    }

    /// Registers the given gyro, replacing any gyro of the same name.
    pub fn insert_gyro(&mut self, name: &str, gyro: SimGyro) -> SimGyro {
        self.gyros.insert(name.to_owned(), gyro.clone());
        gyro
    }

    pub fn insert_color(&mut self, name: &str) -> SimColor {
        let color = SimColor::new(name);
        self.colors.insert(name.to_owned(), color.clone());
        color
    }

    pub fn insert_dim(&mut self, name: &str) -> SimDim {
        let dim = SimDim::new(name);
        self.dims.insert(name.to_owned(), dim.clone());
        dim
    }

    /// Inspection handle to a motor.
    #[must_use]
    pub fn motor(&self, name: &str) -> Option<SimMotor> {
        self.motors.get(name).cloned()
    }

    #[must_use]
    pub fn sim_servo(&self, name: &str) -> Option<SimServo> {
        self.servos.get(name).cloned()
    }

    #[must_use]
    pub fn gyro(&self) -> Option<SimGyro> {
        self.gyros.get(names::GYRO).cloned()
    }

    #[must_use]
    pub fn color(&self) -> Option<SimColor> {
        self.colors.get(names::COLOR).cloned()
    }
}

/// Clones the device out of `devices` or reports the name as unresolved.
fn lookup<T: Clone>(
    devices: &HashMap<String, T>,
    kind: DeviceKind,
    name: &str,
) -> Result<T, LookupError> {
    devices
        .get(name)
        .cloned()
        .ok_or_else(|| LookupError::new(kind, name))
}

impl HardwareMap for SimHardwareMap {
    type Motor = SimMotor;
    type Servo = SimServo;
    type Gyro = SimGyro;
    type Color = SimColor;
    type Dim = SimDim;

    fn dc_motor(&mut self, name: &str) -> Result<SimMotor, LookupError> {
        lookup(&self.motors, DeviceKind::DcMotor, name)
    }

    fn servo(&mut self, name: &str) -> Result<SimServo, LookupError> {
        lookup(&self.servos, DeviceKind::Servo, name)
    }

    fn gyro_sensor(&mut self, name: &str) -> Result<SimGyro, LookupError> {
        lookup(&self.gyros, DeviceKind::GyroSensor, name)
    }

    fn color_sensor(&mut self, name: &str) -> Result<SimColor, LookupError> {
        lookup(&self.colors, DeviceKind::ColorSensor, name)
    }

    fn device_interface_module(&mut self, name: &str) -> Result<SimDim, LookupError> {
        lookup(&self.dims, DeviceKind::DeviceInterfaceModule, name)
    }
}

/// An opmode over a [`SimHardwareMap`] with a virtual clock. Time only moves
/// when the robot sleeps or the test calls [`SimOpMode::advance`], so timing
/// behavior is exact and tests run instantly.
#[derive(Debug, Default)]
pub struct SimOpMode {
    map: SimHardwareMap,
    now: Duration,
    stop_requested: bool,
    stop_at: Option<Duration>,
    slept: Duration,
}

impl SimOpMode {
    #[must_use]
    pub fn new(map: SimHardwareMap) -> Self {
        Self {
            map,
            ..Self::default()
        }
    }

    /// Moves the clock forward, standing in for work done by the caller.
    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }

    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Requests a stop once the clock reaches `at`.
    pub fn stop_at(&mut self, at: Duration) {
        self.stop_at = Some(at);
    }

    /// Total time spent in [`Timebase::sleep`].
    #[must_use]
    pub fn slept(&self) -> Duration {
        self.slept
    }

    #[must_use]
    pub fn map(&self) -> &SimHardwareMap {
        &self.map
    }
}

impl Timebase for SimOpMode {
    fn elapsed(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
        self.slept += duration;
    }
}

impl OpMode for SimOpMode {
    type Hardware = SimHardwareMap;

    fn hardware_map(&mut self) -> &mut SimHardwareMap {
        &mut self.map
    }

    fn is_stop_requested(&self) -> bool {
        self.stop_requested || self.stop_at.is_some_and(|at| self.now >= at)
    }
}
