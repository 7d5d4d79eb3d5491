// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use crate::hardware::{
    motor::checked_power, ColorSensor, DcMotor, DeviceInterfaceModule, DeviceResult,
    DisconnectedSnafu, Direction, GyroSensor, HardwareDevice, RunMode, Servo, ZeroPowerBehavior,
};
use snafu::ensure;
use std::{cell::RefCell, rc::Rc};

/// Everything a [`SimMotor`] has been told.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotorState {
    pub direction: Option<Direction>,
    pub power: f64,
    pub zero_power_behavior: Option<ZeroPowerBehavior>,

    /// Current mode, the last entry of `mode_history`.
    pub mode: Option<RunMode>,
    pub mode_history: Vec<RunMode>,
    pub position: i32,
    pub disconnected: bool,
}

#[derive(Clone, Debug)]
pub struct SimMotor {
    name: String,
    state: Rc<RefCell<MotorState>>,
}

impl SimMotor {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            state: Rc::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the motor's state.
    #[must_use]
    pub fn state(&self) -> MotorState {
        self.state.borrow().clone()
    }

    /// Makes every later command fail.
    pub fn disconnect(&self) {
        self.state.borrow_mut().disconnected = true;
    }

    /// Moves the encoder, only counted while in a mode using it.
    pub fn turn(&self, counts: i32) {
        let mut state = self.state.borrow_mut();

        if state.mode == Some(RunMode::RunUsingEncoder) {
            state.position += counts;
        }
    }

    fn connected(&self) -> DeviceResult<()> {
        ensure!(
            !self.state.borrow().disconnected,
            DisconnectedSnafu { name: &self.name }
        );
        Ok(())
    }
}

impl HardwareDevice for SimMotor {
    fn connection_info(&self) -> String {
        format!("sim://dc-motor/{}", self.name)
    }
}

impl DcMotor for SimMotor {
    fn set_direction(&mut self, direction: Direction) -> DeviceResult<()> {
        self.connected()?;
        self.state.borrow_mut().direction = Some(direction);
        Ok(())
    }

    fn set_power(&mut self, power: f64) -> DeviceResult<()> {
        self.connected()?;
        let power = checked_power(power)?;
        self.state.borrow_mut().power = power;
        Ok(())
    }

    fn set_zero_power_behavior(&mut self, behavior: ZeroPowerBehavior) -> DeviceResult<()> {
        self.connected()?;
        self.state.borrow_mut().zero_power_behavior = Some(behavior);
        Ok(())
    }

    fn set_mode(&mut self, mode: RunMode) -> DeviceResult<()> {
        self.connected()?;
        let mut state = self.state.borrow_mut();

        if mode == RunMode::StopAndResetEncoder {
            state.position = 0;
        }

        state.mode = Some(mode);
        state.mode_history.push(mode);
        Ok(())
    }

    fn current_position(&self) -> DeviceResult<i32> {
        self.connected()?;
        Ok(self.state.borrow().position)
    }
}

#[derive(Clone, Debug)]
pub struct SimServo {
    name: String,
    position: Rc<RefCell<Option<f64>>>,
}

impl SimServo {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            position: Rc::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last commanded position, `None` if never commanded.
    #[must_use]
    pub fn position(&self) -> Option<f64> {
        *self.position.borrow()
    }
}

impl HardwareDevice for SimServo {
    fn connection_info(&self) -> String {
        format!("sim://servo/{}", self.name)
    }
}

impl Servo for SimServo {
    fn set_position(&mut self, position: f64) -> DeviceResult<()> {
        *self.position.borrow_mut() = Some(position.clamp(0f64, 1f64));
        Ok(())
    }
}

/// Everything a [`SimGyro`] has been told, plus its scripted behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GyroState {
    pub integrated_z: i32,
    pub calibrate_calls: u32,
    pub integrator_resets: u32,
    pub calibrating: bool,

    /// Number of `is_calibrating` polls answered with `true` after each
    /// `calibrate`, `None` to never finish.
    pub calibration_polls: Option<u32>,
    polls_left: u32,
    pub disconnected: bool,
}

#[derive(Clone, Debug)]
pub struct SimGyro {
    name: String,
    state: Rc<RefCell<GyroState>>,
}

impl SimGyro {
    /// Gyro that finishes calibrating after three polls.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let gyro = Self {
            name: name.to_owned(),
            state: Rc::default(),
        };

        gyro.state.borrow_mut().calibration_polls = Some(3);
        gyro
    }

    #[must_use]
    pub fn calibrating_for(self, polls: u32) -> Self {
        self.state.borrow_mut().calibration_polls = Some(polls);
        self
    }

    #[must_use]
    pub fn never_finishes(self) -> Self {
        self.state.borrow_mut().calibration_polls = None;
        self
    }

    pub fn set_integrated_z(&self, degrees: i32) {
        self.state.borrow_mut().integrated_z = degrees;
    }

    pub fn disconnect(&self) {
        self.state.borrow_mut().disconnected = true;
    }

    #[must_use]
    pub fn state(&self) -> GyroState {
        self.state.borrow().clone()
    }

    fn connected(&self) -> DeviceResult<()> {
        ensure!(
            !self.state.borrow().disconnected,
            DisconnectedSnafu { name: &self.name }
        );
        Ok(())
    }
}

impl HardwareDevice for SimGyro {
    fn connection_info(&self) -> String {
        format!("sim://gyro/{}", self.name)
    }
}

impl GyroSensor for SimGyro {
    fn calibrate(&mut self) -> DeviceResult<()> {
        self.connected()?;
        let mut state = self.state.borrow_mut();

        state.calibrate_calls += 1;
        state.calibrating = true;
        state.polls_left = state.calibration_polls.unwrap_or(0);
        Ok(())
    }

    fn is_calibrating(&self) -> DeviceResult<bool> {
        self.connected()?;
        let mut state = self.state.borrow_mut();

        if !state.calibrating {
            return Ok(false);
        }

        if state.calibration_polls.is_none() {
            return Ok(true);
        }

        if state.polls_left == 0 {
            state.calibrating = false;
            return Ok(false);
        }

        state.polls_left -= 1;
        Ok(true)
    }

    fn reset_z_axis_integrator(&mut self) -> DeviceResult<()> {
        self.connected()?;
        let mut state = self.state.borrow_mut();

        state.integrated_z = 0;
        state.integrator_resets += 1;
        Ok(())
    }

    fn integrated_z_value(&self) -> DeviceResult<i32> {
        self.connected()?;
        Ok(self.state.borrow().integrated_z)
    }
}

/// Everything a [`SimColor`] has been told.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorState {
    pub led: bool,
    pub led_history: Vec<bool>,
}

#[derive(Clone, Debug)]
pub struct SimColor {
    name: String,
    state: Rc<RefCell<ColorState>>,
}

impl SimColor {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            state: Rc::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ColorState {
        self.state.borrow().clone()
    }
}

impl HardwareDevice for SimColor {
    fn connection_info(&self) -> String {
        format!("sim://color-sensor/{}", self.name)
    }
}

impl ColorSensor for SimColor {
    fn enable_led(&mut self, enabled: bool) -> DeviceResult<()> {
        let mut state = self.state.borrow_mut();

        state.led = enabled;
        state.led_history.push(enabled);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SimDim {
    name: String,
}

impl SimDim {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl HardwareDevice for SimDim {
    fn connection_info(&self) -> String {
        format!("sim://device-interface-module/{}", self.name)
    }
}

impl DeviceInterfaceModule for SimDim {}
