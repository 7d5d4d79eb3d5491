// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

//! The robot: its subsystems as bound at init, which end is the front, and
//! the gyro heading relative to the end that was the front at calibration.

pub mod bind;

use crate::{
    camera::CameraPose,
    capability::{Capabilities, Capability},
    config::{Geometry, RobotConfig},
    drive::{DriveDir, Drivetrain},
    gyro::{GyroController, GyroError},
    hardware::{ColorSensor, GyroSensor, HardwareMap, OpMode},
    heading::Heading,
    metronome::Metronome,
    TAG,
};
use bind::{BindResult, Collector, Pushers, Sensors, Shooter};
use log::{error, info, warn};
use std::{cell::OnceCell, time::Duration};

/// Time the color sensor LED is given to settle when toggled.
pub const COLOR_SETTLE: Duration = Duration::from_millis(50);

pub type HardwareOf<O> = <O as OpMode>::Hardware;
pub type MotorOf<O> = <HardwareOf<O> as HardwareMap>::Motor;
pub type ServoOf<O> = <HardwareOf<O> as HardwareMap>::Servo;
pub type GyroOf<O> = <HardwareOf<O> as HardwareMap>::Gyro;
pub type ColorOf<O> = <HardwareOf<O> as HardwareMap>::Color;
pub type DimOf<O> = <HardwareOf<O> as HardwareMap>::Dim;

pub struct Robot<O: OpMode> {
    config: RobotConfig,
    cpi: f64,
    op: Option<O>,

    drivetrain: Option<Drivetrain<MotorOf<O>>>,
    collector: Option<Collector<MotorOf<O>>>,
    shooter: Option<Shooter<MotorOf<O>>>,
    pushers: Option<Pushers<ServoOf<O>>>,
    sensors: Option<Sensors<DimOf<O>, GyroOf<O>, ColorOf<O>>>,

    drive_dir: DriveDir,

    /// Front end at the time the gyro frame was pinned, set once.
    calibration_dir: OnceCell<DriveDir>,

    gyro: GyroController,
    color_enabled: bool,
    metronome: Metronome,
    camera: CameraPose,
}

impl<O: OpMode> Robot<O> {
    /// Creates a robot with no subsystems. Nothing touches hardware until
    /// [`Robot::init`].
    #[must_use]
    pub fn new(config: RobotConfig) -> Self {
        Self {
            cpi: 0f64,
            op: None,
            drivetrain: None,
            collector: None,
            shooter: None,
            pushers: None,
            sensors: None,
            drive_dir: DriveDir::Unknown,
            calibration_dir: OnceCell::new(),
            gyro: GyroController::new(config.gyro.clone()),
            color_enabled: false,
            metronome: Metronome::default(),
            camera: CameraPose::from_config(&config.camera),
            config,
        }
    }

    /// Computes counts per inch and binds every subsystem whose devices are
    /// present. A subsystem that fails to bind is logged and left absent, it
    /// never keeps the others from binding.
    pub fn init(&mut self, mut op: O) {
        self.compute_cpi();

        let map = op.hardware_map();
        self.drivetrain = bound(Capability::Drivetrain, bind::drivetrain(map));
        self.collector = bound(Capability::Collector, bind::collector(map));
        self.shooter = bound(Capability::Shooter, bind::shooter(map));
        self.pushers = bound(Capability::Pusher, bind::pushers(map));
        self.sensors = bound(Capability::Sensor, bind::sensors(map));

        self.metronome = Metronome::new(&op);
        self.op = Some(op);

        if let Some(sensors) = &mut self.sensors {
            for enabled in [false, true] {
                if let Err(e) = sensors.color.enable_led(enabled) {
                    warn!(target: TAG, "could not toggle color sensor LED: {e}");
                }
            }

            self.turn_color_off();
        }

        self.log_capabilities();
    }

    pub fn compute_cpi(&mut self) {
        self.cpi = self.config.kinematics.counts_per_inch();
        info!(target: TAG, "CPI: {:5.2}", self.cpi);
    }

    /// Encoder counts per inch of travel, 0 until [`Robot::init`].
    #[inline]
    #[must_use]
    pub fn cpi(&self) -> f64 {
        self.cpi
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            drivetrain: self.drivetrain.is_some(),
            shooter: self.shooter.is_some(),
            collector: self.collector.is_some(),
            pusher: self.pushers.is_some(),
            sensor: self.sensors.is_some(),
        }
    }

    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().has(capability)
    }

    fn log_capabilities(&self) {
        for (capability, present) in self.capabilities().iter() {
            info!(target: TAG, "Capability {capability}: {present}");
        }
    }

    /// Makes `dir` the front of the robot, swapping the logical drive motors.
    /// `Unknown` is not a valid choice and becomes `Sweeper`. The first
    /// direction ever set becomes the calibration direction.
    pub fn set_drive_dir(&mut self, dir: DriveDir) {
        let dir = if dir == DriveDir::Unknown {
            error!(target: TAG, "setDriveDir called with UNKNOWN, using SWEEPER");
            DriveDir::Sweeper
        } else {
            dir
        };

        if self.calibration_dir.set(dir).is_ok() {
            info!(target: TAG, "Calibration drive direction {dir}");
        }

        if self.drive_dir == dir {
            return;
        }

        if let Some(drive) = &mut self.drivetrain {
            if let Err(e) = drive.face(dir) {
                error!(target: TAG, "could not set drive motor directions: {e}");
            }
        }

        self.drive_dir = dir;
        info!(target: TAG, "Drive direction {dir}");
    }

    /// Swaps the front and back of the robot, returning the new front.
    pub fn invert_drive_dir(&mut self) -> DriveDir {
        let dir = self.drive_dir.inverted();
        self.set_drive_dir(dir);
        dir
    }

    #[inline]
    #[must_use]
    pub fn drive_dir(&self) -> DriveDir {
        self.drive_dir
    }

    /// `Unknown` until a drive direction is first set.
    #[must_use]
    pub fn calibration_drive_dir(&self) -> DriveDir {
        self.calibration_dir.get().copied().unwrap_or_default()
    }

    /// Calibrates and zeroes the gyro. Returns `false` without a gyro, on
    /// timeout, or when the opmode is stopped mid calibration.
    pub fn calibrate_gyro(&mut self) -> bool {
        if self.sensors.is_none() || self.op.is_none() {
            error!(target: TAG, "no gyro to calibrate");
            return false;
        }

        if self.calibration_dir.get().is_none() {
            info!(target: TAG, "Drive direction not set before gyro calibration, using SWEEPER");
            self.set_drive_dir(DriveDir::Sweeper);
        }

        match (&mut self.sensors, &mut self.op) {
            (Some(sensors), Some(op)) => self.gyro.calibrate(&mut sensors.gyro, op),
            _ => false,
        }
    }

    /// Zeroes the gyro. Does nothing unless calibrated.
    pub fn reset_gyro(&mut self) {
        if let Some(sensors) = &mut self.sensors {
            self.gyro.reset(&mut sensors.gyro);
        }
    }

    /// Raw integrated Z reading in degrees, positive counter clockwise when
    /// mounted upright.
    pub fn gyro_hdg(&self) -> Result<i32, GyroError> {
        let sensors = self.sensors.as_ref().ok_or(GyroError::Missing)?;
        Ok(sensors.gyro.integrated_z_value()?)
    }

    /// Heading relative to the calibration frame, accounting for the gyro
    /// mount and for driving with the other end forward. Zero without a gyro.
    pub fn gyro_fhdg(&mut self) -> Heading {
        let flipped = self.calibration_drive_dir() != self.drive_dir;

        let Some(sensors) = &self.sensors else {
            return Heading::ZERO;
        };

        match self.gyro.fused(&sensors.gyro, flipped) {
            Ok(heading) => heading,
            Err(e) => {
                error!(target: TAG, "could not read gyro: {e}");
                Heading::ZERO
            }
        }
    }

    /// Sets the heading the run starts at, rounded to the nearest degree with
    /// halves rounding up.
    pub fn set_init_hdg(&mut self, init_hdg: f64) {
        self.gyro.set_init_hdg((init_hdg + 0.5f64).floor() as i32);
    }

    #[inline]
    #[must_use]
    pub fn init_hdg(&self) -> i32 {
        self.gyro.init_hdg()
    }

    pub fn set_gyro_inverted(&mut self, inverted: bool) {
        self.gyro.set_inverted(inverted);
    }

    #[inline]
    #[must_use]
    pub fn gyro_inverted(&self) -> bool {
        self.gyro.inverted()
    }

    #[inline]
    #[must_use]
    pub fn gyro_ready(&self) -> bool {
        self.gyro.ready()
    }

    /// Waits for the LED to settle, then turns it on.
    pub fn turn_color_on(&mut self) {
        let (Some(sensors), Some(op)) = (&mut self.sensors, &mut self.op) else {
            return;
        };

        self.color_enabled = true;
        op.sleep(COLOR_SETTLE);

        if let Err(e) = sensors.color.enable_led(true) {
            warn!(target: TAG, "could not turn color sensor LED on: {e}");
        }
    }

    /// Turns the LED off, then waits for it to settle.
    pub fn turn_color_off(&mut self) {
        let (Some(sensors), Some(op)) = (&mut self.sensors, &mut self.op) else {
            return;
        };

        self.color_enabled = false;

        if let Err(e) = sensors.color.enable_led(false) {
            warn!(target: TAG, "could not turn color sensor LED off: {e}");
        }

        op.sleep(COLOR_SETTLE);
    }

    #[inline]
    #[must_use]
    pub fn color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Sleeps out the rest of `period` since the last tick, see
    /// [`Metronome::wait_for_tick`].
    pub fn wait_for_tick(&mut self, period: Duration) -> Duration {
        match &mut self.op {
            Some(op) => self.metronome.wait_for_tick(op, period),
            None => {
                warn!(target: TAG, "waitForTick called before init");
                Duration::ZERO
            }
        }
    }

    #[must_use]
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.config.geometry
    }

    /// Camera pose for this robot's configuration.
    #[must_use]
    pub fn camera_pose(&self) -> &CameraPose {
        &self.camera
    }

    #[must_use]
    pub fn drivetrain(&self) -> Option<&Drivetrain<MotorOf<O>>> {
        self.drivetrain.as_ref()
    }

    pub fn drivetrain_mut(&mut self) -> Option<&mut Drivetrain<MotorOf<O>>> {
        self.drivetrain.as_mut()
    }

    #[must_use]
    pub fn collector(&self) -> Option<&Collector<MotorOf<O>>> {
        self.collector.as_ref()
    }

    pub fn collector_mut(&mut self) -> Option<&mut Collector<MotorOf<O>>> {
        self.collector.as_mut()
    }

    #[must_use]
    pub fn shooter(&self) -> Option<&Shooter<MotorOf<O>>> {
        self.shooter.as_ref()
    }

    pub fn shooter_mut(&mut self) -> Option<&mut Shooter<MotorOf<O>>> {
        self.shooter.as_mut()
    }

    #[must_use]
    pub fn pushers(&self) -> Option<&Pushers<ServoOf<O>>> {
        self.pushers.as_ref()
    }

    pub fn pushers_mut(&mut self) -> Option<&mut Pushers<ServoOf<O>>> {
        self.pushers.as_mut()
    }

    #[must_use]
    pub fn sensors(&self) -> Option<&Sensors<DimOf<O>, GyroOf<O>, ColorOf<O>>> {
        self.sensors.as_ref()
    }

    /// The opmode handed to [`Robot::init`].
    #[must_use]
    pub fn op(&self) -> Option<&O> {
        self.op.as_ref()
    }

    pub fn op_mut(&mut self) -> Option<&mut O> {
        self.op.as_mut()
    }
}

impl<O: OpMode> Default for Robot<O> {
    fn default() -> Self {
        Self::new(RobotConfig::default())
    }
}

/// Logs a failed binding and keeps a successful one.
fn bound<T>(capability: Capability, result: BindResult<T>) -> Option<T> {
    match result {
        Ok(subsystem) => Some(subsystem),
        Err(e) => {
            error!(target: TAG, "ERROR get hardware map {capability}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hardware::{names, Direction, RunMode, Timebase, ZeroPowerBehavior},
        sim::{SimGyro, SimHardwareMap, SimOpMode},
    };

    fn robot_with(map: SimHardwareMap) -> (Robot<SimOpMode>, SimHardwareMap) {
        let mut robot = Robot::default();
        robot.init(SimOpMode::new(map.clone()));
        (robot, map)
    }

    fn elapsed(robot: &Robot<SimOpMode>) -> Duration {
        robot.op().map(|op| op.elapsed()).unwrap()
    }

    #[test]
    fn full_init() {
        let (robot, map) = robot_with(SimHardwareMap::fully_populated());

        assert!(Capability::ALL.iter().all(|c| robot.has(*c)));

        let left = map.motor(names::LEFT_DRIVE).unwrap().state();
        assert_eq!(left.direction, Some(Direction::Forward));
        assert_eq!(left.mode, Some(RunMode::RunUsingEncoder));
        assert_eq!(left.power, 0f64);
        assert_eq!(left.zero_power_behavior, Some(ZeroPowerBehavior::Brake));

        let expected = 560f64 / (4.1875f64 * std::f64::consts::PI);
        assert!(((robot.cpi() - expected) / expected).abs() <= 1e-9);
        assert_eq!(robot.drive_dir(), DriveDir::Unknown);
        assert_eq!(robot.calibration_drive_dir(), DriveDir::Unknown);
    }

    #[test]
    fn init_exercises_color_led() {
        let (robot, map) = robot_with(SimHardwareMap::fully_populated());

        assert_eq!(map.color().unwrap().state().led_history, vec![false, true, false]);
        assert!(!robot.color_enabled());
        assert_eq!(elapsed(&robot), COLOR_SETTLE);
    }

    #[test]
    fn init_without_shooter() {
        let (robot, _) = robot_with(
            SimHardwareMap::fully_populated().without(&[names::LEFT_SHOOTER, names::RIGHT_SHOOTER]),
        );
        let caps = robot.capabilities();

        assert!(!caps.shooter);
        assert!(caps.drivetrain && caps.collector && caps.pusher && caps.sensor);
        assert!(robot.shooter().is_none());
    }

    #[test]
    fn init_with_nothing() {
        let (mut robot, _) = robot_with(SimHardwareMap::empty());

        assert_eq!(robot.capabilities(), Capabilities::default());
        assert!(!robot.calibrate_gyro());
        assert_eq!(robot.gyro_fhdg(), Heading::ZERO);
        assert_eq!(robot.gyro_hdg(), Err(GyroError::Missing));

        robot.turn_color_on();
        assert!(!robot.color_enabled());

        robot.set_drive_dir(DriveDir::Pusher);
        assert_eq!(robot.drive_dir(), DriveDir::Pusher);
    }

    #[test]
    fn uninitialized_robot_is_inert() {
        let mut robot: Robot<SimOpMode> = Robot::default();

        assert_eq!(robot.cpi(), 0f64);
        assert!(!robot.calibrate_gyro());
        assert_eq!(robot.wait_for_tick(Duration::from_millis(50)), Duration::ZERO);
        assert!(robot.op().is_none());
    }

    #[test]
    fn direction_flip_swaps_drive_motors() {
        let (mut robot, map) = robot_with(SimHardwareMap::fully_populated());

        robot.set_drive_dir(DriveDir::Sweeper);
        assert_eq!(robot.drivetrain().unwrap().left().name(), names::LEFT_DRIVE);

        robot.set_drive_dir(DriveDir::Pusher);
        let drive = robot.drivetrain().unwrap();
        assert_eq!(drive.left().name(), names::RIGHT_DRIVE);
        assert_eq!(drive.right().name(), names::LEFT_DRIVE);

        // The polarity constants follow the logical sides.
        assert_eq!(
            map.motor(names::RIGHT_DRIVE).unwrap().state().direction,
            Some(Direction::Forward)
        );
        assert_eq!(
            map.motor(names::LEFT_DRIVE).unwrap().state().direction,
            Some(Direction::Reverse)
        );
    }

    #[test]
    fn unknown_becomes_sweeper() {
        let (mut robot, _) = robot_with(SimHardwareMap::fully_populated());

        robot.set_drive_dir(DriveDir::Unknown);

        assert_eq!(robot.drive_dir(), DriveDir::Sweeper);
        assert_eq!(robot.calibration_drive_dir(), DriveDir::Sweeper);
    }

    #[test]
    fn set_drive_dir_is_idempotent() {
        let (mut robot, map) = robot_with(SimHardwareMap::fully_populated());

        robot.set_drive_dir(DriveDir::Pusher);
        let left = map.motor(names::LEFT_DRIVE).unwrap().state();
        let right = map.motor(names::RIGHT_DRIVE).unwrap().state();

        robot.set_drive_dir(DriveDir::Pusher);

        assert_eq!(robot.drive_dir(), DriveDir::Pusher);
        assert_eq!(robot.calibration_drive_dir(), DriveDir::Pusher);
        assert_eq!(robot.drivetrain().unwrap().left().name(), names::RIGHT_DRIVE);
        assert_eq!(map.motor(names::LEFT_DRIVE).unwrap().state(), left);
        assert_eq!(map.motor(names::RIGHT_DRIVE).unwrap().state(), right);
    }

    #[test]
    fn calibration_dir_is_write_once() {
        let (mut robot, _) = robot_with(SimHardwareMap::fully_populated());

        robot.set_drive_dir(DriveDir::Pusher);
        robot.set_drive_dir(DriveDir::Sweeper);
        robot.invert_drive_dir();
        robot.set_drive_dir(DriveDir::Unknown);

        assert_eq!(robot.calibration_drive_dir(), DriveDir::Pusher);
    }

    #[test]
    fn invert_twice_returns() {
        let (mut robot, _) = robot_with(SimHardwareMap::fully_populated());

        assert_eq!(robot.invert_drive_dir(), DriveDir::Sweeper);

        for start in [DriveDir::Sweeper, DriveDir::Pusher] {
            robot.set_drive_dir(start);
            robot.invert_drive_dir();
            assert_eq!(robot.invert_drive_dir(), start);
            assert_eq!(robot.drive_dir(), start);
        }
    }

    #[test]
    fn heading_under_flip() {
        let (mut robot, map) = robot_with(SimHardwareMap::fully_populated());

        robot.set_drive_dir(DriveDir::Sweeper);
        robot.set_drive_dir(DriveDir::Pusher);
        map.gyro().unwrap().set_integrated_z(10);

        assert!(robot.gyro_inverted());
        assert_eq!(robot.init_hdg(), 0);
        assert_eq!(robot.gyro_fhdg().degrees(), 170);
        assert_eq!(robot.gyro_hdg(), Ok(10));

        robot.set_drive_dir(DriveDir::Sweeper);
        assert_eq!(robot.gyro_fhdg().degrees(), -10);
    }

    #[test]
    fn calibrates_and_resets() {
        let (mut robot, map) = robot_with(SimHardwareMap::fully_populated());
        let gyro = map.gyro().unwrap();
        gyro.set_integrated_z(33);

        assert!(robot.calibrate_gyro());
        assert!(robot.gyro_ready());
        assert_eq!(robot.calibration_drive_dir(), DriveDir::Sweeper);
        assert_eq!(robot.drive_dir(), DriveDir::Sweeper);
        assert_eq!(gyro.state().integrated_z, 0);

        gyro.set_integrated_z(-45);
        robot.reset_gyro();
        assert_eq!(gyro.state().integrated_z, 0);
        assert_eq!(gyro.state().integrator_resets, 2);
    }

    #[test]
    fn calibration_keeps_chosen_direction() {
        let (mut robot, _) = robot_with(SimHardwareMap::fully_populated());

        robot.set_drive_dir(DriveDir::Pusher);
        assert!(robot.calibrate_gyro());
        assert_eq!(robot.calibration_drive_dir(), DriveDir::Pusher);
        assert_eq!(robot.drive_dir(), DriveDir::Pusher);
    }

    #[test]
    fn calibration_timeout() {
        let mut map = SimHardwareMap::fully_populated();
        let gyro = map.insert_gyro(names::GYRO, SimGyro::new(names::GYRO).never_finishes());
        let (mut robot, _) = robot_with(map);
        let start = elapsed(&robot);

        assert!(!robot.calibrate_gyro());

        let took = elapsed(&robot) - start;
        assert!(took >= Duration::from_millis(5000));
        assert!(took < Duration::from_millis(5100));
        assert!(!robot.gyro_ready());

        gyro.set_integrated_z(12);
        robot.reset_gyro();
        assert_eq!(gyro.state().integrated_z, 12);
        assert_eq!(gyro.state().integrator_resets, 0);
    }

    #[test]
    fn stop_during_calibration() {
        let mut map = SimHardwareMap::fully_populated();
        let gyro = map.insert_gyro(names::GYRO, SimGyro::new(names::GYRO).never_finishes());
        let (mut robot, _) = robot_with(map);

        robot.op_mut().unwrap().request_stop();

        assert!(!robot.calibrate_gyro());
        assert!(!robot.gyro_ready());
        assert_eq!(gyro.state().calibrate_calls, 1);
        assert_eq!(gyro.state().integrator_resets, 0);
    }

    #[test]
    fn init_hdg_rounds_half_up() {
        let mut robot: Robot<SimOpMode> = Robot::default();

        for (given, stored) in [(44.4, 44), (44.5, 45), (-2.5, -2), (-2.6, -3), (0.0, 0)] {
            robot.set_init_hdg(given);
            assert_eq!(robot.init_hdg(), stored);
        }
    }

    #[test]
    fn color_led_timing() {
        let (mut robot, map) = robot_with(SimHardwareMap::fully_populated());
        let color = map.color().unwrap();
        let start = elapsed(&robot);

        robot.turn_color_on();
        assert!(robot.color_enabled());
        assert!(color.state().led);
        assert_eq!(elapsed(&robot) - start, COLOR_SETTLE);

        robot.turn_color_off();
        assert!(!robot.color_enabled());
        assert!(!color.state().led);
        assert_eq!(elapsed(&robot) - start, COLOR_SETTLE * 2);
    }

    #[test]
    fn metronome_cadence() {
        let (mut robot, _) = robot_with(SimHardwareMap::fully_populated());
        let period = Duration::from_millis(50);

        robot.wait_for_tick(period);
        let start = elapsed(&robot);

        for _ in 0..10 {
            robot.op_mut().unwrap().advance(Duration::from_millis(12));
            robot.wait_for_tick(period);
        }

        let took = elapsed(&robot) - start;
        assert!(took >= Duration::from_millis(500));
        assert!(took < Duration::from_millis(520));
    }

    #[test]
    fn config_flows_through() {
        let config = RobotConfig::from_json_str(
            r#"{ "gyro": { "inverted": false }, "camera": { "z_in": 10 } }"#,
        )
        .unwrap();
        let robot: Robot<SimOpMode> = Robot::new(config);

        assert!(!robot.gyro_inverted());
        assert!((robot.camera_pose().translation_mm().z - 254f64).abs() < 1e-9);
        assert_eq!(robot.geometry(), &Geometry::default());
    }
}
