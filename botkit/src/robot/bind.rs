// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

//! One-shot acquisition and setup of each subsystem's devices. A subsystem is
//! only returned once every device it needs has resolved and accepted its
//! setup, a partially bound subsystem is dropped.

use crate::{
    drive::{Drivetrain, LEFT_DIR, RIGHT_DIR},
    hardware::{
        names, DcMotor, DeviceError, Direction, HardwareDevice, HardwareMap, LookupError, RunMode,
        ZeroPowerBehavior,
    },
    TAG,
};
use log::debug;
use snafu::{ResultExt, Snafu};

/// Why a subsystem could not be bound.
#[derive(Clone, Debug, PartialEq, Snafu)]
pub enum BindError {
    #[snafu(display("{source}"), context(false))]
    Lookup { source: LookupError },

    #[snafu(display("could not configure \"{name}\": {source}"))]
    Configure { name: String, source: DeviceError },
}

pub type BindResult<T> = Result<T, BindError>;

/// Elevator and sweeper motors.
#[derive(Debug)]
pub struct Collector<M> {
    pub elevator: M,
    pub sweeper: M,
}

/// Left and right flywheel motors.
#[derive(Debug)]
pub struct Shooter<M> {
    pub left: M,
    pub right: M,
}

/// Beacon pusher servos, bound but never positioned here.
#[derive(Debug)]
pub struct Pushers<S> {
    pub left: S,
    pub right: S,
}

#[derive(Debug)]
pub struct Sensors<D, G, C> {
    pub dim: D,
    pub gyro: G,
    pub color: C,
}

/// Setup applied to a freshly resolved motor.
#[derive(Clone, Copy, Debug)]
struct MotorSetup {
    direction: Direction,
    zero_power_behavior: Option<ZeroPowerBehavior>,
    reset_encoder: bool,
    mode: RunMode,
}

impl MotorSetup {
    fn apply<M: DcMotor>(&self, motor: &mut M) -> Result<(), DeviceError> {
        motor.set_direction(self.direction)?;
        motor.set_power(0f64)?;

        if let Some(behavior) = self.zero_power_behavior {
            motor.set_zero_power_behavior(behavior)?;
        }

        if self.reset_encoder {
            motor.set_mode(RunMode::StopAndResetEncoder)?;
        }

        motor.set_mode(self.mode)
    }
}

fn motor<H: HardwareMap>(map: &mut H, name: &str, setup: MotorSetup) -> BindResult<H::Motor> {
    let mut motor = map.dc_motor(name)?;
    setup.apply(&mut motor).context(ConfigureSnafu { name })?;
    Ok(motor)
}

pub fn drivetrain<H: HardwareMap>(map: &mut H) -> BindResult<Drivetrain<H::Motor>> {
    let setup = |direction| MotorSetup {
        direction,
        zero_power_behavior: Some(ZeroPowerBehavior::Brake),
        reset_encoder: true,
        mode: RunMode::RunUsingEncoder,
    };

    let left = motor(map, names::LEFT_DRIVE, setup(LEFT_DIR))?;
    let right = motor(map, names::RIGHT_DRIVE, setup(RIGHT_DIR))?;

    Ok(Drivetrain::new(left, right))
}

pub fn collector<H: HardwareMap>(map: &mut H) -> BindResult<Collector<H::Motor>> {
    let setup = |direction| MotorSetup {
        direction,
        zero_power_behavior: None,
        reset_encoder: false,
        mode: RunMode::RunWithoutEncoder,
    };

    Ok(Collector {
        elevator: motor(map, names::ELEVATOR, setup(Direction::Reverse))?,
        sweeper: motor(map, names::SWEEPER, setup(Direction::Forward))?,
    })
}

pub fn shooter<H: HardwareMap>(map: &mut H) -> BindResult<Shooter<H::Motor>> {
    let setup = |direction| MotorSetup {
        direction,
        zero_power_behavior: None,
        reset_encoder: true,
        mode: RunMode::RunUsingEncoder,
    };

    Ok(Shooter {
        left: motor(map, names::LEFT_SHOOTER, setup(Direction::Forward))?,
        right: motor(map, names::RIGHT_SHOOTER, setup(Direction::Reverse))?,
    })
}

pub fn pushers<H: HardwareMap>(map: &mut H) -> BindResult<Pushers<H::Servo>> {
    Ok(Pushers {
        left: map.servo(names::LEFT_PUSHER)?,
        right: map.servo(names::RIGHT_PUSHER)?,
    })
}

/// Binds the interface module, gyro and color sensor. The color sensor LED is
/// left for the caller to exercise.
pub fn sensors<H: HardwareMap>(map: &mut H) -> BindResult<Sensors<H::Dim, H::Gyro, H::Color>> {
    let dim = map.device_interface_module(names::DIM)?;
    let gyro = map.gyro_sensor(names::GYRO)?;
    debug!(target: TAG, "gyro connected at {}", gyro.connection_info());
    let color = map.color_sensor(names::COLOR)?;
    debug!(target: TAG, "color sensor connected at {}", color.connection_info());

    Ok(Sensors { dim, gyro, color })
}
