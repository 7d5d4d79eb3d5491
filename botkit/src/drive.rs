// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use crate::hardware::{DcMotor, DeviceResult, Direction};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Direction the left drive motor is set to spin for forward travel.
pub const LEFT_DIR: Direction = Direction::Forward;

/// Direction the right drive motor is set to spin for forward travel.
pub const RIGHT_DIR: Direction = Direction::Reverse;

/// Which end of the robot is treated as the front.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveDir {
    /// No direction has been chosen yet.
    #[default]
    Unknown,

    /// The sweeper end leads.
    Sweeper,

    /// The pusher end leads.
    Pusher,
}

impl DriveDir {
    /// The opposite end. `Unknown` is treated like `Pusher` and so yields
    /// `Sweeper`.
    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Self::Sweeper => Self::Pusher,
            Self::Pusher | Self::Unknown => Self::Sweeper,
        }
    }
}

impl Display for DriveDir {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "UNKNOWN",
            Self::Sweeper => "SWEEPER",
            Self::Pusher => "PUSHER",
        })
    }
}

/// The two drive motors. The physical motors never change, which of them is
/// the logical left or right depends on which end of the robot is facing
/// forward.
#[derive(Debug)]
pub struct Drivetrain<M> {
    /// Motor bound as `leftdrive`.
    port: M,

    /// Motor bound as `rightdrive`.
    starboard: M,

    facing: DriveDir,
}

impl<M: DcMotor> Drivetrain<M> {
    /// Creates a drivetrain facing `Sweeper` from already configured motors.
    #[must_use]
    pub fn new(port: M, starboard: M) -> Self {
        Self {
            port,
            starboard,
            facing: DriveDir::Sweeper,
        }
    }

    #[inline]
    #[must_use]
    pub fn facing(&self) -> DriveDir {
        self.facing
    }

    /// Swaps the logical motors for the given direction and reapplies
    /// [`LEFT_DIR`] and [`RIGHT_DIR`] to them.
    pub fn face(&mut self, dir: DriveDir) -> DeviceResult<()> {
        self.facing = dir;

        let (left, right) = self.sides_mut();
        left.set_direction(LEFT_DIR)?;
        right.set_direction(RIGHT_DIR)
    }

    #[must_use]
    pub fn left(&self) -> &M {
        match self.facing {
            DriveDir::Pusher => &self.starboard,
            DriveDir::Sweeper | DriveDir::Unknown => &self.port,
        }
    }

    #[must_use]
    pub fn right(&self) -> &M {
        match self.facing {
            DriveDir::Pusher => &self.port,
            DriveDir::Sweeper | DriveDir::Unknown => &self.starboard,
        }
    }

    /// Logical (left, right) motors.
    pub fn sides_mut(&mut self) -> (&mut M, &mut M) {
        match self.facing {
            DriveDir::Pusher => (&mut self.starboard, &mut self.port),
            DriveDir::Sweeper | DriveDir::Unknown => (&mut self.port, &mut self.starboard),
        }
    }

    /// Sets power on the logical left and right motors.
    pub fn set_power(&mut self, left: f64, right: f64) -> DeviceResult<()> {
        let (l, r) = self.sides_mut();
        l.set_power(left)?;
        r.set_power(right)
    }
}
