// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

//! Hardware definition of a two wheel drop center competition robot with a
//! collector, a flywheel shooter and beacon pushers.

pub mod camera;
pub mod capability;
pub mod config;
pub mod drive;
pub mod gyro;
pub mod hardware;
pub mod heading;
pub mod kinematics;
pub mod metronome;
pub mod robot;
pub mod sim;

pub use capability::{Capabilities, Capability};
pub use config::RobotConfig;
pub use drive::DriveDir;
pub use heading::Heading;
pub use robot::Robot;

/// Log target of everything the robot reports.
pub const TAG: &str = "SJH";
