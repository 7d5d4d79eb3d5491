// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use botkit::{hardware::OpMode, Capabilities, DriveDir, Heading, Robot};
use serde::{Deserialize, Serialize};

/// What the robot looked like on one tick of the opmode loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    tick: u32,
    elapsed_ms: u64,
    drive_dir: DriveDir,
    calibration_drive_dir: DriveDir,
    capabilities: Capabilities,
    gyro_ready: bool,
    heading: Heading,
    cpi: f64,
}

impl Snapshot {
    pub fn capture<O: OpMode>(tick: u32, robot: &mut Robot<O>) -> Self {
        Self {
            tick,
            elapsed_ms: robot
                .op()
                .map_or(0, |op| u64::try_from(op.elapsed().as_millis()).unwrap_or(u64::MAX)),
            drive_dir: robot.drive_dir(),
            calibration_drive_dir: robot.calibration_drive_dir(),
            capabilities: robot.capabilities(),
            gyro_ready: robot.gyro_ready(),
            heading: robot.gyro_fhdg(),
            cpi: robot.cpi(),
        }
    }
}
