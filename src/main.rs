// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

mod logger;
mod opmode;
mod state;

use botkit::{
    hardware::OpMode,
    sim::SimHardwareMap,
    DriveDir, Robot, RobotConfig, TAG,
};
use log::{error, info, LevelFilter};
use opmode::DemoOpMode;
use state::Snapshot;
use std::{env, process::ExitCode, time::Duration};

const LOG_FILE: &str = "shelby.log";
const PERIOD: Duration = Duration::from_millis(50);
const RUN_TIME: Duration = Duration::from_secs(3);

/// Tick at which the robot starts driving pusher end first.
const FLIP_TICK: u32 = 30;

/// Degrees the simulated robot turns each tick.
const TURN_RATE: i32 = 3;

fn main() -> ExitCode {
    if let Err(e) = logger::init(LOG_FILE, LevelFilter::Info) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let config = match env::args().nth(1) {
        Some(path) => match RobotConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(target: TAG, "{e}");
                return ExitCode::FAILURE;
            }
        },
        None => RobotConfig::default(),
    };

    let map = SimHardwareMap::fully_populated();
    let gyro = map.gyro();

    let mut robot = Robot::new(config);
    robot.init(DemoOpMode::new(map, RUN_TIME));
    robot.set_drive_dir(DriveDir::Sweeper);
    robot.set_init_hdg(0f64);

    if !robot.calibrate_gyro() {
        error!(target: TAG, "continuing without a calibrated gyro");
    }

    let mut tick = 0u32;

    while !robot.op().is_some_and(|op| op.is_stop_requested()) {
        if tick == FLIP_TICK {
            let dir = robot.invert_drive_dir();
            info!(target: TAG, "Driving {dir} first");
        }

        if let Some(drive) = robot.drivetrain_mut() {
            if let Err(e) = drive.set_power(0.5f64, 0.3f64) {
                error!(target: TAG, "could not drive: {e}");
            }
        }

        if let Some(gyro) = &gyro {
            gyro.set_integrated_z(gyro.state().integrated_z + TURN_RATE);
        }

        match serde_json::to_string(&Snapshot::capture(tick, &mut robot)) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(target: TAG, "could not serialize snapshot: {e}"),
        }

        robot.wait_for_tick(PERIOD);
        tick += 1;
    }

    info!(target: TAG, "Stopped after {tick} ticks");
    log::logger().flush();
    ExitCode::SUCCESS
}
