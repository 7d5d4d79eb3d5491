// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use botkit::{
    hardware::{OpMode, Timebase},
    sim::SimHardwareMap,
};
use std::{
    thread,
    time::{Duration, Instant},
};

/// Runs simulated hardware on the wall clock, stopping itself once its run
/// time is up.
pub struct DemoOpMode {
    map: SimHardwareMap,
    start: Instant,
    run_time: Duration,
}

impl DemoOpMode {
    pub fn new(map: SimHardwareMap, run_time: Duration) -> Self {
        Self {
            map,
            start: Instant::now(),
            run_time,
        }
    }
}

impl Timebase for DemoOpMode {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

impl OpMode for DemoOpMode {
    type Hardware = SimHardwareMap;

    fn hardware_map(&mut self) -> &mut SimHardwareMap {
        &mut self.map
    }

    fn is_stop_requested(&self) -> bool {
        self.elapsed() >= self.run_time
    }
}
