// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use crate::{
    config::GyroConfig,
    hardware::{DeviceError, DeviceResult, GyroSensor, OpMode},
    heading::{self, Heading},
    TAG,
};
use log::{error, info, warn};
use snafu::Snafu;

/// The raw gyro reading could not be taken.
#[derive(Clone, Debug, PartialEq, Snafu)]
pub enum GyroError {
    #[snafu(display("no gyro is bound"))]
    Missing,

    #[snafu(transparent)]
    Device { source: DeviceError },
}

/// Calibration, zeroing and heading fusion for a [`GyroSensor`]. Holds the
/// heading state only, the gyro itself is passed in by whoever owns it.
#[derive(Clone, Debug, PartialEq)]
pub struct GyroController {
    config: GyroConfig,
    inverted: bool,
    init_hdg: i32,
    ready: bool,
    last_raw: i32,
}

/// How a calibration attempt ended.
#[derive(Debug)]
enum Calibration {
    Done,
    TimedOut,
    Stopped,
    Failed(DeviceError),
}

impl GyroController {
    #[must_use]
    pub fn new(config: GyroConfig) -> Self {
        Self {
            inverted: config.inverted,
            config,
            init_hdg: 0,
            ready: false,
            last_raw: 0,
        }
    }

    /// `true` only if the last calibration finished within its time budget.
    #[inline]
    #[must_use]
    pub fn ready(&self) -> bool {
        self.ready
    }

    #[inline]
    #[must_use]
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    #[inline]
    #[must_use]
    pub fn init_hdg(&self) -> i32 {
        self.init_hdg
    }

    pub fn set_init_hdg(&mut self, init_hdg: i32) {
        self.init_hdg = init_hdg;
    }

    /// Calibrates the gyro, polling until it finishes, the opmode is asked to
    /// stop, or the calibration timeout passes. Zeroes the integrator and
    /// becomes ready only if calibration finished.
    pub fn calibrate<G, O>(&mut self, gyro: &mut G, op: &mut O) -> bool
    where
        G: GyroSensor,
        O: OpMode,
    {
        self.ready = false;

        info!(target: TAG, "Starting gyro calibration");

        if let Err(e) = gyro.calibrate() {
            error!(target: TAG, "could not start gyro calibration: {e}");
            return false;
        }

        let timeout = self.config.calibration_timeout();
        let poll = self.config.poll_interval();
        let start = op.elapsed();

        let outcome = loop {
            if op.is_stop_requested() {
                break Calibration::Stopped;
            }

            match gyro.is_calibrating() {
                Ok(false) => break Calibration::Done,
                Ok(true) => (),
                Err(e) => break Calibration::Failed(e),
            }

            op.sleep(poll);

            if op.elapsed().saturating_sub(start) > timeout {
                break Calibration::TimedOut;
            }
        };

        info!(
            target: TAG,
            "Gyro calibrated in {:4.2} seconds",
            op.elapsed().saturating_sub(start).as_secs_f64()
        );

        match outcome {
            Calibration::Done => match gyro.reset_z_axis_integrator() {
                Ok(()) => {
                    self.ready = true;
                    self.last_raw = 0;
                }
                Err(e) => error!(target: TAG, "could not zero gyro after calibration: {e}"),
            },
            Calibration::TimedOut => warn!(target: TAG, "GYRO INIT TIMED OUT!!"),
            Calibration::Stopped => warn!(target: TAG, "stop requested during gyro calibration"),
            Calibration::Failed(e) => error!(target: TAG, "gyro calibration failed: {e}"),
        }

        self.ready
    }

    /// Zeroes the integrator, but only once calibrated.
    pub fn reset(&mut self, gyro: &mut impl GyroSensor) {
        if !self.ready {
            return;
        }

        match gyro.reset_z_axis_integrator() {
            Ok(()) => self.last_raw = 0,
            Err(e) => error!(target: TAG, "could not reset gyro: {e}"),
        }
    }

    /// Heading fused from the gyro reading, see [`heading::fuse`].
    pub fn fused(&mut self, gyro: &impl GyroSensor, flipped: bool) -> DeviceResult<Heading> {
        let raw = self.filter(gyro.integrated_z_value()?);
        Ok(heading::fuse(raw, self.init_hdg, self.inverted, flipped))
    }

    /// Replaces a lone zero reading after a large heading with the last good
    /// reading, when enabled.
    fn filter(&mut self, raw: i32) -> i32 {
        if !self.config.filter_zero_readings {
            return raw;
        }

        let threshold = self.config.zero_filter_threshold_deg.unsigned_abs();

        if raw == 0 && self.last_raw.unsigned_abs() > threshold {
            return self.last_raw;
        }

        self.last_raw = raw;
        raw
    }
}
