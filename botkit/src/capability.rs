// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A subsystem whose presence is detected when the robot binds its hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Drivetrain,
    Shooter,
    Collector,
    Pusher,
    Sensor,
}

impl Capability {
    pub const ALL: [Self; 5] = [
        Self::Drivetrain,
        Self::Shooter,
        Self::Collector,
        Self::Pusher,
        Self::Sensor,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Drivetrain => "drivetrain",
            Self::Shooter => "shooter",
            Self::Collector => "collector",
            Self::Pusher => "pusher",
            Self::Sensor => "sensor",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which capabilities came up. All absent until the robot is initialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub drivetrain: bool,
    pub shooter: bool,
    pub collector: bool,
    pub pusher: bool,
    pub sensor: bool,
}

impl Capabilities {
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Drivetrain => self.drivetrain,
            Capability::Shooter => self.shooter,
            Capability::Collector => self.collector,
            Capability::Pusher => self.pusher,
            Capability::Sensor => self.sensor,
        }
    }

    /// Every capability alongside whether it is present.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        Capability::ALL.into_iter().map(|c| (c, self.has(c)))
    }
}
