// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Neg, Sub},
};

/// A heading in whole degrees. Headings do not preserve the number of turns,
/// a heading of 365 degrees becomes 5 degrees, and are always kept within
/// (-180, 180]. Exactly -180 is reported as 180.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Heading {
    degrees: i32,
}

impl Heading {
    pub const ZERO: Self = Self { degrees: 0 };

    /// Creates a heading from any number of degrees, wrapping it into range.
    #[must_use]
    pub fn from_degrees(degrees: i64) -> Self {
        Self {
            degrees: wrap_degrees(degrees),
        }
    }

    #[inline]
    #[must_use]
    pub fn degrees(&self) -> i32 {
        self.degrees
    }

    #[inline]
    #[must_use]
    pub fn radians(&self) -> f64 {
        f64::from(self.degrees).to_radians()
    }
}

/// Reduces `degrees` into (-180, 180] with a single modular reduction.
#[inline]
#[must_use]
pub fn wrap_degrees(degrees: i64) -> i32 {
    // Reduced before any arithmetic so no input can overflow.
    let r = degrees.rem_euclid(360);
    (if r > 180 { r - 360 } else { r }) as i32
}

/// Combines a raw integrated gyro reading with mount orientation, the
/// starting heading and the drive direction flip.
///
/// # Arguments
///
/// * `raw` - Integrated Z reading, positive counter clockwise when upright.
/// * `init_hdg` - Heading the robot started the run at.
/// * `inverted` - The gyro is mounted upside down.
/// * `flipped` - Driving with the opposite end forward from the one the gyro
/// was calibrated with.
#[must_use]
pub fn fuse(raw: i32, init_hdg: i32, inverted: bool, flipped: bool) -> Heading {
    let g_dir: i64 = if inverted { -1 } else { 1 };
    let dir_adj: i64 = if flipped { 180 } else { 0 };

    Heading::from_degrees(g_dir * i64::from(raw) + i64::from(init_hdg) + dir_adj)
}

impl Add<Heading> for Heading {
    type Output = Self;

    fn add(self, other: Heading) -> Self {
        Self::from_degrees(i64::from(self.degrees) + i64::from(other.degrees))
    }
}

impl Sub<Heading> for Heading {
    type Output = Self;

    fn sub(self, other: Heading) -> Self {
        Self::from_degrees(i64::from(self.degrees) - i64::from(other.degrees))
    }
}

impl Neg for Heading {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_degrees(-i64::from(self.degrees))
    }
}

impl From<Heading> for i32 {
    fn from(value: Heading) -> Self {
        value.degrees
    }
}

impl Display for Heading {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::{fuse, wrap_degrees, Heading};

    #[test]
    fn wraps_into_half_open_range() {
        let vals = [
            (0, 0),
            (180, 180),
            (-180, 180),
            (-179, -179),
            (181, -179),
            (-181, 179),
            (360, 0),
            (540, 180),
            (-540, 180),
            (725, 5),
        ];

        for (deg, wrapped) in vals {
            assert_eq!(wrap_degrees(deg), wrapped, "wrapping {deg}");
        }
    }

    #[test]
    fn extreme_inputs_stay_in_range() {
        for raw in [i32::MIN, i32::MIN + 1, -1, 0, 1, i32::MAX] {
            for init in [i32::MIN, -90, 0, 90, i32::MAX] {
                for inverted in [false, true] {
                    for flipped in [false, true] {
                        let h = fuse(raw, init, inverted, flipped).degrees();
                        assert!(h > -180 && h <= 180, "{raw} {init} -> {h}");
                    }
                }
            }
        }

        for deg in [i64::MIN, i64::MIN + 1, i64::MAX - 1, i64::MAX] {
            let h = Heading::from_degrees(deg).degrees();
            assert!(h > -180 && h <= 180, "{deg} -> {h}");
            assert_eq!((i128::from(deg) - i128::from(h)).rem_euclid(360), 0);
        }

        assert_eq!(Heading::from_degrees(i64::MIN).degrees(), -8);
        assert_eq!(Heading::from_degrees(i64::MAX).degrees(), 7);
    }

    #[test]
    fn radians() {
        assert_eq!(Heading::ZERO.radians(), 0f64);
        assert!((Heading::from_degrees(180).radians() - std::f64::consts::PI).abs() < 1e-12);
        assert!((Heading::from_degrees(-90).radians() + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn fused_boundaries() {
        assert_eq!(fuse(180, 0, false, false).degrees(), 180);
        assert_eq!(fuse(-181, 0, false, false).degrees(), 179);
        assert_eq!(fuse(0, 0, true, true).degrees(), 180);
        assert_eq!(fuse(10, 0, true, true).degrees(), 170);
        assert_eq!(fuse(10, 0, true, false).degrees(), -10);
        assert_eq!(fuse(30, 45, false, false).degrees(), 75);
    }

    #[test]
    fn operators_rewrap() {
        let a = Heading::from_degrees(170);
        let b = Heading::from_degrees(20);

        assert_eq!((a + b).degrees(), -170);
        assert_eq!((b - a).degrees(), -150);
        assert_eq!((-Heading::from_degrees(180)).degrees(), 180);
        assert_eq!(a.to_string(), "170°");
    }
}
