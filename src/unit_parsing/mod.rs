// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse CASA quantity strings (e.g. "0.3km/s", "0.03arcsec") into a
//! number and a unit.

mod error;

pub use error::UnitParseError;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

/// Velocity units. Units are tried in declaration order, so "km/s" must come
/// before "m/s".
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub(crate) enum VelocityUnit {
    #[strum(serialize = "km/s")]
    KmPerS,

    #[strum(serialize = "m/s")]
    MPerS,
}

impl VelocityUnit {
    pub(crate) fn to_m_per_s(self, value: f64) -> f64 {
        match self {
            VelocityUnit::KmPerS => value * 1e3,
            VelocityUnit::MPerS => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub(crate) enum AngleUnit {
    #[strum(serialize = "arcsec")]
    Arcsec,

    #[strum(serialize = "arcmin")]
    Arcmin,

    #[strum(serialize = "deg")]
    Deg,

    #[strum(serialize = "rad")]
    Rad,
}

impl AngleUnit {
    pub(crate) fn to_arcsec(self, value: f64) -> f64 {
        match self {
            AngleUnit::Arcsec => value,
            AngleUnit::Arcmin => value * 60.0,
            AngleUnit::Deg => value * 3600.0,
            AngleUnit::Rad => value.to_degrees() * 3600.0,
        }
    }
}

/// Parse a string that must have a unit of velocity attached to it.
pub(crate) fn parse_velocity(s: &str) -> Result<(f64, VelocityUnit), UnitParseError> {
    parse_quantity(s, "velocity")
}

/// Parse a string that must have a unit of angle attached to it.
pub(crate) fn parse_angle(s: &str) -> Result<(f64, AngleUnit), UnitParseError> {
    parse_quantity(s, "angle")
}

fn parse_quantity<U>(s: &str, unit_type: &'static str) -> Result<(f64, U), UnitParseError>
where
    U: IntoEnumIterator + Into<&'static str> + Copy,
{
    let trimmed = s.trim();

    // A naked number is valid CASA input, but it hides which unit CASA will
    // assume.
    if trimmed.parse::<f64>().is_ok() {
        return Err(UnitParseError::MissingUnit {
            input: s.to_string(),
            unit_type,
        });
    }

    for unit in U::iter() {
        let unit_str: &'static str = unit.into();
        if let Some(prefix) = trimmed.strip_suffix(unit_str) {
            return match prefix.trim().parse() {
                Ok(number) => Ok((number, unit)),
                Err(_) => Err(UnitParseError::GotUnitButCantParse {
                    input: s.to_string(),
                    unit: unit_str,
                }),
            };
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type,
    })
}
