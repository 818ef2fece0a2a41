//! # Sentence Decoders
//!
//! One [`SentenceParser`](crate::SentenceParser) per supported sentence type.
//! Each parser owns the [`ParsedValue`](crate::ParsedValue) slots it publishes
//! to; consumers read them back through
//! [`Decoder::parser`](crate::Decoder::parser).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{IResult, fields::parsable_enum, fields::parse::invalid};

mod gga;
mod gll;
mod gsv;
mod mwv;
mod pqtmtar;
mod psti;
mod rmc;
mod vtg;

pub use gga::GgaParser;
pub use gll::GllParser;
pub use gsv::{GsvParser, SatelliteInView, SatelliteSystem};
pub use mwv::{MwvParser, SpeedUnit, WindReference};
pub use pqtmtar::{HeadingStatus, PqtmtarParser};
pub use psti::{Psti030Parser, Psti032Parser, PstiParser};
pub use rmc::RmcParser;
pub use vtg::VtgParser;

/// Human-readable names of [`GnssQuality`] values, indexed by discriminant.
pub static GNSS_QUALITY_STRINGS: [&str; 10] = [
    "no GPS",
    "GNSS Fix",
    "DGNSS fix",
    "Precise GNSS",
    "RTK fixed integer",
    "RTK float",
    "Estimated (DR) mode",
    "Manual input",
    "Simulator mode",
    "Error",
];

/// Quality of a GNSS solution.
///
/// Discriminants 0 to 8 follow the GGA fix quality codes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GnssQuality {
    NoGps = 0,
    GnssFix = 1,
    DgnssFix = 2,
    PreciseGnss = 3,
    RtkFixedInteger = 4,
    RtkFloat = 5,
    EstimatedMode = 6,
    ManualInput = 7,
    SimulatorMode = 8,
    Error = 9,
}

impl GnssQuality {
    /// Maps a GGA fix quality code.
    pub fn from_gga_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::NoGps,
            1 => Self::GnssFix,
            2 => Self::DgnssFix,
            3 => Self::PreciseGnss,
            4 => Self::RtkFixedInteger,
            5 => Self::RtkFloat,
            6 => Self::EstimatedMode,
            7 => Self::ManualInput,
            8 => Self::SimulatorMode,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        GNSS_QUALITY_STRINGS[self as usize]
    }
}

impl fmt::Display for GnssQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GGA fix quality field, `0`..=`8`.
pub(crate) fn gga_quality(i: &str) -> IResult<&str, GnssQuality> {
    let (rest, code) = nom::character::complete::u8(i)?;
    let quality = GnssQuality::from_gga_code(code).ok_or_else(|| invalid(i))?;

    Ok((rest, quality))
}

parsable_enum! {
    /// Positioning mode indicator
    pub enum ModeIndicator {
        /// N - Data not valid
        'N' => NotValid,
        /// A - Autonomous
        'A' => Autonomous,
        /// D - Differential
        'D' => Differential,
        /// P - Precise
        'P' => Precise,
        /// R - RTK fixed
        'R' => RtkFixed,
        /// F - RTK float
        'F' => RtkFloat,
        /// E - Estimated (dead reckoning)
        'E' => Estimated,
        /// M - Manual input
        'M' => Manual,
        /// S - Simulator
        'S' => Simulator,
    }
}

impl ModeIndicator {
    pub fn quality(self) -> GnssQuality {
        match self {
            Self::NotValid => GnssQuality::NoGps,
            Self::Autonomous => GnssQuality::GnssFix,
            Self::Differential => GnssQuality::DgnssFix,
            Self::Precise => GnssQuality::PreciseGnss,
            Self::RtkFixed => GnssQuality::RtkFixedInteger,
            Self::RtkFloat => GnssQuality::RtkFloat,
            Self::Estimated => GnssQuality::EstimatedMode,
            Self::Manual => GnssQuality::ManualInput,
            Self::Simulator => GnssQuality::SimulatorMode,
        }
    }
}
