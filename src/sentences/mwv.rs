use crate::{
    self as nmea0183_decoder, FromFields, ParsedValue, SentenceError, SentenceParser,
    dispatch::AddressPattern,
    fields::{Fields, parsable_enum, parse::Status},
    value::degrees_to_radians,
};

parsable_enum! {
    /// Wind angle reference
    pub enum WindReference {
        /// R - Relative to the vessel (apparent wind)
        'R' => Relative,
        /// T - Theoretical (true wind)
        'T' => True,
    }
}

parsable_enum! {
    /// Wind speed unit
    pub enum SpeedUnit {
        /// K - Kilometers per hour
        'K' => KilometersPerHour,
        /// M - Meters per second
        'M' => MetersPerSecond,
        /// N - Knots
        'N' => Knots,
        /// S - Statute miles per hour
        'S' => MilesPerHour,
    }
}

impl SpeedUnit {
    /// Factor converting a speed in this unit to meters per second.
    pub fn to_mps(self) -> f32 {
        match self {
            Self::KilometersPerHour => 0.277_778,
            Self::MetersPerSecond => 1.0,
            Self::Knots => 0.514_444,
            Self::MilesPerHour => 0.447_04,
        }
    }
}

/// MWV - Wind Speed and Angle
///
/// ```text
///         1   2 3   4 5
///         |   | |   | |
///  $--MWV,x.x,a,x.x,a,a*hh<CR><LF>
/// ```
#[derive(Debug, FromFields)]
struct Mwv {
    angle: Option<f32>,
    reference: Option<WindReference>,
    speed: Option<f32>,
    unit: SpeedUnit,
    status: Option<Status>,
}

/// Decodes wind sentences from any talker.
///
/// Relative readings (or readings without a reference) are published as
/// apparent wind, `T` readings as true wind. Angles are in radians, speeds
/// in meters per second. Nothing is published when the status is `V`.
#[derive(Debug, Default)]
pub struct MwvParser {
    pub apparent_wind_angle: ParsedValue<f32>,
    pub apparent_wind_speed: ParsedValue<f32>,
    pub true_wind_angle: ParsedValue<f32>,
    pub true_wind_speed: ParsedValue<f32>,
}

impl SentenceParser for MwvParser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("..MWV")
    }

    fn min_fields(&self) -> usize {
        6
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let mwv = Mwv::from_fields(&mut fields.cursor())?;

        if mwv.status == Some(Status::Invalid) {
            return Ok(());
        }

        let angle = mwv.angle.map(degrees_to_radians);
        let speed = mwv.speed.map(|speed| speed * mwv.unit.to_mps());
        let (angle_slot, speed_slot) = match mwv.reference {
            Some(WindReference::True) => (&mut self.true_wind_angle, &mut self.true_wind_speed),
            Some(WindReference::Relative) | None => {
                (&mut self.apparent_wind_angle, &mut self.apparent_wind_speed)
            }
        };

        if let Some(angle) = angle {
            angle_slot.set(angle);
        }
        if let Some(speed) = speed {
            speed_slot.set(speed);
        }

        Ok(())
    }
}
