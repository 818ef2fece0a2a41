use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
    self as nmea0183_decoder, FromFields, ParsedValue, Position, SentenceError, SentenceParser,
    dispatch::AddressPattern,
    fields::{
        Fields,
        parse::{Status, latitude, longitude, variation},
    },
    value::{INVALID_ALTITUDE, degrees_to_radians, knots_to_mps},
};

/// RMC - Recommended Minimum Navigation Information
///
/// ```text
///                                                            12
///         1         2 3       4 5        6  7   8   9    10 11|  13
///         |         | |       | |        |  |   |   |    |  | |   |
///  $--RMC,hhmmss.ss,A,ddmm.mm,a,dddmm.mm,a,x.x,x.x,xxxx,x.x,a,m,s*hh<CR><LF>
/// ```
#[derive(Debug, FromFields)]
struct Rmc {
    fix_time: Option<time::Time>,
    status: Status,
    #[nmea(with(latitude))]
    latitude: Option<f64>,
    #[nmea(with(longitude))]
    longitude: Option<f64>,
    #[nmea(map(|knots: Option<f32>| knots.map(knots_to_mps)))]
    speed: Option<f32>,
    #[nmea(map(|degrees: Option<f32>| degrees.map(degrees_to_radians)))]
    true_course: Option<f32>,
    fix_date: Option<time::Date>,
    #[nmea(with(variation))]
    variation: Option<f32>,
}

/// Decodes RMC sentences. Nothing is published unless the status is `A`.
///
/// Speed is in meters per second, course and variation in radians
/// (variation negative west).
#[derive(Debug, Default)]
pub struct RmcParser {
    pub position: ParsedValue<Position>,
    pub datetime: ParsedValue<OffsetDateTime>,
    pub speed: ParsedValue<f32>,
    pub true_course: ParsedValue<f32>,
    pub variation: ParsedValue<f32>,
}

impl SentenceParser for RmcParser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("..RMC")
    }

    fn min_fields(&self) -> usize {
        12
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let rmc = Rmc::from_fields(&mut fields.cursor())?;

        if !rmc.status.is_valid() {
            return Ok(());
        }

        if let (Some(latitude), Some(longitude)) = (rmc.latitude, rmc.longitude) {
            self.position.set(Position {
                latitude,
                longitude,
                altitude: INVALID_ALTITUDE,
            });
        }
        if let (Some(date), Some(time)) = (rmc.fix_date, rmc.fix_time) {
            self.datetime
                .set(PrimitiveDateTime::new(date, time).assume_utc());
        }
        if let Some(speed) = rmc.speed {
            self.speed.set(speed);
        }
        if let Some(course) = rmc.true_course {
            self.true_course.set(course);
        }
        if let Some(variation) = rmc.variation {
            self.variation.set(degrees_to_radians(variation));
        }

        Ok(())
    }
}
