use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
    self as nmea0183_decoder, EnuVector, FieldError, FieldErrorKind, FromFields, ParsedValue,
    Position, SentenceError, SentenceParser,
    dispatch::{AddressPattern, forward},
    fields::{
        Fields, Sentinel,
        parse::{Status, latitude, longitude},
    },
    sentences::{GnssQuality, ModeIndicator},
    value::degrees_to_radians,
};

/// PSTI - SkyTraq proprietary sentences
///
/// ```text
///         1   2
///         |   |
///  $PSTI,xxx,...*hh<CR><LF>
/// ```
///
/// Field 1 selects the message. Supported messages are handed to their own
/// parser, which sees the same fields; any other message id is reported as
/// an unknown `PSTI,xxx` address.
#[derive(Debug, Default)]
pub struct PstiParser {
    pub psti030: Psti030Parser,
    pub psti032: Psti032Parser,
}

impl SentenceParser for PstiParser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("PSTI")
    }

    fn min_fields(&self) -> usize {
        2
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let code: u16 = fields.cursor().parse()?;

        match code {
            30 => forward(&mut self.psti030, fields),
            32 => forward(&mut self.psti032, fields),
            _ => Err(SentenceError::NoHandler(format!("PSTI,{code:03}"))),
        }
    }
}

/// PSTI,030 - Recommended Minimum 3D GNSS Data
///
/// ```text
///                                                                                   13
///              1          2 3       4 5        6 7   8   9   10   11   12 |   14    15
///              |          | |       | |        | |   |   |   |    |    |  |   |     |
///  $PSTI,030,hhmmss.sss,A,ddmm.mmmm,a,dddmm.mmmm,a,x.x,x.x,x.x,x.x,ddmmyy,a,x.x,x.x*hh<CR><LF>
/// ```
#[derive(Debug, FromFields)]
struct Psti030 {
    fix_time: Option<time::Time>,
    status: Status,
    #[nmea(with(latitude))]
    latitude: Option<f64>,
    #[nmea(with(longitude))]
    longitude: Option<f64>,
    altitude: Option<f32>,
    east_velocity: Option<f32>,
    north_velocity: Option<f32>,
    up_velocity: Option<f32>,
    fix_date: Option<time::Date>,
    mode: ModeIndicator,
    rtk_age: Option<f32>,
    rtk_ratio: Option<f32>,
}

/// Decodes PSTI,030 fixes.
///
/// Quality and the RTK age and ratio are published for every sentence.
/// Position, time and velocity only when the status is `A`.
#[derive(Debug, Default)]
pub struct Psti030Parser {
    pub position: ParsedValue<Position>,
    pub datetime: ParsedValue<OffsetDateTime>,
    /// Meters per second.
    pub velocity: ParsedValue<EnuVector>,
    pub quality: ParsedValue<GnssQuality>,
    pub rtk_age: ParsedValue<f32>,
    pub rtk_ratio: ParsedValue<f32>,
}

impl SentenceParser for Psti030Parser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("PSTI,030")
    }

    fn min_fields(&self) -> usize {
        16
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let psti = Psti030::from_fields(&mut fields.shifted(1).cursor())?;

        self.quality.set(psti.mode.quality());
        if let Some(age) = psti.rtk_age {
            self.rtk_age.set(age);
        }
        if let Some(ratio) = psti.rtk_ratio {
            self.rtk_ratio.set(ratio);
        }

        if !psti.status.is_valid() {
            return Ok(());
        }

        if let (Some(latitude), Some(longitude)) = (psti.latitude, psti.longitude) {
            self.position.set(Position {
                latitude,
                longitude,
                altitude: f32::or_invalid(psti.altitude),
            });
        }
        if let (Some(date), Some(time)) = (psti.fix_date, psti.fix_time) {
            self.datetime
                .set(PrimitiveDateTime::new(date, time).assume_utc());
        }
        if let (Some(east), Some(north), Some(up)) =
            (psti.east_velocity, psti.north_velocity, psti.up_velocity)
        {
            self.velocity.set(EnuVector { east, north, up });
        }

        Ok(())
    }
}

/// PSTI,032 - RTK Baseline Data
///
/// ```text
///              1          2      3 4  5   6   7   8   9
///              |          |      | |  |   |   |   |   |
///  $PSTI,032,hhmmss.sss,ddmmyy,A,a,x.x,x.x,x.x,x.x,x.x,,,,,*hh<CR><LF>
/// ```
///
/// Everything after the status is empty unless the status is `A`.
#[derive(Debug, FromFields)]
struct Psti032 {
    fix_time: Option<time::Time>,
    fix_date: Option<time::Date>,
    status: Status,
    mode: Option<ModeIndicator>,
    east: Option<f32>,
    north: Option<f32>,
    up: Option<f32>,
    length: Option<f32>,
    course: Option<f32>,
}

fn required<T>(value: Option<T>, index: usize) -> Result<T, FieldError> {
    value.ok_or(FieldError::new(index, FieldErrorKind::Empty))
}

/// Decodes PSTI,032 RTK baselines. Nothing is published unless the status
/// is `A`, in which case every baseline field is required.
///
/// The projection and length are in meters, the course in radians.
#[derive(Debug, Default)]
pub struct Psti032Parser {
    pub datetime: ParsedValue<OffsetDateTime>,
    pub baseline_projection: ParsedValue<EnuVector>,
    pub baseline_length: ParsedValue<f32>,
    pub baseline_course: ParsedValue<f32>,
    pub quality: ParsedValue<GnssQuality>,
}

impl SentenceParser for Psti032Parser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("PSTI,032")
    }

    fn min_fields(&self) -> usize {
        11
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let psti = Psti032::from_fields(&mut fields.shifted(1).cursor())?;

        if !psti.status.is_valid() {
            return Ok(());
        }

        let mode = required(psti.mode, 5)?;
        let projection = EnuVector {
            east: required(psti.east, 6)?,
            north: required(psti.north, 7)?,
            up: required(psti.up, 8)?,
        };
        let length = required(psti.length, 9)?;
        let course = required(psti.course, 10)?;

        if let (Some(date), Some(time)) = (psti.fix_date, psti.fix_time) {
            self.datetime
                .set(PrimitiveDateTime::new(date, time).assume_utc());
        }
        self.baseline_projection.set(projection);
        self.baseline_length.set(length);
        self.baseline_course.set(degrees_to_radians(course));
        self.quality.set(mode.quality());

        Ok(())
    }
}
