//! Field parsers shared by the sentence decoders.
//!
//! Single-field parsers are nom functions usable with
//! [`FieldCursor::next_with`] or `#[nmea(parser(...))]`. Values spread over
//! two fields (a coordinate and its hemisphere) are read straight from the
//! cursor and plug into `#[nmea(with(...))]`.

use nom::{
    Parser,
    bytes::complete::take,
    combinator::all_consuming,
    number::complete::double,
};

use crate::{Error, FieldCursor, FieldError, FieldParse, IResult, fields::parsable_enum};

pub(crate) fn invalid(i: &str) -> nom::Err<Error<&str, nom::error::Error<&str>>> {
    nom::Err::Error(Error::InvalidField(i))
}

fn two_digits(i: &str) -> IResult<&str, u8> {
    let (i, digits) = take(2u8).parse(i)?;
    let (_, value) = all_consuming(nom::character::complete::u8).parse(digits)?;

    Ok((i, value))
}

/// Parses an NMEA `dddmm.mmmm` coordinate into decimal degrees.
///
/// The integer part above the last two digits is degrees, the rest is minutes.
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::{IResult, fields::parse::lat_lon};
///
/// let result: IResult<_, _> = lat_lon("5133.81");
/// let (_, degrees) = result.unwrap();
/// assert!((degrees - 51.5635).abs() < 1e-9);
/// ```
pub fn lat_lon(i: &str) -> IResult<&str, f64> {
    let (rest, value) = double.parse(i)?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(i));
    }

    let degrees = (value / 100.0).floor();
    let minutes = value - degrees * 100.0;

    Ok((rest, degrees + minutes / 60.0))
}

parsable_enum! {
    /// Latitude hemisphere
    pub enum NorthSouth {
        'N' => North,
        'S' => South,
    }
}

parsable_enum! {
    /// Longitude hemisphere
    pub enum EastWest {
        'E' => East,
        'W' => West,
    }
}

parsable_enum! {
    /// Status Mode Indicator
    pub enum Status {
        /// A - Valid
        'A' => Valid,
        /// V - Invalid
        'V' => Invalid,
    }
}

impl NorthSouth {
    pub fn sign(self) -> f64 {
        match self {
            Self::North => 1.0,
            Self::South => -1.0,
        }
    }
}

impl EastWest {
    pub fn sign(self) -> f64 {
        match self {
            Self::East => 1.0,
            Self::West => -1.0,
        }
    }
}

impl Status {
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// Reads a latitude and its `N`/`S` hemisphere from two fields.
///
/// An empty coordinate yields `None`. `S` negates; an empty hemisphere
/// leaves the value positive.
pub fn latitude(cursor: &mut FieldCursor<'_>) -> Result<Option<f64>, FieldError> {
    let value = cursor.next_optional_with(lat_lon)?;
    let hemisphere: Option<NorthSouth> = cursor.parse()?;

    Ok(value.map(|value| hemisphere.map_or(value, |h| value * h.sign())))
}

/// Reads a longitude and its `E`/`W` hemisphere from two fields.
pub fn longitude(cursor: &mut FieldCursor<'_>) -> Result<Option<f64>, FieldError> {
    let value = cursor.next_optional_with(lat_lon)?;
    let hemisphere: Option<EastWest> = cursor.parse()?;

    Ok(value.map(|value| hemisphere.map_or(value, |h| value * h.sign())))
}

/// Reads a magnetic variation in degrees followed by `E`/`W`; west is negative.
pub fn variation(cursor: &mut FieldCursor<'_>) -> Result<Option<f32>, FieldError> {
    let value: Option<f32> = cursor.parse()?;
    let direction: Option<EastWest> = cursor.parse()?;

    Ok(value.map(|value| direction.map_or(value, |d| value * d.sign() as f32)))
}

/// `hhmmss[.sss]`, fractional seconds kept to the millisecond.
impl FieldParse for time::Time {
    fn parse_field(i: &str) -> IResult<&str, Self> {
        let (rest, (hour, minute, second)) = (two_digits, two_digits, double).parse(i)?;

        if !(0.0..60.0).contains(&second) {
            return Err(invalid(i));
        }

        let millisecond = ((second.fract() * 1000.0).round() as u16).min(999);
        let time = time::Time::from_hms_milli(hour, minute, second.trunc() as u8, millisecond)
            .or(Err(invalid(i)))?;

        Ok((rest, time))
    }
}

/// `ddmmyy`, years counted from 2000.
impl FieldParse for time::Date {
    fn parse_field(i: &str) -> IResult<&str, Self> {
        let (rest, (day, month, year)) = (two_digits, two_digits, two_digits).parse(i)?;

        let month = time::Month::try_from(month).or(Err(invalid(i)))?;
        let date = time::Date::from_calendar_date(2000 + year as i32, month, day)
            .or(Err(invalid(i)))?;

        Ok((rest, date))
    }
}
