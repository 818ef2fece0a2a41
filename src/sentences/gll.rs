use crate::{
    self as nmea0183_decoder, FromFields, ParsedValue, Position, SentenceError, SentenceParser,
    dispatch::AddressPattern,
    fields::{
        Fields,
        parse::{latitude, longitude},
    },
    value::INVALID_ALTITUDE,
};

/// GLL - Geographic Position - Latitude/Longitude
///
/// ```text
///         1       2 3        4 5         6 7
///         |       | |        | |         | |
///  $--GLL,ddmm.mm,a,dddmm.mm,a,hhmmss.ss,a,m*hh<CR><LF>
/// ```
///
/// Only the position is decoded; older receivers stop after field 4.
#[derive(Debug, FromFields)]
struct Gll {
    #[nmea(with(latitude))]
    latitude: Option<f64>,
    #[nmea(with(longitude))]
    longitude: Option<f64>,
}

/// Decodes GLL positions. GLL carries no altitude, so the published
/// position's altitude is always [`INVALID_ALTITUDE`].
#[derive(Debug, Default)]
pub struct GllParser {
    pub position: ParsedValue<Position>,
}

impl SentenceParser for GllParser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("..GLL")
    }

    fn min_fields(&self) -> usize {
        5
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let gll = Gll::from_fields(&mut fields.cursor())?;

        if let (Some(latitude), Some(longitude)) = (gll.latitude, gll.longitude) {
            self.position.set(Position {
                latitude,
                longitude,
                altitude: INVALID_ALTITUDE,
            });
        }

        Ok(())
    }
}
