use crate::{
    self as nmea0183_decoder, FromFields, Marker, ParsedValue, SentenceError, SentenceParser,
    dispatch::AddressPattern,
    fields::Fields,
    value::{degrees_to_radians, knots_to_mps},
};

/// VTG - Track made good and Ground speed
///
/// ```text
///          1  2  3  4  5  6  7  8 9
///          |  |  |  |  |  |  |  | |
///  $--VTG,x.x,T,x.x,M,x.x,N,x.x,K,m*hh<CR><LF>
/// ```
///
/// Markers may be empty alongside their value. Speed in km/h and the mode
/// are not decoded.
#[derive(Debug, FromFields)]
struct Vtg {
    true_track: Option<f32>,
    _true_marker: Option<Marker<'T'>>,
    _magnetic_track: Option<f32>,
    _magnetic_marker: Option<Marker<'M'>>,
    speed_knots: Option<f32>,
    _knots_marker: Option<Marker<'N'>>,
}

/// Decodes VTG course and speed over ground. Course is published in
/// radians, speed in meters per second.
#[derive(Debug, Default)]
pub struct VtgParser {
    pub true_course: ParsedValue<f32>,
    pub speed: ParsedValue<f32>,
}

impl SentenceParser for VtgParser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("..VTG")
    }

    fn min_fields(&self) -> usize {
        9
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let vtg = Vtg::from_fields(&mut fields.cursor())?;

        if let Some(track) = vtg.true_track {
            self.true_course.set(degrees_to_radians(track));
        }
        if let Some(knots) = vtg.speed_knots {
            self.speed.set(knots_to_mps(knots));
        }

        Ok(())
    }
}
