#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use nom::{Parser, bytes::complete::tag};

use crate::{
    self as nmea0183_decoder, AttitudeVector, FromFields, IResult, ParsedValue, SentenceError,
    SentenceParser,
    dispatch::AddressPattern,
    fields::{Fields, parse::invalid},
    sentences::GnssQuality,
    value::degrees_to_radians,
};

/// Heading solution status reported by PQTMTAR.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingStatus {
    /// 0 - No heading solution
    Invalid,
    /// 4 - RTK fixed
    Rtk,
    /// 6 - Dead reckoning
    DeadReckoning,
}

impl HeadingStatus {
    pub fn quality(self) -> GnssQuality {
        match self {
            Self::Invalid => GnssQuality::NoGps,
            Self::Rtk => GnssQuality::RtkFixedInteger,
            Self::DeadReckoning => GnssQuality::EstimatedMode,
        }
    }
}

fn heading_status(i: &str) -> IResult<&str, HeadingStatus> {
    let (rest, code) = nom::character::complete::u8(i)?;
    let status = match code {
        0 => HeadingStatus::Invalid,
        4 => HeadingStatus::Rtk,
        6 => HeadingStatus::DeadReckoning,
        _ => return Err(invalid(i)),
    };

    Ok((rest, status))
}

/// Only message version 1 is understood.
fn version_one(i: &str) -> IResult<&str, ()> {
    tag("1").map(|_| ()).parse(i)
}

/// PQTMTAR - Time and Attitude (Quectel)
///
/// ```text
///           1     2      3 4  5   6   7   8   9   10  11  12
///           |     |      | |  |   |   |   |   |   |   |   |
///  $PQTMTAR,1,hhmmss.sss,x,,x.x,x.x,x.x,x.x,x.x,x.x,x.x,xx*hh<CR><LF>
/// ```
///
/// Angles and their accuracies are in degrees on the wire.
#[derive(Debug, FromFields)]
struct Pqtmtar {
    #[nmea(parser(version_one))]
    _version: (),
    fix_time: Option<time::Time>,
    #[nmea(parser(heading_status))]
    status: HeadingStatus,
    #[nmea(skip)]
    _reserved: (),
    length: Option<f32>,
    pitch: Option<f32>,
    roll: Option<f32>,
    heading: Option<f32>,
    pitch_accuracy: Option<f32>,
    roll_accuracy: Option<f32>,
    heading_accuracy: Option<f32>,
    used_satellites: Option<u32>,
}

fn attitude(roll: Option<f32>, pitch: Option<f32>, yaw: Option<f32>) -> Option<AttitudeVector> {
    Some(AttitudeVector {
        roll: degrees_to_radians(roll?),
        pitch: degrees_to_radians(pitch?),
        yaw: degrees_to_radians(yaw?),
    })
}

/// Decodes dual-antenna heading from Quectel receivers.
///
/// Time and the RTK quality are published for every sentence. The
/// baseline, attitude and its accuracy (radians) and the satellite count
/// only while a heading solution exists.
#[derive(Debug, Default)]
pub struct PqtmtarParser {
    pub fix_time: ParsedValue<time::Time>,
    pub rtk_quality: ParsedValue<GnssQuality>,
    pub baseline_length: ParsedValue<f32>,
    pub attitude: ParsedValue<AttitudeVector>,
    pub attitude_accuracy: ParsedValue<AttitudeVector>,
    pub hdg_num_satellites: ParsedValue<u32>,
}

impl SentenceParser for PqtmtarParser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("PQTMTAR")
    }

    fn min_fields(&self) -> usize {
        13
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let tar = Pqtmtar::from_fields(&mut fields.cursor())?;

        if let Some(fix_time) = tar.fix_time {
            self.fix_time.set(fix_time);
        }
        self.rtk_quality.set(tar.status.quality());

        if tar.status == HeadingStatus::Invalid {
            return Ok(());
        }

        if let Some(length) = tar.length {
            self.baseline_length.set(length);
        }
        if let Some(attitude) = attitude(tar.roll, tar.pitch, tar.heading) {
            self.attitude.set(attitude);
        }
        if let Some(accuracy) = attitude(
            tar.roll_accuracy,
            tar.pitch_accuracy,
            tar.heading_accuracy,
        ) {
            self.attitude_accuracy.set(accuracy);
        }
        if let Some(satellites) = tar.used_satellites {
            self.hdg_num_satellites.set(satellites);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldError, sentences::tests::{assert_close_f32, parse_body}};
    use time::macros::time;

    #[test]
    fn test_rtk_heading() {
        let mut parser = PqtmtarParser::default();
        parse_body(
            &mut parser,
            "PQTMTAR,1,165331.000,4,,0.232,2.321340,-6.849396,57.596487,0.081330,0.179366,0.118070,30",
        )
        .unwrap();

        assert_eq!(parser.fix_time.get(), Some(&time!(16:53:31)));
        assert_eq!(parser.rtk_quality.get(), Some(&GnssQuality::RtkFixedInteger));
        assert_eq!(parser.baseline_length.get(), Some(&0.232));
        assert_eq!(parser.hdg_num_satellites.get(), Some(&30));

        let attitude = parser.attitude.get().unwrap();
        assert_close_f32(attitude.pitch, 0.040_515);
        assert_close_f32(attitude.roll, -0.119_545);
        assert_close_f32(attitude.yaw, 1.005_248);

        let accuracy = parser.attitude_accuracy.get().unwrap();
        assert_close_f32(accuracy.pitch, 0.001_419);
        assert_close_f32(accuracy.roll, 0.003_131);
        assert_close_f32(accuracy.yaw, 0.002_061);
    }

    #[test]
    fn test_no_heading_publishes_quality_only() {
        let mut parser = PqtmtarParser::default();
        parse_body(&mut parser, "PQTMTAR,1,165332.000,0,,,,,,,,,").unwrap();

        assert_eq!(parser.rtk_quality.get(), Some(&GnssQuality::NoGps));
        assert_eq!(parser.fix_time.update_count(), 1);
        assert_eq!(parser.attitude.update_count(), 0);
        assert_eq!(parser.baseline_length.update_count(), 0);
        assert_eq!(parser.hdg_num_satellites.update_count(), 0);
    }

    #[test]
    fn test_partial_attitude_is_not_published() {
        let mut parser = PqtmtarParser::default();
        parse_body(&mut parser, "PQTMTAR,1,165331.000,6,,0.232,2.3,,57.5,,,,12").unwrap();

        assert_eq!(parser.rtk_quality.get(), Some(&GnssQuality::EstimatedMode));
        assert_eq!(parser.attitude.get(), None);
        assert_eq!(parser.hdg_num_satellites.get(), Some(&12));
    }

    #[test]
    fn test_unknown_version_and_status() {
        let mut parser = PqtmtarParser::default();

        assert_eq!(
            parse_body(&mut parser, "PQTMTAR,2,165332.000,0,,,,,,,,,"),
            Err(FieldError::malformed(1, "2").into())
        );
        assert_eq!(
            parse_body(&mut parser, "PQTMTAR,1,165332.000,5,,,,,,,,,"),
            Err(FieldError::malformed(3, "5").into())
        );
        assert_eq!(parser.rtk_quality.update_count(), 0);
    }
}
