use crate::{
    self as nmea0183_decoder, FromFields, Marker, ParsedValue, Position, SentenceError,
    SentenceParser,
    dispatch::AddressPattern,
    fields::{
        Fields, Sentinel,
        parse::{latitude, longitude},
    },
    sentences::{GnssQuality, gga_quality},
};

/// GGA - Global Positioning System Fix Data
///
/// ```text
///                                                      11
///         1         2       3 4        5 6 7  8   9  10 |  12 13  14
///         |         |       | |        | | |  |   |   | |   | |   |
///  $--GGA,hhmmss.ss,ddmm.mm,a,dddmm.mm,a,x,xx,x.x,x.x,M,x.x,M,x.x,xxxx*hh<CR><LF>
/// ```
#[derive(Debug, FromFields)]
struct Gga {
    fix_time: Option<time::Time>,
    #[nmea(with(latitude))]
    latitude: Option<f64>,
    #[nmea(with(longitude))]
    longitude: Option<f64>,
    #[nmea(parser(gga_quality))]
    quality: GnssQuality,
    #[nmea(parse_as(u8))]
    satellites: u32,
    hdop: f32,
    altitude: Option<f32>,
    _altitude_unit: Option<Marker<'M'>>,
    geoidal_separation: Option<f32>,
    _separation_unit: Option<Marker<'M'>>,
    dgps_age: Option<f32>,
    dgps_station: Option<u16>,
}

/// Decodes GGA fixes from any talker.
///
/// Position is published only when both coordinates are present. HDOP,
/// geoidal separation and the DGPS details are published only for a fix
/// (quality other than "no GPS"); the DGPS station is published only
/// together with a DGPS age.
#[derive(Debug, Default)]
pub struct GgaParser {
    pub fix_time: ParsedValue<time::Time>,
    pub position: ParsedValue<Position>,
    pub quality: ParsedValue<GnssQuality>,
    pub num_satellites: ParsedValue<u32>,
    pub hdop: ParsedValue<f32>,
    pub geoidal_separation: ParsedValue<f32>,
    pub dgps_age: ParsedValue<f32>,
    pub dgps_id: ParsedValue<u16>,
}

impl SentenceParser for GgaParser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("..GGA")
    }

    fn min_fields(&self) -> usize {
        15
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let gga = Gga::from_fields(&mut fields.cursor())?;

        if let Some(fix_time) = gga.fix_time {
            self.fix_time.set(fix_time);
        }
        if let (Some(latitude), Some(longitude)) = (gga.latitude, gga.longitude) {
            self.position.set(Position {
                latitude,
                longitude,
                altitude: f32::or_invalid(gga.altitude),
            });
        }
        self.quality.set(gga.quality);
        self.num_satellites.set(gga.satellites);

        if gga.quality != GnssQuality::NoGps {
            self.hdop.set(gga.hdop);
            if let Some(separation) = gga.geoidal_separation {
                self.geoidal_separation.set(separation);
            }
            if let Some(age) = gga.dgps_age {
                self.dgps_age.set(age);
                if let Some(station) = gga.dgps_station {
                    self.dgps_id.set(station);
                }
            }
        }

        Ok(())
    }
}
