use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use nom::{Parser, number::complete::hex_u32};
use tracing::debug;

use crate::{
    self as nmea0183_decoder, FieldError, FromFields, IResult, ParsedValue, SentenceError,
    SentenceParser, dispatch::AddressPattern, fields::Fields, fields::parse::invalid,
};

/// Constellation a satellite belongs to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SatelliteSystem {
    Unknown,
    Gps,
    Glonass,
    Galileo,
    Beidou,
    Qzss,
    Sbas,
    Irnss,
}

impl SatelliteSystem {
    /// Classifies a satellite from the talker that reported it and its PRN.
    ///
    /// Mixed (`GN`) and unknown talkers fall back to the NMEA PRN ranges.
    pub fn classify(talker: &str, prn: u16) -> Self {
        match (talker, prn) {
            ("GP", 33..=64) => Self::Sbas,
            ("GP", _) => Self::Gps,
            ("GL", _) => Self::Glonass,
            ("GA", _) => Self::Galileo,
            ("GB" | "BD", _) => Self::Beidou,
            ("GQ" | "QZ", _) => Self::Qzss,
            ("GI", _) => Self::Irnss,
            (_, 1..=32) => Self::Gps,
            (_, 33..=64) => Self::Sbas,
            (_, 65..=96) => Self::Glonass,
            _ => Self::Unknown,
        }
    }
}

/// One satellite of a GSV report. Angles are in degrees.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteInView {
    pub system: SatelliteSystem,
    pub prn: u16,
    pub elevation: Option<f32>,
    pub azimuth: Option<f32>,
    /// Carrier to noise density, dB-Hz. Empty when not tracked.
    pub snr: Option<u8>,
    /// NMEA 4.11 signal id.
    pub signal: Option<u8>,
}

#[derive(Debug, FromFields)]
struct SatelliteRecord {
    prn: Option<u16>,
    elevation: Option<f32>,
    azimuth: Option<f32>,
    snr: Option<u8>,
}

fn signal_id(i: &str) -> IResult<&str, u8> {
    let (rest, value) = hex_u32.parse(i)?;
    let value = u8::try_from(value).or(Err(invalid(i)))?;

    Ok((rest, value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    talker: [u8; 2],
    signal: Option<u8>,
}

#[derive(Debug)]
struct PendingGroup {
    total: u8,
    next: u8,
    satellites: Vec<SatelliteInView>,
}

/// GSV - Satellites in view
///
/// ```text
///         1 2 3 4 5 6 7     n
///         | | | | | | |     |
///  $--GSV,x,x,x,x,x,x,x,...,h*hh<CR><LF>
/// ```
///
/// A report spans several sentences, grouped by talker and signal id. A
/// group starts at message 1 and must continue in order with the same
/// total; anything else discards it. When the last message of a group
/// arrives, the group replaces the previous report of that talker and
/// signal, and the union of all reports is published.
///
/// Reports are only ever replaced, never expired: a talker or signal that
/// stops reporting keeps its last satellites in the union. The in-view
/// count transmitted in field 3 is not used; `num_satellites` counts the
/// distinct satellites actually listed.
#[derive(Debug, Default)]
pub struct GsvParser {
    /// Distinct satellites (by system and PRN) across all reports.
    pub num_satellites: ParsedValue<usize>,
    pub satellites: ParsedValue<Vec<SatelliteInView>>,
    pending: BTreeMap<GroupKey, PendingGroup>,
    reports: BTreeMap<GroupKey, Vec<SatelliteInView>>,
}

impl GsvParser {
    fn publish(&mut self) {
        let satellites: Vec<SatelliteInView> = self.reports.values().flatten().cloned().collect();
        let distinct: BTreeSet<(SatelliteSystem, u16)> = satellites
            .iter()
            .map(|satellite| (satellite.system, satellite.prn))
            .collect();

        self.num_satellites.set(distinct.len());
        self.satellites.set(satellites);
    }
}

impl SentenceParser for GsvParser {
    fn address(&self) -> AddressPattern {
        AddressPattern::new("..GSV")
    }

    fn min_fields(&self) -> usize {
        4
    }

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
        let talker = fields.talker_id().unwrap_or("--");
        let mut cursor = fields.cursor();

        let total: u8 = cursor.parse()?;
        let number: u8 = cursor.parse()?;
        let _in_view: Option<u16> = cursor.parse()?;
        if total == 0 || number == 0 || number > total {
            return Err(FieldError::invalid(2, "message number out of range").into());
        }

        let remaining = cursor.remaining();
        if remaining % 4 > 1 {
            return Err(FieldError::invalid(
                cursor.index() + remaining - 1,
                "incomplete satellite record",
            )
            .into());
        }

        let mut records: heapless::Vec<SatelliteRecord, 4> = heapless::Vec::new();
        for _ in 0..remaining / 4 {
            let index = cursor.index();
            let record = SatelliteRecord::from_fields(&mut cursor)?;
            records
                .push(record)
                .map_err(|_| FieldError::invalid(index, "more than four satellites"))?;
        }
        let signal = match remaining % 4 {
            1 => cursor.next_optional_with(signal_id)?,
            _ => None,
        };

        let satellites = records.into_iter().filter_map(|record| {
            record.prn.map(|prn| SatelliteInView {
                system: SatelliteSystem::classify(talker, prn),
                prn,
                elevation: record.elevation,
                azimuth: record.azimuth,
                snr: record.snr,
                signal,
            })
        });

        let mut key = GroupKey {
            talker: [b'-'; 2],
            signal,
        };
        key.talker.copy_from_slice(&talker.as_bytes()[..2]);

        if number == 1 {
            self.pending.insert(
                key,
                PendingGroup {
                    total,
                    next: 1,
                    satellites: Vec::new(),
                },
            );
        }

        let Some(group) = self.pending.get_mut(&key) else {
            debug!(talker, number, total, "GSV message without a group start");
            return Ok(());
        };
        if group.total != total || group.next != number {
            debug!(talker, number, total, "GSV group out of sequence, discarding");
            self.pending.remove(&key);
            return Ok(());
        }

        group.satellites.extend(satellites);
        if number < total {
            group.next = number + 1;
            return Ok(());
        }

        if let Some(group) = self.pending.remove(&key) {
            self.reports.insert(key, group.satellites);
            self.publish();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentences::tests::parse_body;

    fn prns(parser: &GsvParser) -> Vec<(SatelliteSystem, u16)> {
        parser
            .satellites
            .get()
            .unwrap()
            .iter()
            .map(|satellite| (satellite.system, satellite.prn))
            .collect()
    }

    #[test]
    fn test_group_is_published_on_last_message() {
        let mut parser = GsvParser::default();

        parse_body(
            &mut parser,
            "GPGSV,2,1,07,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45",
        )
        .unwrap();
        assert_eq!(parser.satellites.update_count(), 0);

        parse_body(
            &mut parser,
            "GPGSV,2,2,07,15,61,130,48,17,24,042,37,33,35,211,",
        )
        .unwrap();

        assert_eq!(parser.num_satellites.get(), Some(&7));
        assert_eq!(
            prns(&parser),
            [
                (SatelliteSystem::Gps, 1),
                (SatelliteSystem::Gps, 2),
                (SatelliteSystem::Gps, 12),
                (SatelliteSystem::Gps, 14),
                (SatelliteSystem::Gps, 15),
                (SatelliteSystem::Gps, 17),
                (SatelliteSystem::Sbas, 33),
            ]
        );

        let sbas = &parser.satellites.get().unwrap()[6];
        assert_eq!(sbas.snr, None);
        assert_eq!(sbas.elevation, Some(35.0));
    }

    #[test]
    fn test_reports_from_several_talkers_are_combined() {
        let mut parser = GsvParser::default();

        parse_body(&mut parser, "GPGSV,1,1,01,05,45,120,38").unwrap();
        parse_body(&mut parser, "GLGSV,1,1,02,65,33,257,30,66,,,").unwrap();

        assert_eq!(parser.num_satellites.get(), Some(&3));
        assert_eq!(parser.satellites.update_count(), 2);

        let glonass = &parser.satellites.get().unwrap()[1];
        assert_eq!(glonass.system, SatelliteSystem::Glonass);
        assert_eq!(glonass.prn, 66);
        assert_eq!(glonass.azimuth, None);
    }

    #[test]
    fn test_new_report_replaces_previous_one() {
        let mut parser = GsvParser::default();

        parse_body(&mut parser, "GPGSV,1,1,01,05,45,120,38").unwrap();
        parse_body(&mut parser, "GPGSV,1,1,01,07,10,010,20").unwrap();

        assert_eq!(parser.num_satellites.get(), Some(&1));
        assert_eq!(prns(&parser), [(SatelliteSystem::Gps, 7)]);
    }

    #[test]
    fn test_signal_id_keeps_reports_apart() {
        let mut parser = GsvParser::default();

        parse_body(&mut parser, "GPGSV,1,1,01,05,45,120,38,1").unwrap();
        parse_body(&mut parser, "GPGSV,1,1,01,05,45,120,31,8").unwrap();

        let satellites = parser.satellites.get().unwrap();
        assert_eq!(satellites.len(), 2);
        assert_eq!(satellites[0].signal, Some(1));
        assert_eq!(satellites[1].signal, Some(8));
        assert_eq!(parser.num_satellites.get(), Some(&1));
    }

    #[test]
    fn test_out_of_sequence_group_is_discarded() {
        let mut parser = GsvParser::default();

        parse_body(
            &mut parser,
            "GPGSV,2,2,07,15,61,130,48,17,24,042,37,33,35,211,",
        )
        .unwrap();
        assert_eq!(parser.satellites.update_count(), 0);

        parse_body(
            &mut parser,
            "GPGSV,3,1,09,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45",
        )
        .unwrap();
        parse_body(&mut parser, "GPGSV,3,3,09,19,10,100,20").unwrap();
        parse_body(&mut parser, "GPGSV,3,2,09,15,61,130,48").unwrap();

        assert_eq!(parser.satellites.update_count(), 0);
    }

    #[test]
    fn test_malformed_reports() {
        let mut parser = GsvParser::default();

        for body in [
            "GPGSV,2,3,07,01,40,083,46",
            "GPGSV,0,0,07,01,40,083,46",
            "GPGSV,1,1,07,01,40",
            "GPGSV,1,1,07,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45,15,61,130,48",
            "GPGSV,1,1,01,xx,45,120,38",
        ] {
            assert!(parse_body(&mut parser, body).is_err(), "{body}");
        }
        assert_eq!(parser.satellites.update_count(), 0);
    }

    #[test]
    fn test_longest_group() {
        let mut parser = GsvParser::default();

        for number in 1..=255 {
            parse_body(&mut parser, &format!("GPGSV,255,{number},00")).unwrap();
        }
        assert_eq!(parser.satellites.update_count(), 1);
        assert_eq!(parser.num_satellites.get(), Some(&0));

        parse_body(&mut parser, "GPGSV,1,1,01,05,45,120,38").unwrap();
        assert_eq!(prns(&parser), [(SatelliteSystem::Gps, 5)]);
    }

    #[test]
    fn test_classification() {
        assert_eq!(SatelliteSystem::classify("GN", 70), SatelliteSystem::Glonass);
        assert_eq!(SatelliteSystem::classify("GA", 3), SatelliteSystem::Galileo);
        assert_eq!(SatelliteSystem::classify("GB", 3), SatelliteSystem::Beidou);
        assert_eq!(SatelliteSystem::classify("GN", 200), SatelliteSystem::Unknown);
    }
}
