//! # Sentence Framer
//!
//! A byte-at-a-time state machine that cuts a raw serial stream into
//! sentences of the form `$HHH,D1,D2,...,Dn*CC` followed by CR/LF.
//!
//! The framer makes no assumption about how the transport chunks the
//! stream. It accumulates the body, records field boundaries and the running
//! XOR as it goes, and hands out a [`RawSentence`] once two checksum digits
//! and a terminator have been seen. A `$` or `!` always starts a new
//! sentence, so the framer resynchronizes after any garbage.

use std::fmt;

use crate::{
    DecoderConfig, FramingError,
    config::MAX_SENTENCE_CAPACITY,
    fields::{Fields, MAX_FIELDS, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InField,
    InChecksum { digits: u8, value: u8 },
}

/// Cuts a byte stream into sentences.
#[derive(Debug)]
pub struct Framer {
    state: State,
    delimiter: char,
    body: heapless::String<MAX_SENTENCE_CAPACITY>,
    spans: heapless::Vec<Span, MAX_FIELDS>,
    field_start: usize,
    parity: u8,
    max_sentence_len: usize,
    max_fields: usize,
}

impl Framer {
    pub fn new(config: &DecoderConfig) -> Self {
        let config = config.clamped();

        Self {
            state: State::Start,
            delimiter: '$',
            body: heapless::String::new(),
            spans: heapless::Vec::new(),
            field_start: 0,
            parity: 0,
            max_sentence_len: config.max_sentence_len,
            max_fields: config.max_fields,
        }
    }

    /// Feeds one byte.
    ///
    /// Returns `None` while a sentence is accumulating or while waiting for a
    /// start delimiter, `Some(Ok(_))` when a sentence completes and
    /// `Some(Err(_))` when the sentence in progress is dropped.
    pub fn handle(&mut self, byte: u8) -> Option<Result<RawSentence<'_>, FramingError>> {
        if matches!(byte, b'$' | b'!') {
            let interrupted = self.state != State::Start;
            self.begin(byte as char);
            return interrupted.then_some(Err(FramingError::Interrupted));
        }

        match self.state {
            State::Start => None,
            State::InField => self.in_field(byte).map(Err),
            State::InChecksum { digits, value } => self.in_checksum(byte, digits, value),
        }
    }

    /// Drops any partial sentence.
    pub fn reset(&mut self) {
        self.state = State::Start;
    }

    fn begin(&mut self, delimiter: char) {
        self.state = State::InField;
        self.delimiter = delimiter;
        self.body.clear();
        self.spans.clear();
        self.field_start = 0;
        self.parity = 0;
    }

    fn abort(&mut self, error: FramingError) -> Option<FramingError> {
        self.state = State::Start;
        Some(error)
    }

    fn close_field(&mut self) -> Result<(), FramingError> {
        self.spans
            .push(Span {
                start: self.field_start,
                end: self.body.len(),
            })
            .map_err(|_| FramingError::TooManyFields(self.max_fields))
    }

    fn push(&mut self, byte: u8) -> Result<(), FramingError> {
        if self.body.len() >= self.max_sentence_len {
            return Err(FramingError::Overflow(self.max_sentence_len));
        }
        self.body
            .push(byte as char)
            .map_err(|_| FramingError::Overflow(self.max_sentence_len))?;
        self.parity ^= byte;
        Ok(())
    }

    fn in_field(&mut self, byte: u8) -> Option<FramingError> {
        let step = match byte {
            b',' if self.spans.len() + 2 > self.max_fields => {
                Err(FramingError::TooManyFields(self.max_fields))
            }
            b',' => self.close_field().and_then(|()| {
                self.push(byte)?;
                self.field_start = self.body.len();
                Ok(())
            }),
            b'*' => self.close_field().map(|()| {
                self.state = State::InChecksum {
                    digits: 0,
                    value: 0,
                };
            }),
            b'\r' | b'\n' => Err(FramingError::Unterminated),
            byte if byte.is_ascii() && !byte.is_ascii_control() => self.push(byte),
            byte => Err(FramingError::InvalidByte(byte)),
        };

        match step {
            Ok(()) => None,
            Err(error) => self.abort(error),
        }
    }

    fn in_checksum(
        &mut self,
        byte: u8,
        digits: u8,
        value: u8,
    ) -> Option<Result<RawSentence<'_>, FramingError>> {
        match byte {
            b',' | b'*' | b'\r' | b'\n' if digits == 2 => {
                self.state = State::Start;
                Some(Ok(RawSentence {
                    delimiter: self.delimiter,
                    body: self.body.as_str(),
                    spans: self.spans.as_slice(),
                    computed: self.parity,
                    transmitted: value,
                }))
            }
            byte if digits < 2 => match (byte as char).to_digit(16) {
                Some(nibble) => {
                    self.state = State::InChecksum {
                        digits: digits + 1,
                        value: value << 4 | nibble as u8,
                    };
                    None
                }
                None => self.abort(FramingError::MalformedChecksum).map(Err),
            },
            _ => self.abort(FramingError::MalformedChecksum).map(Err),
        }
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

/// A framed sentence, borrowed from the framer until the next byte is fed.
#[derive(Debug, Clone, Copy)]
pub struct RawSentence<'a> {
    delimiter: char,
    body: &'a str,
    spans: &'a [Span],
    computed: u8,
    transmitted: u8,
}

impl<'a> RawSentence<'a> {
    /// Text between the start delimiter and `*`.
    pub fn body(&self) -> &'a str {
        self.body
    }

    pub fn fields(&self) -> Fields<'a> {
        Fields::new(self.body, self.spans)
    }

    /// `$` for regular sentences, `!` for encapsulated ones.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn computed_checksum(&self) -> u8 {
        self.computed
    }

    pub fn transmitted_checksum(&self) -> u8 {
        self.transmitted
    }

    pub fn checksum_ok(&self) -> bool {
        self.computed == self.transmitted
    }
}

/// Reconstructs the sentence as transmitted, without line ending.
impl fmt::Display for RawSentence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}*{:02X}", self.delimiter, self.body, self.transmitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum;

    fn feed(framer: &mut Framer, input: &[u8]) -> Vec<Result<String, FramingError>> {
        input
            .iter()
            .filter_map(|&byte| {
                framer
                    .handle(byte)
                    .map(|result| result.map(|sentence| sentence.to_string()))
            })
            .collect()
    }

    #[test]
    fn test_fields_and_parity() {
        let mut framer = Framer::default();
        let input = b"$GPGLL,5133.81,N,00042.25,W*75";

        for &byte in input.iter() {
            assert!(framer.handle(byte).is_none());
        }

        let sentence = framer.handle(b'\r').unwrap().unwrap();
        assert_eq!(sentence.body(), "GPGLL,5133.81,N,00042.25,W");
        assert_eq!(sentence.computed_checksum(), 0x75);
        assert_eq!(
            sentence.computed_checksum(),
            checksum(sentence.body().as_bytes())
        );
        assert!(sentence.checksum_ok());
        assert_eq!(
            sentence.fields().iter().collect::<Vec<_>>(),
            ["GPGLL", "5133.81", "N", "00042.25", "W"]
        );
        assert_eq!(sentence.to_string(), "$GPGLL,5133.81,N,00042.25,W*75");

        assert!(framer.handle(b'\n').is_none());
    }

    #[test]
    fn test_lowercase_checksum_digits() {
        let mut framer = Framer::default();
        for &byte in b"$GNVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*3b" {
            assert!(framer.handle(byte).is_none());
        }

        let sentence = framer.handle(b'\n').unwrap().unwrap();
        assert_eq!(sentence.transmitted_checksum(), 0x3B);
        assert!(sentence.checksum_ok());
    }

    #[test]
    fn test_mismatch_still_frames() {
        let mut framer = Framer::default();
        let results = feed(&mut framer, b"$GPGLL,5133.81,N,00042.25,W*76\r\n");
        assert_eq!(results.len(), 1);

        let mut framer = Framer::default();
        for &byte in b"$GPGLL,5133.81,N,00042.25,W*76" {
            framer.handle(byte);
        }
        let sentence = framer.handle(b'\n').unwrap().unwrap();
        assert!(!sentence.checksum_ok());
        assert_eq!(sentence.transmitted_checksum(), 0x76);
    }

    #[test]
    fn test_garbage_before_start_is_ignored() {
        let mut framer = Framer::default();
        let results = feed(&mut framer, b"\x00\xffnoise,*12\r\n$GPGLL,5133.81,N,00042.25,W*75\r\n");
        assert_eq!(
            results,
            [Ok("$GPGLL,5133.81,N,00042.25,W*75".to_owned())]
        );
    }

    #[test]
    fn test_start_delimiter_restarts() {
        let mut framer = Framer::default();
        let results = feed(&mut framer, b"$GPGGA,1210$GPGLL,5133.81,N,00042.25,W*75\r\n");
        assert_eq!(
            results,
            [
                Err(FramingError::Interrupted),
                Ok("$GPGLL,5133.81,N,00042.25,W*75".to_owned())
            ]
        );
    }

    #[test]
    fn test_exclamation_delimiter() {
        let mut framer = Framer::default();
        let results = feed(&mut framer, b"!AIVDM,1*4A\r\n");
        assert_eq!(results, [Ok("!AIVDM,1*4A".to_owned())]);
    }

    #[test]
    fn test_line_end_without_checksum() {
        let mut framer = Framer::default();
        let results = feed(&mut framer, b"$GPGLL,5133.81,N\r\n");
        assert_eq!(results, [Err(FramingError::Unterminated)]);
    }

    #[test]
    fn test_malformed_checksum_trailers() {
        for input in [
            &b"$GPGLL,1*7G\r\n"[..],
            b"$GPGLL,1*7\r\n",
            b"$GPGLL,1*755\r\n",
            b"$GPGLL,1**75\r\n",
        ] {
            let mut framer = Framer::default();
            assert_eq!(
                feed(&mut framer, input),
                [Err(FramingError::MalformedChecksum)],
                "{}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_comma_after_checksum_terminates() {
        let mut framer = Framer::default();
        let results = feed(&mut framer, b"$GPGLL,5133.81,N,00042.25,W*75,");
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn test_overflow_aborts() {
        let config = DecoderConfig::new().max_sentence_len(10);
        let mut framer = Framer::new(&config);

        assert_eq!(
            feed(&mut framer, b"$GPGLL,5133.81,N*00\r\n"),
            [Err(FramingError::Overflow(10))]
        );
        assert_eq!(feed(&mut framer, b"$GPGLL,1*4D\r\n").len(), 1);
    }

    #[test]
    fn test_too_many_fields_aborts() {
        let mut framer = Framer::default();
        let body = format!("GPTXT{}", ",".repeat(24));
        let line = format!("${body}*{:02X}\r\n", checksum(body.as_bytes()));
        let results = feed(&mut framer, line.as_bytes());
        assert!(results[0].is_ok());

        let line = format!("$GPTXT{}*4F\r\n", ",".repeat(26));
        assert_eq!(
            feed(&mut framer, line.as_bytes()),
            [Err(FramingError::TooManyFields(MAX_FIELDS))]
        );
    }

    #[test]
    fn test_non_ascii_aborts() {
        let mut framer = Framer::default();
        assert_eq!(
            feed(&mut framer, b"$GPGLL,51\xb033*00\r\n"),
            [Err(FramingError::InvalidByte(0xb0))]
        );
    }
}
