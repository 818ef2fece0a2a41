//! # Sentence Dispatch
//!
//! Routes framed sentences to the parser registered for their address,
//! enforcing the checksum policy and minimum field count on the way.

use std::any::Any;

use tracing::{debug, trace, warn};

use crate::{ChecksumMode, DecodeError, SentenceError, fields::Fields, framer::RawSentence};

/// An address prefix a parser answers to, such as `GPGGA`, `PSTI,030` or
/// `..VTG`. A `.` matches any single character.
///
/// A pattern matches a sentence body when every character matches and the
/// body continues with `,` or ends right after it.
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::AddressPattern;
///
/// let pattern = AddressPattern::new("..GGA");
/// assert!(pattern.matches("GNGGA,121042.00"));
/// assert!(!pattern.matches("GNGGAX,121042.00"));
/// assert!(AddressPattern::new("PSTI,030").matches("PSTI,030,044606.000"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressPattern(&'static str);

impl AddressPattern {
    pub const fn new(pattern: &'static str) -> Self {
        Self(pattern)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn matches(&self, body: &str) -> bool {
        let pattern = self.0.as_bytes();
        let body = body.as_bytes();

        body.len() >= pattern.len()
            && pattern
                .iter()
                .zip(body)
                .all(|(expected, actual)| *expected == b'.' || expected == actual)
            && matches!(body.get(pattern.len()), None | Some(b','))
    }
}

/// Allows looking up a registered parser by its concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Decoder for one sentence type.
///
/// `parse_fields` must decode every field it needs before publishing
/// anything, so that a failed sentence leaves all outputs untouched.
pub trait SentenceParser: AsAny + Send {
    fn address(&self) -> AddressPattern;

    /// Fewest fields, the address included, a sentence needs to be decoded.
    fn min_fields(&self) -> usize;

    fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError>;
}

struct Registration {
    parser: Box<dyn SentenceParser>,
    checksum_mode: ChecksumMode,
    rx_count: u64,
}

/// Ordered set of sentence parsers. The first registration whose address
/// matches a sentence handles it.
#[derive(Default)]
pub struct Dispatcher {
    registrations: Vec<Registration>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, parser: Box<dyn SentenceParser>, checksum_mode: ChecksumMode) {
        self.registrations.push(Registration {
            parser,
            checksum_mode,
            rx_count: 0,
        });
    }

    /// Hands a framed sentence to its parser.
    ///
    /// Returns the pattern of the parser that decoded it.
    pub fn dispatch(&mut self, sentence: &RawSentence<'_>) -> Result<AddressPattern, DecodeError> {
        let fields = sentence.fields();

        let Some(registration) = self
            .registrations
            .iter_mut()
            .find(|registration| registration.parser.address().matches(sentence.body()))
        else {
            debug!(address = fields.address(), "no parser registered");
            return Err(DecodeError::UnknownAddress {
                address: fields.address().to_owned(),
            });
        };

        let pattern = registration.parser.address();

        if registration.checksum_mode == ChecksumMode::Required && !sentence.checksum_ok() {
            warn!(
                %sentence,
                computed = sentence.computed_checksum(),
                "checksum mismatch"
            );
            return Err(DecodeError::ChecksumMismatch {
                sentence: sentence.to_string(),
                computed: sentence.computed_checksum(),
                transmitted: sentence.transmitted_checksum(),
            });
        }

        let expected = registration.parser.min_fields();
        if fields.len() < expected {
            warn!(%sentence, expected, found = fields.len(), "too few fields");
            return Err(DecodeError::TooFewFields {
                sentence: sentence.to_string(),
                expected,
                found: fields.len(),
            });
        }

        match registration.parser.parse_fields(&fields) {
            Ok(()) => {
                registration.rx_count += 1;
                trace!(address = pattern.as_str(), "sentence decoded");
                Ok(pattern)
            }
            Err(SentenceError::Field(error)) => {
                warn!(%sentence, %error, "failed to decode sentence");
                Err(DecodeError::Field {
                    sentence: sentence.to_string(),
                    source: error,
                })
            }
            Err(SentenceError::TooFewFields { expected, found }) => {
                warn!(%sentence, expected, found, "too few fields");
                Err(DecodeError::TooFewFields {
                    sentence: sentence.to_string(),
                    expected,
                    found,
                })
            }
            Err(SentenceError::NoHandler(address)) => {
                debug!(%address, "no handler for sentence");
                Err(DecodeError::UnknownAddress { address })
            }
        }
    }

    pub fn parser<P: SentenceParser>(&self) -> Option<&P> {
        self.registrations.iter().find_map(|registration| {
            let parser: &dyn SentenceParser = registration.parser.as_ref();
            parser.as_any().downcast_ref::<P>()
        })
    }

    pub fn parser_mut<P: SentenceParser>(&mut self) -> Option<&mut P> {
        self.registrations.iter_mut().find_map(|registration| {
            let parser: &mut dyn SentenceParser = registration.parser.as_mut();
            parser.as_any_mut().downcast_mut::<P>()
        })
    }

    /// Sentences successfully decoded by the first parser registered for `pattern`.
    pub fn rx_count(&self, pattern: &str) -> Option<u64> {
        self.registrations
            .iter()
            .find(|registration| registration.parser.address().as_str() == pattern)
            .map(|registration| registration.rx_count)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// Checks a sub-parser's field requirement the way the dispatcher does,
/// for meta parsers that forward sentences themselves.
pub(crate) fn forward(
    parser: &mut dyn SentenceParser,
    fields: &Fields<'_>,
) -> Result<(), SentenceError> {
    let expected = parser.min_fields();
    if fields.len() < expected {
        return Err(SentenceError::TooFewFields {
            expected,
            found: fields.len(),
        });
    }
    parser.parse_fields(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldError, framer::Framer};

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl SentenceParser for Recorder {
        fn address(&self) -> AddressPattern {
            AddressPattern::new("..TST")
        }

        fn min_fields(&self) -> usize {
            3
        }

        fn parse_fields(&mut self, fields: &Fields<'_>) -> Result<(), SentenceError> {
            let mut cursor = fields.cursor();
            let value: u8 = cursor.parse()?;
            if value == 0 {
                return Err(FieldError::invalid(1, "zero").into());
            }
            self.seen.push(fields.body().to_owned());
            Ok(())
        }
    }

    fn dispatch(dispatcher: &mut Dispatcher, line: &str) -> Result<AddressPattern, DecodeError> {
        let mut framer = Framer::default();
        let mut outcome = None;
        for &byte in line.as_bytes() {
            if let Some(Ok(sentence)) = framer.handle(byte) {
                outcome = Some(dispatcher.dispatch(&sentence));
            }
        }
        outcome.expect("line did not frame")
    }

    fn line(body: &str) -> String {
        format!("${body}*{:02X}\r\n", crate::checksum(body.as_bytes()))
    }

    #[test]
    fn test_pattern_wildcards_and_boundaries() {
        let pattern = AddressPattern::new("..VTG");
        assert!(pattern.matches("GNVTG,,T"));
        assert!(pattern.matches("GPVTG"));
        assert!(!pattern.matches("GPVTGX,1"));
        assert!(!pattern.matches("VTG,1"));

        assert!(AddressPattern::new("PSTI").matches("PSTI,030,1"));
        assert!(!AddressPattern::new("PSTI,030").matches("PSTI,032,1"));
    }

    #[test]
    fn test_routes_and_counts() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(Recorder::default()), ChecksumMode::Required);

        let result = dispatch(&mut dispatcher, &line("GPTST,5,x"));
        assert_eq!(result, Ok(AddressPattern::new("..TST")));
        assert_eq!(dispatcher.rx_count("..TST"), Some(1));
        assert_eq!(
            dispatcher.parser::<Recorder>().unwrap().seen,
            ["GPTST,5,x"]
        );
    }

    #[test]
    fn test_unknown_address() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(Recorder::default()), ChecksumMode::Required);

        assert_eq!(
            dispatch(&mut dispatcher, &line("GPXYZ,5,x")),
            Err(DecodeError::UnknownAddress {
                address: "GPXYZ".to_owned()
            })
        );
    }

    #[test]
    fn test_checksum_policy_per_registration() {
        let mut strict = Dispatcher::new();
        strict.register(Box::new(Recorder::default()), ChecksumMode::Required);
        let mut lenient = Dispatcher::new();
        lenient.register(Box::new(Recorder::default()), ChecksumMode::Ignored);

        let corrupted = "$GPTST,5,x*00\r\n";
        assert!(matches!(
            dispatch(&mut strict, corrupted),
            Err(DecodeError::ChecksumMismatch { transmitted: 0, .. })
        ));
        assert_eq!(strict.rx_count("..TST"), Some(0));

        assert!(dispatch(&mut lenient, corrupted).is_ok());
        assert_eq!(lenient.rx_count("..TST"), Some(1));
    }

    #[test]
    fn test_too_few_fields_never_reach_parser() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(Recorder::default()), ChecksumMode::Required);

        assert!(matches!(
            dispatch(&mut dispatcher, &line("GPTST,5")),
            Err(DecodeError::TooFewFields {
                expected: 3,
                found: 2,
                ..
            })
        ));
        assert!(dispatcher.parser::<Recorder>().unwrap().seen.is_empty());
    }

    #[test]
    fn test_field_errors_are_reported() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(Recorder::default()), ChecksumMode::Required);

        let result = dispatch(&mut dispatcher, &line("GPTST,0,x"));
        assert_eq!(
            result,
            Err(DecodeError::Field {
                sentence: format!("$GPTST,0,x*{:02X}", crate::checksum(b"GPTST,0,x")),
                source: FieldError::invalid(1, "zero"),
            })
        );
        assert_eq!(dispatcher.rx_count("..TST"), Some(0));
    }

    #[test]
    fn test_first_registration_wins() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(Recorder::default()), ChecksumMode::Required);
        dispatcher.register(Box::new(Recorder::default()), ChecksumMode::Required);

        dispatch(&mut dispatcher, &line("GPTST,5,x")).unwrap();
        assert_eq!(dispatcher.len(), 2);
        assert_eq!(dispatcher.parser::<Recorder>().unwrap().seen.len(), 1);
    }
}
