use tracing::debug;

use crate::{
    AddressPattern, ChecksumMode, DecodeError, DecoderConfig, SentenceParser,
    dispatch::Dispatcher,
    framer::Framer,
    sentences::{
        GgaParser, GllParser, GsvParser, MwvParser, PqtmtarParser, PstiParser, RmcParser,
        VtgParser,
    },
};

/// Byte-stream NMEA 0183 decoder.
///
/// Bytes go through a [`Framer`]; every completed sentence is handed to the
/// first registered [`SentenceParser`] whose address matches it. Parsers are
/// looked up by type to read their outputs.
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::{Decoder, DecoderConfig, sentences::MwvParser};
///
/// let mut decoder = Decoder::standard(DecoderConfig::default());
/// decoder.feed(b"$WIMWV,045.0,R,10.0,N,A*13\r\n");
///
/// let wind = decoder.parser::<MwvParser>().unwrap();
/// let speed = wind.apparent_wind_speed.get().unwrap();
/// assert!((speed - 5.144).abs() < 1e-3);
/// ```
pub struct Decoder {
    framer: Framer,
    dispatcher: Dispatcher,
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a decoder with no parsers registered.
    pub fn new(config: DecoderConfig) -> Self {
        let config = config.clamped();

        Self {
            framer: Framer::new(&config),
            dispatcher: Dispatcher::new(),
            config,
        }
    }

    /// Creates a decoder with every built-in sentence parser registered.
    pub fn standard(config: DecoderConfig) -> Self {
        let mut decoder = Self::new(config);
        decoder.register(GgaParser::default());
        decoder.register(GllParser::default());
        decoder.register(RmcParser::default());
        decoder.register(VtgParser::default());
        decoder.register(GsvParser::default());
        decoder.register(PstiParser::default());
        decoder.register(PqtmtarParser::default());
        decoder.register(MwvParser::default());
        decoder
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Registers `parser` with the configured checksum policy.
    pub fn register<P: SentenceParser>(&mut self, parser: P) {
        self.register_with(parser, self.config.checksum_mode);
    }

    /// Registers `parser` with its own checksum policy.
    pub fn register_with<P: SentenceParser>(&mut self, parser: P, checksum_mode: ChecksumMode) {
        self.dispatcher.register(Box::new(parser), checksum_mode);
    }

    /// Feeds one byte.
    ///
    /// Returns `None` until a sentence completes or is dropped, then the
    /// address pattern of the parser that decoded it or the reason it was
    /// rejected.
    pub fn handle(&mut self, byte: u8) -> Option<Result<AddressPattern, DecodeError>> {
        let result = match self.framer.handle(byte)? {
            Ok(sentence) => self.dispatcher.dispatch(&sentence),
            Err(error) => {
                debug!(%error, "sentence dropped");
                Err(error.into())
            }
        };

        Some(result)
    }

    /// Feeds a chunk of the stream and returns how many sentences were
    /// decoded. A sentence may span several chunks.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .filter_map(|&byte| self.handle(byte))
            .filter(Result::is_ok)
            .count()
    }

    /// Decodes a line that was already split by the transport. The line
    /// terminator is optional.
    ///
    /// Returns the outcome of the last sentence the line completed.
    pub fn decode_line(&mut self, line: &str) -> Option<Result<AddressPattern, DecodeError>> {
        let mut outcome = None;
        for &byte in line.as_bytes() {
            if let Some(result) = self.handle(byte) {
                outcome = Some(result);
            }
        }

        if !line.ends_with(['\r', '\n']) {
            if let Some(result) = self.handle(b'\n') {
                outcome = Some(result);
            }
        }

        outcome
    }

    /// The first registered parser of type `P`.
    pub fn parser<P: SentenceParser>(&self) -> Option<&P> {
        self.dispatcher.parser()
    }

    pub fn parser_mut<P: SentenceParser>(&mut self) -> Option<&mut P> {
        self.dispatcher.parser_mut()
    }

    /// Sentences decoded by the parser registered for `pattern`.
    pub fn rx_count(&self, pattern: &str) -> Option<u64> {
        self.dispatcher.rx_count(pattern)
    }

    /// Drops any partially received sentence.
    pub fn reset(&mut self) {
        self.framer.reset();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}
