//! # NMEA 0183 Decoder
//!
//! This library decodes NMEA 0183 sentences of the form
//! `$HHH,D1,D2,...,Dn*CC\r\n` from a raw byte stream.
//!
//! Bytes are fed one at a time (or in chunks of any size) to a [`Decoder`].
//! Its framer cuts the stream into sentences and checks their XOR checksum,
//! and a dispatcher hands each sentence to the parser registered for its
//! address. Parsers publish what they decode into [`ParsedValue`] slots.
//!
//! Supported sentences:
//! - `GGA`, `GLL`, `RMC`, `VTG` and `GSV` from any talker
//! - SkyTraq `PSTI,030` and `PSTI,032`
//! - Quectel `PQTMTAR`
//! - `MWV` wind
//!
//! ## Usage
//!
//! ```rust
//! use nmea0183_decoder::{Decoder, DecoderConfig, sentences::GgaParser};
//!
//! let mut decoder = Decoder::standard(DecoderConfig::default());
//!
//! let stream = b"$GNGGA,121042.00,6011.07385,N,02503.04396,E,2,11,1.04,17.0,M,17.6,M,,0000*75\r\n";
//! assert_eq!(decoder.feed(stream), 1);
//!
//! let gga = decoder.parser::<GgaParser>().unwrap();
//! let position = gga.position.get().unwrap();
//! assert!((position.latitude - 60.184_564).abs() < 1e-6);
//! assert_eq!(gga.num_satellites.get(), Some(&11));
//! ```
//!
//! New sentence types implement [`SentenceParser`], usually with a record
//! struct deriving [`FromFields`] to describe the field layout.

pub mod checksum;
pub mod config;
mod decoder;
pub mod dispatch;
pub mod error;
pub mod fields;
pub mod framer;
pub mod sentences;
pub mod value;

pub use checksum::{append_checksum, checksum, checksum_with_seed, format_checksum, verify_sentence};
pub use config::{ChecksumMode, DecoderConfig};
pub use decoder::Decoder;
pub use dispatch::{AddressPattern, SentenceParser};
pub use error::{
    DecodeError, Error, FieldError, FieldErrorKind, FramingError, IResult, SentenceError,
};
pub use fields::{FieldCursor, FieldParse, Fields, FromFields, Marker, Span};
pub use nmea0183_decoder_derive::FromFields;
pub use value::{AttitudeVector, EnuVector, ParsedValue, Position};

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct README;
