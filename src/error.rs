//! # Error Types
//!
//! This module defines the error types used throughout the decoder: the
//! nom-level [`Error`] produced by individual field parsers, and the typed
//! errors reported for framing, field, sentence and dispatch failures.

use nom::error::{ErrorKind, FromExternalError, ParseError};
use std::fmt::Debug;

/// Holds the result of field parsing functions.
///
/// It depends on the input type `I`, the output type `O`, and the error type `E`
/// (by default `nom::error::Error<I>`).
///
/// The `Ok` side is a pair containing the remainder of the input (the part of the data that
/// was not parsed) and the produced value. The `Err` side contains an instance of `nom::Err`.
pub type IResult<I, O, E = nom::error::Error<I>> = nom::IResult<I, O, Error<I, E>>;

/// Failure of a single-field nom parser.
#[derive(Debug, PartialEq)]
pub enum Error<I, E> {
    /// The field could not be parsed because its format was invalid.
    ///
    /// This wraps nom's standard parsing errors.
    ParsingError(E),

    /// The field was well formed but its value is out of range or not one of
    /// the accepted symbols (a fix quality of 9, a hemisphere of `X`).
    ///
    /// Contains the input that caused the error.
    InvalidField(I),
}

impl<I, E> ParseError<I> for Error<I, E>
where
    E: ParseError<I>,
{
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Error::ParsingError(E::from_error_kind(input, kind))
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I, E, EX> FromExternalError<I, EX> for Error<I, E>
where
    E: FromExternalError<I, EX>,
{
    fn from_external_error(input: I, kind: ErrorKind, e: EX) -> Self {
        Error::ParsingError(E::from_external_error(input, kind, e))
    }
}

/// Why a field could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldErrorKind {
    /// The sentence ended before this field.
    #[error("missing")]
    Missing,
    /// The field is empty but a value is required.
    #[error("empty")]
    Empty,
    /// The field text could not be parsed.
    #[error("malformed value `{0}`")]
    Malformed(String),
    /// The field parsed but violates a rule of the sentence.
    #[error("{0}")]
    Invalid(&'static str),
}

/// A field-level decode failure, identified by its index in the sentence
/// (the address is field 0).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field {index}: {kind}")]
pub struct FieldError {
    pub index: usize,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(index: usize, kind: FieldErrorKind) -> Self {
        Self { index, kind }
    }

    pub fn malformed(index: usize, text: &str) -> Self {
        Self::new(index, FieldErrorKind::Malformed(text.to_owned()))
    }

    pub fn invalid(index: usize, reason: &'static str) -> Self {
        Self::new(index, FieldErrorKind::Invalid(reason))
    }
}

/// Returned by [`SentenceParser::parse_fields`](crate::SentenceParser::parse_fields).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SentenceError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// A meta parser found no sub-parser for the selector it read.
    #[error("no handler for `{0}`")]
    NoHandler(String),
}

/// Reasons the framer drops the sentence it was accumulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    #[error("sentence longer than {0} bytes")]
    Overflow(usize),

    #[error("sentence has more than {0} fields")]
    TooManyFields(usize),

    #[error("line ended before the checksum")]
    Unterminated,

    #[error("malformed checksum trailer")]
    MalformedChecksum,

    #[error("unexpected byte 0x{0:02X}")]
    InvalidByte(u8),

    #[error("sentence interrupted by a new start delimiter")]
    Interrupted,
}

/// Every way a sentence can fail to reach its parser's outputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("framing: {0}")]
    Framing(#[from] FramingError),

    #[error("checksum mismatch in `{sentence}`: computed {computed:02X}, transmitted {transmitted:02X}")]
    ChecksumMismatch {
        sentence: String,
        computed: u8,
        transmitted: u8,
    },

    #[error("no parser registered for `{address}`")]
    UnknownAddress { address: String },

    #[error("`{sentence}`: expected at least {expected} fields, found {found}")]
    TooFewFields {
        sentence: String,
        expected: usize,
        found: usize,
    },

    #[error("`{sentence}`: {source}")]
    Field {
        sentence: String,
        source: FieldError,
    },
}
