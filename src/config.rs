//! # Decoder Configuration
//!
//! Limits for the framer and the default checksum policy for registered
//! sentence parsers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fields::MAX_FIELDS;

/// Upper bound for [`DecoderConfig::max_sentence_len`]; the framer's buffer
/// is allocated with this capacity.
pub const MAX_SENTENCE_CAPACITY: usize = 250;

/// Default bound on the bytes between the start delimiter and `*`.
pub const DEFAULT_MAX_SENTENCE_LEN: usize = 164;

/// Defines how a sentence parser's input checksum is treated.
///
/// The framer always requires a `*HH` trailer; this only decides whether a
/// mismatching trailer rejects the sentence.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumMode {
    /// The transmitted checksum must match the computed one.
    #[default]
    Required,

    /// The transmitted checksum is read but not compared.
    ///
    /// Useful for talkers known to emit wrong checksums.
    Ignored,
}

/// Configuration for a [`Decoder`](crate::Decoder).
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::{ChecksumMode, DecoderConfig};
///
/// let config = DecoderConfig::new()
///     .max_sentence_len(82)
///     .checksum_mode(ChecksumMode::Ignored);
///
/// assert_eq!(config.max_sentence_len, 82);
/// assert_eq!(config.max_fields, 25);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Longest accepted sentence body, clamped to [`MAX_SENTENCE_CAPACITY`].
    pub max_sentence_len: usize,
    /// Most fields a sentence may have, the address included. Clamped to [`MAX_FIELDS`].
    pub max_fields: usize,
    /// Checksum policy used by [`Decoder::register`](crate::Decoder::register).
    pub checksum_mode: ChecksumMode,
}

impl DecoderConfig {
    /// Creates a configuration with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the longest accepted sentence body.
    pub fn max_sentence_len(mut self, len: usize) -> Self {
        self.max_sentence_len = len.min(MAX_SENTENCE_CAPACITY);
        self
    }

    /// Sets the most fields a sentence may have.
    pub fn max_fields(mut self, fields: usize) -> Self {
        self.max_fields = fields.min(MAX_FIELDS);
        self
    }

    /// Sets the checksum policy for parsers registered without an explicit one.
    pub fn checksum_mode(mut self, mode: ChecksumMode) -> Self {
        self.checksum_mode = mode;
        self
    }

    // Deserialized values bypass the setters.
    pub(crate) fn clamped(self) -> Self {
        Self {
            max_sentence_len: self.max_sentence_len.min(MAX_SENTENCE_CAPACITY),
            max_fields: self.max_fields.clamp(1, MAX_FIELDS),
            ..self
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_sentence_len: DEFAULT_MAX_SENTENCE_LEN,
            max_fields: MAX_FIELDS,
            checksum_mode: ChecksumMode::Required,
        }
    }
}
