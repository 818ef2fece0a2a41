//! # Decoded Values
//!
//! Every sentence parser publishes into [`ParsedValue`] slots. A slot keeps
//! the last good value and notifies its observers on every update; failed
//! decodes never touch it.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fields::{INVALID_FLOAT, Sentinel};

/// Altitude of a [`Position`] decoded from a sentence that carries none.
pub const INVALID_ALTITUDE: f32 = INVALID_FLOAT;

type Observer<T> = Box<dyn FnMut(&T) + Send>;

/// Output slot holding the most recently decoded value of one quantity.
///
/// Only the owning sentence parser writes to it, after the whole sentence
/// has decoded.
///
/// # Examples
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use nmea0183_decoder::{Decoder, sentences::GllParser};
///
/// let mut decoder = Decoder::new(Default::default());
/// decoder.register(GllParser::default());
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// decoder
///     .parser_mut::<GllParser>()
///     .unwrap()
///     .position
///     .connect(move |position| sink.lock().unwrap().push(position.latitude));
///
/// decoder.decode_line("$GPGLL,5133.81,N,00042.25,W*75");
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub struct ParsedValue<T> {
    value: Option<T>,
    updates: u64,
    observers: Vec<Observer<T>>,
}

impl<T> ParsedValue<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            updates: 0,
            observers: Vec::new(),
        }
    }

    /// The last published value, `None` until the first successful decode.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// How many times a value has been published.
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Calls `observer` with every value published from now on.
    pub fn connect<F>(&mut self, observer: F)
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Publishes `value`. Only the parser owning the slot calls this.
    pub fn set(&mut self, value: T) {
        let value = self.value.insert(value);
        self.updates += 1;
        for observer in &mut self.observers {
            observer(value);
        }
    }
}

impl<T> Default for ParsedValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ParsedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedValue")
            .field("value", &self.value)
            .field("updates", &self.updates)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Geodetic position in decimal degrees, altitude in meters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// [`INVALID_ALTITUDE`] when the sentence carried no altitude.
    pub altitude: f32,
}

impl Position {
    pub fn has_altitude(&self) -> bool {
        !self.altitude.is_invalid()
    }
}

/// East/north/up vector, in meters or meters per second.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnuVector {
    pub east: f32,
    pub north: f32,
    pub up: f32,
}

/// Roll, pitch and yaw in radians.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttitudeVector {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

/// Knots to meters per second.
pub(crate) fn knots_to_mps(knots: f32) -> f32 {
    knots * 1852.0 / 3600.0
}

pub(crate) fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::TAU / 360.0
}
