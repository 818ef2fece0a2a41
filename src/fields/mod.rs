//! # Sentence Fields
//!
//! A framed sentence is a body of text plus the byte spans of its
//! comma-separated fields. Field 0 is the address (`GPGGA`, `PSTI`, ...),
//! the data fields follow from index 1.
//!
//! [`FieldParse`] decodes one field into a typed value; `Option<T>` turns an
//! empty field into `None` instead of an error. [`FromFields`] decodes a whole
//! record from a [`FieldCursor`] and is usually derived.

use nom::{Parser, character::complete::anychar, combinator::all_consuming};

use crate::{Error, FieldError, FieldErrorKind, FramingError, IResult};

pub mod parse;

/// Most fields a sentence may carry, the address included.
pub const MAX_FIELDS: usize = 25;

/// Marks a single precision value that was absent.
pub const INVALID_FLOAT: f32 = f32::MIN;

/// Flat "absent" encoding for values stored without an `Option`, such as
/// [`Position::altitude`](crate::Position::altitude).
///
/// The sentinel is the lowest value of the type and is never produced by a
/// successful decode.
pub trait Sentinel: Copy + PartialEq {
    const INVALID: Self;

    fn or_invalid(value: Option<Self>) -> Self {
        value.unwrap_or(Self::INVALID)
    }

    fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

impl Sentinel for f32 {
    const INVALID: Self = INVALID_FLOAT;
}

/// Byte range of one field inside a sentence body, separators excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Read-only view of a sentence's fields.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    body: &'a str,
    spans: &'a [Span],
    base: usize,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a str, spans: &'a [Span]) -> Self {
        Self {
            body,
            spans,
            base: 0,
        }
    }

    /// Splits a sentence body (no start delimiter, no checksum) at its commas.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nmea0183_decoder::Fields;
    ///
    /// let mut spans = heapless::Vec::new();
    /// let fields = Fields::split("GPGLL,5133.81,N,,", &mut spans).unwrap();
    ///
    /// assert_eq!(fields.len(), 5);
    /// assert_eq!(fields.address(), "GPGLL");
    /// assert_eq!(fields.get(2), Some("N"));
    /// assert_eq!(fields.get(4), Some(""));
    /// ```
    pub fn split(
        body: &'a str,
        spans: &'a mut heapless::Vec<Span, MAX_FIELDS>,
    ) -> Result<Self, FramingError> {
        spans.clear();

        let mut start = 0;
        for (end, byte) in body.bytes().enumerate() {
            if byte == b',' {
                spans
                    .push(Span { start, end })
                    .map_err(|_| FramingError::TooManyFields(MAX_FIELDS))?;
                start = end + 1;
            }
        }
        spans
            .push(Span {
                start,
                end: body.len(),
            })
            .map_err(|_| FramingError::TooManyFields(MAX_FIELDS))?;

        Ok(Self::new(body, spans))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.spans
            .get(index)
            .and_then(|span| self.body.get(span.start..span.end))
    }

    pub fn address(&self) -> &'a str {
        self.get(0).unwrap_or_default()
    }

    /// The two-letter talker of a standard sentence (`GP`, `GN`, `WI`, ...).
    ///
    /// Proprietary sentences (address starting with `P`) have none.
    pub fn talker_id(&self) -> Option<&'a str> {
        let address = self.address();
        if address.starts_with('P') {
            return None;
        }
        address.get(..2)
    }

    /// Whole sentence body the fields were split from.
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Drops the first `n` fields. Field indices reported by cursors over the
    /// shifted view still refer to the original sentence.
    pub fn shifted(&self, n: usize) -> Self {
        let n = n.min(self.spans.len());
        Self {
            body: self.body,
            spans: &self.spans[n..],
            base: self.base + n,
        }
    }

    /// A cursor positioned on the first data field.
    pub fn cursor(&self) -> FieldCursor<'a> {
        FieldCursor {
            fields: *self,
            index: 1,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }
}

/// Walks the fields of a sentence in order, decoding one at a time.
#[derive(Debug, Clone)]
pub struct FieldCursor<'a> {
    fields: Fields<'a>,
    index: usize,
}

impl<'a> FieldCursor<'a> {
    /// Index of the next field, counted in the original sentence.
    pub fn index(&self) -> usize {
        self.fields.base + self.index
    }

    /// Number of fields not consumed yet.
    pub fn remaining(&self) -> usize {
        self.fields.len().saturating_sub(self.index)
    }

    /// Returns the raw text of the next field.
    pub fn next_field(&mut self) -> Result<&'a str, FieldError> {
        let field = self
            .fields
            .get(self.index)
            .ok_or_else(|| FieldError::new(self.index(), FieldErrorKind::Missing))?;
        self.index += 1;
        Ok(field)
    }

    pub fn skip(&mut self) {
        self.index += 1;
    }

    /// Decodes the next field with `parser`, which must consume it entirely.
    /// An empty field is an error.
    pub fn next_with<O, F>(&mut self, parser: F) -> Result<O, FieldError>
    where
        F: Parser<&'a str, Output = O, Error = Error<&'a str, nom::error::Error<&'a str>>>,
    {
        let index = self.index();
        let field = self.next_field()?;
        if field.is_empty() {
            return Err(FieldError::new(index, FieldErrorKind::Empty));
        }

        let result = all_consuming(parser).parse(field);
        match result {
            Ok((_, value)) => Ok(value),
            Err(_) => Err(FieldError::malformed(index, field)),
        }
    }

    /// Like [`next_with`](Self::next_with), but an empty field yields `None`.
    pub fn next_optional_with<O, F>(&mut self, parser: F) -> Result<Option<O>, FieldError>
    where
        F: Parser<&'a str, Output = O, Error = Error<&'a str, nom::error::Error<&'a str>>>,
    {
        if self.fields.get(self.index).is_some_and(str::is_empty) {
            self.index += 1;
            return Ok(None);
        }
        self.next_with(parser).map(Some)
    }

    /// Decodes the next field as `T`.
    pub fn parse<T: FieldParse>(&mut self) -> Result<T, FieldError> {
        T::from_cursor(self)
    }
}

/// Types that can be decoded from a single field.
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::{FieldParse, IResult};
///
/// let result: IResult<_, _> = u8::parse_field("42");
/// assert_eq!(result, Ok(("", 42)));
///
/// let result: IResult<_, _> = Option::<f32>::parse_field("");
/// assert_eq!(result, Ok(("", None)));
/// ```
pub trait FieldParse: Sized {
    /// Parses the field text. The cursor rejects any unconsumed remainder.
    fn parse_field(i: &str) -> IResult<&str, Self>;

    /// Decodes the next field of `cursor`.
    fn from_cursor(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        cursor.next_with(Self::parse_field)
    }
}

/// Records decoded from consecutive fields. Derive it with
/// `#[derive(FromFields)]`.
pub trait FromFields: Sized {
    fn from_fields(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError>;
}

impl<T: FieldParse> FieldParse for Option<T> {
    fn parse_field(i: &str) -> IResult<&str, Self> {
        if i.is_empty() {
            return Ok((i, None));
        }
        T::parse_field(i).map(|(i, value)| (i, Some(value)))
    }

    fn from_cursor(cursor: &mut FieldCursor<'_>) -> Result<Self, FieldError> {
        cursor.next_optional_with(T::parse_field)
    }
}

macro_rules! impl_integer_field {
    ($($t:tt),*) => ($(
        impl FieldParse for $t {
            fn parse_field(i: &str) -> IResult<&str, Self> {
                nom::character::complete::$t.parse(i)
            }
        }
    )*)
}

impl_integer_field!(u8, u16, u32, u64, i8, i16, i32, i64);

impl FieldParse for f32 {
    fn parse_field(i: &str) -> IResult<&str, Self> {
        nom::number::complete::float.parse(i)
    }
}

impl FieldParse for f64 {
    fn parse_field(i: &str) -> IResult<&str, Self> {
        nom::number::complete::double.parse(i)
    }
}

/// Any single character.
impl FieldParse for char {
    fn parse_field(i: &str) -> IResult<&str, Self> {
        anychar.parse(i)
    }
}

/// A field that must hold exactly the character `C`, such as the `M` unit
/// after an altitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marker<const C: char>;

impl<const C: char> FieldParse for Marker<C> {
    fn parse_field(i: &str) -> IResult<&str, Self> {
        nom::character::complete::char(C).map(|_| Marker).parse(i)
    }
}

/// Declares an enum transmitted as a single character and implements
/// [`FieldParse`] for it.
macro_rules! parsable_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $char:literal => $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $name {
            /// The character this value is transmitted as.
            pub fn as_char(self) -> char {
                match self {
                    $(Self::$variant => $char,)*
                }
            }
        }

        impl $crate::FieldParse for $name {
            fn parse_field(i: &str) -> $crate::IResult<&str, Self> {
                let (rest, symbol) = nom::character::complete::anychar(i)?;
                match symbol {
                    $($char => Ok((rest, Self::$variant)),)*
                    _ => Err(nom::Err::Error($crate::Error::InvalidField(i))),
                }
            }
        }
    };
}

pub(crate) use parsable_enum;

#[cfg(test)]
mod tests {
    use super::*;

    fn split(body: &str) -> (heapless::Vec<Span, MAX_FIELDS>, &str) {
        let mut spans = heapless::Vec::new();
        Fields::split(body, &mut spans).unwrap();
        (spans, body)
    }

    #[test]
    fn test_split_keeps_empty_fields() {
        let (spans, body) = split("GNVTG,,T,,M,1.317,N,2.438,K,D");
        let fields = Fields::new(body, &spans);

        assert_eq!(fields.len(), 10);
        assert_eq!(
            fields.iter().collect::<Vec<_>>(),
            ["GNVTG", "", "T", "", "M", "1.317", "N", "2.438", "K", "D"]
        );
        assert_eq!(fields.talker_id(), Some("GN"));
    }

    #[test]
    fn test_split_rejects_too_many_fields() {
        let body = format!("GPTXT{}", ",".repeat(MAX_FIELDS));
        let mut spans = heapless::Vec::new();
        assert_eq!(
            Fields::split(&body, &mut spans).err(),
            Some(FramingError::TooManyFields(MAX_FIELDS))
        );
    }

    #[test]
    fn test_proprietary_sentence_has_no_talker() {
        let (spans, body) = split("PQTMTAR,1");
        assert_eq!(Fields::new(body, &spans).talker_id(), None);
    }

    #[test]
    fn test_cursor_reports_absolute_indices_after_shift() {
        let (spans, body) = split("PSTI,032,abc");
        let fields = Fields::new(body, &spans).shifted(1);

        let mut cursor = fields.cursor();
        assert_eq!(cursor.index(), 2);
        assert_eq!(
            cursor.parse::<u32>(),
            Err(FieldError::malformed(2, "abc"))
        );
        assert_eq!(
            cursor.parse::<u32>(),
            Err(FieldError::new(3, FieldErrorKind::Missing))
        );
    }

    #[test]
    fn test_empty_field_is_none_never_zero() {
        let (spans, body) = split("XXXXX,,,0");
        let mut cursor = Fields::new(body, &spans).cursor();

        assert_eq!(cursor.parse::<Option<i32>>(), Ok(None));
        assert_eq!(cursor.parse::<Option<f32>>(), Ok(None));
        assert_eq!(cursor.parse::<Option<i32>>(), Ok(Some(0)));

        assert_eq!(f32::or_invalid(None), INVALID_FLOAT);
        assert!(f32::or_invalid(None).is_invalid());
        assert!(!f32::or_invalid(Some(0.0)).is_invalid());
    }

    #[test]
    fn test_required_field_rejects_empty() {
        let (spans, body) = split("XXXXX,");
        let mut cursor = Fields::new(body, &spans).cursor();
        assert_eq!(
            cursor.parse::<f32>(),
            Err(FieldError::new(1, FieldErrorKind::Empty))
        );
    }

    #[test]
    fn test_whole_field_must_be_consumed() {
        let (spans, body) = split("XXXXX,12abc,1.5.2,-3");
        let mut cursor = Fields::new(body, &spans).cursor();

        assert!(cursor.parse::<u8>().is_err());
        assert!(cursor.parse::<f32>().is_err());
        assert_eq!(cursor.parse::<i32>(), Ok(-3));
    }

    #[test]
    fn test_char_and_marker() {
        let (spans, body) = split("XXXXX,M,M,MM,K");
        let mut cursor = Fields::new(body, &spans).cursor();

        assert_eq!(cursor.parse::<char>(), Ok('M'));
        assert_eq!(cursor.parse::<Marker<'M'>>(), Ok(Marker));
        assert!(cursor.parse::<char>().is_err());
        assert!(cursor.parse::<Marker<'M'>>().is_err());
    }
}
