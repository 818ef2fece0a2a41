//! # Checksums
//!
//! NMEA 0183 protects each sentence with the XOR of every byte between the
//! start delimiter (`$` or `!`) and the `*` that introduces the two-digit
//! hexadecimal trailer.

use nom::{
    Parser,
    bytes::complete::{take, take_until},
    character::complete::{char, line_ending, one_of},
    combinator::{all_consuming, opt},
    number::complete::hex_u32,
};

use crate::{DecodeError, FramingError, IResult};

/// Calculates the NMEA 0183 checksum for the given sentence content.
///
/// The content is everything between the start delimiter and the `*`
/// checksum delimiter, excluding both.
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::checksum;
///
/// assert_eq!(checksum(b"GPGLL,5133.81,N,00042.25,W"), 0x75);
/// ```
pub fn checksum(input: &[u8]) -> u8 {
    checksum_with_seed(input, 0)
}

/// Continues a checksum over `input`, starting from `seed`.
///
/// Checksums compose: the checksum of `a` followed by `b` equals
/// `checksum_with_seed(b, checksum(a))`, so a sentence can be validated in
/// pieces (for example the address and the remaining fields).
pub fn checksum_with_seed(input: &[u8], seed: u8) -> u8 {
    input
        .iter()
        .fold(seed, |accumulated_xor, &byte| accumulated_xor ^ byte)
}

/// Formats a checksum value as a two-digit uppercase hexadecimal string.
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::format_checksum;
///
/// assert_eq!(format_checksum(0x0A), "0A");
/// ```
pub fn format_checksum(checksum: u8) -> String {
    format!("{checksum:02X}")
}

/// Appends `*HH` to an outgoing sentence.
///
/// The checksum covers everything after a leading `$` or `!`, so the
/// sentence may be passed with or without its start delimiter.
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::append_checksum;
///
/// let mut sentence = String::from("$GPGLL,5133.81,N,00042.25,W");
/// append_checksum(&mut sentence);
/// assert_eq!(sentence, "$GPGLL,5133.81,N,00042.25,W*75");
/// ```
pub fn append_checksum(sentence: &mut String) {
    let content = sentence
        .strip_prefix(['$', '!'])
        .unwrap_or(sentence.as_str());
    let checksum = checksum(content.as_bytes());
    sentence.push('*');
    sentence.push_str(&format_checksum(checksum));
}

fn trailer(i: &str) -> IResult<&str, u8> {
    let (i, digits) = take(2u8).parse(i)?;
    let (_, value) = all_consuming(hex_u32).parse(digits)?;

    Ok((i, value as u8))
}

fn sentence(i: &str) -> IResult<&str, (&str, u8)> {
    let (i, (_, content, _, transmitted, _)) = all_consuming((
        one_of("$!"),
        take_until("*"),
        char('*'),
        trailer,
        opt(line_ending),
    ))
    .parse(i)?;

    Ok((i, (content, transmitted)))
}

/// Verifies a complete sentence line, `$...*HH` with an optional line ending.
///
/// Returns the checksum on success.
///
/// # Examples
///
/// ```rust
/// use nmea0183_decoder::verify_sentence;
///
/// assert_eq!(verify_sentence("$GPGLL,5133.81,N,00042.25,W*75\r\n"), Ok(0x75));
/// assert!(verify_sentence("$GPGLL,5133.81,N,00042.25,W*76").is_err());
/// ```
pub fn verify_sentence(line: &str) -> Result<u8, DecodeError> {
    let (_, (content, transmitted)) =
        sentence(line).map_err(|_| DecodeError::Framing(FramingError::MalformedChecksum))?;

    let computed = checksum(content.as_bytes());
    if computed != transmitted {
        return Err(DecodeError::ChecksumMismatch {
            sentence: line.trim_end().to_owned(),
            computed,
            transmitted,
        });
    }

    Ok(computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_known_checksums() {
        assert_eq!(checksum(b"WIMWV,045.0,R,10.0,N,A"), 0x13);
        assert_eq!(
            checksum(b"GNGGA,121224.00,,,,,0,00,99.99,,,,,,"),
            0x7E
        );
        assert_eq!(checksum(b""), 0);
    }

    #[test]
    fn test_seeded_checksum_composes() {
        let address = b"PSTI,";
        let rest = b"099,1,2,3";
        let seed = checksum(address);

        assert_eq!(checksum_with_seed(rest, seed), checksum(b"PSTI,099,1,2,3"));
        assert_eq!(checksum_with_seed(rest, seed), 0x1E);
    }

    #[test]
    fn test_append_then_verify() {
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let len = rng.gen_range(0..80);
            let body: String = (0..len)
                .map(|_| match rng.gen_range(0..4) {
                    0 => ',',
                    _ => rng.gen_range(b'0'..=b'Z') as char,
                })
                .collect();

            let mut sentence = format!("$GP{body}");
            append_checksum(&mut sentence);

            let computed = checksum(sentence[1..sentence.len() - 3].as_bytes());
            assert_eq!(verify_sentence(&sentence), Ok(computed), "{sentence}");
        }
    }

    #[test]
    fn test_single_bit_flip_is_detected() {
        let sentence = "$GPGLL,5133.81,N,00042.25,W*75";
        let content_end = sentence.len() - 3;

        for position in 1..content_end {
            for bit in 0..7 {
                let mut bytes = sentence.as_bytes().to_vec();
                bytes[position] ^= 1 << bit;
                if bytes[position] == b'*' || !bytes[position].is_ascii() {
                    continue;
                }

                let corrupted = String::from_utf8(bytes).unwrap();
                assert!(
                    verify_sentence(&corrupted).is_err(),
                    "flip of bit {bit} at {position} went unnoticed: {corrupted}"
                );
            }
        }
    }

    #[test]
    fn test_verify_rejects_malformed_trailers() {
        for line in [
            "$GPGLL,5133.81,N,00042.25,W",
            "$GPGLL,5133.81,N,00042.25,W*7",
            "$GPGLL,5133.81,N,00042.25,W*7G",
            "$GPGLL,5133.81,N,00042.25,W*755",
            "GPGLL,5133.81,N,00042.25,W*75",
        ] {
            assert_eq!(
                verify_sentence(line),
                Err(DecodeError::Framing(FramingError::MalformedChecksum)),
                "{line}"
            );
        }
    }

    #[test]
    fn test_verify_accepts_lowercase_hex() {
        assert_eq!(
            verify_sentence("$GNVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*3b\r\n"),
            Ok(0x3B)
        );
        assert!(matches!(
            verify_sentence("$WIMWV,045.0,R,10.0,N,A*1a"),
            Err(DecodeError::ChecksumMismatch {
                computed: 0x13,
                transmitted: 0x1A,
                ..
            })
        ));
    }

    #[test]
    fn test_verify_reports_mismatch() {
        assert_eq!(
            verify_sentence("$WIMWV,045.0,R,10.0,N,A*14\r\n"),
            Err(DecodeError::ChecksumMismatch {
                sentence: "$WIMWV,045.0,R,10.0,N,A*14".to_owned(),
                computed: 0x13,
                transmitted: 0x14,
            })
        );
    }
}
