//! Pinned SHA-256 digests.
//!
//! Digests arrive as hex text from the release table and leave the hasher
//! as raw bytes; both forms meet in [`Sha256Digest`], which compares bytes
//! and renders lowercase hex. Text must be exactly 64 lowercase hex
//! characters. A longer value is rejected, never truncated to fit.

use super::error::{ArtefactError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// A 256-bit digest parsed from, and displayed as, lowercase hex.
///
/// # Examples
///
/// ```
/// use piam_anc_installer::artefact::sha256_digest::Sha256Digest;
///
/// let hex = "0f".repeat(32);
/// let digest: Sha256Digest = hex.parse().expect("valid digest");
/// assert_eq!(digest.as_bytes()[0], 0x0f);
/// assert_eq!(digest.to_hex(), hex);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; DIGEST_LEN]);

impl Sha256Digest {
    /// The raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, as written in the release table.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl From<[u8; DIGEST_LEN]> for Sha256Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Sha256Digest {
    type Err = ArtefactError;

    fn from_str(value: &str) -> Result<Self> {
        parse_hex(value).map(Self)
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({self})")
    }
}

impl Serialize for Sha256Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_hex(value: &str) -> Result<[u8; DIGEST_LEN]> {
    let invalid = |reason: String| ArtefactError::InvalidSha256Digest { reason };
    if value.len() != DIGEST_HEX_LEN {
        return Err(invalid(format!(
            "expected {DIGEST_HEX_LEN} hex characters, got {}",
            value.len()
        )));
    }

    let mut bytes = [0_u8; DIGEST_LEN];
    for (byte, pair) in bytes.iter_mut().zip(value.as_bytes().chunks_exact(2)) {
        let &[high, low] = pair else {
            return Err(invalid("odd number of hex characters".to_owned()));
        };
        *byte = (nibble(high).map_err(invalid)? << 4) | nibble(low).map_err(invalid)?;
    }
    Ok(bytes)
}

fn nibble(symbol: u8) -> std::result::Result<u8, String> {
    match symbol {
        b'0'..=b'9' => Ok(symbol - b'0'),
        b'a'..=b'f' => Ok(symbol - b'a' + 10),
        b'A'..=b'F' => Err("digest must be lowercase".to_owned()),
        other => Err(format!("non-hex character {:?}", char::from(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sha2::{Digest, Sha256};

    const ABC_HEX: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn parses_known_vector_to_bytes() {
        let digest: Sha256Digest = ABC_HEX.parse().expect("valid digest");
        let expected: [u8; DIGEST_LEN] = Sha256::digest(b"abc").into();
        assert_eq!(digest.as_bytes(), &expected);
        assert_eq!(digest, Sha256Digest::from(expected));
    }

    #[rstest]
    #[case::too_short("abcdef".to_owned())]
    #[case::one_char_too_many("a".repeat(65))]
    #[case::one_byte_too_many("a".repeat(66))]
    #[case::empty(String::new())]
    fn rejects_wrong_length(#[case] value: String) {
        let err = Sha256Digest::try_from(value.as_str()).expect_err("expected rejection");
        assert!(
            matches!(err, ArtefactError::InvalidSha256Digest { ref reason } if reason.contains("64")),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    #[case::non_hex(format!("{}g", "a".repeat(63)), "non-hex")]
    #[case::uppercase("A".repeat(64), "lowercase")]
    #[case::whitespace(format!(" {}", "a".repeat(63)), "non-hex")]
    fn rejects_bad_characters(#[case] value: String, #[case] expected: &str) {
        let err: ArtefactError = value.parse::<Sha256Digest>().expect_err("expected rejection");
        assert!(err.to_string().contains(expected), "unexpected error: {err}");
    }

    #[test]
    fn display_round_trips_through_parse() {
        let digest: Sha256Digest = ABC_HEX.parse().expect("valid digest");
        assert_eq!(digest.to_hex(), ABC_HEX);
        assert_eq!(format!("{digest:?}"), format!("Sha256Digest({ABC_HEX})"));
    }

    #[test]
    fn serialises_as_hex_string() {
        let digest: Sha256Digest = ABC_HEX.parse().expect("valid digest");
        let json = serde_json::to_string(&digest).expect("serialises");
        assert_eq!(json, format!("\"{ABC_HEX}\""));
    }
}
