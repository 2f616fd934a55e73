// # Hardware Addresses
//
// Parsing for EUI-48, EUI-64 and 20-octet IP-over-InfiniBand link-layer
// addresses. Accepted notations:
//
// - `00:00:5e:00:53:01` (colon-separated pairs)
// - `00-00-5e-00-53-01` (hyphen-separated pairs)
// - `0000.5e00.5301`    (dot-separated quads)
//
// Every address is rendered back as lowercase colon-separated pairs.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Octet counts of the supported address families
const VALID_LENGTHS: [usize; 3] = [6, 8, 20];

/// Shortest textual form: six octets in dotted quads
const MIN_TEXT_LEN: usize = 14;

/// A link-layer hardware address
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(Vec<u8>);

impl MacAddr {
    /// Raw octets of the address
    pub fn octets(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() < MIN_TEXT_LEN {
            return Err(invalid(s));
        }

        let octets = match (bytes[2], bytes[4]) {
            (sep @ (b':' | b'-'), _) => parse_pairs(s, sep)?,
            (_, b'.') => parse_quads(s)?,
            _ => return Err(invalid(s)),
        };

        if !VALID_LENGTHS.contains(&octets.len()) {
            return Err(invalid(s));
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, octet) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{octet:02x}")?;
        }
        Ok(())
    }
}

/// `xx:xx:xx...` or `xx-xx-xx...`; the separator must be consistent
fn parse_pairs(s: &str, sep: u8) -> Result<Vec<u8>> {
    let bytes = s.as_bytes();
    if (bytes.len() + 1) % 3 != 0 {
        return Err(invalid(s));
    }

    let count = (bytes.len() + 1) / 3;
    let mut octets = Vec::with_capacity(count);
    for i in 0..count {
        let at = i * 3;
        if i + 1 < count && bytes[at + 2] != sep {
            return Err(invalid(s));
        }
        octets.push(hex_octet(bytes[at], bytes[at + 1]).ok_or_else(|| invalid(s))?);
    }

    Ok(octets)
}

/// `xxxx.xxxx.xxxx...`
fn parse_quads(s: &str) -> Result<Vec<u8>> {
    let bytes = s.as_bytes();
    if (bytes.len() + 1) % 5 != 0 {
        return Err(invalid(s));
    }

    let groups = (bytes.len() + 1) / 5;
    let mut octets = Vec::with_capacity(groups * 2);
    for i in 0..groups {
        let at = i * 5;
        if i + 1 < groups && bytes[at + 4] != b'.' {
            return Err(invalid(s));
        }
        octets.push(hex_octet(bytes[at], bytes[at + 1]).ok_or_else(|| invalid(s))?);
        octets.push(hex_octet(bytes[at + 2], bytes[at + 3]).ok_or_else(|| invalid(s))?);
    }

    Ok(octets)
}

fn hex_octet(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

fn invalid(s: &str) -> Error {
    Error::invalid_identifier(format!("bad hardware address {s:?}"))
}
