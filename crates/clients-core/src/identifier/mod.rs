//! Client identifiers
//!
//! A persistent client is matched against incoming traffic by one or more
//! identifiers. Every raw string is classified into exactly one kind, tried
//! in this order:
//!
//! 1. MAC address ([`MacAddr`])
//! 2. CIDR subnet ([`Subnet`])
//! 3. Single IP address
//! 4. Opaque client ID (as sent by DoH/DoT/DoQ clients)
//!
//! Classification normalizes the value, so two spellings of the same address
//! compare equal.

pub mod mac;
pub mod subnet;

pub use mac::MacAddr;
pub use subnet::Subnet;

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Maximum client ID length (one DNS label)
pub const MAX_CLIENT_ID_LEN: usize = 63;

/// A single normalized identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identifier {
    /// Exact IP address
    Ip(IpAddr),
    /// CIDR block
    Subnet(Subnet),
    /// Link-layer address
    Mac(MacAddr),
    /// Opaque client ID string
    ClientId(String),
}

/// The kind of an [`Identifier`], as reported in lookup logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Ip,
    Subnet,
    Mac,
    ClientId,
}

impl Identifier {
    /// Classify and normalize a raw identifier
    pub fn classify(raw: &str) -> Result<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(Error::invalid_identifier("identifier is empty"));
        }

        if let Ok(mac) = s.parse::<MacAddr>() {
            return Ok(Self::Mac(mac));
        }

        if s.contains('/') {
            return s.parse::<Subnet>().map(Self::Subnet);
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Ip(ip));
        }

        validate_client_id(s)?;
        Ok(Self::ClientId(s.to_string()))
    }

    /// Kind of this identifier
    pub fn kind(&self) -> IdentifierKind {
        match self {
            Self::Ip(_) => IdentifierKind::Ip,
            Self::Subnet(_) => IdentifierKind::Subnet,
            Self::Mac(_) => IdentifierKind::Mac,
            Self::ClientId(_) => IdentifierKind::ClientId,
        }
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::classify(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => ip.fmt(f),
            Self::Subnet(subnet) => subnet.fmt(f),
            Self::Mac(mac) => mac.fmt(f),
            Self::ClientId(id) => f.write_str(id),
        }
    }
}

/// Validate an opaque client ID
///
/// A client ID must be a single lowercase DNS label: ASCII letters, digits
/// and hyphens, at most 63 characters, no leading or trailing hyphen.
pub fn validate_client_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::invalid_identifier("client id is empty"));
    }

    if id.len() > MAX_CLIENT_ID_LEN {
        return Err(Error::invalid_identifier(format!(
            "client id {id:?} is too long: {} chars (max {MAX_CLIENT_ID_LEN})",
            id.len()
        )));
    }

    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        let hint = if c.is_ascii_uppercase() {
            "; client ids must be lowercase"
        } else {
            ""
        };
        return Err(Error::invalid_identifier(format!(
            "client id {id:?} contains invalid character {c:?}{hint}"
        )));
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(Error::invalid_identifier(format!(
            "client id {id:?} cannot start or end with a hyphen"
        )));
    }

    Ok(())
}

/// A normalized, deduplicated set of identifiers
///
/// Ordering of the input is irrelevant: two sets built from the same
/// identifiers in different orders are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet(BTreeSet<Identifier>);

impl IdentifierSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every raw entry
    ///
    /// Fails on the first empty or malformed entry; the error names it.
    pub fn parse<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for (i, entry) in raw.into_iter().enumerate() {
            let entry = entry.as_ref();
            let id = Identifier::classify(entry).map_err(|err| match err {
                Error::InvalidIdentifier(msg) => {
                    Error::invalid_identifier(format!("entry {i} ({entry:?}): {msg}"))
                }
                other => other,
            })?;
            set.insert(id);
        }

        Ok(Self(set))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.0.iter()
    }

    /// Render every identifier in canonical form
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<Identifier> for IdentifierSet {
    fn from_iter<T: IntoIterator<Item = Identifier>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a Identifier;
    type IntoIter = std::collections::btree_set::Iter<'a, Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_kind() {
        let cases = [
            ("1.1.1.1", IdentifierKind::Ip, "1.1.1.1"),
            ("2001:0DB8::0001", IdentifierKind::Ip, "2001:db8::1"),
            ("192.168.1.77/24", IdentifierKind::Subnet, "192.168.1.0/24"),
            ("AA-BB-CC-DD-EE-FF", IdentifierKind::Mac, "aa:bb:cc:dd:ee:ff"),
            ("kids-laptop", IdentifierKind::ClientId, "kids-laptop"),
            ("  1.1.1.1  ", IdentifierKind::Ip, "1.1.1.1"),
        ];

        for (raw, kind, want) in cases {
            let id = Identifier::classify(raw).unwrap();
            assert_eq!(id.kind(), kind, "input {raw:?}");
            assert_eq!(id.to_string(), want, "input {raw:?}");
        }
    }

    #[test]
    fn test_classify_rejects() {
        let too_long = "a".repeat(MAX_CLIENT_ID_LEN + 1);
        for raw in [
            "",
            "   ",
            "Kids-Laptop",
            "-laptop",
            "laptop-",
            "kids_laptop",
            "1.2.3.4/40",
            "fe80::1%eth0",
            too_long.as_str(),
        ] {
            let err = Identifier::classify(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidIdentifier(_)), "input {raw:?}");
        }
    }

    #[test]
    fn test_uppercase_client_id_hint() {
        let err = validate_client_id("Laptop").unwrap_err();
        assert!(err.to_string().contains("lowercase"));
    }

    #[test]
    fn test_set_dedup_and_order() {
        let a = IdentifierSet::parse(["1.1.1.1", "aa:bb:cc:dd:ee:ff", "laptop"]).unwrap();
        let b = IdentifierSet::parse(["laptop", "AA:BB:CC:DD:EE:FF", "1.1.1.1", "1.1.1.1"]).unwrap();

        assert_eq!(a, b);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_set_names_bad_entry() {
        let err = IdentifierSet::parse(["1.1.1.1", ""]).unwrap_err();
        assert!(err.to_string().contains("entry 1"), "{err}");
    }
}
