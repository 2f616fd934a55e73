// # Subnets
//
// CIDR blocks in canonical form: the host bits of the network address are
// always zero, so `10.1.2.3/8` and `10.0.0.0/8` are the same subnet.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;

use crate::error::{Error, Result};

/// An IPv4 or IPv6 network in CIDR notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subnet(IpNet);

impl Subnet {
    /// Create a subnet, masking off host bits
    ///
    /// Fails when `prefix_len` exceeds the address width.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self> {
        let net = IpNet::new(addr, prefix_len).map_err(|_| {
            Error::invalid_identifier(format!("prefix length {prefix_len} is too long for {addr}"))
        })?;

        Ok(Self(net.trunc()))
    }

    /// Network address (host bits cleared)
    pub fn addr(&self) -> IpAddr {
        self.0.network()
    }

    /// Prefix length in bits
    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Whether `ip` lies inside this subnet
    ///
    /// Addresses of the other family are never contained.
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(ip)
    }

    /// Whether the two subnets share at least one address
    pub fn overlaps(&self, other: &Subnet) -> bool {
        self.contains(&other.addr()) || other.contains(&self.addr())
    }
}

impl FromStr for Subnet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::invalid_identifier(format!("bad subnet {s:?}"));

        // Plain decimal prefix only: no sign, no leading zeros
        let (_, len) = s.split_once('/').ok_or_else(bad)?;
        if len.is_empty()
            || !len.bytes().all(|b| b.is_ascii_digit())
            || (len.len() > 1 && len.starts_with('0'))
        {
            return Err(bad());
        }

        let net: IpNet = s.parse().map_err(|_| bad())?;
        Ok(Self(net.trunc()))
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
