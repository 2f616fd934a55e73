// # Client Index
//
// The data behind `ClientRegistry`. Every method here runs with the
// registry lock already held, so a mutation validates first and only then
// touches the maps: a rejected call leaves the index exactly as it was.
//
// ## Layout
//
// - `clients`: records keyed by insertion sequence (listing order)
// - one map per identifier kind, pointing at the owner's UID
// - `names`: name -> UID
//
// Exact IPs are checked against subnets by probing every prefix length of
// the address, so a lookup costs at most 33 (IPv4) or 129 (IPv6) hash
// probes regardless of how many subnets are stored. New subnets are checked
// by scanning, since adding one is rare.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::IpAddr;

use crate::client::{PersistentClient, Uid};
use crate::error::{Error, Result};
use crate::identifier::{Identifier, MacAddr, Subnet};

#[derive(Debug, Default)]
pub(crate) struct ClientIndex {
    next_seq: u64,
    clients: BTreeMap<u64, PersistentClient>,
    seq_by_uid: HashMap<Uid, u64>,

    names: HashMap<String, Uid>,
    ips: HashMap<IpAddr, Uid>,
    subnets: HashMap<Subnet, Uid>,
    macs: HashMap<MacAddr, Uid>,
    client_ids: HashMap<String, Uid>,

    supported_tags: HashSet<String>,
}

impl ClientIndex {
    pub(crate) fn new<I, S>(supported_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported_tags: supported_tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.clients.len()
    }

    /// Records in insertion order
    pub(crate) fn iter(&self) -> impl Iterator<Item = &PersistentClient> {
        self.clients.values()
    }

    /// Insert a new client under a freshly minted UID
    pub(crate) fn add(&mut self, mut client: PersistentClient) -> Result<&PersistentClient> {
        self.validate(&client, None)?;

        client.uid = self.mint_uid();
        let seq = self.next_seq;
        self.next_seq += 1;

        self.index(&client);
        self.seq_by_uid.insert(client.uid, seq);
        Ok(self.clients.entry(seq).or_insert(client))
    }

    /// Replace the client named `old_name`, keeping its UID and position
    pub(crate) fn update(
        &mut self,
        old_name: &str,
        mut client: PersistentClient,
    ) -> Result<&PersistentClient> {
        if old_name.is_empty() {
            return Err(Error::invalid_name("client name to update is empty"));
        }

        let uid = *self
            .names
            .get(old_name)
            .ok_or_else(|| Error::not_found(old_name))?;
        let seq = self.seq_of(uid)?;

        self.validate(&client, Some(uid))?;

        client.uid = uid;
        if let Some(prev) = self.clients.remove(&seq) {
            self.unindex(&prev);
        }
        self.index(&client);
        Ok(self.clients.entry(seq).or_insert(client))
    }

    /// Remove the client named `name`
    pub(crate) fn remove(&mut self, name: &str) -> Result<PersistentClient> {
        if name.is_empty() {
            return Err(Error::invalid_name("client name to delete is empty"));
        }

        let uid = *self.names.get(name).ok_or_else(|| Error::not_found(name))?;
        let seq = self.seq_of(uid)?;
        let client = self
            .clients
            .remove(&seq)
            .ok_or_else(|| Error::not_found(name))?;

        self.unindex(&client);
        self.seq_by_uid.remove(&uid);
        Ok(client)
    }

    pub(crate) fn find_by_name(&self, name: &str) -> Option<&PersistentClient> {
        self.names.get(name).and_then(|uid| self.get(uid))
    }

    /// Find the client matching a single identifier
    ///
    /// An IP matches an exact entry first, then the most specific subnet
    /// covering it.
    pub(crate) fn find(&self, id: &Identifier) -> Option<&PersistentClient> {
        let uid = match id {
            Identifier::Ip(ip) => self
                .ips
                .get(ip)
                .or_else(|| self.covering_subnets(*ip).next().map(|(_, uid)| uid)),
            Identifier::Subnet(subnet) => self.subnets.get(subnet),
            Identifier::Mac(mac) => self.macs.get(mac),
            Identifier::ClientId(client_id) => self.client_ids.get(client_id),
        }?;

        self.get(uid)
    }

    fn get(&self, uid: &Uid) -> Option<&PersistentClient> {
        self.seq_by_uid
            .get(uid)
            .and_then(|seq| self.clients.get(seq))
    }

    fn seq_of(&self, uid: Uid) -> Result<u64> {
        self.seq_by_uid
            .get(&uid)
            .copied()
            .ok_or_else(|| Error::not_found(uid.to_string()))
    }

    fn mint_uid(&self) -> Uid {
        loop {
            let uid = Uid::new();
            if !self.seq_by_uid.contains_key(&uid) {
                return uid;
            }
        }
    }

    /// Check `client` against every other record
    ///
    /// `replacing` is the UID of the record being updated; its own entries
    /// never clash with the new data.
    fn validate(&self, client: &PersistentClient, replacing: Option<Uid>) -> Result<()> {
        if client.name.is_empty() {
            return Err(Error::invalid_name("client name is empty"));
        }

        if client.ids.is_empty() {
            return Err(Error::invalid_identifier(format!(
                "client {:?} has no identifiers",
                client.name
            )));
        }

        if let Some(tag) = client
            .tags
            .iter()
            .find(|tag| !self.supported_tags.contains(tag.as_str()))
        {
            return Err(Error::invalid_tag(tag.as_str()));
        }

        if let Some(owner) = self.names.get(&client.name)
            && Some(*owner) != replacing
        {
            return Err(Error::duplicate_name(client.name.as_str()));
        }

        for id in &client.ids {
            if let Some(owner) = self.clash(id, replacing) {
                let owner = self.get(&owner).map(|c| c.name.clone()).unwrap_or_default();
                return Err(Error::duplicate_identifier(id.to_string(), owner));
            }
        }

        Ok(())
    }

    /// UID of another record that claims or overlaps `id`
    fn clash(&self, id: &Identifier, skip: Option<Uid>) -> Option<Uid> {
        let other = |uid: &Uid| Some(*uid) != skip;

        match id {
            Identifier::Ip(ip) => self.ips.get(ip).copied().filter(other).or_else(|| {
                self.covering_subnets(*ip)
                    .map(|(_, uid)| *uid)
                    .find(|uid| other(uid))
            }),
            Identifier::Subnet(subnet) => self
                .subnets
                .iter()
                .find(|(existing, uid)| other(uid) && existing.overlaps(subnet))
                .map(|(_, uid)| *uid)
                .or_else(|| {
                    self.ips
                        .iter()
                        .find(|(ip, uid)| other(uid) && subnet.contains(ip))
                        .map(|(_, uid)| *uid)
                }),
            Identifier::Mac(mac) => self.macs.get(mac).copied().filter(other),
            Identifier::ClientId(client_id) => self.client_ids.get(client_id).copied().filter(other),
        }
    }

    /// Stored subnets containing `ip`, most specific first
    fn covering_subnets(&self, ip: IpAddr) -> impl Iterator<Item = (Subnet, &Uid)> {
        let width: u8 = match ip {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };

        (0..=width).rev().filter_map(move |len| {
            let subnet = Subnet::new(ip, len).ok()?;
            self.subnets.get(&subnet).map(|uid| (subnet, uid))
        })
    }

    fn index(&mut self, client: &PersistentClient) {
        let uid = client.uid;
        self.names.insert(client.name.clone(), uid);

        for id in &client.ids {
            match id {
                Identifier::Ip(ip) => {
                    self.ips.insert(*ip, uid);
                }
                Identifier::Subnet(subnet) => {
                    self.subnets.insert(*subnet, uid);
                }
                Identifier::Mac(mac) => {
                    self.macs.insert(mac.clone(), uid);
                }
                Identifier::ClientId(client_id) => {
                    self.client_ids.insert(client_id.clone(), uid);
                }
            }
        }
    }

    fn unindex(&mut self, client: &PersistentClient) {
        self.names.remove(&client.name);

        for id in &client.ids {
            match id {
                Identifier::Ip(ip) => {
                    self.ips.remove(ip);
                }
                Identifier::Subnet(subnet) => {
                    self.subnets.remove(subnet);
                }
                Identifier::Mac(mac) => {
                    self.macs.remove(mac);
                }
                Identifier::ClientId(client_id) => {
                    self.client_ids.remove(client_id);
                }
            }
        }
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.names.len() + self.ips.len() + self.subnets.len() + self.macs.len() + self.client_ids.len()
    }
}
