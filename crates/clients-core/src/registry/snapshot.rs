use crate::client::PersistentClient;

/// Consistent copy of the registry taken under one read lock
///
/// Iterating does not consume the snapshot, so it can be walked any number
/// of times. Later mutations of the registry are not reflected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    clients: Vec<PersistentClient>,
}

impl Snapshot {
    /// Iterate in registry order
    pub fn iter(&self) -> std::slice::Iter<'_, PersistentClient> {
        self.clients.iter()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<PersistentClient> {
        self.clients
    }
}

impl FromIterator<PersistentClient> for Snapshot {
    fn from_iter<T: IntoIterator<Item = PersistentClient>>(iter: T) -> Self {
        Self {
            clients: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = PersistentClient;
    type IntoIter = std::vec::IntoIter<PersistentClient>;

    fn into_iter(self) -> Self::IntoIter {
        self.clients.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a PersistentClient;
    type IntoIter = std::slice::Iter<'a, PersistentClient>;

    fn into_iter(self) -> Self::IntoIter {
        self.clients.iter()
    }
}
