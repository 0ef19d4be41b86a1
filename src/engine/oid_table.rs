//! Sorted OID storage answering GET and GETNEXT lookups.

use crate::oid::Oid;

/// OID-keyed table kept in ascending OID order.
///
/// Backs [`MockEngine`](super::MockEngine): exact lookups serve GET, and
/// [`get_next`](Self::get_next) / [`successors`](Self::successors) serve
/// GETNEXT and GETBULK.
#[derive(Debug, Clone)]
pub struct OidTable<V> {
    entries: Vec<(Oid, V)>,
}

impl<V> OidTable<V> {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert an OID-value pair, replacing any existing value.
    pub fn insert(&mut self, oid: Oid, value: V) {
        match self.entries.binary_search_by(|(o, _)| o.cmp(&oid)) {
            Ok(idx) => self.entries[idx].1 = value,
            Err(idx) => self.entries.insert(idx, (oid, value)),
        }
    }

    /// Remove an OID, returning its value if present.
    pub fn remove(&mut self, oid: &Oid) -> Option<V> {
        self.entries
            .binary_search_by(|(o, _)| o.cmp(oid))
            .ok()
            .map(|idx| self.entries.remove(idx).1)
    }

    /// Exact match.
    pub fn get(&self, oid: &Oid) -> Option<&V> {
        self.entries
            .binary_search_by(|(o, _)| o.cmp(oid))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// First entry strictly greater than `oid`.
    pub fn get_next(&self, oid: &Oid) -> Option<(&Oid, &V)> {
        self.successors(oid).next()
    }

    /// All entries strictly greater than `oid`, in ascending order.
    pub fn successors<'a>(&'a self, oid: &Oid) -> impl Iterator<Item = (&'a Oid, &'a V)> + use<'a, V> {
        let start = self.entries.partition_point(|(o, _)| o <= oid);
        self.entries[start..].iter().map(|(o, v)| (o, v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in ascending OID order.
    pub fn iter(&self) -> impl Iterator<Item = (&Oid, &V)> {
        self.entries.iter().map(|(o, v)| (o, v))
    }
}

impl<V> Default for OidTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(Oid, V)> for OidTable<V> {
    fn from_iter<I: IntoIterator<Item = (Oid, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (oid, value) in iter {
            table.insert(oid, value);
        }
        table
    }
}
