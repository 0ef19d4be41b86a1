//! Ordered result collection.
//!
//! [`Results`] maps OIDs to decoded values in ascending OID order (numeric per
//! arc, prefix first). Re-inserting an OID replaces its value. Decode
//! diagnostics live alongside, keyed by the same OIDs.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::io::{self, Write};

use crate::error::DecodeWarning;
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::QueryResult;

/// Query results in ascending OID order.
///
/// Populated by the decoder; a caller can pass one to
/// [`query_into`](crate::query_into) to append the results of several
/// queries into one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results {
    entries: BTreeMap<Oid, Value>,
    warnings: BTreeMap<Oid, DecodeWarning>,
}

impl Results {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `oid`, returning the previous value.
    ///
    /// A successful insert clears any decode warning recorded for the OID.
    pub fn insert(&mut self, oid: Oid, value: Value) -> Option<Value> {
        self.warnings.remove(&oid);
        self.entries.insert(oid, value)
    }

    /// Look up the value for an exact OID.
    pub fn get(&self, oid: &Oid) -> Option<&Value> {
        self.entries.get(oid)
    }

    /// Check whether a value is stored for `oid`.
    pub fn contains(&self, oid: &Oid) -> bool {
        self.entries.contains_key(oid)
    }

    /// Number of stored values (warnings not included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in ascending OID order.
    ///
    /// Each call starts a fresh traversal.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Iterate over the entries at or below `prefix`, in ascending order.
    pub fn subtree<'a>(&'a self, prefix: &'a Oid) -> impl Iterator<Item = (&'a Oid, &'a Value)> {
        self.entries
            .range(prefix..)
            .take_while(move |(oid, _)| oid.starts_with(prefix))
    }

    /// First entry in OID order.
    pub fn first(&self) -> Option<(&Oid, &Value)> {
        self.entries.first_key_value()
    }

    /// Last entry in OID order.
    pub fn last(&self) -> Option<(&Oid, &Value)> {
        self.entries.last_key_value()
    }

    /// Record a decode warning for `oid`.
    ///
    /// A value already stored for the OID is kept.
    pub fn record_warning(&mut self, oid: Oid, warning: DecodeWarning) {
        self.warnings.insert(oid, warning);
    }

    /// The decode warning for `oid`, if its last decode failed.
    pub fn warning(&self, oid: &Oid) -> Option<&DecodeWarning> {
        self.warnings.get(oid)
    }

    /// All decode warnings in ascending OID order.
    pub fn warnings(&self) -> impl Iterator<Item = (&Oid, &DecodeWarning)> {
        self.warnings.iter()
    }

    /// Write a human-readable listing of every entry.
    ///
    /// Each entry is the OID and value type, the integer rendering, the
    /// string rendering and a blank line:
    ///
    /// ```text
    /// oid, type: .1.3.6.1.2.1.1.7.0, Integer32
    /// INTEGER: 72
    /// STRING : 72
    ///
    /// ```
    ///
    /// Decode warnings follow as `warning: <oid>: <reason>` lines.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (oid, value) in &self.entries {
            writeln!(w, "oid, type: {}, {}", oid, value.type_name())?;
            writeln!(w, "INTEGER: {}", value.integer())?;
            writeln!(w, "STRING : {}", value)?;
            writeln!(w)?;
        }
        for (oid, warning) in &self.warnings {
            writeln!(w, "warning: {}: {}", oid, warning)?;
        }
        Ok(())
    }
}

/// Ascending iterator over a [`Results`], created by [`Results::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, Oid, Value>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Oid, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Results {
    type Item = (&'a Oid, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning ascending iterator over a [`Results`].
#[derive(Debug)]
pub struct IntoIter {
    inner: btree_map::IntoIter<Oid, Value>,
}

impl Iterator for IntoIter {
    type Item = QueryResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(oid, value)| QueryResult { oid, value })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl IntoIterator for Results {
    type Item = QueryResult;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl FromIterator<QueryResult> for Results {
    fn from_iter<I: IntoIterator<Item = QueryResult>>(iter: I) -> Self {
        let mut results = Results::new();
        results.extend(iter);
        results
    }
}

impl Extend<QueryResult> for Results {
    fn extend<I: IntoIterator<Item = QueryResult>>(&mut self, iter: I) {
        for r in iter {
            self.insert(r.oid, r.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn p(s: &str) -> Oid {
        Oid::parse(s).unwrap()
    }

    #[test]
    fn test_iterates_in_numeric_order() {
        let mut results = Results::new();
        for s in ["1.10", "1.9", "1.2.3.4", "1.2.3", "1.12"] {
            results.insert(p(s), Value::Null);
        }
        let order: Vec<String> = results.iter().map(|(o, _)| o.to_string()).collect();
        assert_eq!(order, [".1.2.3", ".1.2.3.4", ".1.9", ".1.10", ".1.12"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut results = Results::new();
        assert_eq!(results.insert(p("1.3.6.1"), Value::Integer32(1)), None);
        assert_eq!(
            results.insert(p("1.3.6.1"), Value::Integer32(2)),
            Some(Value::Integer32(1))
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results.get(&p("1.3.6.1")), Some(&Value::Integer32(2)));
    }

    #[test]
    fn test_iteration_is_restartable() {
        let results: Results = [
            QueryResult::new(p("1.2"), Value::Integer32(2)),
            QueryResult::new(p("1.1"), Value::Integer32(1)),
        ]
        .into_iter()
        .collect();

        let first: Vec<_> = results.iter().collect();
        let second: Vec<_> = results.iter().collect();
        assert_eq!(first, second);
        assert_eq!(results.iter().len(), 2);
    }

    #[test]
    fn test_subtree() {
        let mut results = Results::new();
        results.insert(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Null);
        results.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Null);
        results.insert(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Null);
        results.insert(oid!(1, 3, 6, 1, 2, 1, 10), Value::Null);

        let system = oid!(1, 3, 6, 1, 2, 1, 1);
        assert_eq!(results.subtree(&system).count(), 2);

        let interfaces = oid!(1, 3, 6, 1, 2, 1, 2);
        assert_eq!(results.subtree(&interfaces).count(), 1);
    }

    // ========================================================================
    // Warnings
    // ========================================================================

    #[test]
    fn test_warning_keeps_existing_value() {
        let mut results = Results::new();
        results.insert(p("1.1"), Value::Integer32(7));
        results.record_warning(p("1.1"), DecodeWarning::UnknownTag { tag: 0x47 });

        assert_eq!(results.get(&p("1.1")), Some(&Value::Integer32(7)));
        assert!(results.warning(&p("1.1")).is_some());
    }

    #[test]
    fn test_insert_clears_warning() {
        let mut results = Results::new();
        results.record_warning(p("1.1"), DecodeWarning::UnknownTag { tag: 0x47 });
        assert_eq!(results.len(), 0);
        assert_eq!(results.warnings().count(), 1);

        results.insert(p("1.1"), Value::Integer32(7));
        assert!(results.warning(&p("1.1")).is_none());
    }

    // ========================================================================
    // Dump
    // ========================================================================

    #[test]
    fn test_dump_format() {
        let mut results = Results::new();
        results.insert(oid!(1, 3, 6, 1, 2, 1, 1, 7, 0), Value::Integer32(72));
        results.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("gw1"));
        results.record_warning(oid!(1, 3, 6, 1, 9), DecodeWarning::UnknownTag { tag: 0x47 });

        let mut out = Vec::new();
        results.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "\
oid, type: .1.3.6.1.2.1.1.5.0, OctetString
INTEGER: 0
STRING : gw1

oid, type: .1.3.6.1.2.1.1.7.0, Integer32
INTEGER: 72
STRING : 72

warning: .1.3.6.1.9: unrecognized wire type 0x47
";
        assert_eq!(text, expected);
    }
}
