// 📒 Amount Table - ordered name → amount mapping
// Used for both expense categories and debts
//
// Keys are unique (last write wins), iteration follows insertion order so
// tables and charts render rows the way the user entered them.

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct AmountTable {
    entries: Vec<(String, Decimal)>,
}

impl AmountTable {
    pub fn new() -> Self {
        AmountTable { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.position(name).map(|i| self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Insert or overwrite. Returns the previous amount, if any.
    pub fn insert(&mut self, name: impl Into<String>, amount: Decimal) -> Option<Decimal> {
        let name = name.into();
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, amount)),
            None => {
                self.entries.push((name, amount));
                None
            }
        }
    }

    /// Add `amount` to an existing entry, or insert it. Returns the new amount,
    /// or `None` (table untouched) if the sum does not fit in a Decimal.
    pub fn increment(&mut self, name: &str, amount: Decimal) -> Option<Decimal> {
        match self.position(name) {
            Some(i) => {
                let sum = self.entries[i].1.checked_add(amount)?;
                self.entries[i].1 = sum;
                Some(sum)
            }
            None => {
                self.entries.push((name.to_string(), amount));
                Some(amount)
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Decimal> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(name, amount)| (name.as_str(), *amount))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Sum of all amounts, `None` on overflow
    pub fn total(&self) -> Option<Decimal> {
        self.entries
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, amount)| acc.checked_add(*amount))
    }

    /// First entry with a negative amount, if any
    pub fn first_negative(&self) -> Option<(&str, Decimal)> {
        self.iter().find(|(_, amount)| *amount < Decimal::ZERO)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

// Structural equality: same pairs, order ignored
impl PartialEq for AmountTable {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, amount)| other.get(name) == Some(amount))
    }
}

impl Eq for AmountTable {}

impl<S: Into<String>> FromIterator<(S, Decimal)> for AmountTable {
    fn from_iter<I: IntoIterator<Item = (S, Decimal)>>(iter: I) -> Self {
        let mut table = AmountTable::new();
        for (name, amount) in iter {
            table.insert(name, amount);
        }
        table
    }
}

impl Serialize for AmountTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, amount) in &self.entries {
            map.serialize_entry(name, amount)?;
        }
        map.end()
    }
}

struct AmountTableVisitor;

impl<'de> Visitor<'de> for AmountTableVisitor {
    type Value = AmountTable;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of names to amounts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = AmountTable::new();
        while let Some((name, amount)) = access.next_entry::<String, Decimal>()? {
            table.insert(name, amount);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for AmountTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AmountTableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, i64)]) -> AmountTable {
        pairs.iter().map(|(n, a)| (*n, Decimal::from(*a))).collect()
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut t = table(&[("Car Loan", 700), ("Credit Card", 1000)]);
        let previous = t.insert("Car Loan", Decimal::from(650));

        assert_eq!(previous, Some(Decimal::from(700)));
        assert_eq!(t.len(), 2);
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["Car Loan", "Credit Card"]);
    }

    #[test]
    fn test_increment_existing_and_new() {
        let mut t = table(&[("Food", 500)]);

        assert_eq!(t.increment("Food", Decimal::from(50)), Some(Decimal::from(550)));
        assert_eq!(t.increment("Travel", Decimal::from(80)), Some(Decimal::from(80)));
        assert_eq!(t.names().last(), Some("Travel"));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = table(&[("A", 1), ("B", 2)]);
        let b = table(&[("B", 2), ("A", 1)]);
        let c = table(&[("A", 1), ("B", 3)]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, table(&[("A", 1)]));
    }

    #[test]
    fn test_total_and_remove() {
        let mut t = table(&[("A", 10), ("B", 15)]);
        assert_eq!(t.total(), Some(Decimal::from(25)));

        assert_eq!(t.remove("A"), Some(Decimal::from(10)));
        assert_eq!(t.remove("A"), None);
        assert_eq!(t.total(), Some(Decimal::from(15)));
        assert_eq!(AmountTable::new().total(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_overflow_is_reported_not_applied() {
        let mut t: AmountTable = vec![("Big", Decimal::MAX)].into_iter().collect();

        assert_eq!(t.increment("Big", Decimal::ONE), None);
        assert_eq!(t.get("Big"), Some(Decimal::MAX));

        t.insert("Other", Decimal::MAX);
        assert_eq!(t.total(), None);
    }

    #[test]
    fn test_first_negative() {
        let t = table(&[("A", 0), ("B", -5), ("C", -1)]);
        assert_eq!(t.first_negative(), Some(("B", Decimal::from(-5))));
        assert_eq!(table(&[("A", 0)]).first_negative(), None);
    }

    #[test]
    fn test_json_keeps_order() {
        let t = table(&[("Zeta", 1), ("Alpha", 2)]);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"Zeta":"1","Alpha":"2"}"#);

        let back: AmountTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.names().collect::<Vec<_>>(), vec!["Zeta", "Alpha"]);
    }
}
