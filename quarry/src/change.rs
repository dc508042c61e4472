//! Pending mutations of a record, coalesced per row

use crate::builder::{Args, DELETE, INSERT, UPDATE};
use crate::{Arg, Dialect, Error, Result, Value, Where};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Key of a [`Change`] in the [`ChangeLog`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeKey {
    /// Serialized identity values of an existing row
    Identity(String),
    /// Sequence number of an appended row
    Append(u64),
}

/// One pending mutation.
///
/// No identity means INSERT, no payload means DELETE, both means UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub identity_columns: Option<Vec<String>>,
    pub identity_values: Option<Vec<Value>>,
    pub payload: Option<IndexMap<String, Value>>,
}

impl Change {
    pub fn is_insert(&self) -> bool {
        self.identity_values.is_none()
    }

    pub fn is_delete(&self) -> bool {
        self.payload.is_none()
    }

    fn identity_condition(&self) -> Option<Where> {
        let columns = self.identity_columns.as_ref()?;
        let values = self.identity_values.as_ref()?;
        Some(
            columns
                .iter()
                .zip(values)
                .fold(Where::new(), |w, (c, v)| w.and(c.clone(), v.clone())),
        )
    }

    /// The statement this change stands for.
    pub fn to_sql(&self, dialect: &Dialect, table: &str) -> Result<String> {
        let args = Args::new().with("table", table);
        match (self.identity_condition(), &self.payload) {
            (Some(identity), None) => DELETE.render_with(dialect, args.with("where", identity)),
            (None, Some(payload)) => {
                INSERT.render_with(dialect, args.with("set", Arg::Set(payload.clone())))
            }
            (Some(identity), Some(payload)) => UPDATE.render_with(
                dialect,
                args.with("where", identity)
                    .with("set", Arg::Set(payload.clone())),
            ),
            (None, None) => Err(Error::invalid_query(format!(
                "change on {table} has neither identity nor payload"
            ))),
        }
    }
}

/// Changes in recording order, at most one per identified row.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: IndexMap<ChangeKey, Change>,
    /// Deleted identities that came back, mapped to the entry now
    /// collecting their updates
    reopened: HashMap<ChangeKey, ChangeKey>,
    next_seq: u64,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn fingerprint(values: &[Value]) -> Result<ChangeKey> {
        Ok(ChangeKey::Identity(serde_json::to_string(values)?))
    }

    fn next_key(&mut self) -> ChangeKey {
        let key = ChangeKey::Append(self.next_seq);
        self.next_seq += 1;
        key
    }

    fn holds_delete(&self, key: &ChangeKey) -> bool {
        self.entries.get(key).is_some_and(Change::is_delete)
    }

    /// Merge `column = value` into the UPDATE for the identified row.
    ///
    /// Once an identity has been deleted in this log, its later updates
    /// gather in one entry placed after the delete.
    pub fn record_update(
        &mut self,
        identity_columns: &[String],
        identity_values: Vec<Value>,
        column: &str,
        value: Value,
    ) -> Result<()> {
        let identity = Self::fingerprint(&identity_values)?;
        let key = if !self.holds_delete(&identity) {
            identity
        } else if let Some(key) = self.reopened.get(&identity) {
            key.clone()
        } else {
            let key = self.next_key();
            self.reopened.insert(identity, key.clone());
            key
        };
        let change = self.entries.entry(key).or_insert_with(|| Change {
            identity_columns: Some(identity_columns.to_vec()),
            identity_values: Some(identity_values),
            payload: Some(IndexMap::new()),
        });
        if let Some(payload) = change.payload.as_mut() {
            payload.insert(column.to_string(), value);
        }
        Ok(())
    }

    /// Record an INSERT and return its key, for later edits of the new row.
    pub fn record_insert(&mut self, payload: IndexMap<String, Value>) -> ChangeKey {
        let key = self.next_key();
        self.entries.insert(
            key.clone(),
            Change {
                identity_columns: None,
                identity_values: None,
                payload: Some(payload),
            },
        );
        key
    }

    /// Merge `column = value` into a pending INSERT.
    pub fn amend_insert(&mut self, key: &ChangeKey, column: &str, value: Value) -> Result<()> {
        match self.entries.get_mut(key) {
            Some(change) if change.is_insert() => {
                if let Some(payload) = change.payload.as_mut() {
                    payload.insert(column.to_string(), value);
                }
                Ok(())
            }
            _ => Err(Error::invalid_query(format!(
                "no pending insert under {key:?}"
            ))),
        }
    }

    /// Drop a pending INSERT, as if the row had never been appended.
    pub fn discard_insert(&mut self, key: &ChangeKey) -> bool {
        match self.entries.get(key) {
            Some(change) if change.is_insert() => self.entries.shift_remove(key).is_some(),
            _ => false,
        }
    }

    /// Record a DELETE; it replaces any pending UPDATE of the same row.
    pub fn record_delete(
        &mut self,
        identity_columns: &[String],
        identity_values: Vec<Value>,
    ) -> Result<()> {
        let identity = Self::fingerprint(&identity_values)?;
        let key = if !self.holds_delete(&identity) {
            identity
        } else if let Some(key) = self.reopened.remove(&identity) {
            key
        } else {
            self.next_key()
        };
        self.entries.insert(
            key,
            Change {
                identity_columns: Some(identity_columns.to_vec()),
                identity_values: Some(identity_values),
                payload: None,
            },
        );
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.reopened.clear();
    }

    /// One statement per change, in recording order.
    pub fn to_statements(&self, dialect: &Dialect, table: &str) -> Result<Vec<String>> {
        self.iter().map(|c| c.to_sql(dialect, table)).collect()
    }
}
