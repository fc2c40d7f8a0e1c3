//! Typed column-assignment builder for partial updates.
//!
//! Partial-update requests carry every field as an `Option`; only the
//! present fields become `SET` assignments. Keeping the clause
//! construction here means it can be unit-tested without a store, and
//! the repositories only ever interpolate column names from a fixed
//! `&'static str` set. Values always travel through bind parameters.

use chrono::{DateTime, Utc};

/// An owned value destined for a single bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

/// An ordered set of column-assignment pairs.
#[derive(Debug, Clone, Default)]
pub struct FieldDiff {
    pairs: Vec<(&'static str, FieldValue)>,
}

impl FieldDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text assignment if the value is present.
    pub fn push_text(&mut self, column: &'static str, value: Option<String>) {
        if let Some(v) = value {
            self.pairs.push((column, FieldValue::Text(v)));
        }
    }

    /// Add an integer assignment if the value is present.
    pub fn push_int(&mut self, column: &'static str, value: Option<i64>) {
        if let Some(v) = value {
            self.pairs.push((column, FieldValue::Int(v)));
        }
    }

    /// Add a timestamp assignment if the value is present.
    pub fn push_timestamp(&mut self, column: &'static str, value: Option<DateTime<Utc>>) {
        if let Some(v) = value {
            self.pairs.push((column, FieldValue::Timestamp(v)));
        }
    }

    /// Add an unconditional assignment (e.g. `updated_at` refreshes).
    pub fn set(&mut self, column: &'static str, value: FieldValue) {
        self.pairs.push((column, value));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// The columns in assignment order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.pairs.iter().map(|(c, _)| *c).collect()
    }

    /// Render the `SET` clause with anonymous placeholders, one per pair:
    /// `"name = ?, email = ?"`.
    pub fn set_clause(&self) -> String {
        self.pairs
            .iter()
            .map(|(c, _)| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Iterate the values in the same order as [`FieldDiff::set_clause`].
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.pairs.iter().map(|(_, v)| v)
    }
}
