//! Daily cash-flow ledger
//!
//! Fields the model does not name are kept in `extra`, so a ledger written
//! back out carries everything the server sent.

use crate::evaluation::null_as_default;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One day of cash movements as returned by the finance endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerDay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<LedgerEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_income: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_expense: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub balance: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerDay {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute totals from the entries
    pub fn recompute_totals(&mut self) {
        let (income, expense) = self.entries.iter().fold((0.0, 0.0), |(inc, exp), entry| {
            match entry.kind {
                EntryKind::Income => (inc + entry.amount, exp),
                EntryKind::Expense => (inc, exp + entry.amount),
            }
        });
        self.total_income = income;
        self.total_expense = expense;
        self.balance = income - expense;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: EntryKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO date-time of the movement
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Anything that is not income counts as an expense
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    #[default]
    #[serde(other)]
    Expense,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Income => "Entrada",
            EntryKind::Expense => "Saída",
        }
    }
}
