//! In-memory filtering and ordering for the transactions screen. Filters
//! AND together, never touch the source list, and preserve input order,
//! so applying them in any sequence gives the same rows.

use std::cmp::Ordering;

use crate::models::{Transaction, TransactionStatus, TransactionType};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TransactionFilter {
    pub(crate) kind: Option<TransactionType>,
    pub(crate) status: Option<TransactionStatus>,
    pub(crate) search: Option<String>,
}

impl TransactionFilter {
    pub(crate) fn is_active(&self) -> bool {
        self.kind.is_some()
            || self.status.is_some()
            || self.search.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub(crate) fn matches(&self, txn: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if txn.kind != kind {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if !txn.status.as_str().eq_ignore_ascii_case(status.as_str()) {
                return false;
            }
        }
        if let Some(needle) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            let in_title = txn
                .title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            let in_description = txn.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }

    pub(crate) fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }
}

/// Order a display copy by due date, newest first. Rows without a due
/// date sink to the end; the sort is stable so equal dates keep their
/// relative order from the fetch.
pub(crate) fn sort_by_due_date_desc(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| match (&a.due_date, &b.due_date) {
        (Some(a_date), Some(b_date)) => b_date.cmp(a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
