//! Client-side aggregation over the fetched transaction list. Everything
//! here is a pure reduction; the services only ever hand us the raw rows.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{format_wire_date, Transaction, TransactionStatus, TransactionType};

/// One row of the dashboard's recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Activity {
    pub(crate) icon: &'static str,
    pub(crate) title: String,
    pub(crate) amount: Decimal,
    pub(crate) kind: TransactionType,
    pub(crate) date: String,
    pub(crate) status: TransactionStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DashboardMetrics {
    pub(crate) pending_total: Decimal,
    pub(crate) pending_count: usize,
    pub(crate) month_pending_count: usize,
    pub(crate) prev_month_pending_count: usize,
    pub(crate) success_rate: f64,
    pub(crate) month_income: Decimal,
    pub(crate) month_expense: Decimal,
    pub(crate) net_profit: Decimal,
    pub(crate) recent: Vec<Activity>,
}

impl DashboardMetrics {
    /// Recomputed from scratch on every fetch; nothing is cached between
    /// refreshes. An empty slice yields all zeros and an empty feed.
    pub(crate) fn compute(transactions: &[Transaction], today: NaiveDate) -> Self {
        let current = (today.year(), today.month());
        let previous = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };

        let mut metrics = Self::default();

        for txn in transactions {
            if txn.is_pending() {
                metrics.pending_total += txn.amount;
                metrics.pending_count += 1;
                // Rows without a parseable created_at fall out of both
                // month buckets but still count toward the totals above.
                match txn.created_year_month() {
                    Some(ym) if ym == current => metrics.month_pending_count += 1,
                    Some(ym) if ym == previous => metrics.prev_month_pending_count += 1,
                    _ => {}
                }
            }

            // Note: these are all-time sums, not calendar-month ones. The
            // dashboard has always labeled them "monthly"; keep the numbers
            // matching what users already see.
            if txn.status.is_completed() {
                match txn.kind {
                    TransactionType::Income => metrics.month_income += txn.amount,
                    TransactionType::Expense => metrics.month_expense += txn.amount,
                }
            }
        }

        metrics.success_rate = if transactions.is_empty() {
            0.0
        } else {
            metrics.pending_count as f64 / transactions.len() as f64 * 100.0
        };
        metrics.net_profit = metrics.month_income - metrics.month_expense;
        metrics.recent = recent_activity(transactions, 10);
        metrics
    }
}

/// The `limit` newest rows by `created_at`, newest first. The sort is
/// stable, so rows sharing a timestamp keep their fetch order.
fn recent_activity(transactions: &[Transaction], limit: usize) -> Vec<Activity> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered
        .into_iter()
        .take(limit)
        .map(|txn| Activity {
            icon: txn.kind.icon(),
            title: txn.display_title().to_string(),
            amount: txn.amount,
            kind: txn.kind,
            date: format_wire_date(&txn.created_at),
            status: txn.status.clone(),
        })
        .collect()
}
