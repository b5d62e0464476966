mod transaction;
mod user;

pub(crate) use transaction::{
    format_wire_date, year_month, NewTransaction, Transaction, TransactionPatch,
    TransactionStatus, TransactionType,
};
pub(crate) use user::User;

#[cfg(test)]
mod tests;
