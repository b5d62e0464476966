pub(crate) mod auth;
pub(crate) mod dashboard;
pub(crate) mod form;
pub(crate) mod transactions;
