pub mod ledger_store;
pub mod pool;
