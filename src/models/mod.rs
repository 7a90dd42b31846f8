pub mod account;
pub mod decimal;
