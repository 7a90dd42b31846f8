pub mod account_service;
pub mod chat_service;
pub mod market_service;
