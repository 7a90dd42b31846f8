//! Runtime configuration, read from the environment after `.env` is loaded.

use anyhow::{anyhow, bail, Context, Result};
use bigdecimal::BigDecimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_INITIAL_BALANCE: i64 = 20000;
pub const DEFAULT_MARKET_DATA_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerBackend {
    File { path: PathBuf },
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub url: String,
    pub vs_currency: String,
    pub per_page: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub backend: LedgerBackend,
    pub initial_balance: BigDecimal,
    pub market: MarketConfig,
    pub json_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match var("LEDGER_BACKEND").as_deref().map(str::trim) {
            None | Some("file") => LedgerBackend::File {
                path: PathBuf::from(var("LEDGER_PATH").unwrap_or_else(|| "./db.json".to_string())),
            },
            Some("postgres") => LedgerBackend::Postgres {
                database_url: var("DATABASE_URL")
                    .ok_or_else(|| anyhow!("DATABASE_URL must be set when LEDGER_BACKEND=postgres"))?,
            },
            Some(other) => bail!("unknown LEDGER_BACKEND {:?} (expected \"file\" or \"postgres\")", other),
        };

        let initial_balance = match var("INITIAL_BALANCE") {
            Some(raw) => BigDecimal::from_str(raw.trim())
                .with_context(|| format!("INITIAL_BALANCE {:?} is not a number", raw))?,
            None => BigDecimal::from(DEFAULT_INITIAL_BALANCE),
        };

        Ok(Config {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(var("PORT"), "PORT", 5000)?,
            backend,
            initial_balance,
            market: MarketConfig {
                url: var("MARKET_DATA_URL").unwrap_or_else(|| DEFAULT_MARKET_DATA_URL.to_string()),
                vs_currency: var("MARKET_VS_CURRENCY").unwrap_or_else(|| "usd".to_string()),
                per_page: parse_or(var("MARKET_PER_PAGE"), "MARKET_PER_PAGE", 10)?,
            },
            json_limit: parse_or(var("JSON_LIMIT"), "JSON_LIMIT", 4096)?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}
