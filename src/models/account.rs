use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One balance-affecting event. `amount` is subtracted from the balance
/// whatever the symbol is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trade {
    pub symbol: String,
    #[serde(with = "crate::models::decimal")]
    pub amount: BigDecimal,
    pub time: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Account {
    pub username: String,
    #[serde(with = "crate::models::decimal")]
    pub balance: BigDecimal,
    #[serde(default)]
    pub trades: Vec<Trade>, // chronological, append-only
}

/// The `user` object returned by signup.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub username: String,
    #[serde(with = "crate::models::decimal")]
    pub balance: BigDecimal,
}

impl Account {
    pub fn new(username: String, balance: BigDecimal) -> Self {
        Account {
            username,
            balance,
            trades: Vec::new(),
        }
    }

    /// Records the trade and reflects it in the balance exactly once.
    pub fn apply_trade(&mut self, trade: Trade) {
        self.balance = &self.balance - &trade.amount;
        self.trades.push(trade);
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            username: self.username.clone(),
            balance: self.balance.clone(),
        }
    }
}

/// Every account, in signup order. This is also the persisted document.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    // `users` is the key older db.json files were written with
    #[serde(default, alias = "users")]
    pub accounts: Vec<Account>,
}

impl Ledger {
    pub fn find(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    pub fn find_mut(&mut self, username: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.username == username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
