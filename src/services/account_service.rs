use crate::db::ledger_store::LedgerStore;
use crate::error::AppError;
use crate::models::account::{Account, Ledger, Trade};
use crate::models::decimal::check_amount;
use bigdecimal::BigDecimal;
use chrono::Utc;
use tokio::sync::Mutex;

struct LedgerState {
    ledger: Ledger,
    store: LedgerStore,
}

/// Sole writer of the ledger. Each mutation runs under one lock from lookup
/// to durable write, and the in-memory ledger only changes once the write
/// has succeeded.
pub struct AccountService {
    state: Mutex<LedgerState>,
    initial_balance: BigDecimal,
}

impl AccountService {
    pub async fn open(store: LedgerStore, initial_balance: BigDecimal) -> Result<Self, AppError> {
        let ledger = store.load().await?;
        log::info!(
            "Loaded ledger from {} with {} accounts",
            store.describe(),
            ledger.len()
        );
        Ok(AccountService {
            state: Mutex::new(LedgerState { ledger, store }),
            initial_balance,
        })
    }

    pub async fn signup(&self, username: &str) -> Result<Account, AppError> {
        require_non_empty("username", username)?;

        let mut state = self.state.lock().await;
        if state.ledger.find(username).is_some() {
            log::warn!("Signup rejected, user {} already exists", username);
            return Err(AppError::DuplicateUser);
        }

        let account = Account::new(username.to_string(), self.initial_balance.clone());
        let mut staged = state.ledger.clone();
        staged.accounts.push(account.clone());

        state.store.save(&staged).await?;
        state.ledger = staged;

        log::info!("Created account {} with balance {}", username, account.balance);
        Ok(account)
    }

    pub async fn trade(
        &self,
        username: &str,
        symbol: &str,
        amount: BigDecimal,
    ) -> Result<Account, AppError> {
        require_non_empty("username", username)?;
        require_non_empty("symbol", symbol)?;
        check_amount(&amount).map_err(AppError::InvalidInput)?;

        let mut state = self.state.lock().await;
        if state.ledger.find(username).is_none() {
            log::warn!("Trade rejected, user {} not found", username);
            return Err(AppError::UserNotFound);
        }

        let mut staged = state.ledger.clone();
        let account = staged
            .find_mut(username)
            .ok_or(AppError::UserNotFound)?;
        account.apply_trade(Trade {
            symbol: symbol.to_string(),
            amount,
            time: Utc::now(),
        });
        let updated = account.clone();

        state.store.save(&staged).await?;
        state.ledger = staged;

        log::info!(
            "Recorded {} trade for {}, balance now {}",
            symbol,
            username,
            updated.balance
        );
        Ok(updated)
    }

    pub async fn account(&self, username: &str) -> Result<Account, AppError> {
        let state = self.state.lock().await;
        state
            .ledger
            .find(username)
            .cloned()
            .ok_or(AppError::UserNotFound)
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> Ledger {
        self.state.lock().await.ledger.clone()
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
