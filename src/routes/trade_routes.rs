use crate::error::AppError;
use crate::models::account::Account;
use crate::routes::AppState;
use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct TradeRequest {
    pub username: String,
    pub symbol: String,
    #[serde(with = "crate::models::decimal")]
    pub amount: BigDecimal,
}

#[derive(Serialize)]
pub struct TradeResponse {
    pub message: &'static str,
    pub user: Account,
}

pub async fn create_trade(
    body: web::Json<TradeRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let TradeRequest { username, symbol, amount } = body.into_inner();
    let account = app_state.accounts.trade(&username, &symbol, amount).await?;

    Ok(HttpResponse::Ok().json(TradeResponse {
        message: "Trade completed",
        user: account,
    }))
}
