use crate::error::AppError;
use crate::routes::AppState;
use crate::services::market_service::get_market_prices;
use actix_web::{web, HttpResponse};

pub async fn get_prices(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let prices = get_market_prices(&app_state.http_client, &app_state.market).await?;
    Ok(HttpResponse::Ok().json(prices))
}
