use crate::error::AppError;
use crate::models::account::AccountSummary;
use crate::routes::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub user: AccountSummary,
}

pub async fn signup(
    body: web::Json<SignupRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let account = app_state.accounts.signup(&request.username).await?;

    Ok(HttpResponse::Ok().json(SignupResponse {
        message: "Signup successful",
        user: account.summary(),
    }))
}

pub async fn get_account(
    username: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let account = app_state.accounts.account(&username.into_inner()).await?;
    Ok(HttpResponse::Ok().json(account))
}
