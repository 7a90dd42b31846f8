use crate::services::chat_service::get_reply;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: &'static str,
}

pub async fn chat(body: web::Json<ChatRequest>) -> HttpResponse {
    HttpResponse::Ok().json(ChatResponse {
        reply: get_reply(&body.message),
    })
}
