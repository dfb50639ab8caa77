use actix_web::{HttpResponse, get};

#[get("/health")]
pub async fn handler() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
