use actix_web::HttpResponse;
use serde::Serialize;

/// Success envelope shared by every endpoint. Errors use the
/// `{ status_code, error }` shape from `error.rs`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status_code: u16,
    pub payload: T,
}

pub fn ok<T: Serialize>(payload: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        status_code: 200,
        payload,
    })
}
