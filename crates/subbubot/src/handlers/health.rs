use axum::http::StatusCode;

/// Greeting returned by `GET /`.
pub const ROOT_GREETING: &str = "Hello World, App is active";

pub async fn root() -> (StatusCode, &'static str) {
    (StatusCode::OK, ROOT_GREETING)
}

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

pub async fn readyz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
