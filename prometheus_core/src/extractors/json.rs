//! JSON body extractor that answers malformed input with the API error shape

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

pub const INVALID_JSON_MESSAGE: &str = "Requete JSON invalide.";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Requete trop volumineuse.";

pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiJsonRejection::from(rejection)),
        }
    }
}

#[derive(Debug)]
pub enum ApiJsonRejection {
    TooLarge,
    Invalid(String),
}

impl From<JsonRejection> for ApiJsonRejection {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiJsonRejection::TooLarge
        } else {
            ApiJsonRejection::Invalid(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiJsonRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiJsonRejection::TooLarge => (StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_MESSAGE),
            ApiJsonRejection::Invalid(detail) => {
                tracing::debug!("Rejected JSON body: {}", detail);
                (StatusCode::BAD_REQUEST, INVALID_JSON_MESSAGE)
            }
        };

        let body = Json(json!({
            "success": false,
            "status": status.as_u16(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl std::fmt::Display for ApiJsonRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiJsonRejection::TooLarge => write!(f, "JSON body too large"),
            ApiJsonRejection::Invalid(msg) => write!(f, "Invalid JSON: {}", msg),
        }
    }
}

impl std::error::Error for ApiJsonRejection {}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_valid_json_is_extracted() {
        let ApiJson(payload) =
            ApiJson::<Payload>::from_request(request(Some("application/json"), r#"{"name":"Ana"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "Ana");
    }

    #[tokio::test]
    async fn test_bad_bodies_are_bad_requests() {
        let cases = [
            (Some("application/json"), "{broken"),
            (Some("application/json"), r#"{"name": 3}"#),
            (None, r#"{"name":"Ana"}"#),
        ];

        for (content_type, body) in cases {
            let rejection = ApiJson::<Payload>::from_request(request(content_type, body), &())
                .await
                .err()
                .unwrap();
            let response = rejection.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["message"], INVALID_JSON_MESSAGE);
            assert_eq!(json["status"], 400);
        }
    }
}
