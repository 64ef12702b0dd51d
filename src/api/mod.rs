use crate::core::error::MarketplaceError;
use async_trait::async_trait;
use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

pub mod conversations;
pub mod offers;
pub mod profiles;
pub mod requests;

const X_USER_ID: &str = "X-User-ID";

#[derive(Debug)]
pub struct ExtractUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, (StatusCode, &'static str)> {
        if let Some(user_id) = parts.headers.get(X_USER_ID) {
            let user_id = user_id
                .to_str()
                .map_err(|_| (StatusCode::BAD_REQUEST, "invalid user id"))?;
            let user_id = Uuid::from_str(user_id)
                .map_err(|_| (StatusCode::BAD_REQUEST, "invalid user id"))?;
            Ok(ExtractUser(user_id))
        } else {
            Err((StatusCode::BAD_REQUEST, "`X-User-ID` header is missing"))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
}

/// Marketplace errors as HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub MarketplaceError);

impl From<MarketplaceError> for ApiError {
    fn from(error: MarketplaceError) -> Self {
        ApiError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            MarketplaceError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "unauthorized"),
            MarketplaceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            MarketplaceError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            MarketplaceError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
            MarketplaceError::StoreFailure(e) => {
                error!("store failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "store_failure")
            }
        };

        (
            status,
            Json(ErrorEnvelope {
                code,
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
