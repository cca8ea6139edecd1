//! Request extractors.
//!
//! axum's own rejections answer with plain text; these wrappers turn them
//! into [`AppError`] so every failure carries the `{"message": ...}` body.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

/// Local version of [`axum::Json`].
///
/// Malformed JSON, a missing content type, wrong field types and unknown
/// keys in patch bodies all become [`AppError::Validation`] (400). A body
/// over the size limit becomes [`AppError::PayloadTooLarge`] (413).
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(AppError::PayloadTooLarge)
            }
            Err(rejection) => Err(AppError::Validation(match rejection {
                JsonRejection::JsonDataError(err) => err.body_text(),
                JsonRejection::JsonSyntaxError(err) => err.body_text(),
                JsonRejection::MissingJsonContentType(_) => {
                    "Expected request with `Content-Type: application/json`".to_owned()
                }
                other => {
                    warn!("unhandled JsonRejection category: {other:?}");
                    other.body_text()
                }
            })),
        }
    }
}

/// Local version of [`axum::extract::Path`].
///
/// A segment that cannot be decoded (for example invalid percent-encoded
/// UTF-8) becomes [`AppError::Validation`] (400).
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(PathRejection::FailedToDeserializePathParams(err)) => {
                Err(AppError::Validation(err.body_text()))
            }
            // Route/extractor mismatch: a bug, not a caller mistake.
            Err(other) => Err(AppError::Internal(other.body_text())),
        }
    }
}
