//! Request body extraction for medication writes.
//!
//! Any body that cannot be read as a [`MedicationReq`] is answered with `400 Bad Request`.
//! When the failing value belongs to a known field the body is a request error list naming it,
//! the same shape validation failures use.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use api_shared::{MedicationReq, RequestErrorRes, RequestErrorType};
use pocketbook_core::MedicationField;

/// A JSON medication body. The `Content-Type` header is not inspected.
pub struct MedicationBody(pub MedicationReq);

#[axum::async_trait]
impl<S> FromRequest<S> for MedicationBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::warn!("Unreadable medication body: {}", e);
            (StatusCode::BAD_REQUEST, "Unreadable request body").into_response()
        })?;

        parse_medication_req(&bytes).map(MedicationBody)
    }
}

/// Parses a medication body, reporting the failing field when there is one.
///
/// This uses `serde_path_to_error` to find the path (e.g. `name`) of a value with the wrong type.
fn parse_medication_req(bytes: &[u8]) -> Result<MedicationReq, Response> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    match serde_path_to_error::deserialize::<_, MedicationReq>(&mut deserializer) {
        Ok(req) => match deserializer.end() {
            Ok(()) => Ok(req),
            Err(e) => {
                tracing::warn!("Trailing data after medication body: {}", e);
                Err((StatusCode::BAD_REQUEST, "Malformed JSON body").into_response())
            }
        },
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            tracing::warn!("Medication body mismatch at {}: {}", path, source);

            let field = path
                .split(['.', '['])
                .next()
                .and_then(MedicationField::from_path);

            Err(match field {
                Some(field) => (
                    StatusCode::BAD_REQUEST,
                    Json(vec![RequestErrorRes {
                        error: RequestErrorType::IsInvalid,
                        path: field.path().to_owned(),
                    }]),
                )
                    .into_response(),
                None => (StatusCode::BAD_REQUEST, "Malformed JSON body").into_response(),
            })
        }
    }
}
