//! # API REST
//!
//! REST API implementation for PocketBook.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Conditional reads (`If-None-Match` / `If-Modified-Since` → `304 Not Modified`)
//! - API key checks on writes
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Uses `api-shared` for wire types and `pocketbook-core` for all medication logic.

#![warn(rust_2018_idioms)]

mod body;
mod convert;

use axum::{
    extract::{FromRequestParts, Path as AxumPath, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    validate_api_key, HealthRes, HealthService, MedicationReq, MedicationRes,
    MedicationSummaryRes, RequestErrorRes, RequestErrorType, API_KEY_HEADER,
};
use body::MedicationBody;
use convert::{draft_from_req, medication_res, request_errors_res, summary_res};
use pocketbook_core::{
    ConditionalRequest, MedicationError, MedicationId, MedicationResult, MedicationService,
    ReadOutcome,
};

/// Application state shared across REST API handlers
///
/// Holds the medication service plus the HTTP-level settings resolved at startup.
#[derive(Clone)]
pub struct AppState {
    medications: MedicationService,
    api_key: Option<Arc<str>>,
    cache_max_age_secs: u32,
}

impl AppState {
    /// Creates the handler state.
    ///
    /// When `api_key` is `None`, write endpoints are open to every caller.
    pub fn new(
        medications: MedicationService,
        api_key: Option<String>,
        cache_max_age_secs: u32,
    ) -> Self {
        Self {
            medications,
            api_key: api_key.map(Arc::from),
            cache_max_age_secs,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_medications,
        get_medication,
        create_medication,
        update_medication,
        delete_medication,
    ),
    components(schemas(
        HealthRes,
        MedicationReq,
        MedicationRes,
        MedicationSummaryRes,
        RequestErrorRes,
        RequestErrorType,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with OpenAPI docs and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/medications",
            get(list_medications).post(create_medication),
        )
        .route(
            "/medications/:id",
            get(get_medication)
                .put(update_medication)
                .delete(delete_medication),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Capability check for administrative (write) endpoints.
///
/// Passes when no API key is configured, or when the `x-api-key` header matches it.
pub struct AdminKey;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminKey {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.api_key.as_deref() else {
            return Ok(AdminKey);
        };

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        validate_api_key(provided, expected)
            .map(|()| AdminKey)
            .map_err(|e| {
                tracing::warn!("Rejected {} {}: {}", parts.method, parts.uri.path(), e);
                (StatusCode::UNAUTHORIZED, "Invalid API key")
            })
    }
}

/// Reads the cache validators from request headers.
///
/// An unreadable `If-None-Match` is still treated as supplied (it can never match); an
/// unreadable `If-Modified-Since` is ignored.
fn conditional_request(headers: &HeaderMap) -> ConditionalRequest {
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    let if_modified_since = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    ConditionalRequest::new(if_none_match, if_modified_since)
}

/// Runs a service call on the blocking pool; the store may touch the disk.
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, Response>
where
    F: FnOnce(&MedicationService) -> MedicationResult<T> + Send + 'static,
    T: Send + 'static,
{
    let medications = state.medications.clone();
    match tokio::task::spawn_blocking(move || op(&medications)).await {
        Ok(result) => result.map_err(failure_response),
        Err(e) => {
            tracing::error!("Medication task failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response())
        }
    }
}

/// Maps a failed operation onto its HTTP response.
fn failure_response(err: MedicationError) -> Response {
    match err {
        MedicationError::Validation(errors) => {
            (StatusCode::BAD_REQUEST, Json(request_errors_res(&errors))).into_response()
        }
        MedicationError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
        other => {
            tracing::error!("Medication operation error: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

fn insert_header(response: &mut Response, name: header::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            response.headers_mut().insert(name, value);
        }
        Err(e) => tracing::warn!("Skipping unrepresentable {} header: {}", name, e),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Returns the current health status of the PocketBook REST API service.
/// This endpoint is used for monitoring and load balancer health checks.
#[axum::debug_handler(state = AppState)]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/medications",
    responses(
        (status = 200, description = "Summaries of all medications", body = [MedicationSummaryRes]),
        (status = 500, description = "Internal server error")
    )
)]
/// List all medications as summaries (id, name, last modified)
///
/// Collection reads are never answered with `304 Not Modified`.
#[axum::debug_handler]
async fn list_medications(State(state): State<AppState>) -> Response {
    match run_blocking(&state, |medications| medications.list()).await {
        Ok(summaries) => {
            let body: Vec<MedicationSummaryRes> = summaries.into_iter().map(summary_res).collect();
            Json(body).into_response()
        }
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path = "/medications/{id}",
    params(
        ("id" = i32, Path, description = "Medication id"),
        ("If-None-Match" = Option<String>, Header, description = "Entity tag of the cached copy"),
        ("If-Modified-Since" = Option<String>, Header, description = "Last-Modified of the cached copy")
    ),
    responses(
        (status = 200, description = "Medication", body = MedicationRes),
        (status = 304, description = "Not modified"),
        (status = 404, description = "Not found")
    )
)]
/// Read a single medication
///
/// A matching `If-None-Match` always yields `304`. Without `If-None-Match`, an
/// `If-Modified-Since` within two seconds of the record's modification time also yields `304`.
/// Otherwise the record is returned with `ETag` and `Last-Modified` headers.
#[axum::debug_handler]
async fn get_medication(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i32>,
    headers: HeaderMap,
) -> Response {
    let request = conditional_request(&headers);
    let outcome = run_blocking(&state, move |medications| {
        medications.read(MedicationId::new(id), &request)
    })
    .await;

    match outcome {
        Ok(ReadOutcome::NotModified) => StatusCode::NOT_MODIFIED.into_response(),
        Ok(ReadOutcome::Current {
            medication,
            etag,
            last_modified,
        }) => {
            let mut response = Json(medication_res(&medication)).into_response();
            insert_header(&mut response, header::ETAG, &etag);
            insert_header(&mut response, header::LAST_MODIFIED, &last_modified);
            insert_header(
                &mut response,
                header::CACHE_CONTROL,
                &format!("public, max-age={}", state.cache_max_age_secs),
            );
            insert_header(&mut response, header::VARY, "Accept-Encoding");
            response
        }
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/medications",
    request_body = MedicationReq,
    params(
        ("x-api-key" = Option<String>, Header, description = "Required when the server has an API key configured")
    ),
    responses(
        (status = 201, description = "Medication created", body = MedicationRes),
        (status = 400, description = "Validation failed or malformed body", body = [RequestErrorRes]),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a new medication
///
/// Every blank, invalid or in-use field is reported in one `400` response. On success the
/// `Location` header points at the new record.
#[axum::debug_handler]
async fn create_medication(
    _admin: AdminKey,
    State(state): State<AppState>,
    MedicationBody(req): MedicationBody,
) -> Response {
    let draft = draft_from_req(req);

    match run_blocking(&state, move |medications| medications.create(&draft)).await {
        Ok(medication) => {
            let location = format!("/medications/{}", medication.id);
            let mut response =
                (StatusCode::CREATED, Json(medication_res(&medication))).into_response();
            insert_header(&mut response, header::LOCATION, &location);
            response
        }
        Err(response) => response,
    }
}

#[utoipa::path(
    put,
    path = "/medications/{id}",
    request_body = MedicationReq,
    params(
        ("id" = i32, Path, description = "Medication id"),
        ("x-api-key" = Option<String>, Header, description = "Required when the server has an API key configured")
    ),
    responses(
        (status = 200, description = "Medication updated", body = MedicationRes),
        (status = 400, description = "Validation failed or malformed body", body = [RequestErrorRes]),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Replace a medication
///
/// The whole record is revalidated. Validation errors are reported even when the id does not
/// exist; `404` is only returned for a valid body.
#[axum::debug_handler]
async fn update_medication(
    _admin: AdminKey,
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i32>,
    MedicationBody(req): MedicationBody,
) -> Response {
    let draft = draft_from_req(req);
    let outcome = run_blocking(&state, move |medications| {
        medications.update(MedicationId::new(id), &draft)
    })
    .await;

    match outcome {
        Ok(medication) => Json(medication_res(&medication)).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    delete,
    path = "/medications/{id}",
    params(
        ("id" = i32, Path, description = "Medication id"),
        ("x-api-key" = Option<String>, Header, description = "Required when the server has an API key configured")
    ),
    responses(
        (status = 204, description = "Medication deleted, or already absent"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
/// Delete a medication
///
/// Idempotent: deleting an unknown id also returns `204`.
#[axum::debug_handler]
async fn delete_medication(
    _admin: AdminKey,
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i32>,
) -> Response {
    match run_blocking(&state, move |medications| medications.delete(MedicationId::new(id))).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(response) => response,
    }
}
