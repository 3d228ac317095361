//! Routes for reading and updating the config document.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use homedash_core::ServerSettings;
use homedash_services::{ConfigUpdate, Task};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResponse};
use crate::state::AppState;

pub const UPDATED_MESSAGE: &str = "Configuration updated successfully!";
pub const NO_DATA_MESSAGE: &str = "No JSON or form data provided";

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/get_config", get(get_config_handler))
        .route("/update_config", post(update_config_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Bind the configured address. Failure here is a startup error.
pub async fn bind(settings: &ServerSettings) -> anyhow::Result<TcpListener> {
    let address = settings.socket_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", address, e))?;
    tracing::info!("Config service listening on http://{}", address);
    Ok(listener)
}

#[tracing::instrument(skip_all)]
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

#[tracing::instrument(skip_all)]
pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    tokio::fs::read_to_string(state.index_page.as_path())
        .await
        .map(Html)
        .map_err(|e| {
            ApiError::NotFound(format!(
                "Index page {} unavailable: {}",
                state.index_page.display(),
                e
            ))
        })
}

/// The persisted document as stored, read fresh on every call.
#[tracing::instrument(skip_all)]
pub async fn get_config_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let document = state.dashboard.lock().store.read_persisted_json();
    Json(document)
}

#[tracing::instrument(skip_all)]
pub async fn update_config_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse>, ApiError> {
    let update = parse_update(&headers, &body)?;
    tracing::info!(
        api_key = update.api_key.is_some(),
        latitude = ?update.latitude,
        longitude = ?update.longitude,
        tasks = update.tasks.as_ref().map(Vec::len),
        "Received configuration update"
    );

    {
        let mut dashboard = state.dashboard.lock();
        dashboard.store.write(update)?;
    }
    state.refresh.notify_one();

    Ok(Json(ApiResponse::ok(UPDATED_MESSAGE)))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Decode the body as JSON or, for any other content type, as form fields.
pub fn parse_update(headers: &HeaderMap, body: &[u8]) -> Result<ConfigUpdate, ApiError> {
    if is_json(headers) {
        return serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)));
    }

    let fields: Vec<(String, String)> = url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if fields.is_empty() {
        return Err(ApiError::BadRequest(NO_DATA_MESSAGE.to_string()));
    }

    let mut update = ConfigUpdate::default();
    for (key, value) in fields {
        match key.as_str() {
            "apiKey" => update.api_key = Some(value),
            "latitude" => update.latitude = Some(parse_coordinate(&key, &value)?),
            "longitude" => update.longitude = Some(parse_coordinate(&key, &value)?),
            "tasks" => {
                let tasks: Vec<Task> = serde_json::from_str(&value)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid tasks: {}", e)))?;
                update.tasks = Some(tasks);
            }
            other => tracing::debug!("Ignoring unknown form field {}", other),
        }
    }
    Ok(update)
}

fn parse_coordinate(key: &str, value: &str) -> Result<f64, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {:?}", key, value)))
}
