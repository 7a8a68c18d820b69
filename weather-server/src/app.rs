//! HTTP surface: `GET /weather?cep=<code>`.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};
use weather_core::{LookupError, WeatherResult, WeatherService};

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: WeatherService,
}

/// Raw query pairs, in request order. Repeated keys are kept.
pub type QueryPairs = Vec<(String, String)>;

/// First `cep` value; a missing parameter is validated like an empty one.
fn first_cep(pairs: &[(String, String)]) -> &str {
    pairs.iter().find(|(key, _)| key == "cep").map_or("", |(_, value)| value.as_str())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(weather_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn weather_handler(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<WeatherResult>, ApiError> {
    let Query(pairs) = query.map_err(|rejection| {
        debug!(error = %rejection, "unparseable query string");
        ApiError(LookupError::InvalidZipcode)
    })?;

    let result = state.service.lookup(first_cep(&pairs)).await?;
    Ok(Json(result))
}

/// Lookup failure rendered as `{"message": ...}` with the matching status.
#[derive(Debug)]
pub struct ApiError(pub LookupError);

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            LookupError::InvalidZipcode => StatusCode::UNPROCESSABLE_ENTITY,
            LookupError::ZipcodeNotFound => StatusCode::NOT_FOUND,
            LookupError::Cep(_) | LookupError::MissingApiKey | LookupError::Weather(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self.0 {
            LookupError::InvalidZipcode | LookupError::ZipcodeNotFound => {
                debug!(error = %self.0, "rejected lookup");
            }
            LookupError::MissingApiKey => warn!(error = %self.0, "rejected lookup"),
            LookupError::Cep(_) | LookupError::Weather(_) => {
                error!(error = %self.0, "upstream failure");
            }
        }

        (status, Json(json!({ "message": self.0.public_message() }))).into_response()
    }
}
