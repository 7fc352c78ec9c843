use crate::domain::party::normalize_code;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::PartyDto;
use crate::interface_adapters::state::AppState;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

/// `GET /parties/{code}`: current roster of a party, for lobby browsers and
/// operators. Codes are matched case-insensitively.
pub async fn party_handler(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let code = match normalize_code(&code) {
        Ok(code) => code,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let broker = state.broker.lock().await;
    match broker.party(&code) {
        Some(party) => (StatusCode::OK, Json(PartyDto::from(party))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "party not found".to_string(),
            }),
        )
            .into_response(),
    }
}
