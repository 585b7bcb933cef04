use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::warn;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    state::SharedState,
};

pub async fn conversation_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = payload.inspect_err(|rejection| {
        warn!(status = rejection.status().as_u16(), "rejected conversation body");
    })?;
    let reply = state.relay.respond(payload).await;
    let reply = reply.into_result().map_err(AppError::Relay)?;
    Ok(Json(ChatResponse { reply }))
}
