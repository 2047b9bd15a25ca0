// src/handlers/realtime.rs
//
// Canal realtime sobre Server-Sent Events. Cada cliente conectado mantiene
// una suscripción al hub y recibe solo sus propios eventos; al cortar la
// conexión la suscripción se suelta y no queda ningún otro recurso tomado.

use std::{collections::HashSet, convert::Infallible, time::Duration};

use axum::{
    extract::{Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RealtimeQuery {
    // "sse" (por defecto) o "ws"
    #[serde(rename = "type")]
    pub transport: Option<String>,
    // Lista separada por comas; vacío = todos los tópicos
    pub topics: Option<String>,
}

// GET /api/realtime
#[utoipa::path(
    get,
    path = "/api/realtime",
    tag = "Realtime",
    params(RealtimeQuery),
    responses(
        (status = 200, description = "Stream SSE de eventos del usuario, o descriptor de conexión para type=ws")
    ),
    security(("api_jwt" = []))
)]
pub async fn realtime(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<RealtimeQuery>,
) -> Result<Response, AppError> {
    // El transporte WebSocket nunca se terminó; se entrega un descriptor
    // que apunta al transporte SSE equivalente
    if query.transport.as_deref() == Some("ws") {
        return Ok(Json(json!({
            "transport": "sse",
            "endpoint": "/api/realtime?type=sse",
            "note": "WebSocket no disponible; usar el stream SSE.",
        }))
        .into_response());
    }

    let topics: Option<HashSet<String>> = query.topics.map(|raw| {
        raw.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    });

    let user_id = user.id;
    let rx = app_state.realtime.subscribe();

    tracing::info!(user_id = %user_id, "Cliente SSE conectado");

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        // Un suscriptor atrasado pierde los eventos intermedios (Lagged)
        let event = result.ok()?;
        if event.user_id != user_id {
            return None;
        }
        if let Some(filter) = &topics {
            if !filter.contains(&event.topic) {
                return None;
            }
        }

        let sse_event = Event::default()
            .event(event.kind.clone())
            .json_data(&event.payload)
            .ok()?;
        Some(Ok::<Event, Infallible>(sse_event))
    });

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    );

    Ok(sse.into_response())
}
