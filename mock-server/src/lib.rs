use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Clients allowed in one room.
pub const ROOM_CAPACITY: usize = 2;

#[derive(Clone, Debug, Default)]
pub struct Room {
    pub clients: Vec<Client>,
}

#[derive(Clone, Debug)]
pub struct Client {
    pub id: String,
    pub is_initiator: bool,
    /// Messages posted while no peer was present to read them.
    pub messages: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JoinParams {
    pub room_id: String,
    pub client_id: String,
    pub is_initiator: bool,
    pub messages: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JoinResponse {
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JoinParams>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub result: String,
}

/// What `/echo` saw on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoResponse {
    pub method: String,
    pub origin: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub cache_control: Option<String>,
    pub body: String,
}

pub type Rooms = Arc<RwLock<HashMap<String, Room>>>;

pub fn app() -> Router {
    let rooms: Rooms = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/join/{room_id}", post(join))
        .route("/message/{room_id}/{client_id}", post(message))
        .route("/leave/{room_id}/{client_id}", post(leave))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/delay/{ms}", any(delay))
        .with_state(rooms)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn join(State(rooms): State<Rooms>, Path(room_id): Path<String>) -> Json<JoinResponse> {
    let mut rooms = rooms.write().await;
    let room = rooms.entry(room_id.clone()).or_default();
    if room.clients.len() >= ROOM_CAPACITY {
        tracing::info!(%room_id, "join rejected, room full");
        return Json(JoinResponse {
            result: "FULL".to_string(),
            params: None,
        });
    }

    // The newcomer picks up whatever the peers queued before it arrived.
    let messages = room
        .clients
        .iter_mut()
        .flat_map(|c| std::mem::take(&mut c.messages))
        .collect();
    let client = Client {
        id: Uuid::new_v4().simple().to_string(),
        is_initiator: room.clients.is_empty(),
        messages: Vec::new(),
    };
    tracing::info!(%room_id, client_id = %client.id, initiator = client.is_initiator, "client joined");

    let params = JoinParams {
        room_id,
        client_id: client.id.clone(),
        is_initiator: client.is_initiator,
        messages,
    };
    room.clients.push(client);
    Json(JoinResponse {
        result: "SUCCESS".to_string(),
        params: Some(params),
    })
}

async fn message(
    State(rooms): State<Rooms>,
    Path((room_id, client_id)): Path<(String, String)>,
    body: String,
) -> Json<MessageResponse> {
    let mut rooms = rooms.write().await;
    let result = match rooms.get_mut(&room_id) {
        None => "UNKNOWN_ROOM",
        Some(room) => match room.clients.iter_mut().find(|c| c.id == client_id) {
            None => "UNKNOWN_CLIENT",
            Some(client) => {
                client.messages.push(body);
                "SUCCESS"
            }
        },
    };
    Json(MessageResponse {
        result: result.to_string(),
    })
}

async fn leave(
    State(rooms): State<Rooms>,
    Path((room_id, client_id)): Path<(String, String)>,
) -> StatusCode {
    let mut rooms = rooms.write().await;
    if let Some(room) = rooms.get_mut(&room_id) {
        room.clients.retain(|c| c.id != client_id);
        if room.clients.is_empty() {
            rooms.remove(&room_id);
        }
    }
    StatusCode::OK
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<EchoResponse> {
    Json(EchoResponse {
        method: method.to_string(),
        origin: header_text(&headers, header::ORIGIN),
        content_type: header_text(&headers, header::CONTENT_TYPE),
        content_length: header_text(&headers, header::CONTENT_LENGTH),
        cache_control: header_text(&headers, header::CACHE_CONTROL),
        body,
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, format!("status {code}"))
}

async fn delay(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "ok"
}
