use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tower_sessions::Session;

use crate::{
    model::api::ErrorDto,
    server::{
        error::AppError,
        middleware::auth::{AuthContext, AuthGuard, Permission},
        realtime::{ClientCommand, Room, Subscription},
        state::AppState,
    },
};

pub static REALTIME_TAG: &str = "realtime";

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Open the realtime WebSocket.
///
/// The connection receives events for its tenant room and its user room. Clients send
/// `{"action":"join","task_id":N}` to also receive a task's events, and `leave` to stop.
///
/// # Access Control
/// - Any active member; joining a task room requires access to the task
#[utoipa::path(
    get,
    path = "/api/realtime",
    tag = REALTIME_TAG,
    responses(
        (status = 101, description = "Switching to the WebSocket protocol"),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an active member of the tenant", body = ErrorDto)
    ),
)]
pub async fn connect(
    State(state): State<AppState>,
    session: Session,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, session, auth)))
}

async fn handle_socket(socket: WebSocket, state: AppState, session: Session, auth: AuthContext) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.realtime.subscribe();
    let mut subscription = Subscription::new(auth.tenant_id, auth.user.id);
    let mut ping = tokio::time::interval(PING_INTERVAL);

    tracing::debug!(
        tenant_id = auth.tenant_id,
        user_id = auth.user.id,
        "Realtime connection opened"
    );

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if !subscription.accepts(&event) {
                        continue;
                    }
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!("Failed to encode realtime event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!(user_id = auth.user.id, missed, "Realtime client lagged");
                }
                Err(RecvError::Closed) => break,
            },
            message = receiver.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let reply =
                        handle_command(&state, &session, &mut subscription, text.as_str()).await;
                    if let Some(reply) = reply {
                        if sender.send(Message::Text(reply.into())).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            _ = ping.tick() => {
                if sender.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(user_id = auth.user.id, "Realtime connection closed");
}

/// Applies a client command. Returns an error frame to send back, if any.
async fn handle_command(
    state: &AppState,
    session: &Session,
    subscription: &mut Subscription,
    text: &str,
) -> Option<String> {
    let command = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => command,
        Err(e) => return error_frame(format!("Invalid command: {}", e)),
    };

    match command {
        ClientCommand::Join { task_id } => {
            match AuthGuard::new(&state.db, session)
                .require(&[Permission::TaskAccess(task_id)])
                .await
            {
                Ok(_) => {
                    subscription.join(Room::Task(task_id));
                    None
                }
                Err(e) => {
                    tracing::debug!(task_id, "Realtime join refused: {}", e);
                    error_frame(format!("Cannot join task {}", task_id))
                }
            }
        }
        ClientCommand::Leave { task_id } => {
            subscription.leave_task(task_id);
            None
        }
    }
}

fn error_frame(error: String) -> Option<String> {
    serde_json::to_string(&ErrorDto { error }).ok()
}
