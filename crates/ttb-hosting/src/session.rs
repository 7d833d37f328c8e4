use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc::unbounded_channel;

use crate::dispatch::Connection;
use crate::dispatch::dispatch;
use crate::gateway::Gateway;

/// Bridges one `actix-ws` connection to the gateway (grounded on
/// `rbp_hosting::Casino::bridge`'s single-task `tokio::select!` loop, which
/// owns the session so inbound decode/dispatch and outbound fan-out
/// delivery never race for the same `&mut Session`): inbound frames are
/// decoded and dispatched inline; outbound frames arrive over this
/// connection's own unbounded channel, fed by `Gateway`'s pub/sub fan-out
/// once the socket has joined a room.
pub async fn run(
    gateway: Arc<Gateway>,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let socket_id = uuid::Uuid::new_v4().to_string();
    log::info!("socket {socket_id}: connected");
    let (tx, mut rx) = unbounded_channel::<String>();
    let mut conn = Connection::default();

    'session: loop {
        tokio::select! {
            biased;
            outbound = rx.recv() => match outbound {
                Some(payload) => {
                    if session.text(payload).await.is_err() {
                        break 'session;
                    }
                }
                None => break 'session,
            },
            frame = stream.next() => match frame {
                Some(Ok(actix_ws::Message::Text(text))) => {
                    match dispatch(&gateway, &socket_id, &tx, &mut conn, &text).await {
                        Some(reply) if !reply.is_empty() => {
                            if session.text(reply).await.is_err() {
                                break 'session;
                            }
                        }
                        _ => {}
                    }
                }
                Some(Ok(actix_ws::Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break 'session;
                    }
                }
                Some(Ok(actix_ws::Message::Close(_))) => break 'session,
                Some(Err(e)) => {
                    log::warn!("socket {socket_id}: stream error: {e}");
                    break 'session;
                }
                None => break 'session,
                _ => continue 'session,
            },
        }
    }

    gateway.on_disconnect(&socket_id).await;
    log::info!("socket {socket_id}: disconnected");
}
