use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use ttb_dto::ApiError;
use ttb_dto::ErrorEnvelope;
use ttb_dto::InboundMessage;
use ttb_dto::LegacyMessage;
use ttb_dto::OutboundResponse;
use ttb_dto::SeqTracker;
use ttb_dto::SyncFrame;
use ttb_dto::SyncReply;

use crate::gateway::Gateway;

/// Envelope wrapper so a dispatched request's reply and an `ApiError`
/// serialize through the same `{success, ...}` / `{success:false, error}`
/// shape (spec §6.1, §7) without every call site hand-rolling the tag.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum Reply {
    Ok(OutboundResponse),
    Err { success: bool, error: ErrorEnvelope },
    Sync(SyncReply),
}

fn err_reply(err: ApiError) -> String {
    let reply = Reply::Err {
        success: false,
        error: ErrorEnvelope::from(&err),
    };
    serde_json::to_string(&reply).unwrap_or_else(|_| "{\"success\":false}".to_string())
}

fn ok_reply(response: OutboundResponse) -> String {
    serde_json::to_string(&Reply::Ok(response)).unwrap_or_else(|_| "{\"success\":false}".to_string())
}

/// Per-connection dispatcher state: which player this socket has joined as
/// (if any) and the `seq` dedup tracker for the legacy network-sync
/// protocol (spec §6.1 "`input_event` duplicates or out-of-order `seq` are
/// rejected").
#[derive(Default)]
pub struct Connection {
    pub player_id: Option<ttb_core::Id<ttb_core::Player>>,
    pub room_id: Option<ttb_core::Id<ttb_core::Room>>,
    seq_tracker: SeqTracker,
}

/// Handles one inbound text frame. Tries the canonical closed message set
/// first, then the legacy network-sync protocol, then the legacy per-game
/// flow, so the decoder never fails closed on a well-formed frame from a
/// still-negotiating client (spec §6.1, §9) — returns `None` only for a
/// frame that decodes as none of the three.
pub async fn dispatch(
    gateway: &Arc<Gateway>,
    socket_id: &str,
    tx: &UnboundedSender<String>,
    conn: &mut Connection,
    text: &str,
) -> Option<String> {
    if let Ok(message) = serde_json::from_str::<InboundMessage>(text) {
        return Some(handle_inbound(gateway, socket_id, tx, conn, message).await);
    }
    if let Ok(frame) = serde_json::from_str::<SyncFrame>(text) {
        return handle_sync_frame(gateway, conn, frame).await;
    }
    if let Ok(legacy) = serde_json::from_str::<LegacyMessage>(text) {
        log::debug!("socket {socket_id}: ignoring legacy per-game frame {legacy:?}");
        return None;
    }
    log::warn!("socket {socket_id}: undecodable frame, rejecting as invalid action");
    Some(err_reply(ApiError::InvalidAction))
}

async fn handle_inbound(
    gateway: &Arc<Gateway>,
    socket_id: &str,
    tx: &UnboundedSender<String>,
    conn: &mut Connection,
    message: InboundMessage,
) -> String {
    let lobby = gateway.lobby();
    match message {
        InboundMessage::JoinAutoRoom { name } => match lobby.join_auto(name).await {
            Ok((room_id, player)) => {
                conn.player_id = Some(player.id);
                conn.room_id = Some(room_id);
                gateway.bind_player(socket_id, player.id, room_id, tx.clone());
                ok_reply(OutboundResponse::JoinAutoRoom { success: true, room_id, player })
            }
            Err(e) => err_reply(e),
        },
        InboundMessage::LeaveAutoRoom { room_id, player_id } => match lobby.leave_auto(room_id, player_id).await {
            Ok(()) => {
                gateway.unbind_player(player_id, room_id);
                if conn.player_id == Some(player_id) {
                    conn.player_id = None;
                    conn.room_id = None;
                }
                ok_reply(OutboundResponse::LeaveAutoRoom { success: true })
            }
            Err(e) => err_reply(e),
        },
        InboundMessage::HandlePlayerInput { player_id, action } => {
            match lobby.handle_player_input(player_id, action).await {
                // "none (side-effects via pub/sub)" (spec §6.1): nothing to
                // acknowledge on this socket beyond the broadcast fan-out.
                Ok(()) => String::new(),
                Err(e) => err_reply(e),
            }
        }
        InboundMessage::GetPlayerGameState { player_id } => match lobby.player_snapshot(player_id).await {
            Ok(game_state) => ok_reply(OutboundResponse::GetPlayerGameState { success: true, game_state }),
            Err(e) => err_reply(e),
        },
        InboundMessage::GetRoomPlayers { room_id } => match lobby.room_players(room_id).await {
            Ok(players) => ok_reply(OutboundResponse::GetRoomPlayers { success: true, players }),
            Err(e) => err_reply(e),
        },
        InboundMessage::GetRoomInfo { room_id } => match lobby.room_info(room_id).await {
            Ok(_info) => ok_reply(OutboundResponse::GetRoomInfo { success: true }),
            Err(e) => err_reply(e),
        },
        InboundMessage::GetRoomStats => {
            let stats = lobby.room_stats().await;
            ok_reply(OutboundResponse::GetRoomStats { success: true, stats })
        }
        InboundMessage::StartRoomGame { room_id } => match lobby.start_room_game(room_id).await {
            Ok(game_seed) => ok_reply(OutboundResponse::StartRoomGame { success: true, room_id, game_seed }),
            Err(e) => err_reply(e),
        },
    }
}

/// Legacy network-sync protocol (spec §6.1): kept alive for clients
/// negotiating it, but it doesn't drive any simulation logic beyond replying
/// to pings/snapshot requests and recording desync reports as warnings.
async fn handle_sync_frame(gateway: &Arc<Gateway>, conn: &mut Connection, frame: SyncFrame) -> Option<String> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    match frame {
        SyncFrame::Ping { seq, .. } => Some(encode_sync(SyncReply::Pong { seq, server_time: now })),
        SyncFrame::SnapshotRequest { seq, player_id } => match gateway.lobby().player_snapshot(player_id).await {
            Ok(snapshot) => Some(encode_sync(SyncReply::StateSnapshot { seq, server_time: now, snapshot })),
            Err(e) => Some(err_reply(e)),
        },
        SyncFrame::InputEvent { seq, player_id, action } => {
            if !conn.seq_tracker.accept(seq) {
                log::debug!("player {player_id}: rejecting duplicate/out-of-order seq {seq}");
                return None;
            }
            if let Err(e) = gateway.lobby().handle_player_input(player_id, action).await {
                return Some(err_reply(e));
            }
            None
        }
        SyncFrame::DesyncReport { player_id, detail, .. } => {
            log::warn!("player {player_id}: desync reported: {detail}");
            None
        }
        SyncFrame::JoinGame { .. } | SyncFrame::MatchReady { .. } | SyncFrame::Ack { .. } | SyncFrame::Keepalive { .. } => {
            None
        }
    }
}

fn encode_sync(reply: SyncReply) -> String {
    serde_json::to_string(&Reply::Sync(reply)).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    use ttb_gameroom::Lobby;
    use ttb_gameroom::NullStatsSink;
    use ttb_store::MemoryStore;

    fn gateway() -> Arc<Gateway> {
        let store = Arc::new(MemoryStore::new());
        let lobby = Arc::new(Lobby::new(store, Arc::new(NullStatsSink)));
        Arc::new(Gateway::new(lobby))
    }

    #[tokio::test]
    async fn join_auto_room_binds_the_socket_and_replies_success() {
        let gateway = gateway();
        let (tx, _rx) = unbounded_channel();
        let mut conn = Connection::default();
        let text = serde_json::json!({"type": "joinAutoRoom", "name": "alice"}).to_string();

        let reply = dispatch(&gateway, "socket-a", &tx, &mut conn, &text).await.unwrap();

        assert!(reply.contains("\"joinAutoRoom\""));
        assert!(reply.contains("\"success\":true"));
        assert!(conn.player_id.is_some());
        assert!(gateway.player_for_socket("socket-a").is_some());
    }

    #[tokio::test]
    async fn handle_player_input_for_unknown_player_replies_with_error_and_no_reply_on_success() {
        let gateway = gateway();
        let (tx, _rx) = unbounded_channel();
        let mut conn = Connection::default();
        let unknown = ttb_core::Id::<ttb_core::Player>::default();
        let text = serde_json::json!({
            "type": "handlePlayerInput",
            "playerId": unknown,
            "action": "moveLeft",
        })
        .to_string();

        let reply = dispatch(&gateway, "socket-a", &tx, &mut conn, &text).await.unwrap();

        assert!(reply.contains("\"success\":false"));
    }

    #[tokio::test]
    async fn get_room_stats_replies_with_empty_lobby_counts() {
        let gateway = gateway();
        let (tx, _rx) = unbounded_channel();
        let mut conn = Connection::default();
        let text = serde_json::json!({"type": "getRoomStats"}).to_string();

        let reply = dispatch(&gateway, "socket-a", &tx, &mut conn, &text).await.unwrap();

        assert!(reply.contains("\"totalRooms\":0"));
    }

    #[tokio::test]
    async fn legacy_per_game_frame_decodes_but_produces_no_reply() {
        let gateway = gateway();
        let (tx, _rx) = unbounded_channel();
        let mut conn = Connection::default();
        let text = serde_json::json!({"type": "joinGame", "gameId": "g1", "name": "bob"}).to_string();

        let reply = dispatch(&gateway, "socket-a", &tx, &mut conn, &text).await;

        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn sync_ping_replies_with_pong() {
        let gateway = gateway();
        let (tx, _rx) = unbounded_channel();
        let mut conn = Connection::default();
        let text = serde_json::json!({"type": "ping", "seq": 1, "client_time": 42}).to_string();

        let reply = dispatch(&gateway, "socket-a", &tx, &mut conn, &text).await.unwrap();

        assert!(reply.contains("\"pong\""));
    }

    #[tokio::test]
    async fn undecodable_frame_is_rejected_as_invalid_action() {
        let gateway = gateway();
        let (tx, _rx) = unbounded_channel();
        let mut conn = Connection::default();

        let reply = dispatch(&gateway, "socket-a", &tx, &mut conn, "not json").await.unwrap();

        assert!(reply.contains("\"success\":false"));
    }
}
