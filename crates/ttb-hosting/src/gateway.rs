use std::sync::Arc;

use dashmap::DashMap;
use dashmap::DashSet;
use tokio::sync::mpsc::UnboundedSender;

use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;
use ttb_dto::BroadcastMessage;
use ttb_gameroom::Lobby;
use ttb_store::PATTERN_GAME_STARTED;
use ttb_store::PATTERN_GAME_STATE_UPDATE;
use ttb_store::PATTERN_PLAYER_STATE_CHANGED;
use ttb_store::PATTERN_ROOM_STATE_UPDATE;
use ttb_store::StateStore;

/// Socket↔player bookkeeping and pub/sub fan-out (spec §4.7). One `Gateway`
/// is shared across every connection; `sockets`/`player_tx`/`room_members`
/// are written only on connect/disconnect/join/leave (spec §5 "the
/// socket→player map is shared; writes only on connect/disconnect"), and
/// read on every fan-out delivery.
pub struct Gateway {
    lobby: Arc<Lobby>,
    sockets: DashMap<String, Id<Player>>,
    player_tx: DashMap<Id<Player>, UnboundedSender<String>>,
    room_members: DashMap<Id<Room>, DashSet<Id<Player>>>,
}

impl Gateway {
    pub fn new(lobby: Arc<Lobby>) -> Self {
        Self {
            lobby,
            sockets: DashMap::new(),
            player_tx: DashMap::new(),
            room_members: DashMap::new(),
        }
    }

    pub fn lobby(&self) -> &Arc<Lobby> {
        &self.lobby
    }

    /// Subscribes once, at startup, to the four pub/sub patterns (spec
    /// §4.7) and forwards every delivered message verbatim to the matching
    /// transport room or per-player channel. Registers the subscriptions
    /// against `store` so `RedisStore` and `MemoryStore` are both usable
    /// interchangeably here.
    pub async fn start_fanout(self: &Arc<Self>, store: &Arc<dyn StateStore>) {
        self.subscribe_per_player(store, PATTERN_GAME_STATE_UPDATE).await;
        self.subscribe_per_player(store, PATTERN_GAME_STARTED).await;
        self.subscribe_per_room(store, PATTERN_PLAYER_STATE_CHANGED).await;
        self.subscribe_per_room(store, PATTERN_ROOM_STATE_UPDATE).await;
    }

    async fn subscribe_per_player(self: &Arc<Self>, store: &Arc<dyn StateStore>, pattern: &str) {
        let gateway = self.clone();
        let result = store
            .subscribe(
                pattern,
                Box::new(move |channel, payload| gateway.forward_to_player(&channel, payload)),
            )
            .await;
        if let Err(e) = result {
            log::error!("failed to subscribe to {pattern}: {e}");
        }
    }

    async fn subscribe_per_room(self: &Arc<Self>, store: &Arc<dyn StateStore>, pattern: &str) {
        let gateway = self.clone();
        let result = store
            .subscribe(
                pattern,
                Box::new(move |channel, payload| gateway.forward_to_room(&channel, payload)),
            )
            .await;
        if let Err(e) = result {
            log::error!("failed to subscribe to {pattern}: {e}");
        }
    }

    /// `game_state_update:{playerId}` / `game_started:{playerId}` forward to
    /// that one player's connection, if it's still open.
    fn forward_to_player(&self, channel: &str, payload: String) {
        let Some((_, id)) = channel.split_once(':') else { return };
        let Ok(player_id) = id.parse::<Id<Player>>() else { return };
        if let Some(tx) = self.player_tx.get(&player_id) {
            let _ = tx.send(payload);
        }
    }

    /// `player_state_changed:{roomId}` / `room_state_update:{roomId}`
    /// forward to every connected player currently seated in that room.
    fn forward_to_room(&self, channel: &str, payload: String) {
        let Some((_, id)) = channel.split_once(':') else { return };
        let Ok(room_id) = id.parse::<Id<Room>>() else { return };
        let Some(members) = self.room_members.get(&room_id) else { return };
        for player_id in members.iter() {
            if let Some(tx) = self.player_tx.get(&player_id) {
                let _ = tx.send(payload.clone());
            }
        }
    }

    /// Called once a `joinAutoRoom` succeeds on this socket: binds the
    /// socket to the player and registers this connection's outbound
    /// sender for both per-player and per-room fan-out.
    pub fn bind_player(
        &self,
        socket_id: &str,
        player_id: Id<Player>,
        room_id: Id<Room>,
        tx: UnboundedSender<String>,
    ) {
        self.sockets.insert(socket_id.to_string(), player_id);
        self.player_tx.insert(player_id, tx);
        self.room_members.entry(room_id).or_default().insert(player_id);
    }

    /// Called on explicit `leaveAutoRoom` or on disconnect: forgets the
    /// player's fan-out registrations (spec §4.7, §5).
    pub fn unbind_player(&self, player_id: Id<Player>, room_id: Id<Room>) {
        self.player_tx.remove(&player_id);
        if let Some(members) = self.room_members.get(&room_id) {
            members.remove(&player_id);
        }
    }

    pub fn player_for_socket(&self, socket_id: &str) -> Option<Id<Player>> {
        self.sockets.get(socket_id).map(|e| *e.value())
    }

    /// On disconnect: resolve socket→player→room and best-effort leave the
    /// room (spec §4.7 "resolve socket→player, call leaveGame... tolerate
    /// missing"). A socket that never joined a room is a silent no-op.
    /// Never leaves a dangling gravity ticker: `Lobby::leave_auto` always
    /// stops the player's actor (and therefore its ticker) first.
    pub async fn on_disconnect(&self, socket_id: &str) {
        let Some((_, player_id)) = self.sockets.remove(socket_id) else { return };
        let Some(room_id) = self.lobby.room_for_player(player_id) else {
            self.player_tx.remove(&player_id);
            return;
        };
        self.unbind_player(player_id, room_id);
        if let Err(e) = self.lobby.leave_auto(room_id, player_id).await {
            log::debug!("disconnect cleanup for player {player_id}: {e}");
        }
    }
}

/// Serializes a `BroadcastMessage` the same way every publish path does, so
/// callers that need to hand-construct a frame (none currently do, kept for
/// parity with `ttb_gameroom`'s internal `publish` helper) stay consistent.
#[allow(dead_code)]
pub(crate) fn encode(message: &BroadcastMessage) -> Option<String> {
    serde_json::to_string(message).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    use ttb_gameroom::NullStatsSink;
    use ttb_store::MemoryStore;

    fn gateway() -> Arc<Gateway> {
        let store = Arc::new(MemoryStore::new());
        let lobby = Arc::new(Lobby::new(store, Arc::new(NullStatsSink)));
        Arc::new(Gateway::new(lobby))
    }

    #[tokio::test]
    async fn forward_to_player_delivers_only_to_bound_socket() {
        let gateway = gateway();
        let player = Id::<Player>::default();
        let room = Id::<Room>::default();
        let (tx, mut rx) = unbounded_channel();
        gateway.bind_player("socket-a", player, room, tx);

        gateway.forward_to_player(&format!("game_state_update:{player}"), "payload".into());

        assert_eq!(rx.recv().await, Some("payload".to_string()));
    }

    #[tokio::test]
    async fn forward_to_player_ignores_malformed_or_unknown_channel() {
        let gateway = gateway();
        let player = Id::<Player>::default();
        let room = Id::<Room>::default();
        let (tx, mut rx) = unbounded_channel();
        gateway.bind_player("socket-a", player, room, tx);

        gateway.forward_to_player("no-colon-here", "payload".into());
        gateway.forward_to_player("game_state_update:not-a-uuid", "payload".into());
        gateway.forward_to_player(&format!("game_state_update:{}", Id::<Player>::default()), "payload".into());

        drop(gateway);
        assert_eq!(rx.try_recv(), Err(tokio::sync::mpsc::error::TryRecvError::Disconnected));
    }

    #[tokio::test]
    async fn forward_to_room_delivers_to_every_seated_member() {
        let gateway = gateway();
        let room = Id::<Room>::default();
        let alice = Id::<Player>::default();
        let bob = Id::<Player>::default();
        let (alice_tx, mut alice_rx) = unbounded_channel();
        let (bob_tx, mut bob_rx) = unbounded_channel();
        gateway.bind_player("socket-alice", alice, room, alice_tx);
        gateway.bind_player("socket-bob", bob, room, bob_tx);

        gateway.forward_to_room(&format!("room_state_update:{room}"), "update".into());

        assert_eq!(alice_rx.recv().await, Some("update".to_string()));
        assert_eq!(bob_rx.recv().await, Some("update".to_string()));
    }

    #[tokio::test]
    async fn unbind_player_stops_future_delivery() {
        let gateway = gateway();
        let player = Id::<Player>::default();
        let room = Id::<Room>::default();
        let (tx, mut rx) = unbounded_channel();
        gateway.bind_player("socket-a", player, room, tx);
        gateway.unbind_player(player, room);

        gateway.forward_to_player(&format!("game_state_update:{player}"), "payload".into());

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn on_disconnect_on_unknown_socket_is_a_no_op() {
        let gateway = gateway();
        gateway.on_disconnect("never-bound").await;
    }

    #[tokio::test]
    async fn on_disconnect_forgets_a_player_with_no_lobby_room() {
        let gateway = gateway();
        let player = Id::<Player>::default();
        let room = Id::<Room>::default();
        let (tx, _rx) = unbounded_channel();
        gateway.bind_player("socket-a", player, room, tx);

        gateway.on_disconnect("socket-a").await;

        assert!(gateway.player_for_socket("socket-a").is_none());
    }
}
