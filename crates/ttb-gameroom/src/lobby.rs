use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use dashmap::DashMap;
use tokio::sync::Mutex;

use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room as RoomMarker;
use ttb_dto::ApiError;
use ttb_dto::BroadcastMessage;
use ttb_dto::GameStateSnapshot;
use ttb_dto::PlayerAction;
use ttb_dto::PlayerSummary;
use ttb_dto::RoomInfo;
use ttb_dto::RoomStats;
use ttb_dto::RoomStatus;
use ttb_simulation::PlayerState;
use ttb_store::StateStore;
use ttb_store::ACTIVE_ROOMS;
use ttb_store::PLAYERS;
use ttb_store::channel_player_state_changed;
use ttb_store::channel_room_state_update;
use ttb_store::game_players_key;
use ttb_store::player_game_key;
use ttb_store::player_key;
use ttb_store::room_key;

use crate::actor;
use crate::room::Room;
use crate::room::Seat;
use crate::stats::StatsSink;

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Mints a room seed: `timeMs + rand32` (spec §4.5 `createNewRoom`).
fn mint_room_seed(now_ms: i64) -> i32 {
    (now_ms as i32).wrapping_add(rand::random::<i32>())
}

/// Room allocator and lifecycle manager (spec §4.5). Owns the in-process
/// room registry (`DashMap<Id<Room>, Arc<Mutex<Room>>>`, the same shape as
/// the `DashMap<u32, Arc<Room>>` registry in
/// `GlobedGD-central-server/src/rooms-manager.rs`) and mirrors every
/// mutation into the state store so `ttb-hosting` or a second process could
/// reconstruct the roster from the store alone.
///
/// `Id<Room>` here is a UUIDv7 (`ttb_core::Id`), which already encodes
/// creation order the way the source's `room_{epoch_ms}_{rand9}` string id
/// did — see `DESIGN.md` for that open-question resolution.
pub struct Lobby {
    rooms: DashMap<Id<RoomMarker>, Arc<Mutex<Room>>>,
    player_rooms: DashMap<Id<Player>, Id<RoomMarker>>,
    store: Arc<dyn StateStore>,
    stats: Arc<dyn StatsSink>,
}

impl Lobby {
    pub fn new(store: Arc<dyn StateStore>, stats: Arc<dyn StatsSink>) -> Self {
        Self {
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            store,
            stats,
        }
    }

    /// `findAvailableRoom` (spec §4.5): a `PLAYING` room with capacity, else
    /// a `WAITING` room with capacity, else any room with capacity.
    async fn find_available_room(&self) -> Option<Arc<Mutex<Room>>> {
        let mut playing = None;
        let mut waiting = None;
        let mut any = None;
        for entry in self.rooms.iter() {
            let room = entry.value().clone();
            let guard = room.lock().await;
            if !guard.has_capacity() {
                continue;
            }
            match guard.status {
                RoomStatus::Playing if playing.is_none() => playing = Some(room.clone()),
                RoomStatus::Waiting if waiting.is_none() => waiting = Some(room.clone()),
                _ => {}
            }
            if any.is_none() {
                any = Some(room.clone());
            }
        }
        playing.or(waiting).or(any)
    }

    async fn create_new_room(&self) -> Arc<Mutex<Room>> {
        let id = Id::default();
        let now = now_millis();
        let seed = mint_room_seed(now);
        let room = Arc::new(Mutex::new(Room::new(id, seed, now)));
        self.rooms.insert(id, room.clone());
        if let Err(e) = self.store.sadd(ACTIVE_ROOMS, &id.to_string()).await {
            log::warn!("room {id}: failed to record in active_rooms: {e}");
        }
        self.persist_room(&room).await;
        room
    }

    /// `joinGameAuto` (spec §4.5): find-or-create, assign the player,
    /// initialize their `PlayerGameState`, and bump `lastActivity`. Starting
    /// the game is not automatic — that's `startRoomGame`.
    pub async fn join_auto(&self, name: String) -> Result<(Id<RoomMarker>, PlayerSummary), ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name", "must not be empty"));
        }
        let room = match self.find_available_room().await {
            Some(room) => room,
            None => self.create_new_room().await,
        };

        let room_id = room.lock().await.id;
        let player_id = Id::default();
        let state = PlayerState::initial(player_id, room_id);
        let actor = actor::spawn(state, self.store.clone(), self.stats.clone());

        let (summary, player_count) = {
            let mut guard = room.lock().await;
            if !guard.has_capacity() {
                actor.stop();
                return Err(ApiError::RoomFull);
            }
            let seat = Seat {
                id: player_id,
                name,
                score: 0,
                level: 0,
                lines_cleared: 0,
                actor,
            };
            let summary = seat.summary(room_id);
            guard.seats.insert(player_id, seat);
            guard.touch(now_millis());
            (summary, guard.current_players())
        };

        self.player_rooms.insert(player_id, room_id);
        if let Err(e) = self.store.sadd(PLAYERS, &player_id.to_string()).await {
            log::warn!("player {player_id}: failed to record in players set: {e}");
        }
        if let Err(e) = self.store.sadd(&game_players_key(room_id), &player_id.to_string()).await {
            log::warn!("room {room_id}: failed to record player {player_id}: {e}");
        }
        self.persist_player(&summary).await;
        self.persist_room(&room).await;
        self.broadcast_room_state(&room, player_count).await;
        self.publish(
            &channel_player_state_changed(room_id),
            &BroadcastMessage::PlayerJoined {
                room_id,
                player: summary.clone(),
            },
        )
        .await;

        Ok((room_id, summary))
    }

    /// `leaveGameAuto` (spec §4.5): remove the player; delete the room
    /// immediately if it's now empty (no background sweeper, spec §5).
    pub async fn leave_auto(&self, room_id: Id<RoomMarker>, player_id: Id<Player>) -> Result<(), ApiError> {
        let room = self.rooms.get(&room_id).map(|e| e.value().clone()).ok_or(ApiError::RoomNotFound)?;

        let remaining = {
            let mut guard = room.lock().await;
            let seat = guard.seats.remove(&player_id).ok_or(ApiError::PlayerNotFound)?;
            seat.actor.stop();
            guard.touch(now_millis());
            guard.current_players()
        };

        self.player_rooms.remove(&player_id);
        if let Err(e) = self.store.del(&player_key(player_id)).await {
            log::warn!("player {player_id}: failed to delete player record: {e}");
        }
        if let Err(e) = self.store.del(&player_game_key(player_id)).await {
            log::warn!("player {player_id}: failed to delete game state: {e}");
        }
        if let Err(e) = self.store.srem(PLAYERS, &player_id.to_string()).await {
            log::warn!("player {player_id}: failed to remove from players set: {e}");
        }
        if let Err(e) = self.store.srem(&game_players_key(room_id), &player_id.to_string()).await {
            log::warn!("room {room_id}: failed to remove player {player_id}: {e}");
        }

        if remaining == 0 {
            self.rooms.remove(&room_id);
            if let Err(e) = self.store.srem(ACTIVE_ROOMS, &room_id.to_string()).await {
                log::warn!("room {room_id}: failed to remove from active_rooms: {e}");
            }
            if let Err(e) = self.store.del(&room_key(room_id)).await {
                log::warn!("room {room_id}: failed to delete room record: {e}");
            }
        } else {
            self.persist_room(&room).await;
            self.broadcast_room_state(&room, remaining).await;
        }

        self.publish(
            &channel_player_state_changed(room_id),
            &BroadcastMessage::PlayerLeft { room_id, player_id },
        )
        .await;
        Ok(())
    }

    /// Room a connected player currently occupies, if any. Used by
    /// `ttb-hosting` to resolve a disconnecting socket's room without
    /// keeping a second copy of the socket→player→room chain.
    pub fn room_for_player(&self, player_id: Id<Player>) -> Option<Id<RoomMarker>> {
        self.player_rooms.get(&player_id).map(|e| *e.value())
    }

    /// `startRoomGame` (spec §4.5): flips the room to `PLAYING` and starts
    /// every seated player's game. Rejects a room that isn't `WAITING`.
    pub async fn start_room_game(&self, room_id: Id<RoomMarker>) -> Result<i32, ApiError> {
        let room = self.rooms.get(&room_id).map(|e| e.value().clone()).ok_or(ApiError::RoomNotFound)?;

        let (seed, seats) = {
            let mut guard = room.lock().await;
            if guard.status != RoomStatus::Waiting {
                return Err(ApiError::CannotStart(format!("room is {:?}, not WAITING", guard.status)));
            }
            guard.status = RoomStatus::Playing;
            guard.touch(now_millis());
            (guard.room_seed, guard.seats.values().cloned().collect::<Vec<_>>())
        };

        for seat in &seats {
            if let Err(e) = seat.actor.start_game().await {
                log::warn!("player {}: failed to start game: {e}", seat.id);
            }
        }

        self.persist_room(&room).await;
        self.publish(
            &channel_room_state_update(room_id),
            &BroadcastMessage::RoomGameStarted { room_id, game_seed: seed },
        )
        .await;
        Ok(seed)
    }

    /// `handlePlayerInput` (spec §4.3, §6.1): routed to the owning actor,
    /// with no reply body — effects surface through pub/sub.
    pub async fn handle_player_input(&self, player_id: Id<Player>, action: PlayerAction) -> Result<(), ApiError> {
        let room_id = *self.player_rooms.get(&player_id).ok_or(ApiError::PlayerNotFound)?.value();
        let room = self.rooms.get(&room_id).map(|e| e.value().clone()).ok_or(ApiError::RoomNotFound)?;
        let actor = {
            let guard = room.lock().await;
            guard.seats.get(&player_id).map(|seat| seat.actor.clone()).ok_or(ApiError::PlayerNotFound)?
        };
        actor.apply(action).await?;
        if let Ok(snapshot) = actor.snapshot().await {
            let mut guard = room.lock().await;
            if let Some(seat) = guard.seats.get_mut(&player_id) {
                seat.score = snapshot.score;
                seat.level = snapshot.level;
                seat.lines_cleared = snapshot.lines_cleared;
            }
        }
        Ok(())
    }

    pub async fn player_snapshot(&self, player_id: Id<Player>) -> Result<GameStateSnapshot, ApiError> {
        let room_id = *self.player_rooms.get(&player_id).ok_or(ApiError::PlayerNotFound)?.value();
        let room = self.rooms.get(&room_id).map(|e| e.value().clone()).ok_or(ApiError::RoomNotFound)?;
        let actor = {
            let guard = room.lock().await;
            guard.seats.get(&player_id).map(|seat| seat.actor.clone()).ok_or(ApiError::PlayerNotFound)?
        };
        actor.snapshot().await
    }

    pub async fn room_players(&self, room_id: Id<RoomMarker>) -> Result<Vec<PlayerSummary>, ApiError> {
        let room = self.rooms.get(&room_id).map(|e| e.value().clone()).ok_or(ApiError::RoomNotFound)?;
        Ok(room.lock().await.summaries())
    }

    /// `getRoomInfo` (spec §6.1): returns the room shape and, as a side
    /// effect, republishes `roomStateUpdate` for anyone listening.
    pub async fn room_info(&self, room_id: Id<RoomMarker>) -> Result<RoomInfo, ApiError> {
        let room = self.rooms.get(&room_id).map(|e| e.value().clone()).ok_or(ApiError::RoomNotFound)?;
        let (info, player_count) = {
            let guard = room.lock().await;
            (
                RoomInfo {
                    id: guard.id,
                    status: guard.status,
                    player_count: guard.current_players(),
                    max_players: ttb_core::ROOM_CAPACITY,
                    room_seed: guard.room_seed,
                },
                guard.current_players(),
            )
        };
        self.broadcast_room_state(&room, player_count).await;
        Ok(info)
    }

    pub async fn room_stats(&self) -> RoomStats {
        let mut total_players = 0;
        let mut rooms_playing = 0;
        let mut rooms_waiting = 0;
        for entry in self.rooms.iter() {
            let guard = entry.value().lock().await;
            total_players += guard.current_players();
            match guard.status {
                RoomStatus::Playing => rooms_playing += 1,
                RoomStatus::Waiting => rooms_waiting += 1,
                RoomStatus::Finished => {}
            }
        }
        RoomStats {
            total_rooms: self.rooms.len(),
            total_players,
            rooms_playing,
            rooms_waiting,
        }
    }

    async fn persist_room(&self, room: &Arc<Mutex<Room>>) {
        #[derive(serde::Serialize)]
        struct RoomRecord {
            id: Id<RoomMarker>,
            status: RoomStatus,
            room_seed: i32,
            created_at: i64,
            last_activity: i64,
            player_count: usize,
        }
        let guard = room.lock().await;
        let record = RoomRecord {
            id: guard.id,
            status: guard.status,
            room_seed: guard.room_seed,
            created_at: guard.created_at,
            last_activity: guard.last_activity,
            player_count: guard.current_players(),
        };
        match serde_json::to_string(&record) {
            Ok(payload) => {
                if let Err(e) = self
                    .store
                    .set(&room_key(record.id), &payload, Some(ttb_core::STORE_TTL_SECS))
                    .await
                {
                    log::warn!("room {}: failed to persist: {e}", record.id);
                }
            }
            Err(e) => log::warn!("room {}: failed to serialize: {e}", record.id),
        }
    }

    async fn persist_player(&self, summary: &PlayerSummary) {
        match serde_json::to_string(summary) {
            Ok(payload) => {
                if let Err(e) = self
                    .store
                    .set(&player_key(summary.id), &payload, Some(ttb_core::STORE_TTL_SECS))
                    .await
                {
                    log::warn!("player {}: failed to persist: {e}", summary.id);
                }
            }
            Err(e) => log::warn!("player {}: failed to serialize: {e}", summary.id),
        }
    }

    async fn broadcast_room_state(&self, room: &Arc<Mutex<Room>>, player_count: usize) {
        let (room_id, players) = {
            let guard = room.lock().await;
            (guard.id, guard.summaries())
        };
        self.publish(
            &channel_room_state_update(room_id),
            &BroadcastMessage::RoomStateUpdate {
                room_id,
                players,
                player_count,
                timestamp: now_millis(),
            },
        )
        .await;
    }

    async fn publish(&self, channel: &str, message: &BroadcastMessage) {
        match serde_json::to_string(message) {
            Ok(payload) => {
                if let Err(e) = self.store.publish(channel, &payload).await {
                    log::warn!("publish to {channel} failed: {e}");
                }
            }
            Err(e) => log::warn!("failed to serialize broadcast for {channel}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::NullStatsSink;
    use ttb_store::MemoryStore;

    fn lobby() -> Lobby {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let stats: Arc<dyn StatsSink> = Arc::new(NullStatsSink);
        Lobby::new(store, stats)
    }

    #[tokio::test]
    async fn join_auto_creates_a_room_when_none_exist() {
        let lobby = lobby();
        let (room_id, summary) = lobby.join_auto("alice".into()).await.unwrap();
        assert_eq!(summary.name, "alice");
        let players = lobby.room_players(room_id).await.unwrap();
        assert_eq!(players.len(), 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let lobby = lobby();
        let err = lobby.join_auto("   ".into()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn leaving_the_last_player_deletes_the_room() {
        let lobby = lobby();
        let (room_id, summary) = lobby.join_auto("alice".into()).await.unwrap();
        lobby.leave_auto(room_id, summary.id).await.unwrap();
        assert!(matches!(lobby.room_players(room_id).await, Err(ApiError::RoomNotFound)));
    }

    #[tokio::test]
    async fn ninety_nine_players_fill_one_room_and_the_hundredth_starts_a_new_one() {
        let lobby = lobby();
        let mut first_room = None;
        for i in 0..99 {
            let (room_id, _) = lobby.join_auto(format!("p{i}")).await.unwrap();
            first_room.get_or_insert(room_id);
        }
        let (room_id, _) = lobby.join_auto("p99".into()).await.unwrap();
        assert_ne!(Some(room_id), first_room);
    }

    #[tokio::test]
    async fn start_room_game_rejects_a_non_waiting_room() {
        let lobby = lobby();
        let (room_id, _) = lobby.join_auto("alice".into()).await.unwrap();
        lobby.start_room_game(room_id).await.unwrap();
        let err = lobby.start_room_game(room_id).await.unwrap_err();
        assert!(matches!(err, ApiError::CannotStart(_)));
    }

    #[tokio::test]
    async fn player_input_after_start_locks_in_score() {
        let lobby = lobby();
        let (room_id, summary) = lobby.join_auto("alice".into()).await.unwrap();
        lobby.start_room_game(room_id).await.unwrap();
        lobby.handle_player_input(summary.id, PlayerAction::HardDrop).await.unwrap();
        let snapshot = lobby.player_snapshot(summary.id).await.unwrap();
        assert!(snapshot.score > 0);
    }
}
