use std::time::Duration;

use tokio::task::JoinHandle;

use gridlock_core::constants::TICK_INTERVAL_MS;
use gridlock_core::time;

use crate::state::AppState;

/// Spawn the fixed-rate tick loop that drives every playing room. Missed
/// ticks are skipped rather than bursted, so a stalled runtime never
/// fast-forwards game time.
pub fn spawn_tick_loop(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let now = time::now_ms();
            let ticked = {
                let mut registry = state.registry.write().await;
                registry.tick_all(now)
            };
            for (room_id, events) in ticked {
                for event in events {
                    state.dispatcher.broadcast_room(&room_id, &event);
                }
            }
        }
    })
}

/// Spawn the periodic sweep that removes rooms with no recent activity.
pub fn spawn_idle_sweep(state: AppState) -> JoinHandle<()> {
    let check_interval = Duration::from_secs(state.config.rooms.idle_check_interval_secs);
    let max_idle = Duration::from_secs(state.config.rooms.idle_timeout_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(check_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let removed = {
                let mut registry = state.registry.write().await;
                registry.cleanup_idle_rooms(max_idle)
            };
            if removed.is_empty() {
                continue;
            }
            for room_id in &removed {
                state.dispatcher.drop_room(room_id);
            }
            let registry = state.registry.read().await;
            if let crate::dispatcher::Outbound::Global(event) =
                crate::commands::lobby_update(&registry)
            {
                state.dispatcher.broadcast_all(&event);
            }
        }
    })
}
