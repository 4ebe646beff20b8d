use crate::engine::GameEngine;
use crate::types::RoundNo;
use std::sync::Weak;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Spawn the background task backing a round timer.
///
/// Sleeps until `deadline`, then asks the engine to expire the timer for
/// `round_no`. Holds only a weak reference so a dropped party does not stay
/// alive until its last timer fires. The engine publishes the resulting
/// phase change on its own event channel.
pub fn spawn_round_timer(
    engine: Weak<Mutex<GameEngine>>,
    round_no: RoundNo,
    deadline: Instant,
) -> AbortHandle {
    let handle = tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;

        let Some(engine) = engine.upgrade() else {
            tracing::debug!("Party gone before round {} timer fired", round_no);
            return;
        };

        let mut engine = engine.lock().await;
        if engine.expire_round_timer(round_no) {
            tracing::info!(
                "Round {} in {} moved to judge-selecting after timeout",
                round_no,
                engine.party_code()
            );
        }
    });
    handle.abort_handle()
}
