use crate::events::AppEvent;
use crate::sys::engine::{EngineStatus, PlaybackEngine};
use async_channel::Sender;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Publishes engine status changes, and the position while playing, every `every`.
///
/// Returns when the receiver is gone or the engine failed.
pub async fn run_poller<E: PlaybackEngine>(engine: E, every: Duration, tx: Sender<AppEvent>) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last: Option<EngineStatus> = None;
    loop {
        ticker.tick().await;

        let status = engine.status();
        if last.as_ref() != Some(&status) {
            log::debug!("Engine status: {:?}", status);
            if tx.send(AppEvent::EngineStatus(status.clone())).await.is_err() {
                break;
            }
            last = Some(status.clone());
        }

        if let EngineStatus::Failed(reason) = status {
            log::error!("Playback engine failed, stopping progress updates: {}", reason);
            break;
        }

        if engine.is_playing() {
            let progress = AppEvent::Progress {
                position: engine.position_ms(),
                duration: engine.duration_ms(),
            };
            if tx.send(progress).await.is_err() {
                break;
            }
        }
    }
}
