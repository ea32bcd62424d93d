use crate::events::AppEvent;
use crate::sys::engine::PlaybackEngine;
use async_channel::Sender;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Runs the progress poller and the config watcher on their own thread.
pub fn start_background_services<E: PlaybackEngine>(
    tx: Sender<AppEvent>,
    engine: E,
    poll_interval: Duration,
) -> std::io::Result<()> {
    let rt = Runtime::new()?;

    thread::Builder::new()
        .name("floatplay-services".into())
        .spawn(move || {
            rt.block_on(async {
                {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        crate::sys::poller::run_poller(engine, poll_interval, tx).await;
                    });
                }

                {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        crate::config::run_async_watcher(tx).await;
                    });
                }

                std::future::pending::<()>().await;
            });
        })?;

    Ok(())
}
