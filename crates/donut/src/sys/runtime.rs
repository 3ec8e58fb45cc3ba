use crate::events::AppEvent;
use async_channel::Sender;
use std::path::PathBuf;
use std::thread;
use tokio::runtime::Runtime;

/// Spawns the config watcher on its own thread. Events arrive on `tx`; the
/// last one is always [`AppEvent::WatcherStopped`].
pub fn start_background_services(
    config_path: PathBuf,
    tx: Sender<AppEvent>,
) -> std::io::Result<()> {
    let rt = Runtime::new()?;

    thread::spawn(move || {
        rt.block_on(async {
            let tx = tx.clone();
            tokio::spawn(async move {
                crate::config::run_async_watcher(config_path, tx).await;
            })
            .await
            .unwrap_or_else(|e| log::error!("Config watcher task failed: {}", e));
        });
    });
    Ok(())
}
