use std::sync::Arc;

use vigil_core::engine;
use vigil_core::notify::{LogNotifier, Notifier, NullNotifier};
use vigil_core::storage::{Config, Database, StateStore};

/// Run the live engine and print a state line on every change until
/// Ctrl-C. This is the full engine, display refresh included, so the
/// countdown ticks once a second.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let store: Arc<dyn StateStore> = Arc::new(Database::open()?);
        let config = Config::load()?;
        let notifier: Arc<dyn Notifier> = if config.notifications.enabled {
            Arc::new(LogNotifier)
        } else {
            Arc::new(NullNotifier)
        };

        let handle = engine::spawn(store, notifier, config.default_interval())?;
        handle.set_display_visible(true).await;

        let mut snapshots = handle.watch_snapshots();
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snap = snapshots.borrow().clone();
                    println!(
                        "{:>12}  alarm: {}",
                        snap.remaining_text,
                        if snap.alert_active { "ACTIVE" } else { "clear" }
                    );
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        handle.shutdown().await;
        Ok(())
    })
}
