//! Run command implementation.
//!
//! Starts the controller, then either drives the tray icon on this thread or
//! runs headless until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use expiry_core::{Controller, Launcher, SettingsStore, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::desktop::{self, ProcessLauncher};
use crate::onboarding::ensure_tracked_stores;
use crate::tray;

pub async fn cmd_run(
    settings: SettingsStore,
    settings_override: Option<PathBuf>,
    no_tray: bool,
    no_color: bool,
) -> Result<()> {
    let stores = ensure_tracked_stores(&settings, no_color)?;
    info!(
        "Watching {} database(s) from {}",
        stores.len(),
        settings.path().display()
    );

    let launcher: Arc<dyn Launcher> = Arc::new(ProcessLauncher::new(settings_override));
    let headless = !desktop::has_desktop_session();
    let notifier = desktop::notifier(Arc::clone(&launcher), headless);

    let cancel = CancellationToken::new();
    let (controller, handle) =
        Controller::new(settings, Arc::new(SystemClock), notifier, launcher);
    let task = tokio::spawn(controller.with_cancellation(cancel.clone()).run());

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down");
            interrupt.cancel();
        }
    });

    let tray_wanted = !no_tray && !headless;
    if !tray_wanted || !tray::available() {
        if tray_wanted {
            warn!("Tray icon is not available in this build; running headless");
        }
        info!("Running in the background, press Ctrl-C to stop");
    }

    #[cfg(all(feature = "tray", target_os = "linux"))]
    {
        if tray_wanted {
            let tray_handle = handle.clone();
            let tray_cancel = cancel.clone();
            tokio::task::block_in_place(|| tray::run(tray_handle, tray_cancel))?;
            cancel.cancel();
        }
    }

    task.await.context("Controller task failed")??;
    // The controller stops once every handle is gone.
    drop(handle);
    Ok(())
}
