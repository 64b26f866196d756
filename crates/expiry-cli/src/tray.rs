//! System tray icon.
//!
//! The tray shows the aggregate status as a coloured dot, mirrors the
//! controller's tooltip, and turns menu clicks into [`Command`]s. It never
//! touches application state directly.
//!
//! tray-icon needs a GTK main loop on Linux, and a platform event loop
//! elsewhere that this binary does not run, so the tray is Linux only.

#[cfg(any(test, all(feature = "tray", target_os = "linux")))]
use expiry_core::{Command, TrayStatus};

/// Menu entries, in display order.
#[cfg(any(test, all(feature = "tray", target_os = "linux")))]
pub const MENU_ITEMS: [(&str, Command); 5] = [
    ("Scan Now", Command::ScanNow),
    ("Open Editor", Command::OpenEditor),
    (expiry_core::pause::PAUSE_LABEL, Command::TogglePause),
    ("Settings", Command::OpenSettings),
    ("Exit", Command::Shutdown),
];

/// Edge length of the generated icon.
#[cfg(any(test, all(feature = "tray", target_os = "linux")))]
const ICON_SIZE: u32 = 32;

/// RGBA pixels for the status dot.
#[cfg(any(test, all(feature = "tray", target_os = "linux")))]
pub fn icon_rgba(status: TrayStatus, paused: bool) -> Vec<u8> {
    let (r, g, b) = match status {
        TrayStatus::Normal => (76, 175, 80),  // Green
        TrayStatus::Warning => (255, 193, 7), // Amber
        TrayStatus::Expired => (244, 67, 54), // Red
    };
    let alpha = if paused { 110 } else { 255 };

    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 2.0;
    let mut pixels = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if (dx * dx + dy * dy).sqrt() <= radius {
                pixels.extend_from_slice(&[r, g, b, alpha]);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    pixels
}

/// Whether this build can show a tray icon.
pub fn available() -> bool {
    cfg!(all(feature = "tray", target_os = "linux"))
}

#[cfg(all(feature = "tray", target_os = "linux"))]
pub use linux::run;

#[cfg(all(feature = "tray", target_os = "linux"))]
mod linux {
    use std::time::Duration;

    use anyhow::{Context, Result};
    use expiry_core::{AppSnapshot, ControllerHandle};
    use tokio_util::sync::CancellationToken;
    use tracing::{debug, info, warn};
    use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
    use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

    use super::*;

    /// How often the loop checks for menu clicks and snapshot changes.
    const POLL_INTERVAL: Duration = Duration::from_millis(50);

    struct TrayManager {
        tray_icon: TrayIcon,
        items: Vec<(MenuItem, Command)>,
        pause_item: MenuItem,
        shown: Option<(TrayStatus, bool)>,
    }

    impl TrayManager {
        fn new(snapshot: &AppSnapshot) -> Result<Self> {
            let menu = Menu::new();
            let mut items = Vec::with_capacity(MENU_ITEMS.len());
            for (i, (label, command)) in MENU_ITEMS.iter().enumerate() {
                if i == MENU_ITEMS.len() - 1 {
                    menu.append(&PredefinedMenuItem::separator())?;
                }
                let item = MenuItem::new(*label, true, None);
                menu.append(&item)?;
                items.push((item, *command));
            }
            let pause_item = items
                .iter()
                .find(|(_, c)| *c == Command::TogglePause)
                .map(|(item, _)| item.clone())
                .context("pause menu item missing")?;

            let tray_icon = TrayIconBuilder::new()
                .with_menu(Box::new(menu))
                .with_tooltip(&snapshot.tooltip)
                .with_icon(load_icon(snapshot.status, snapshot.is_paused())?)
                .build()
                .context("Failed to create tray icon")?;

            info!("System tray icon created");
            Ok(Self {
                tray_icon,
                items,
                pause_item,
                shown: Some((snapshot.status, snapshot.is_paused())),
            })
        }

        fn command_for(&self, event: &MenuEvent) -> Option<Command> {
            self.items
                .iter()
                .find(|(item, _)| *item.id() == event.id)
                .map(|(_, command)| *command)
        }

        fn update(&mut self, snapshot: &AppSnapshot) {
            if let Err(e) = self.tray_icon.set_tooltip(Some(&snapshot.tooltip)) {
                warn!("Failed to update tray tooltip: {}", e);
            }
            self.pause_item.set_text(snapshot.pause_label);

            let wanted = (snapshot.status, snapshot.is_paused());
            if self.shown != Some(wanted) {
                match load_icon(wanted.0, wanted.1) {
                    Ok(icon) => {
                        if let Err(e) = self.tray_icon.set_icon(Some(icon)) {
                            warn!("Failed to update tray icon: {}", e);
                        }
                        self.shown = Some(wanted);
                    }
                    Err(e) => warn!("Failed to generate icon: {}", e),
                }
            }
        }
    }

    fn load_icon(status: TrayStatus, paused: bool) -> Result<Icon> {
        Icon::from_rgba(icon_rgba(status, paused), ICON_SIZE, ICON_SIZE)
            .context("Failed to build tray icon")
    }

    /// Run the tray on the current thread until shutdown.
    pub fn run(handle: ControllerHandle, cancel: CancellationToken) -> Result<()> {
        gtk::init().context("Failed to initialise GTK")?;

        let mut snapshots = handle.subscribe();
        let mut tray = TrayManager::new(&snapshots.borrow_and_update())?;
        let menu_events = MenuEvent::receiver();

        while !cancel.is_cancelled() {
            while gtk::events_pending() {
                gtk::main_iteration_do(false);
            }

            while let Ok(event) = menu_events.try_recv() {
                let Some(command) = tray.command_for(&event) else {
                    continue;
                };
                debug!("Tray: {:?}", command);
                handle.try_send(command);
                if command == Command::Shutdown {
                    cancel.cancel();
                }
            }

            match snapshots.has_changed() {
                Ok(true) => {
                    let snapshot = snapshots.borrow_and_update().clone();
                    tray.update(&snapshot);
                }
                Ok(false) => {}
                Err(_) => break,
            }

            std::thread::sleep(POLL_INTERVAL);
        }

        debug!("Tray loop finished");
        Ok(())
    }
}
