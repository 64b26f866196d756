//! Desktop integration: notifications and the launcher for editor windows.

use std::process::{Command, Stdio};
use std::sync::Arc;
#[cfg(all(feature = "notifications", unix, not(target_os = "macos")))]
use std::sync::atomic::{AtomicUsize, Ordering};

use expiry_core::{Launcher, Notifier};
use tracing::debug;
#[cfg(feature = "notifications")]
use tracing::warn;

/// Starts `expiry edit` / `expiry settings` as separate processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher {
    settings: Option<std::path::PathBuf>,
}

impl ProcessLauncher {
    /// A launcher that passes `--settings` on to the child when given.
    pub fn new(settings: Option<std::path::PathBuf>) -> Self {
        Self { settings }
    }

    fn spawn(&self, subcommand: &str) -> std::io::Result<()> {
        let exe = std::env::current_exe()?;
        let mut command = terminal_command(&exe, subcommand);
        if let Some(path) = &self.settings {
            command.arg("--settings").arg(path);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        debug!("Launching {:?}", command);
        command.spawn().map(|_| ())
    }
}

impl Launcher for ProcessLauncher {
    fn open_editor(&self) -> std::io::Result<()> {
        self.spawn("edit")
    }

    fn open_settings(&self) -> std::io::Result<()> {
        self.spawn("settings")
    }
}

/// The editor is interactive, so it needs a terminal of its own.
#[cfg(target_os = "linux")]
fn terminal_command(exe: &std::path::Path, subcommand: &str) -> Command {
    let terminal = std::env::var("TERMINAL").unwrap_or_else(|_| "x-terminal-emulator".to_string());
    let mut command = Command::new(terminal);
    command.arg("-e").arg(exe).arg(subcommand);
    command
}

#[cfg(target_os = "macos")]
fn terminal_command(exe: &std::path::Path, subcommand: &str) -> Command {
    let mut command = Command::new("open");
    command
        .args(["-a", "Terminal"])
        .arg(exe)
        .arg("--args")
        .arg(subcommand);
    command
}

#[cfg(target_os = "windows")]
fn terminal_command(exe: &std::path::Path, subcommand: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(exe).arg(subcommand);
    command
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn terminal_command(exe: &std::path::Path, subcommand: &str) -> Command {
    let mut command = Command::new(exe);
    command.arg(subcommand);
    command
}

/// Most notifications waiting for a click at once. Each waiter holds a
/// thread and a D-Bus connection until its notification closes.
#[cfg(all(feature = "notifications", unix, not(target_os = "macos")))]
const MAX_CLICK_WATCHERS: usize = 4;

/// Counts the threads waiting on notification actions.
#[cfg(all(feature = "notifications", unix, not(target_os = "macos")))]
#[derive(Debug, Clone)]
struct WatcherSlots {
    live: Arc<AtomicUsize>,
    max: usize,
}

#[cfg(all(feature = "notifications", unix, not(target_os = "macos")))]
impl WatcherSlots {
    fn new(max: usize) -> Self {
        Self {
            live: Arc::new(AtomicUsize::new(0)),
            max,
        }
    }

    /// A slot, or `None` when `max` watchers are already running.
    fn try_acquire(&self) -> Option<WatcherSlot> {
        self.live
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max).then_some(n + 1)
            })
            .ok()
            .map(|_| WatcherSlot {
                live: Arc::clone(&self.live),
            })
    }

    #[cfg(test)]
    fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Released when the watcher thread finishes.
#[cfg(all(feature = "notifications", unix, not(target_os = "macos")))]
struct WatcherSlot {
    live: Arc<AtomicUsize>,
}

#[cfg(all(feature = "notifications", unix, not(target_os = "macos")))]
impl Drop for WatcherSlot {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shows notifications through the platform notification service.
#[cfg(feature = "notifications")]
pub struct DesktopNotifier {
    #[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
    launcher: Arc<dyn Launcher>,
    #[cfg(all(unix, not(target_os = "macos")))]
    watchers: WatcherSlots,
}

#[cfg(feature = "notifications")]
impl DesktopNotifier {
    /// Clicking a notification opens the editor through `launcher`.
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self {
            launcher,
            #[cfg(all(unix, not(target_os = "macos")))]
            watchers: WatcherSlots::new(MAX_CLICK_WATCHERS),
        }
    }
}

#[cfg(feature = "notifications")]
impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &expiry_core::Notification) {
        let mut toast = notify_rust::Notification::new();
        toast
            .summary(&notification.title)
            .body(&notification.body)
            .appname(expiry_core::APP_NAME)
            .icon(notification.kind.icon_name());

        // Urgency and actions are only available on freedesktop systems
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            if notification.kind.is_urgent() {
                toast.urgency(notify_rust::Urgency::Critical);
            }
            // Without a free slot the notification is shown without the
            // click action.
            let slot = self.watchers.try_acquire();
            if slot.is_some() {
                toast.action("default", "Open Editor");
            }
            match toast.show() {
                Ok(handle) => {
                    debug!("Notification sent: {} - {}", notification.title, notification.body);
                    if let Some(slot) = slot {
                        self.watch_for_click(handle, slot);
                    }
                }
                Err(e) => warn!("Failed to send notification: {}", e),
            }
        }

        #[cfg(not(all(unix, not(target_os = "macos"))))]
        match toast.show() {
            Ok(_) => debug!("Notification sent: {} - {}", notification.title, notification.body),
            Err(e) => warn!("Failed to send notification: {}", e),
        }
    }
}

#[cfg(all(feature = "notifications", unix, not(target_os = "macos")))]
impl DesktopNotifier {
    fn watch_for_click(&self, handle: notify_rust::NotificationHandle, slot: WatcherSlot) {
        let launcher = Arc::clone(&self.launcher);
        let spawned = std::thread::Builder::new()
            .name("notification-click".to_string())
            .spawn(move || {
                let _slot = slot;
                handle.wait_for_action(|action| {
                    if action == "default"
                        && let Err(e) = launcher.open_editor()
                    {
                        warn!("Failed to open editor: {}", e);
                    }
                });
            });
        if let Err(e) = spawned {
            warn!("Failed to watch notification for clicks: {}", e);
        }
    }
}

/// Whether a graphical session is available for notifications.
pub fn has_desktop_session() -> bool {
    if cfg!(all(unix, not(target_os = "macos"))) {
        std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
    } else {
        true
    }
}

/// The notifier for this build: desktop notifications when compiled in,
/// otherwise log lines.
pub fn notifier(launcher: Arc<dyn Launcher>, headless: bool) -> Arc<dyn Notifier> {
    #[cfg(feature = "notifications")]
    {
        if !headless {
            return Arc::new(DesktopNotifier::new(launcher));
        }
    }

    let _ = (launcher, headless);
    Arc::new(expiry_core::LogNotifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_uses_log_notifier() {
        let launcher: Arc<dyn Launcher> = Arc::new(ProcessLauncher::default());
        // Must not touch the desktop session.
        let notifier = notifier(launcher, true);
        notifier.notify(&expiry_core::Notification::new(
            expiry_core::NotificationKind::Upcoming,
            "title",
            "body",
        ));
    }

    #[cfg(all(feature = "notifications", unix, not(target_os = "macos")))]
    #[test]
    fn test_click_watchers_are_capped() {
        let slots = WatcherSlots::new(MAX_CLICK_WATCHERS);

        // Two cycles of six notifications nobody dismisses.
        let mut held = Vec::new();
        for _cycle in 0..2 {
            for _ in 0..6 {
                if let Some(slot) = slots.try_acquire() {
                    held.push(slot);
                }
            }
            assert_eq!(slots.live(), MAX_CLICK_WATCHERS);
        }
        assert_eq!(held.len(), MAX_CLICK_WATCHERS);
        assert!(slots.try_acquire().is_none());

        // A closed notification frees its slot.
        held.pop();
        assert_eq!(slots.live(), MAX_CLICK_WATCHERS - 1);
        assert!(slots.try_acquire().is_some());
        drop(held);
        assert_eq!(slots.live(), 0);
    }
}
