//! Controller scheduling and pause tests on a paused tokio clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use expiry_core::{
    AppSnapshot, Command, Controller, ControllerHandle, FixedClock, Launcher, NewProduct,
    PAUSE_DURATION, PauseState, ProductStore, RecordingNotifier, SettingsStore, TrackedStore,
    TrayStatus,
};
use tempfile::TempDir;
use time::macros::date;
use tokio::task::JoinHandle;

#[derive(Default)]
struct CountingLauncher {
    editor: AtomicUsize,
    settings: AtomicUsize,
}

impl Launcher for CountingLauncher {
    fn open_editor(&self) -> std::io::Result<()> {
        self.editor.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_settings(&self) -> std::io::Result<()> {
        self.settings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Harness {
    _dir: TempDir,
    settings: SettingsStore,
    notifier: Arc<RecordingNotifier>,
    launcher: Arc<CountingLauncher>,
    handle: ControllerHandle,
    task: JoinHandle<expiry_core::Result<()>>,
}

/// A controller watching one store holding an expired product.
fn start(scan_interval_secs: u64) -> Harness {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("fridge.db");
    let store = ProductStore::create(&db).unwrap();
    store
        .insert(&NewProduct::new("Milk", date!(2025 - 01 - 01)).unwrap())
        .unwrap();
    drop(store);

    let settings = SettingsStore::new(dir.path().join("settings.ini"));
    settings
        .add_tracked_store(&TrackedStore::new("Fridge", &db), |_| true)
        .unwrap();
    settings.set_scan_interval(scan_interval_secs).unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let launcher = Arc::new(CountingLauncher::default());
    let (controller, handle) = Controller::new(
        settings.clone(),
        Arc::new(FixedClock(date!(2025 - 01 - 05))),
        notifier.clone(),
        launcher.clone(),
    );
    let task = tokio::spawn(controller.run());

    Harness {
        _dir: dir,
        settings,
        notifier,
        launcher,
        handle,
        task,
    }
}

async fn wait_for(handle: &ControllerHandle, f: impl FnMut(&AppSnapshot) -> bool) -> AppSnapshot {
    let mut rx = handle.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(f))
        .await
        .expect("timed out waiting for snapshot")
        .expect("controller stopped")
        .clone();
    snapshot
}

/// Let the controller drain its queue.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_immediately() {
    let h = start(3600);

    let snapshot = wait_for(&h.handle, |s| s.cycles == 1).await;
    assert_eq!(snapshot.status, TrayStatus::Expired);
    assert_eq!(snapshot.tooltip, "expiry-watch - an item has expired");
    assert_eq!(snapshot.last_report.unwrap().expired, 1);
    assert_eq!(h.notifier.delivered().len(), 1);
    assert_eq!(h.notifier.delivered()[0].body, "\"Milk\" has now expired");
}

#[tokio::test(start_paused = true)]
async fn cycles_follow_the_interval() {
    let h = start(3600);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    tokio::time::sleep(Duration::from_secs(3 * 3600 + 1)).await;
    let snapshot = wait_for(&h.handle, |s| s.cycles >= 4).await;
    assert_eq!(snapshot.cycles, 4);
    assert_eq!(h.notifier.delivered().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn interval_change_is_picked_up_after_a_cycle() {
    let h = start(3600);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    h.settings.set_scan_interval(60).unwrap();
    // The hour-long tick runs once more, then the schedule is rebuilt.
    tokio::time::sleep(Duration::from_secs(3600 + 1)).await;
    wait_for(&h.handle, |s| s.cycles == 2).await;

    tokio::time::sleep(Duration::from_secs(5 * 60)).await;
    let snapshot = wait_for(&h.handle, |s| s.cycles >= 7).await;
    assert_eq!(snapshot.cycles, 7);
}

#[tokio::test(start_paused = true)]
async fn oversized_interval_in_file_keeps_scanning() {
    let h = start(60);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    // Hand edit, bypassing the validating setter.
    h.settings
        .write(
            expiry_core::settings::NOTIFICATIONS_SECTION,
            expiry_core::settings::SCAN_INTERVAL_KEY,
            &u64::MAX.to_string(),
        )
        .unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;
    wait_for(&h.handle, |s| s.cycles == 2).await;
    settle().await;
    assert!(!h.task.is_finished());

    // The bad value falls back to the 3 hour default.
    tokio::time::sleep(Duration::from_secs(3 * 3600 + 1)).await;
    let snapshot = wait_for(&h.handle, |s| s.cycles >= 3).await;
    assert_eq!(snapshot.cycles, 3);

    assert!(h.handle.send(Command::ScanNow).await);
    wait_for(&h.handle, |s| s.cycles == 4).await;
    assert!(!h.task.is_finished());
}

#[tokio::test(start_paused = true)]
async fn longest_interval_is_scheduled() {
    let h = start(expiry_core::settings::MAX_SCAN_INTERVAL_SECS);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
    settle().await;
    assert_eq!(h.handle.snapshot().cycles, 1);
    assert!(!h.task.is_finished());

    assert!(h.handle.send(Command::ScanNow).await);
    wait_for(&h.handle, |s| s.cycles == 2).await;
}

#[tokio::test(start_paused = true)]
async fn paused_cycles_still_update_status_without_notifying() {
    let h = start(3600);
    wait_for(&h.handle, |s| s.cycles == 1).await;
    h.notifier.clear();

    assert!(h.handle.send(Command::Pause).await);
    wait_for(&h.handle, |s| s.is_paused()).await;
    assert!(h.handle.send(Command::ScanNow).await);

    let snapshot = wait_for(&h.handle, |s| s.cycles == 2).await;
    assert!(h.notifier.delivered().is_empty());
    assert_eq!(snapshot.status, TrayStatus::Expired);
    assert_eq!(snapshot.tooltip, "expiry-watch - an item has expired (paused)");
    assert_eq!(snapshot.pause_label, "Unpause Notifications");
}

#[tokio::test(start_paused = true)]
async fn pause_resumes_once_after_24_hours() {
    let h = start(7 * 24 * 3600);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    h.handle.send(Command::Pause).await;
    wait_for(&h.handle, |s| s.is_paused()).await;

    tokio::time::sleep(PAUSE_DURATION - Duration::from_secs(60)).await;
    settle().await;
    assert!(h.handle.snapshot().is_paused());

    tokio::time::sleep(Duration::from_secs(120)).await;
    let snapshot = wait_for(&h.handle, |s| !s.is_paused()).await;
    assert_eq!(snapshot.pause, PauseState::Active);
    assert_eq!(snapshot.pause_label, "Pause Notifications for 24 Hours");

    // A fresh pause is not cut short by the timer that already fired.
    h.handle.send(Command::Pause).await;
    wait_for(&h.handle, |s| s.is_paused()).await;
    tokio::time::sleep(Duration::from_secs(12 * 3600)).await;
    settle().await;
    assert!(h.handle.snapshot().is_paused());
}

#[tokio::test(start_paused = true)]
async fn explicit_resume_cancels_pending_timer() {
    let h = start(7 * 24 * 3600);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    h.handle.send(Command::Pause).await;
    wait_for(&h.handle, |s| s.is_paused()).await;
    tokio::time::sleep(Duration::from_secs(12 * 3600)).await;

    h.handle.send(Command::Resume).await;
    wait_for(&h.handle, |s| !s.is_paused()).await;
    h.handle.send(Command::Pause).await;
    wait_for(&h.handle, |s| s.is_paused()).await;

    // Past the first pause's deadline: still paused.
    tokio::time::sleep(Duration::from_secs(13 * 3600)).await;
    settle().await;
    assert!(h.handle.snapshot().is_paused());

    // Past the second pause's deadline: resumed.
    tokio::time::sleep(Duration::from_secs(12 * 3600)).await;
    wait_for(&h.handle, |s| !s.is_paused()).await;
}

#[tokio::test(start_paused = true)]
async fn toggle_and_noop_commands() {
    let h = start(3600);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    h.handle.send(Command::Resume).await;
    settle().await;
    assert!(!h.handle.snapshot().is_paused());

    h.handle.send(Command::TogglePause).await;
    wait_for(&h.handle, |s| s.is_paused()).await;
    h.handle.send(Command::Pause).await;
    settle().await;
    assert!(h.handle.snapshot().is_paused());

    h.handle.send(Command::TogglePause).await;
    wait_for(&h.handle, |s| !s.is_paused()).await;
}

#[tokio::test(start_paused = true)]
async fn launcher_commands_are_forwarded() {
    let h = start(3600);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    h.handle.send(Command::OpenEditor).await;
    h.handle.send(Command::OpenSettings).await;
    h.handle.send(Command::OpenEditor).await;
    settle().await;

    assert_eq!(h.launcher.editor.load(Ordering::SeqCst), 2);
    assert_eq!(h.launcher.settings.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_controller() {
    let h = start(3600);
    wait_for(&h.handle, |s| s.cycles == 1).await;

    h.handle.send(Command::Shutdown).await;
    h.task.await.unwrap().unwrap();
    assert!(!h.handle.send(Command::ScanNow).await);
}
