//! The background controller.
//!
//! A single [`Controller`] task owns the application state: the pause
//! controller, the current [`TrayStatus`], and the last [`ScanReport`]. The
//! tray, notification clicks, and timers reach it only through a
//! [`ControllerHandle`], which sends [`Command`]s and observes
//! [`AppSnapshot`]s.
//!
//! Scans run on a fixed-rate schedule: the first cycle starts immediately,
//! missed ticks are skipped, and the interval is re-read after every cycle.

use std::sync::Arc;
use std::time::Duration;

use expiry_store::ExpiryWindow;
use time::Date;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::notifier::{Notifier, TrayStatus, dispatch};
use crate::pause::{PAUSE_DURATION, PauseController, PauseState};
use crate::scan::{ExpiryKind, ScanReport, scan};
use crate::settings::{MAX_SCAN_INTERVAL_SECS, ScanSettings, SettingsStore};

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 32;

/// Messages accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run a scan cycle now, outside the schedule.
    ScanNow,
    /// Pause notifications for 24 hours.
    Pause,
    /// Resume notifications.
    Resume,
    /// Pause when active, resume when paused.
    TogglePause,
    /// Open the editor.
    OpenEditor,
    /// Open the settings surface.
    OpenSettings,
    /// Stop the controller.
    Shutdown,
}

/// Opens the editor and settings surfaces on behalf of the controller.
pub trait Launcher: Send + Sync {
    /// Open the product editor.
    fn open_editor(&self) -> std::io::Result<()>;
    /// Open the settings surface.
    fn open_settings(&self) -> std::io::Result<()>;
}

/// Condensed view of the last scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Evaluation date.
    pub today: Date,
    /// Upcoming alerts.
    pub upcoming: usize,
    /// Expired alerts.
    pub expired: usize,
    /// Stores that could not be read.
    pub unavailable: usize,
    /// Stores scanned successfully.
    pub scanned: usize,
}

impl From<&ScanReport> for ReportSummary {
    fn from(report: &ScanReport) -> Self {
        Self {
            today: report.today,
            upcoming: report.count(ExpiryKind::Upcoming),
            expired: report.count(ExpiryKind::Expired),
            unavailable: report.failures.len(),
            scanned: report.scanned,
        }
    }
}

/// What the tray shows, published after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSnapshot {
    /// Pause state.
    pub pause: PauseState,
    /// Label for the pause menu item.
    pub pause_label: &'static str,
    /// Aggregate status from the last cycle.
    pub status: TrayStatus,
    /// Tooltip text.
    pub tooltip: String,
    /// Cycles completed since start.
    pub cycles: u64,
    /// Summary of the last cycle.
    pub last_report: Option<ReportSummary>,
}

impl AppSnapshot {
    /// Whether notifications are paused.
    pub fn is_paused(&self) -> bool {
        self.pause == PauseState::Paused
    }
}

impl Default for AppSnapshot {
    fn default() -> Self {
        let pause = PauseController::new();
        Self {
            pause: pause.state(),
            pause_label: pause.menu_label(),
            status: TrayStatus::Normal,
            tooltip: TrayStatus::Normal.tooltip(0, false),
            cycles: 0,
            last_report: None,
        }
    }
}

/// Sends commands to a running controller and watches its state.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<AppSnapshot>,
}

impl ControllerHandle {
    /// Send a command, waiting for buffer space.
    ///
    /// Returns `false` once the controller has stopped.
    pub async fn send(&self, command: Command) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Send a command without waiting. For callers outside the runtime.
    pub fn try_send(&self, command: Command) -> bool {
        match self.commands.try_send(command) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(command)) => {
                warn!("Controller busy, dropping {:?}", command);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> AppSnapshot {
        self.snapshot.borrow().clone()
    }

    /// A receiver that is notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.snapshot.clone()
    }
}

/// Owns the application state and drives the scan schedule.
pub struct Controller {
    settings: SettingsStore,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    launcher: Arc<dyn Launcher>,
    cancel: CancellationToken,

    pause: PauseController,
    status: TrayStatus,
    cycles: u64,
    last_report: Option<ScanReport>,

    commands: mpsc::Receiver<Command>,
    snapshot: watch::Sender<AppSnapshot>,
    resume_tx: mpsc::UnboundedSender<u64>,
    resume_rx: mpsc::UnboundedReceiver<u64>,
    resume_timer: Option<JoinHandle<()>>,
}

impl Controller {
    /// Create a controller and the handle used to talk to it.
    pub fn new(
        settings: SettingsStore,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        launcher: Arc<dyn Launcher>,
    ) -> (Self, ControllerHandle) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot, snapshot_rx) = watch::channel(AppSnapshot::default());
        let (resume_tx, resume_rx) = mpsc::unbounded_channel();

        let controller = Self {
            settings,
            clock,
            notifier,
            launcher,
            cancel: CancellationToken::new(),
            pause: PauseController::new(),
            status: TrayStatus::Normal,
            cycles: 0,
            last_report: None,
            commands,
            snapshot,
            resume_tx,
            resume_rx,
            resume_timer: None,
        };
        let handle = ControllerHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
        };
        (controller, handle)
    }

    /// Stop when `token` is cancelled, in addition to [`Command::Shutdown`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run until shutdown.
    pub async fn run(mut self) -> Result<()> {
        let mut settings = self.load_scan_settings().await?;
        let mut ticker = schedule(settings.scan_interval(), true);
        info!(
            "Scanning every {}s with a {}-day window",
            settings.scan_interval_secs, settings.notify_days
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("Controller cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                    match self.load_scan_settings().await {
                        Ok(current) => {
                            if current.scan_interval_secs != settings.scan_interval_secs {
                                info!(
                                    "Scan interval changed from {}s to {}s",
                                    settings.scan_interval_secs, current.scan_interval_secs
                                );
                                ticker = schedule(current.scan_interval(), false);
                            }
                            settings = current;
                        }
                        Err(e) => warn!("Keeping previous scan settings: {}", e),
                    }
                }
                Some(generation) = self.resume_rx.recv() => {
                    if self.pause.auto_resume(generation) {
                        info!("Pause expired, notifications resumed");
                        self.resume_timer = None;
                        self.publish();
                    }
                }
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle(command).await,
                },
            }
        }

        self.shutdown();
        Ok(())
    }

    async fn handle(&mut self, command: Command) {
        debug!("Handling {:?}", command);
        match command {
            Command::ScanNow => self.run_cycle().await,
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => {
                if self.pause.is_paused() {
                    self.resume();
                } else {
                    self.pause();
                }
            }
            Command::OpenEditor => {
                if let Err(e) = self.launcher.open_editor() {
                    warn!("Failed to open editor: {}", e);
                }
            }
            Command::OpenSettings => {
                if let Err(e) = self.launcher.open_settings() {
                    warn!("Failed to open settings: {}", e);
                }
            }
            Command::Shutdown => {}
        }
    }

    fn pause(&mut self) {
        let Some(generation) = self.pause.pause() else {
            debug!("Already paused");
            return;
        };

        let tx = self.resume_tx.clone();
        self.resume_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(PAUSE_DURATION).await;
            let _ = tx.send(generation);
        }));
        info!("Notifications paused for {}h", PAUSE_DURATION.as_secs() / 3600);
        self.publish();
    }

    fn resume(&mut self) {
        if !self.pause.resume() {
            debug!("Already active");
            return;
        }
        if let Some(timer) = self.resume_timer.take() {
            timer.abort();
        }
        info!("Notifications resumed");
        self.publish();
    }

    async fn load_scan_settings(&self) -> Result<ScanSettings> {
        let settings = self.settings.clone();
        match tokio::task::spawn_blocking(move || settings.scan_settings()).await {
            Ok(result) => result,
            Err(e) => {
                error!("Settings task failed: {}", e);
                Ok(ScanSettings::default())
            }
        }
    }

    async fn run_cycle(&mut self) {
        let settings = self.settings.clone();
        let today = self.clock.today();
        let task = tokio::task::spawn_blocking(move || -> Result<ScanReport> {
            let stores = settings.tracked_stores()?;
            let window = ExpiryWindow::new(today, settings.scan_settings()?.notify_days);
            Ok(scan(&stores, &window))
        });

        let report = match task.await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                warn!("Skipping scan cycle: {}", e);
                return;
            }
            Err(e) => {
                error!("Scan task failed: {}", e);
                return;
            }
        };

        self.status = report.status();
        self.cycles += 1;

        let notifier = Arc::clone(&self.notifier);
        let notifications = report.notifications();
        let paused = self.pause.is_paused();
        match tokio::task::spawn_blocking(move || dispatch(notifier.as_ref(), &notifications, paused))
            .await
        {
            Ok(delivered) => debug!("Delivered {} notification(s)", delivered),
            Err(e) => error!("Notification task failed: {}", e),
        }

        self.last_report = Some(report);
        self.publish();
    }

    fn publish(&self) {
        let unavailable = self
            .last_report
            .as_ref()
            .map(|r| r.failures.len())
            .unwrap_or(0);
        let snapshot = AppSnapshot {
            pause: self.pause.state(),
            pause_label: self.pause.menu_label(),
            status: self.status,
            tooltip: self.status.tooltip(unavailable, self.pause.is_paused()),
            cycles: self.cycles,
            last_report: self.last_report.as_ref().map(ReportSummary::from),
        };
        self.snapshot.send_replace(snapshot);
    }

    fn shutdown(&mut self) {
        if let Some(timer) = self.resume_timer.take() {
            timer.abort();
        }
        info!("Controller stopped after {} cycle(s)", self.cycles);
    }
}

/// Build the scan schedule. The first tick fires immediately only at start.
fn schedule(period: Duration, immediate: bool) -> Interval {
    let period = period.clamp(
        Duration::from_secs(1),
        Duration::from_secs(MAX_SCAN_INTERVAL_SECS),
    );
    let now = Instant::now();
    let start = if immediate {
        now
    } else {
        now.checked_add(period).unwrap_or(now)
    };
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
