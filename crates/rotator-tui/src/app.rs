//! App: owns the rotator engine and runs the terminal event loop.
//!
//! Architecture:
//! - One task multiplexes terminal input, the rotation timer, the 0.5 s
//!   countdown, the status poll and notice expiry through `tokio::select!`.
//! - Terminal input is read on a blocking thread and forwarded over an mpsc
//!   channel; poll results come back over the same channel.
//! - The rotator decides; the app performs its effects (viewport loads,
//!   notices, refetches).
//! - The rotation sleep is re-armed whenever the scheduler's timer epoch
//!   changes, so resume, manual moves and interval edits all restart the
//!   window from zero.

use std::io;
use std::time::Duration;

use chrono::{DateTime, Local};
use ratatui::crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use rotator_core::engine::{Effect, Rotator};
use rotator_core::protocol::StatusSnapshot;
use rotator_core::rotation::{PlayState, Step, COUNTDOWN_STEP};
use rotator_core::store::KeyValueStore;

use crate::action::{Action, PromptKind};
use crate::poller::{PollError, StatusPoller};
use crate::ui;
use crate::viewport::Viewport;
use crate::widgets::prompt::{Prompt, PromptAction};
use crate::widgets::toast::ToastManager;

#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    Status {
        generation: u64,
        result: Result<StatusSnapshot, PollError>,
    },
}

pub struct App<S> {
    pub(crate) rotator: Rotator<S>,
    poller: StatusPoller,
    poll_interval: Duration,
    parent_host: String,
    pub(crate) viewport: Viewport,
    pub(crate) toast: ToastManager,
    pub(crate) prompt: Prompt,
    pub(crate) show_help: bool,
    pub(crate) fetching: bool,
    pub(crate) last_update: Option<DateTime<Local>>,
    should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(
        rotator: Rotator<S>,
        poller: StatusPoller,
        poll_interval: Duration,
        parent_host: impl Into<String>,
    ) -> Self {
        Self {
            rotator,
            poller,
            poll_interval,
            parent_host: parent_host.into(),
            viewport: Viewport::default(),
            toast: ToastManager::new(),
            prompt: Prompt::default(),
            show_help: false,
            fetching: false,
            last_update: None,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);

        // ── Background task: terminal events ──────────────────────────────────
        let input_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if input_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("terminal input closed: {}", e);
                    break;
                }
            }
        });

        let effects = self.rotator.start();
        self.apply_effects(effects, &tx);
        info!(
            "rotator started with {} channel(s), interval {}s",
            self.rotator.roster().len(),
            self.rotator.scheduler().interval().as_secs()
        );

        // ── Periodic timers ───────────────────────────────────────────────────
        // First tick fires immediately: the initial status fetch.
        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut countdown = tokio::time::interval(COUNTDOWN_STEP);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let rotation = tokio::time::sleep(self.rotator.scheduler().interval());
        tokio::pin!(rotation);
        let mut armed_epoch = self.rotator.scheduler().timer_epoch();

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| ui::draw(f, self))?;
                needs_redraw = false;
            }
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg, &tx);
                    needs_redraw = true;
                }

                _ = &mut rotation, if self.rotator.scheduler().is_ticking() => {
                    let effects = self.rotator.tick();
                    self.apply_effects(effects, &tx);
                    // Re-arm even when nothing advanced so an empty subset
                    // does not spin.
                    rotation
                        .as_mut()
                        .reset(Instant::now() + self.rotator.scheduler().interval());
                    countdown.reset();
                    armed_epoch = self.rotator.scheduler().timer_epoch();
                    needs_redraw = true;
                }

                _ = countdown.tick() => {
                    if self.rotator.scheduler().is_ticking() {
                        self.rotator.step_countdown();
                        needs_redraw = true;
                    }
                }

                _ = poll.tick() => {
                    self.start_fetch(&tx);
                    needs_redraw = true;
                }

                _ = toast_tick.tick() => {
                    needs_redraw |= self.toast.tick();
                }
            }

            let epoch = self.rotator.scheduler().timer_epoch();
            if epoch != armed_epoch {
                debug!("rotation timer re-armed (epoch {})", epoch);
                rotation
                    .as_mut()
                    .reset(Instant::now() + self.rotator.scheduler().interval());
                countdown.reset();
                armed_epoch = epoch;
            }
        }

        info!("rotator exiting");
        Ok(())
    }

    // ── Message handling ──────────────────────────────────────────────────────

    pub(crate) fn handle_message(&mut self, msg: AppMessage, tx: &mpsc::Sender<AppMessage>) {
        match msg {
            AppMessage::Event(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key, tx);
            }
            AppMessage::Event(Event::FocusLost) => {
                debug!("terminal hidden, suspending rotation");
                self.rotator.set_hidden(true);
            }
            AppMessage::Event(Event::FocusGained) => {
                debug!("terminal visible, resuming rotation");
                self.rotator.set_hidden(false);
            }
            AppMessage::Event(_) => {}
            AppMessage::Status { generation, result } => {
                if !self.rotator.is_current(generation) {
                    debug!("ignoring status for stale generation {}", generation);
                    return;
                }
                self.fetching = false;
                let effects = match result {
                    Ok(snapshot) => {
                        self.last_update = Some(Local::now());
                        self.rotator.apply_status(generation, snapshot)
                    }
                    Err(e) => self.rotator.fetch_failed(generation, &e.to_string()),
                };
                self.apply_effects(effects, tx);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, tx: &mpsc::Sender<AppMessage>) {
        if self.prompt.is_open() {
            if let PromptAction::Submitted(kind, text) = self.prompt.handle_key(key) {
                self.submit(kind, &text, tx);
            }
            return;
        }
        if self.show_help {
            self.show_help = false;
            return;
        }
        self.dispatch(Action::from_key(key), tx);
    }

    pub(crate) fn dispatch(&mut self, action: Action, tx: &mpsc::Sender<AppMessage>) {
        let effects = match action {
            Action::TogglePause => {
                match self.rotator.toggle_pause() {
                    PlayState::Paused => self.toast.info("Paused"),
                    PlayState::Playing => self.toast.info("Playing"),
                }
                Vec::new()
            }
            Action::Next => self.rotator.advance(Step::Forward),
            Action::Prev => self.rotator.advance(Step::Back),
            Action::ToggleLiveOnly => {
                let before = self.rotator.live_only();
                let effects = self.rotator.toggle_live_only();
                if self.rotator.live_only() != before {
                    self.toast.info(if self.rotator.live_only() {
                        "Live-only mode on"
                    } else {
                        "Live-only mode off"
                    });
                }
                effects
            }
            Action::ToggleMute => {
                let effects = self.rotator.toggle_mute();
                self.toast
                    .info(if self.rotator.muted() { "Muted" } else { "Sound on" });
                effects
            }
            Action::ClearCategory => self.rotator.clear_category(),
            Action::OpenPrompt(kind) => {
                let initial = match kind {
                    PromptKind::RemoveChannel => {
                        self.rotator.current().unwrap_or_default().to_string()
                    }
                    PromptKind::Category => self.rotator.roster().category().to_string(),
                    PromptKind::Interval => {
                        self.rotator.scheduler().interval().as_secs().to_string()
                    }
                    PromptKind::AddChannel | PromptKind::BulkAdd | PromptKind::JumpTo => {
                        String::new()
                    }
                };
                self.prompt.open(kind, &initial);
                Vec::new()
            }
            Action::Refresh => vec![Effect::Refetch],
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                Vec::new()
            }
            Action::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Action::Noop => Vec::new(),
        };
        self.apply_effects(effects, tx);
    }

    fn submit(&mut self, kind: PromptKind, text: &str, tx: &mpsc::Sender<AppMessage>) {
        let effects = match kind {
            PromptKind::AddChannel => self.rotator.add_channel(text),
            PromptKind::BulkAdd => self.rotator.bulk_add(text),
            PromptKind::RemoveChannel => self.rotator.remove_channel(text.trim()),
            PromptKind::Category => self.rotator.set_category(text),
            PromptKind::Interval => self.rotator.set_interval_input(text),
            PromptKind::JumpTo => self.rotator.jump_to(text.trim()),
        };
        self.apply_effects(effects, tx);
    }

    // ── Effects ───────────────────────────────────────────────────────────────

    fn apply_effects(&mut self, effects: Vec<Effect>, tx: &mpsc::Sender<AppMessage>) {
        for effect in effects {
            match effect {
                Effect::Load { channel, muted } => {
                    self.viewport.load(&channel, muted, &self.parent_host);
                }
                Effect::Info(message) => self.toast.info(message),
                Effect::Warn(message) => self.toast.warning(message),
                Effect::Refetch => self.start_fetch(tx),
            }
        }
    }

    fn start_fetch(&mut self, tx: &mpsc::Sender<AppMessage>) {
        let ticket = self.rotator.begin_fetch();
        self.fetching = true;

        let poller = self.poller.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = poller.fetch(&ticket.channels).await;
            if let Err(e) = &result {
                warn!("status poll {} failed: {}", ticket.generation, e);
            }
            let _ = tx
                .send(AppMessage::Status {
                    generation: ticket.generation,
                    result,
                })
                .await;
        });
    }
}
