//! Rotation scheduler: a synchronous Playing/Paused state machine.
//!
//! No timers live here.  The host calls [`Scheduler::tick`] when the advance
//! interval elapses and [`Scheduler::step_countdown`] every
//! [`COUNTDOWN_STEP`].  Whenever the advance timer has to be re-armed the
//! scheduler bumps [`Scheduler::timer_epoch`]; the host compares epochs after
//! each call and resets its deadline to `now + interval` on change.
//!
//! ```text
//!  Playing --tick------> Playing   (cursor + 1, countdown restarts)
//!  Playing --pause-----> Paused    (advance + countdown cancelled)
//!  Paused  --resume----> Playing   (next advance one full interval away)
//! ```
//!
//! Hiding the host suspends ticking without leaving `Playing`; becoming
//! visible again restarts the window from zero instead of catching up.

use std::time::Duration;

pub const MIN_INTERVAL_SECS: u64 = 5;
pub const MAX_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Countdown redraw cadence.
pub const COUNTDOWN_STEP: Duration = Duration::from_millis(500);

pub fn clamp_interval(secs: u64) -> u64 {
    secs.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

/// Manual navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward,
    Back,
}

/// Cosmetic progress over one advance window.  Never drives the advance.
#[derive(Debug, Clone)]
pub struct Countdown {
    elapsed: Duration,
    period: Duration,
    running: bool,
}

impl Countdown {
    fn new(period: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            period,
            running: true,
        }
    }

    fn restart(&mut self, period: Duration) {
        self.elapsed = Duration::ZERO;
        self.period = period;
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn clear(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = false;
    }

    fn step(&mut self, dt: Duration) {
        if !self.running {
            return;
        }
        self.elapsed = (self.elapsed + dt).min(self.period);
        if self.elapsed >= self.period {
            self.running = false;
        }
    }

    /// 0.0..=100.0
    pub fn percent(&self) -> f64 {
        if self.period.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.period.as_secs_f64() * 100.0).clamp(0.0, 100.0)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    state: PlayState,
    interval: Duration,
    active: Vec<String>,
    /// Always `< active.len()` when `active` is non-empty, else 0.
    cursor: usize,
    hidden: bool,
    countdown: Countdown,
    timer_epoch: u64,
}

impl Scheduler {
    /// Starts `Playing` on the first active channel.
    pub fn new(interval_secs: u64, active: Vec<String>) -> Self {
        let interval = Duration::from_secs(clamp_interval(interval_secs));
        Self {
            state: PlayState::Playing,
            interval,
            active,
            cursor: 0,
            hidden: false,
            countdown: Countdown::new(interval),
            timer_epoch: 0,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// True when the host should have its advance timer armed.
    pub fn is_ticking(&self) -> bool {
        self.is_playing() && !self.hidden
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timer_epoch(&self) -> u64 {
        self.timer_epoch
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&str> {
        self.active.get(self.cursor).map(String::as_str)
    }

    /// 1-based position and subset length, for "n/len" labels.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current().map(|_| (self.cursor + 1, self.active.len()))
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Interval elapsed.  Returns the channel to load, or `None` when the
    /// scheduler is paused, hidden, or has nothing to rotate.
    pub fn tick(&mut self) -> Option<String> {
        if !self.is_ticking() || self.active.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.active.len();
        self.restart_window();
        self.current().map(str::to_owned)
    }

    pub fn pause(&mut self) {
        if self.state == PlayState::Paused {
            return;
        }
        self.state = PlayState::Paused;
        self.countdown.stop();
        self.timer_epoch += 1;
    }

    pub fn resume(&mut self) {
        if self.state == PlayState::Playing {
            return;
        }
        self.state = PlayState::Playing;
        self.restart_window();
    }

    pub fn toggle(&mut self) -> PlayState {
        match self.state {
            PlayState::Playing => self.pause(),
            PlayState::Paused => self.resume(),
        }
        self.state
    }

    /// Manual navigation.  Allowed in both states; while playing it restarts
    /// the window rather than pausing.
    pub fn advance(&mut self, step: Step) -> Option<String> {
        let len = self.active.len();
        if len == 0 {
            return None;
        }
        self.cursor = match step {
            Step::Forward => (self.cursor + 1) % len,
            Step::Back => (self.cursor + len - 1) % len,
        };
        self.on_channel_loaded();
        self.current().map(str::to_owned)
    }

    /// Jump straight to `id` if it is active.
    pub fn select(&mut self, id: &str) -> Option<String> {
        let idx = self.active.iter().position(|c| c == id)?;
        self.cursor = idx;
        self.on_channel_loaded();
        Some(id.to_string())
    }

    /// Clamp to `[MIN_INTERVAL_SECS, MAX_INTERVAL_SECS]` and apply.  Returns
    /// the value actually used.
    pub fn set_interval(&mut self, secs: u64) -> u64 {
        let secs = clamp_interval(secs);
        self.interval = Duration::from_secs(secs);
        if self.is_playing() {
            self.restart_window();
        } else {
            self.countdown.period = self.interval;
        }
        secs
    }

    /// Swap in a recomputed active subset.  The displayed channel keeps its
    /// place if it survived; otherwise the cursor goes back to 0.  Returns the
    /// new channel when what is displayed changed.
    pub fn replace_active(&mut self, active: Vec<String>) -> Option<String> {
        let previous = self.current().map(str::to_owned);
        self.active = active;
        self.cursor = previous
            .as_deref()
            .and_then(|p| self.active.iter().position(|c| c == p))
            .unwrap_or(0);

        let now = self.current().map(str::to_owned);
        if now != previous && now.is_some() {
            self.on_channel_loaded();
            return now;
        }
        None
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if self.hidden == hidden {
            return;
        }
        self.hidden = hidden;
        if hidden {
            self.countdown.stop();
            self.timer_epoch += 1;
        } else if self.is_playing() {
            self.restart_window();
        }
    }

    /// Advance the cosmetic countdown by one [`COUNTDOWN_STEP`] and return
    /// the new percentage.
    pub fn step_countdown(&mut self) -> f64 {
        if !self.hidden {
            self.countdown.step(COUNTDOWN_STEP);
        }
        self.countdown.percent()
    }

    fn restart_window(&mut self) {
        self.countdown.restart(self.interval);
        self.timer_epoch += 1;
    }

    /// A new channel went into the viewport: reset the bar, and the timer too
    /// while playing.
    fn on_channel_loaded(&mut self) {
        if self.is_playing() {
            self.restart_window();
        } else {
            self.countdown.clear();
        }
    }
}
