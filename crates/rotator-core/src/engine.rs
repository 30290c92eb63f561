//! Rotator: owns the roster, the latest status and the scheduler, and turns
//! user actions and poll results into [`Effect`]s for the host.
//!
//! The host (terminal client, tests) performs the effects: loading a channel
//! into the viewport, showing notices, and starting a new status fetch.
//! Every fetch is stamped with a generation; results from an older
//! generation are dropped so a slow poll can never overwrite newer state.

use tracing::{debug, info, warn};

use crate::protocol::{StatusRecord, StatusSnapshot};
use crate::reconcile::{reconcile, select_active, Reconciled};
use crate::roster::{RosterError, RosterStore};
use crate::rotation::{PlayState, Scheduler, Step};
use crate::store::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Put `channel` into the viewport.
    Load { channel: String, muted: bool },
    Info(String),
    Warn(String),
    /// Roster or filter changed; start a new status fetch.
    Refetch,
}

/// A status fetch the host is about to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveCounts {
    /// Live channels ignoring the category filter.
    pub total: usize,
    /// Live channels in the filtered category; `None` without a filter.
    pub in_category: Option<usize>,
}

pub struct Rotator<S> {
    roster: RosterStore<S>,
    scheduler: Scheduler,
    live_only: bool,
    muted: bool,
    raw: Option<StatusSnapshot>,
    reconciled: Option<Reconciled>,
    generation: u64,
}

impl<S: KeyValueStore> Rotator<S> {
    /// Until the first snapshot arrives the whole roster rotates.
    pub fn new(roster: RosterStore<S>, interval_secs: u64, live_only: bool, muted: bool) -> Self {
        let scheduler = Scheduler::new(interval_secs, roster.channels().to_vec());
        Self {
            roster,
            scheduler,
            live_only,
            muted,
            raw: None,
            reconciled: None,
            generation: 0,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn roster(&self) -> &RosterStore<S> {
        &self.roster
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn live_only(&self) -> bool {
        self.live_only
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn current(&self) -> Option<&str> {
        self.scheduler.current()
    }

    pub fn has_status(&self) -> bool {
        self.raw.is_some()
    }

    /// Filtered record for `id`, as it should be shown.
    pub fn display_record(&self, id: &str) -> Option<&StatusRecord> {
        self.reconciled.as_ref().and_then(|r| r.display.get(id))
    }

    pub fn counts(&self) -> LiveCounts {
        let (total, filtered) = self
            .reconciled
            .as_ref()
            .map(|r| (r.total_live, r.category_live))
            .unwrap_or((0, 0));
        let in_category = (!self.roster.category().is_empty()).then_some(filtered);
        LiveCounts { total, in_category }
    }

    /// Effects for the very first frame.
    pub fn start(&self) -> Vec<Effect> {
        self.load_current().into_iter().collect()
    }

    // ── Status polling ───────────────────────────────────────────────────────

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        debug!("rotator: fetch generation {}", self.generation);
        FetchTicket {
            generation: self.generation,
            channels: self.roster.channels().to_vec(),
        }
    }

    /// Whether a result for `generation` would still be applied.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn apply_status(&mut self, generation: u64, snapshot: StatusSnapshot) -> Vec<Effect> {
        if !self.is_current(generation) {
            debug!(
                "rotator: dropping stale status (generation {} < {})",
                generation, self.generation
            );
            return Vec::new();
        }
        self.raw = Some(snapshot);
        self.recompute()
    }

    /// A poll cycle failed; everything stays as it was.
    pub fn fetch_failed(&mut self, generation: u64, reason: &str) -> Vec<Effect> {
        if !self.is_current(generation) {
            return Vec::new();
        }
        warn!("rotator: status fetch failed: {}", reason);
        vec![Effect::Warn(format!("Status update failed: {}", reason))]
    }

    // ── Playback ─────────────────────────────────────────────────────────────

    pub fn tick(&mut self) -> Vec<Effect> {
        match self.scheduler.tick() {
            Some(channel) => vec![self.load(channel)],
            None => Vec::new(),
        }
    }

    pub fn advance(&mut self, step: Step) -> Vec<Effect> {
        match self.scheduler.advance(step) {
            Some(channel) => vec![self.load(channel)],
            None => Vec::new(),
        }
    }

    pub fn toggle_pause(&mut self) -> PlayState {
        let state = self.scheduler.toggle();
        info!("rotator: {:?}", state);
        state
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.scheduler.set_hidden(hidden);
    }

    pub fn step_countdown(&mut self) -> f64 {
        self.scheduler.step_countdown()
    }

    /// Parse and apply a user-typed interval.
    pub fn set_interval_input(&mut self, text: &str) -> Vec<Effect> {
        let requested = match text.trim().parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                return vec![Effect::Warn(format!(
                    "Interval must be a whole number of seconds, got {:?}",
                    text.trim()
                ))]
            }
        };
        let applied = self.scheduler.set_interval(requested);
        info!("rotator: interval {}s", applied);
        if applied != requested {
            vec![Effect::Info(format!("Interval clamped to {}s", applied))]
        } else {
            vec![Effect::Info(format!("Interval set to {}s", applied))]
        }
    }

    pub fn toggle_mute(&mut self) -> Vec<Effect> {
        self.muted = !self.muted;
        self.load_current().into_iter().collect()
    }

    /// Turn live-only on or off.  Turning it on with nothing live is refused.
    pub fn toggle_live_only(&mut self) -> Vec<Effect> {
        if self.live_only {
            self.live_only = false;
            return self.recompute();
        }
        let nothing_live = self
            .reconciled
            .as_ref()
            .is_some_and(|r| r.active.is_empty());
        if nothing_live {
            return vec![Effect::Warn(
                "No channels are currently live in the selected category!".to_string(),
            )];
        }
        self.live_only = true;
        self.recompute()
    }

    /// Show `name` now.  If live-only filtering hides it, live-only is
    /// switched off so the full roster rotates.
    pub fn jump_to(&mut self, name: &str) -> Vec<Effect> {
        if let Some(channel) = self.scheduler.select(name) {
            return vec![self.load(channel)];
        }
        if !self.roster.contains(name) {
            return vec![Effect::Warn(format!("{} is not in the list", name))];
        }
        self.live_only = false;
        self.scheduler.replace_active(self.roster.channels().to_vec());
        let mut effects = vec![Effect::Info("Live-only mode off".to_string())];
        if let Some(channel) = self.scheduler.select(name) {
            effects.push(self.load(channel));
        }
        effects
    }

    // ── Roster editing ───────────────────────────────────────────────────────

    pub fn add_channel(&mut self, name: &str) -> Vec<Effect> {
        let result = self.roster.add(name);
        self.after_roster_edit(result.map(|_| format!("Added {}", name.trim())))
    }

    pub fn bulk_add(&mut self, text: &str) -> Vec<Effect> {
        let result = self.roster.bulk_add(text);
        self.after_roster_edit(result.map(|n| format!("Added {} streamer(s)", n)))
    }

    pub fn remove_channel(&mut self, name: &str) -> Vec<Effect> {
        let result = self.roster.remove(name);
        self.after_roster_edit(result.map(|_| format!("Removed {}", name)))
    }

    pub fn set_category(&mut self, text: &str) -> Vec<Effect> {
        let result = self.roster.set_category(text).map(|_| {
            if self.roster.category().is_empty() {
                "Category filter cleared, showing all games".to_string()
            } else {
                format!("Category filter set to {}", self.roster.category())
            }
        });
        self.after_filter_edit(result)
    }

    pub fn clear_category(&mut self) -> Vec<Effect> {
        let result = self
            .roster
            .clear_category()
            .map(|_| "Category filter cleared, showing all games".to_string());
        self.after_filter_edit(result)
    }

    fn after_roster_edit(&mut self, result: Result<String, RosterError>) -> Vec<Effect> {
        match result {
            Ok(message) => {
                // In-flight polls were for the old roster.
                self.generation += 1;
                let mut effects = vec![Effect::Info(message)];
                effects.extend(self.recompute());
                effects.push(Effect::Refetch);
                effects
            }
            Err(e) => vec![Effect::Warn(e.to_string())],
        }
    }

    fn after_filter_edit(&mut self, result: Result<String, RosterError>) -> Vec<Effect> {
        match result {
            Ok(message) => {
                let mut effects = vec![Effect::Info(message)];
                effects.extend(self.recompute());
                effects.push(Effect::Refetch);
                effects
            }
            Err(e) => vec![Effect::Warn(e.to_string())],
        }
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Rebuild the active subset from the roster, the last snapshot and the
    /// filter.  An empty live subset switches live-only off.
    fn recompute(&mut self) -> Vec<Effect> {
        let channels = self.roster.channels().to_vec();
        let mut effects = Vec::new();

        let active = match &self.raw {
            None => channels,
            Some(raw) => {
                let reconciled = reconcile(
                    &channels,
                    self.reconciled.as_ref().map(|r| &r.display),
                    raw,
                    self.roster.category(),
                );
                debug!(
                    "rotator: {} live, {} in category, changed={}",
                    reconciled.total_live, reconciled.category_live, reconciled.changed
                );
                let selection = select_active(&channels, &reconciled, self.live_only);
                if selection.fell_back {
                    info!("rotator: no channels match the current filters");
                    self.live_only = false;
                    effects.push(Effect::Warn(
                        "No channels match the current filters, showing all channels".to_string(),
                    ));
                }
                self.reconciled = Some(reconciled);
                selection.active
            }
        };

        if let Some(channel) = self.scheduler.replace_active(active) {
            effects.push(self.load(channel));
        }
        effects
    }

    fn load(&self, channel: String) -> Effect {
        Effect::Load {
            channel,
            muted: self.muted,
        }
    }

    fn load_current(&self) -> Option<Effect> {
        self.scheduler
            .current()
            .map(|c| self.load(c.to_string()))
    }
}
