use rotator_core::engine::{Effect, Rotator};
use rotator_core::protocol::{StatusRecord, StatusSnapshot};
use rotator_core::roster::{RosterStore, CATEGORY_KEY, ROSTER_KEY};
use rotator_core::rotation::Step;
use rotator_core::store::{JsonFileStore, KeyValueStore, MemoryStore};

fn rotator(names: &[&str], category: &str, live_only: bool) -> Rotator<MemoryStore> {
    let mut store = MemoryStore::new();
    store
        .set(ROSTER_KEY, &serde_json::to_string(names).unwrap())
        .unwrap();
    store.set(CATEGORY_KEY, category).unwrap();
    Rotator::new(RosterStore::load(store), 30, live_only, false)
}

fn live(names: &[&str], category: &str) -> StatusSnapshot {
    names
        .iter()
        .map(|n| (n.to_string(), StatusRecord::live("title", category, 7)))
        .collect()
}

fn loads(effects: &[Effect]) -> Vec<&str> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Load { channel, .. } => Some(channel.as_str()),
            _ => None,
        })
        .collect()
}

fn has_warning(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Warn(_)))
}

#[test]
fn full_roster_rotates_before_first_snapshot() {
    let r = rotator(&["A", "B", "C"], "", true);
    assert_eq!(r.scheduler().active(), ["A", "B", "C"]);
    assert_eq!(loads(&r.start()), ["A"]);
    assert!(!r.has_status());
}

#[test]
fn live_only_snapshot_narrows_rotation() {
    let mut r = rotator(&["A", "B", "C"], "", true);
    let ticket = r.begin_fetch();
    assert_eq!(ticket.channels, ["A", "B", "C"]);

    let mut snap = live(&["B", "C"], "Chess");
    snap.insert("A", StatusRecord::offline());
    let effects = r.apply_status(ticket.generation, snap);

    assert_eq!(loads(&effects), ["B"]);
    assert_eq!(r.scheduler().active(), ["B", "C"]);
    assert_eq!(loads(&r.tick()), ["C"]);
    assert_eq!(loads(&r.tick()), ["B"]);
}

#[test]
fn stale_status_is_ignored() {
    let mut r = rotator(&["A", "B"], "", true);
    let old = r.begin_fetch();
    let new = r.begin_fetch();

    assert!(r.apply_status(old.generation, live(&["B"], "")).is_empty());
    assert!(!r.has_status());

    r.apply_status(new.generation, live(&["A"], ""));
    assert_eq!(r.scheduler().active(), ["A"]);
}

#[test]
fn roster_edit_invalidates_in_flight_fetch() {
    let mut r = rotator(&["A"], "", true);
    let ticket = r.begin_fetch();
    let effects = r.add_channel("B");
    assert!(effects.contains(&Effect::Refetch));

    assert!(r.apply_status(ticket.generation, live(&["A"], "")).is_empty());
}

#[test]
fn empty_live_subset_disables_live_only() {
    let mut r = rotator(&["A", "B"], "", true);
    let ticket = r.begin_fetch();
    let snap: StatusSnapshot = ["A", "B"]
        .iter()
        .map(|n| (n.to_string(), StatusRecord::offline()))
        .collect();

    let effects = r.apply_status(ticket.generation, snap);
    assert!(has_warning(&effects));
    assert!(!r.live_only());
    assert_eq!(r.scheduler().active(), ["A", "B"]);
}

#[test]
fn enabling_live_only_with_nothing_live_is_refused() {
    let mut r = rotator(&["A", "B"], "", false);
    let ticket = r.begin_fetch();
    r.apply_status(ticket.generation, StatusSnapshot::new());

    let effects = r.toggle_live_only();
    assert!(has_warning(&effects));
    assert!(!r.live_only());
}

#[test]
fn filter_change_keeps_displayed_channel_when_still_eligible() {
    let mut r = rotator(&["A", "B", "C"], "", true);
    let ticket = r.begin_fetch();
    let mut snap = StatusSnapshot::new();
    snap.insert("A", StatusRecord::live("", "Music", 1));
    snap.insert("B", StatusRecord::live("", "Chess", 1));
    snap.insert("C", StatusRecord::live("", "Chess", 1));
    r.apply_status(ticket.generation, snap);

    r.advance(Step::Forward);
    assert_eq!(r.current(), Some("B"));

    let effects = r.set_category("chess");
    assert!(loads(&effects).is_empty());
    assert_eq!(r.current(), Some("B"));
    assert_eq!(r.scheduler().active(), ["B", "C"]);

    let counts = r.counts();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.in_category, Some(2));
}

#[test]
fn failed_poll_keeps_previous_subset() {
    let mut r = rotator(&["A", "B"], "", true);
    let ticket = r.begin_fetch();
    r.apply_status(ticket.generation, live(&["B"], ""));

    let ticket = r.begin_fetch();
    let effects = r.fetch_failed(ticket.generation, "upstream returned 503");
    assert!(has_warning(&effects));
    assert_eq!(r.scheduler().active(), ["B"]);
    assert_eq!(r.current(), Some("B"));
}

#[test]
fn jump_to_hidden_channel_turns_live_only_off() {
    let mut r = rotator(&["A", "B", "C"], "", true);
    let ticket = r.begin_fetch();
    r.apply_status(ticket.generation, live(&["C"], ""));
    assert_eq!(r.scheduler().active(), ["C"]);

    let effects = r.jump_to("A");
    assert_eq!(loads(&effects), ["A"]);
    assert!(!r.live_only());
    assert_eq!(r.scheduler().active(), ["A", "B", "C"]);
}

#[test]
fn mute_toggle_reloads_current_channel() {
    let mut r = rotator(&["A"], "", false);
    let effects = r.toggle_mute();
    assert_eq!(
        effects,
        [Effect::Load {
            channel: "A".into(),
            muted: true
        }]
    );
}

#[test]
fn invalid_interval_input_is_reported_locally() {
    let mut r = rotator(&["A"], "", false);
    assert!(has_warning(&r.set_interval_input("soon")));
    assert_eq!(r.scheduler().interval().as_secs(), 30);

    let effects = r.set_interval_input("2");
    assert_eq!(effects, [Effect::Info("Interval clamped to 5s".into())]);
}

#[test]
fn duplicate_add_is_a_local_message() {
    let mut r = rotator(&["A"], "", false);
    let effects = r.add_channel("A");
    assert_eq!(effects, [Effect::Warn("Streamer already in list".into())]);
    assert_eq!(r.roster().channels(), ["A"]);
}

#[test]
fn malformed_name_is_a_local_message_and_no_refetch() {
    let mut r = rotator(&["A"], "", false);
    let effects = r.add_channel("foo,bar");
    assert_eq!(
        effects,
        [Effect::Warn(
            "\"foo,bar\" is not a valid streamer name (letters, digits and _ only)".into()
        )]
    );
    assert!(has_warning(&r.bulk_add("B, two words")));
    assert_eq!(r.roster().channels(), ["A"]);
}

#[test]
fn roster_survives_restart_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let store = JsonFileStore::open(&path);
    let mut r = Rotator::new(RosterStore::load(store), 30, true, false);
    r.bulk_add("zeta, eta");
    r.set_category("Chess");
    let expected = r.roster().channels().to_vec();

    let reloaded = RosterStore::load(JsonFileStore::open(&path));
    assert_eq!(reloaded.channels(), expected.as_slice());
    assert_eq!(reloaded.category(), "Chess");
}
