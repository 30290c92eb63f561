//! Status reconciliation: roster + raw snapshot + category filter into what is
//! shown and what is eligible for rotation.

use crate::protocol::{StatusRecord, StatusSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Raw snapshot with off-category live records downgraded to offline.
    pub display: StatusSnapshot,
    /// Roster entries live in `display`, in roster order.
    pub active: Vec<String>,
    /// Live channels in the unfiltered snapshot.
    pub total_live: usize,
    /// Live channels after the category filter.
    pub category_live: usize,
    /// Whether `display` differs from the previous display snapshot.
    pub changed: bool,
}

/// Pure: the same inputs always produce the same output.  `previous` only
/// feeds the `changed` flag.
pub fn reconcile(
    roster: &[String],
    previous: Option<&StatusSnapshot>,
    raw: &StatusSnapshot,
    category_filter: &str,
) -> Reconciled {
    let display: StatusSnapshot = raw
        .iter()
        .map(|(id, record)| {
            let shown = if record.live && record.category_matches(category_filter) {
                record.clone()
            } else {
                StatusRecord::offline()
            };
            (id.clone(), shown)
        })
        .collect();

    let active = roster
        .iter()
        .filter(|id| display.is_live(id))
        .cloned()
        .collect();

    Reconciled {
        total_live: raw.live_count(),
        category_live: display.live_count(),
        changed: previous != Some(&display),
        display,
        active,
    }
}

/// Which channels the scheduler rotates through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub active: Vec<String>,
    /// Live-only was requested but nothing matched; the whole roster is
    /// active and live-only mode must be switched off.
    pub fell_back: bool,
}

/// Apply the live-only policy to a reconciliation result.
pub fn select_active(roster: &[String], reconciled: &Reconciled, live_only: bool) -> Selection {
    if !live_only {
        return Selection {
            active: roster.to_vec(),
            fell_back: false,
        };
    }
    if reconciled.active.is_empty() {
        return Selection {
            active: roster.to_vec(),
            fell_back: true,
        };
    }
    Selection {
        active: reconciled.active.clone(),
        fell_back: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_filter_keeps_live_in_roster_order() {
        let roster = ids(&["C", "A", "B"]);
        let mut raw = StatusSnapshot::new();
        raw.insert("A", StatusRecord::live("", "", 0));
        raw.insert("B", StatusRecord::offline());
        raw.insert("C", StatusRecord::live("", "", 0));

        let out = reconcile(&roster, None, &raw, "");
        assert_eq!(out.active, ["C", "A"]);
        assert_eq!(out.total_live, 2);
        assert_eq!(out.category_live, 2);
        assert!(out.changed);
    }

    #[test]
    fn test_filter_downgrades_other_categories() {
        let roster = ids(&["A", "B"]);
        let mut raw = StatusSnapshot::new();
        raw.insert("A", StatusRecord::live("t", "Chess", 10));
        raw.insert("B", StatusRecord::live("t", "Music", 20));

        let out = reconcile(&roster, None, &raw, "chess");
        assert_eq!(out.active, ["A"]);
        assert_eq!(out.display.get("B"), Some(&StatusRecord::offline()));
        assert_eq!(out.display.get("A"), raw.get("A"));
        assert_eq!(out.total_live, 2);
        assert_eq!(out.category_live, 1);
    }

    #[test]
    fn test_unchanged_display_is_reported() {
        let roster = ids(&["A"]);
        let mut raw = StatusSnapshot::new();
        raw.insert("A", StatusRecord::live("", "", 0));

        let first = reconcile(&roster, None, &raw, "");
        let second = reconcile(&roster, Some(&first.display), &raw, "");
        assert!(!second.changed);
        assert_eq!(first.active, second.active);
    }

    #[test]
    fn test_select_active_falls_back_to_full_roster() {
        let roster = ids(&["A", "B"]);
        let raw = StatusSnapshot::new();
        let out = reconcile(&roster, None, &raw, "");

        let sel = select_active(&roster, &out, true);
        assert!(sel.fell_back);
        assert_eq!(sel.active, roster);

        let sel = select_active(&roster, &out, false);
        assert!(!sel.fell_back);
        assert_eq!(sel.active, roster);
    }
}
