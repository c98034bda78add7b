// ABOUTME: Property and scenario tests for the retention engine.
// ABOUTME: Uses proptest for invariants over arbitrary histories.

use proptest::prelude::*;
use std::collections::BTreeSet;
use webapp_deploy::history::{DeploymentHistory, DeploymentRecord, reconcile};

fn history(entries: &[(i64, &str)]) -> DeploymentHistory {
    entries
        .iter()
        .map(|(ts, name)| DeploymentRecord::new(*ts, *name).unwrap())
        .collect()
}

fn arb_history() -> impl Strategy<Value = DeploymentHistory> {
    prop::collection::vec(
        (0i64..20, prop::sample::select(vec!["a", "b", "c", "d", "e", "f"])),
        0..40,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(ts, name)| DeploymentRecord::new(ts * 10, name).unwrap())
            .collect()
    })
}

fn old_timestamps(history: &DeploymentHistory, cutoff: i64) -> BTreeSet<i64> {
    history
        .timestamps()
        .into_iter()
        .filter(|ts| *ts < cutoff)
        .collect()
}

mod scenarios {
    use super::*;

    #[test]
    fn single_old_deployment_prunes_nothing() {
        let input = history(&[(100, "a"), (100, "b"), (200, "b"), (200, "c")]);
        let result = reconcile(&input, 150);

        assert_eq!(result.surviving, input);
        assert!(result.deletable.is_empty());
        assert!(result.is_noop());
    }

    #[test]
    fn file_reused_by_boundary_deployment_survives() {
        let input = history(&[
            (100, "a"),
            (150, "a"),
            (150, "b"),
            (300, "b"),
            (300, "c"),
        ]);
        let result = reconcile(&input, 250);

        assert_eq!(result.boundary, Some(150));
        assert!(result.deletable.is_empty());
        assert_eq!(
            result.surviving,
            history(&[(150, "a"), (150, "b"), (300, "b"), (300, "c")])
        );
    }

    #[test]
    fn exclusive_files_of_older_deployments_are_deletable() {
        let input = history(&[
            (100, "old.js"),
            (100, "index.html"),
            (200, "mid.js"),
            (200, "index.html"),
            (300, "new.js"),
            (300, "index.html"),
        ]);
        let result = reconcile(&input, 250);

        assert_eq!(result.boundary, Some(200));
        assert_eq!(
            result.deletable,
            BTreeSet::from(["old.js".to_string()])
        );
        assert_eq!(result.surviving.len(), 4);
    }
}

proptest! {
    #[test]
    fn at_most_one_old_deployment_is_a_noop(history in arb_history(), raw_cutoff in 0i64..250) {
        // A cutoff no later than the second oldest deployment leaves at most
        // one deployment before it.
        let cutoff = match history.timestamps().into_iter().nth(1) {
            Some(second_oldest) => raw_cutoff.min(second_oldest),
            None => raw_cutoff,
        };
        prop_assert!(old_timestamps(&history, cutoff).len() <= 1);

        let result = reconcile(&history, cutoff);
        prop_assert_eq!(&result.surviving, &history);
        prop_assert!(result.deletable.is_empty());
        prop_assert_eq!(result.boundary, None);
    }

    #[test]
    fn retained_files_are_never_deletable(history in arb_history(), cutoff in 0i64..250) {
        let result = reconcile(&history, cutoff);
        let retained = result.surviving.filenames();

        for name in &result.deletable {
            prop_assert!(!retained.contains(name.as_str()), "{} is retained and deletable", name);
        }
    }

    #[test]
    fn boundary_is_newest_old_deployment(history in arb_history(), cutoff in 0i64..250) {
        let old = old_timestamps(&history, cutoff);
        let result = reconcile(&history, cutoff);

        if old.len() >= 2 {
            let boundary = result.boundary.unwrap();
            prop_assert_eq!(Some(&boundary), old.last());
            for record in &result.surviving {
                prop_assert!(record.timestamp() >= boundary);
            }
            let expected: DeploymentHistory = history
                .iter()
                .filter(|r| r.timestamp() >= boundary)
                .cloned()
                .collect();
            prop_assert_eq!(&result.surviving, &expected);
        } else {
            prop_assert_eq!(result.boundary, None);
        }
    }

    #[test]
    fn deletable_files_come_from_dropped_records(history in arb_history(), cutoff in 0i64..250) {
        let result = reconcile(&history, cutoff);
        if let Some(boundary) = result.boundary {
            for name in &result.deletable {
                prop_assert!(history
                    .iter()
                    .any(|r| r.filename() == name.as_str() && r.timestamp() < boundary));
            }
        }
    }

    #[test]
    fn second_reconcile_is_a_noop(history in arb_history(), cutoff in 0i64..250) {
        let first = reconcile(&history, cutoff);
        let second = reconcile(&first.surviving, cutoff);

        prop_assert!(second.is_noop());
        prop_assert_eq!(&second.surviving, &first.surviving);
        prop_assert!(second.deletable.is_empty());
    }
}
