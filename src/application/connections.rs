use crate::application::similarity::score_with;
use crate::domain::models::{Connection, Event};
use crate::domain::policy::GraphPolicy;

pub fn connections(target: &Event, all: &[Event]) -> Vec<Connection> {
    connections_with(target, all, &GraphPolicy::default())
}

/// Scores `target` against every other event, keeps strengths strictly above
/// the threshold and returns the strongest `top_k`, strongest first. Equal
/// strengths keep their order from `all`.
///
/// Pruning is per query node: `b` may be in `a`'s list while `a` is crowded
/// out of `b`'s.
pub fn connections_with(target: &Event, all: &[Event], policy: &GraphPolicy) -> Vec<Connection> {
    let mut ranked = all
        .iter()
        .filter(|candidate| candidate.id != target.id)
        .map(|candidate| (candidate, score_with(target, candidate, policy)))
        .filter(|(_, strength)| *strength > policy.similarity_threshold)
        .collect::<Vec<_>>();
    ranked.sort_by(|left, right| right.1.total_cmp(&left.1));
    ranked.truncate(policy.top_k);

    ranked
        .into_iter()
        .map(|(peer, strength)| Connection {
            peer: peer.clone(),
            strength,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::similarity::score;
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn event_at(id: &str, start: DateTime<Utc>) -> Event {
        Event::new(id, start, start + Duration::hours(1), "")
    }

    #[test]
    fn empty_collection_has_no_connections() {
        let target = event_at("solo", fixed_time("2026-02-16T09:00:00Z"));
        assert!(connections(&target, &[]).is_empty());
        assert!(connections(&target, std::slice::from_ref(&target)).is_empty());
    }

    #[test]
    fn tagged_meetings_connect_both_ways() {
        let a = event_at("a", fixed_time("2026-02-16T09:00:00Z")).with_tags(["meeting", "important"]);
        let b = event_at("b", fixed_time("2026-02-16T11:00:00Z")).with_tags(["meeting", "sales"]);
        let all = vec![a.clone(), b.clone()];

        let from_a = connections(&a, &all);
        let from_b = connections(&b, &all);
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_a[0].peer.id, "b");
        assert_eq!(from_b.len(), 1);
        assert_eq!(from_b[0].peer.id, "a");
        assert_eq!(from_a[0].strength, from_b[0].strength);
    }

    #[test]
    fn threshold_is_strict() {
        let a = event_at("a", fixed_time("2026-01-01T09:00:00Z")).with_category("bg-green-500");
        let b = event_at("b", fixed_time("2026-06-01T09:00:00Z")).with_category("bg-green-500");
        let policy = GraphPolicy {
            similarity_threshold: score(&a, &b),
            ..GraphPolicy::default()
        };
        assert!(connections_with(&a, &[a.clone(), b], &policy).is_empty());
    }

    #[test]
    fn ties_keep_input_order_and_list_is_capped() {
        let start = fixed_time("2026-02-16T09:00:00Z");
        let target = event_at("target", start).with_tags(["focus"]);
        let all = (0..15)
            .map(|index| event_at(&format!("peer-{index:02}"), start).with_tags(["focus"]))
            .chain(std::iter::once(target.clone()))
            .collect::<Vec<_>>();

        let result = connections(&target, &all);
        let ids = result.iter().map(|c| c.peer.id.as_str()).collect::<Vec<_>>();
        let expected = (0..10).map(|index| format!("peer-{index:02}")).collect::<Vec<_>>();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn membership_is_not_forced_to_be_symmetric() {
        let start = fixed_time("2026-02-16T09:00:00Z");
        let hub = event_at("hub", start).with_tags(["a", "b"]);
        let loner = event_at("loner", start + Duration::days(10)).with_tags(["a"]);
        let mut all = vec![hub.clone(), loner.clone()];
        // Ten near-duplicates of the hub crowd the loner out of the hub's list.
        for index in 0..10 {
            all.push(event_at(&format!("twin-{index}"), start).with_tags(["a", "b"]));
        }

        let from_hub = connections(&hub, &all);
        let from_loner = connections(&loner, &all);
        assert_eq!(from_hub.len(), 10);
        assert!(from_hub.iter().all(|c| c.peer.id != "loner"));
        assert!(from_loner.iter().any(|c| c.peer.id == "hub"));
    }

    fn arbitrary_collection() -> impl Strategy<Value = Vec<Event>> {
        prop::collection::vec(
            (
                prop::collection::vec(prop::sample::select(vec!["work", "home", "gym", "x"]), 0..3),
                0i64..40 * 24,
                prop::sample::select(vec!["bg-blue-500", "bg-red-500"]),
            ),
            0..25,
        )
        .prop_map(|specs| {
            let base = fixed_time("2026-01-01T00:00:00Z");
            specs
                .into_iter()
                .enumerate()
                .map(|(index, (tags, hours, category))| {
                    event_at(&format!("evt-{index}"), base + Duration::hours(hours))
                        .with_tags(tags)
                        .with_category(category)
                })
                .collect()
        })
    }

    // Feature: relatedness, Property 5: connection lists are pruned, capped and ordered
    proptest! {
        #[test]
        fn property5_connection_lists_are_pruned_capped_and_ordered(
            all in arbitrary_collection(),
            pick in any::<prop::sample::Index>()
        ) {
            prop_assume!(!all.is_empty());
            let target = &all[pick.index(all.len())];
            let result = connections(target, &all);

            prop_assert!(result.len() <= 10);
            for connection in &result {
                prop_assert!(connection.peer.id != target.id);
                prop_assert!(connection.strength > 0.2);
            }
            for pair in result.windows(2) {
                prop_assert!(pair[0].strength >= pair[1].strength);
            }
        }
    }
}
