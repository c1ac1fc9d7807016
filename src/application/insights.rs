use crate::domain::models::{Connection, Event, TagCount};
use crate::domain::policy::InsightPolicy;
use tracing::trace;

pub fn insights(target: &Event, connections: &[Connection], all: &[Event]) -> Vec<String> {
    insights_with(target, connections, all, &InsightPolicy::default())
}

pub fn insights_with(
    target: &Event,
    connections: &[Connection],
    // Part of the call shape shared with the other queries; every insight is
    // derived from `connections` alone.
    _all: &[Event],
    policy: &InsightPolicy,
) -> Vec<String> {
    let mut observations = Vec::new();

    let strong = connections
        .iter()
        .filter(|connection| connection.strength > policy.strong_connection_strength)
        .count();
    if strong > policy.pattern_min_count {
        observations.push(policy.templates.render_pattern(strong));
    }

    let clustered = tag_frequencies(connections.iter().map(|connection| &connection.peer))
        .into_iter()
        .filter(|entry| entry.count > policy.cluster_min_frequency)
        .take(policy.cluster_top_tags)
        .collect::<Vec<_>>();
    if !clustered.is_empty() {
        let names = clustered
            .iter()
            .map(|entry| entry.tag.as_str())
            .collect::<Vec<_>>();
        observations.push(policy.templates.render_tag_cluster(&names));
    }

    let window = policy.recency_window();
    let recent = connections
        .iter()
        .filter(|connection| (connection.peer.start - target.start).abs() <= window)
        .count();
    if recent > 0 {
        observations.push(policy.templates.render_recency(recent));
    }

    trace!(
        event_id = %target.id,
        connections = connections.len(),
        strong,
        recent,
        insights = observations.len(),
        "derived insights"
    );
    observations
}

pub fn tag_statistics(events: &[Event]) -> Vec<TagCount> {
    tag_frequencies(events.iter())
}

// Each event contributes a tag at most once. Ties keep first-seen order.
fn tag_frequencies<'a>(events: impl Iterator<Item = &'a Event>) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    for event in events {
        for tag in event.distinct_tags() {
            match counts.iter_mut().find(|entry| entry.tag == tag) {
                Some(entry) => entry.count += 1,
                None => counts.push(TagCount {
                    tag: tag.to_string(),
                    count: 1,
                }),
            }
        }
    }
    counts.sort_by(|left, right| right.count.cmp(&left.count));
    counts
}
