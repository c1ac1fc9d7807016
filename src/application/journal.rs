use crate::application::availability::{dates_between, day_bounds, free_blocks_on};
use crate::application::connections::connections_with;
use crate::application::insights::{insights_with, tag_statistics};
use crate::domain::models::{events_from_records, Connection, Event, EventRecord, FreeBlock, TagCount};
use crate::domain::policy::EngineConfig;
use crate::infrastructure::error::DaybookError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventInsights {
    pub event_id: String,
    pub connections: Vec<Connection>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct JournalSnapshot {
    events: Vec<Event>,
    config: EngineConfig,
}

impl JournalSnapshot {
    pub fn new(events: Vec<Event>, config: EngineConfig) -> Result<Self, DaybookError> {
        config.validate().map_err(DaybookError::InvalidConfig)?;

        let mut seen = HashSet::new();
        for event in &events {
            event
                .validate()
                .map_err(|reason| DaybookError::invalid_event(Some(&event.id), reason))?;
            if !seen.insert(event.id.as_str()) {
                return Err(DaybookError::DuplicateEventId(event.id.clone()));
            }
        }

        debug!(events = events.len(), timezone = %config.timezone, "built journal snapshot");
        Ok(Self { events, config })
    }

    pub fn from_records(records: Vec<EventRecord>, config: EngineConfig) -> Result<Self, DaybookError> {
        Self::new(events_from_records(records)?, config)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn event(&self, event_id: &str) -> Result<&Event, DaybookError> {
        self.events
            .iter()
            .find(|event| event.id == event_id)
            .ok_or_else(|| DaybookError::UnknownEvent(event_id.to_string()))
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        let day = day_bounds(date, &self.config.timezone);
        let mut events = self
            .events
            .iter()
            .filter(|event| event.overlaps(day.start, day.end))
            .collect::<Vec<_>>();
        events.sort_by_key(|event| event.start);
        events
    }

    pub fn free_blocks(&self, date: NaiveDate) -> Vec<FreeBlock> {
        free_blocks_on(
            &self.events,
            date,
            &self.config.timezone,
            &self.config.availability,
        )
    }

    pub fn free_blocks_between(
        &self,
        first: NaiveDate,
        last: NaiveDate,
    ) -> BTreeMap<NaiveDate, Vec<FreeBlock>> {
        dates_between(first, last)
            .into_iter()
            .map(|date| (date, self.free_blocks(date)))
            .collect()
    }

    pub fn connections(&self, event_id: &str) -> Result<Vec<Connection>, DaybookError> {
        let target = self.event(event_id)?;
        let connections = connections_with(target, &self.events, &self.config.graph);
        debug!(event_id, connections = connections.len(), "built connection list");
        Ok(connections)
    }

    pub fn insights(&self, event_id: &str) -> Result<Vec<String>, DaybookError> {
        self.inspect(event_id).map(|inspected| inspected.insights)
    }

    pub fn inspect(&self, event_id: &str) -> Result<EventInsights, DaybookError> {
        let target = self.event(event_id)?;
        let connections = connections_with(target, &self.events, &self.config.graph);
        let insights = insights_with(target, &connections, &self.events, &self.config.insights);
        debug!(
            event_id,
            connections = connections.len(),
            insights = insights.len(),
            "inspected event"
        );
        Ok(EventInsights {
            event_id: target.id.clone(),
            connections,
            insights,
        })
    }

    pub fn tag_statistics(&self) -> Vec<TagCount> {
        tag_statistics(&self.events)
    }
}
