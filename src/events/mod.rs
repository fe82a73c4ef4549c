// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Event History
//!
//! Every externally visible state change made by a task is recorded as an
//! [`EventRecord`]. Records are immutable facts named in the past tense and
//! carry the task that caused them in `chain`.
//!
//! ```text
//! Task(task-31) ──▶ EnterMaintenanceMode ──▶ EventRecord {
//!                                               kind: EnteredMaintenanceMode,
//!                                               chain: task-31,
//!                                               host: host-12 }
//! ```
//!
//! The log is bounded; once full, the oldest record is evicted. Event keys
//! keep increasing across evictions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::domain::ManagedObjectReference;

/// Default number of records kept
pub const DEFAULT_EVENT_HISTORY_LIMIT: usize = 1000;

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A host joined the inventory
    HostAdded,

    /// A host and its sub-managers were removed from the inventory
    HostRemoved,

    EnteredMaintenanceMode,

    ExitedMaintenanceMode,

    HostShutdown,

    /// Software units appended to the host's patch manager
    PatchInstalled { vibs: Vec<String> },

    /// The last mount of a datastore went away with the datastore itself
    DatastoreDestroyed {
        datastore: ManagedObjectReference,
        name: String,
    },

    /// A host unmounted a datastore that stays available to other hosts
    DatastoreRemoved {
        datastore: ManagedObjectReference,
        name: String,
    },

    DvsHostJoined {
        dvs: ManagedObjectReference,
        name: String,
    },

    DvsHostLeft {
        dvs: ManagedObjectReference,
        name: String,
    },
}

impl EventKind {
    /// Event type name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::HostAdded => "HostAddedEvent",
            EventKind::HostRemoved => "HostRemovedEvent",
            EventKind::EnteredMaintenanceMode => "EnteredMaintenanceModeEvent",
            EventKind::ExitedMaintenanceMode => "ExitMaintenanceModeEvent",
            EventKind::HostShutdown => "HostShutdownEvent",
            EventKind::PatchInstalled { .. } => "HostPatchInstalledEvent",
            EventKind::DatastoreDestroyed { .. } => "DatastoreDestroyedEvent",
            EventKind::DatastoreRemoved { .. } => "DatastoreRemovedOnHostEvent",
            EventKind::DvsHostJoined { .. } => "DvsHostJoinedEvent",
            EventKind::DvsHostLeft { .. } => "DvsHostLeftEvent",
        }
    }
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Monotonic key, unique within one log
    pub key: u64,

    /// Globally unique, time-ordered identifier
    pub event_id: Uuid,

    pub created_time: DateTime<Utc>,

    /// Task that caused the event
    pub chain: Option<ManagedObjectReference>,

    /// Host the event is about
    pub host: ManagedObjectReference,

    pub kind: EventKind,
}

/// Bounded, append-only event history
#[derive(Debug, Clone)]
pub struct EventLog {
    records: VecDeque<EventRecord>,
    limit: usize,
    next_key: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_HISTORY_LIMIT)
    }
}

impl EventLog {
    /// Create a log holding at most `limit` records (at least one)
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            records: VecDeque::with_capacity(limit.min(DEFAULT_EVENT_HISTORY_LIMIT)),
            limit,
            next_key: 1,
        }
    }

    /// Append an event, evicting the oldest one when full
    pub fn record(
        &mut self,
        host: ManagedObjectReference,
        chain: Option<ManagedObjectReference>,
        kind: EventKind,
    ) -> &EventRecord {
        if self.records.len() == self.limit {
            self.records.pop_front();
        }

        let record = EventRecord {
            key: self.next_key,
            event_id: Uuid::now_v7(),
            created_time: Utc::now(),
            chain,
            host,
            kind,
        };
        self.next_key += 1;

        tracing::debug!(
            key = record.key,
            event = record.kind.name(),
            host = %record.host,
            "Event recorded"
        );

        self.records.push_back(record);
        &self.records[self.records.len() - 1]
    }

    /// Records oldest first
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Records about one host, oldest first
    pub fn for_host<'a>(
        &'a self,
        host: &'a ManagedObjectReference,
    ) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.records.iter().filter(move |r| &r.host == host)
    }

    /// Records caused by one task
    pub fn for_task<'a>(
        &'a self,
        task: &'a ManagedObjectReference,
    ) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.chain.as_ref() == Some(task))
    }

    pub fn latest(&self) -> Option<&EventRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManagedObjectType;

    fn host() -> ManagedObjectReference {
        ManagedObjectReference::new(ManagedObjectType::HostSystem, "host-1")
    }

    #[test]
    fn test_records_are_keyed_in_order() {
        let mut log = EventLog::new(10);
        log.record(host(), None, EventKind::HostAdded);
        log.record(host(), None, EventKind::EnteredMaintenanceMode);

        let keys: Vec<u64> = log.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(log.latest().unwrap().kind, EventKind::EnteredMaintenanceMode);
    }

    #[test]
    fn test_bounded_log_evicts_oldest() {
        let mut log = EventLog::new(2);
        log.record(host(), None, EventKind::HostAdded);
        log.record(host(), None, EventKind::EnteredMaintenanceMode);
        log.record(host(), None, EventKind::ExitedMaintenanceMode);

        assert_eq!(log.len(), 2);
        let keys: Vec<u64> = log.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![2, 3]);
    }

    #[test]
    fn test_zero_limit_keeps_one_record() {
        let mut log = EventLog::new(0);
        log.record(host(), None, EventKind::HostAdded);
        log.record(host(), None, EventKind::HostShutdown);
        assert_eq!(log.limit(), 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_filter_by_task() {
        let task = ManagedObjectReference::new(ManagedObjectType::Task, "task-9");
        let mut log = EventLog::default();
        log.record(host(), Some(task.clone()), EventKind::HostShutdown);
        log.record(host(), None, EventKind::HostAdded);

        assert_eq!(log.for_task(&task).count(), 1);
        assert_eq!(log.for_host(&host()).count(), 2);
    }

    #[test]
    fn test_event_kind_serializes_with_type_tag() {
        let json = serde_json::to_value(EventKind::PatchInstalled {
            vibs: vec!["a".to_string()],
        })
        .unwrap();
        assert_eq!(json["type"], "patch_installed");
        assert_eq!(json["vibs"][0], "a");
    }
}
