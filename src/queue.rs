/* Copyright © 2018 Gianmarco Garrisi

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>. */

//! The two runtime containers the engine scans every step: pending flow
//! entities and the resource pool.

use std::collections::HashSet;

use crate::entity::{FlowEntity, ResourceEntity};

/// Pending flow entities awaiting or undergoing service.
///
/// A naive O(n)-per-call scan, as the spec allows: selection cost is
/// dominated by the event calendar in every model this engine has been run
/// against, and an indexed `(arrival_time, insertion_seq)` structure is a
/// drop-in optimization if that ever stops being true.
#[derive(Debug, Default)]
pub struct FlowEntityQueue {
    entities: Vec<FlowEntity>,
}

impl FlowEntityQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        FlowEntityQueue {
            entities: Vec::new(),
        }
    }

    /// Append a flow entity.
    pub fn add(&mut self, entity: FlowEntity) {
        self.entities.push(entity);
    }

    /// All entities, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FlowEntity> {
        self.entities.iter()
    }

    /// Returns the unprocessed entity with the smallest `arrival_time`.
    /// Ties are broken by insertion order (the earliest-added entity wins);
    /// insertion order is itself a unique total order, so no further
    /// tie-breaker is needed here. Activity priority is consulted by the
    /// event calendar instead (`EventCalendar`'s ordering), not by this
    /// queue.
    pub fn next_unprocessed(&self) -> Option<&FlowEntity> {
        self.next_unprocessed_excluding(&HashSet::new())
    }

    /// Like [`Self::next_unprocessed`], but also skips any entity whose id
    /// is in `excluded`. The engine uses this to exclude entities that have
    /// already begun service (an `EndService` is pending for them) but
    /// whose `departure_time` is not yet stamped — without it, the drain
    /// phase would repeatedly re-start the same entity before its first
    /// service instance ever ends.
    pub fn next_unprocessed_excluding(&self, excluded: &HashSet<String>) -> Option<&FlowEntity> {
        self.entities
            .iter()
            .filter(|e| !e.is_processed() && !excluded.contains(&e.id))
            .min_by(|a, b| {
                a.arrival_time
                    .partial_cmp(&b.arrival_time)
                    .expect("arrival_time must not be NaN")
            })
    }

    /// Mutable access to a specific entity by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut FlowEntity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Returns all entities that have never completed service at their
    /// current activity.
    pub fn pending(&self) -> Vec<&FlowEntity> {
        self.entities.iter().filter(|e| !e.is_processed()).collect()
    }

    /// Number of entities tracked (processed and unprocessed).
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are tracked.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// The pool of resource entities and their availability state.
#[derive(Debug, Default)]
pub struct ResourceEntityQueue {
    entities: Vec<ResourceEntity>,
}

impl ResourceEntityQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        ResourceEntityQueue {
            entities: Vec::new(),
        }
    }

    /// Add a resource.
    pub fn add(&mut self, resource: ResourceEntity) {
        self.entities.push(resource);
    }

    /// Among resources of `resource_type` with `available == true`, returns
    /// the one with the smallest `ready_time` (ties broken by insertion
    /// order). Does **not** change availability: the caller decides what to
    /// do with the returned candidate.
    pub fn acquire(&self, resource_type: &str) -> Option<&ResourceEntity> {
        self.acquire_one(resource_type, &[])
    }

    /// Like [`Self::acquire`], but ignores any resource whose id appears in
    /// `excluding`. Used by the engine when a single activity requires more
    /// than one resource of the same type, so that the same instance is not
    /// selected twice within one atomic acquisition attempt.
    pub fn acquire_one(&self, resource_type: &str, excluding: &[String]) -> Option<&ResourceEntity> {
        self.entities
            .iter()
            .filter(|r| r.resource_type == resource_type && r.available && !excluding.iter().any(|id| id == &r.id))
            .min_by(|a, b| {
                a.ready_time
                    .partial_cmp(&b.ready_time)
                    .expect("ready_time must not be NaN")
            })
    }

    /// Mutable access to a specific resource by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ResourceEntity> {
        self.entities.iter_mut().find(|r| r.id == id)
    }

    /// All resources, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceEntity> {
        self.entities.iter()
    }

    /// Number of resources tracked.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no resources are tracked.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_unprocessed_picks_smallest_arrival() {
        let mut q = FlowEntityQueue::new();
        q.add(FlowEntity::new("b", "act", 5.0));
        q.add(FlowEntity::new("a", "act", 1.0));
        assert_eq!(q.next_unprocessed().unwrap().id, "a");
    }

    #[test]
    fn next_unprocessed_skips_processed() {
        let mut q = FlowEntityQueue::new();
        let mut first = FlowEntity::new("a", "act", 1.0);
        first.departure_time = Some(2.0);
        q.add(first);
        q.add(FlowEntity::new("b", "act", 5.0));
        assert_eq!(q.next_unprocessed().unwrap().id, "b");
    }

    #[test]
    fn ties_broken_by_insertion_order() {
        let mut q = FlowEntityQueue::new();
        q.add(FlowEntity::new("first", "act", 1.0));
        q.add(FlowEntity::new("second", "act", 1.0));
        assert_eq!(q.next_unprocessed().unwrap().id, "first");
    }

    #[test]
    fn acquire_does_not_mutate() {
        let mut q = ResourceEntityQueue::new();
        q.add(ResourceEntity::new("r1", "loader"));
        let candidate = q.acquire("loader").unwrap().clone();
        assert_eq!(candidate.id, "r1");
        assert!(q.get_mut("r1").unwrap().available);
    }

    #[test]
    fn acquire_picks_smallest_ready_time() {
        let mut q = ResourceEntityQueue::new();
        q.add(ResourceEntity::new("late", "loader").ready_at(5.0));
        q.add(ResourceEntity::new("early", "loader").ready_at(1.0));
        assert_eq!(q.acquire("loader").unwrap().id, "early");
    }

    #[test]
    fn acquire_one_skips_excluded_ids() {
        let mut q = ResourceEntityQueue::new();
        q.add(ResourceEntity::new("a", "loader"));
        q.add(ResourceEntity::new("b", "loader"));
        let excluded = vec!["a".to_string()];
        assert_eq!(q.acquire_one("loader", &excluded).unwrap().id, "b");
    }

    #[test]
    fn acquire_ignores_unavailable_or_wrong_type() {
        let mut q = ResourceEntityQueue::new();
        let mut unavailable = ResourceEntity::new("u", "loader");
        unavailable.available = false;
        q.add(unavailable);
        q.add(ResourceEntity::new("w", "flagger"));
        assert!(q.acquire("loader").is_none());
    }
}
