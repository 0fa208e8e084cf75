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

//! Flow entities and resource entities, the two kinds of runtime object the
//! engine moves around. Both carry an opaque [`Attributes`] bag that the
//! engine never reads.

use std::collections::HashMap;

/// A single value in an entity's attribute bag.
///
/// A closed sum type rather than a dynamically-typed scripting value: the
/// engine is generic over what a host stores here, but the set of shapes a
/// host can store is fixed.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// A signed integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A text value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// Opaque binary data.
    Bytes(Vec<u8>),
}

/// An opaque key→value bag carried by entities. The engine never inspects
/// its contents; it exists purely as pass-through state for the host.
pub type Attributes = HashMap<String, AttributeValue>;

/// A unit flowing through the activity graph (e.g. a truck, a job, a
/// packet).
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEntity {
    /// Stable unique identifier.
    pub id: String,
    /// The activity this entity is currently waiting to begin, or is
    /// undergoing.
    pub activity_id: String,
    /// Simulated time at which the entity became eligible for
    /// `activity_id`.
    pub arrival_time: f64,
    /// Simulated time at which the entity's current activity instance
    /// ended. `None` means the entity has not yet been serviced at its
    /// current activity.
    pub departure_time: Option<f64>,
    /// Opaque attribute bag, carried but not interpreted by the engine.
    pub attributes: Attributes,
}

impl FlowEntity {
    /// Create a new, unprocessed flow entity waiting at `activity_id`.
    pub fn new(id: impl Into<String>, activity_id: impl Into<String>, arrival_time: f64) -> Self {
        FlowEntity {
            id: id.into(),
            activity_id: activity_id.into(),
            arrival_time,
            departure_time: None,
            attributes: Attributes::new(),
        }
    }

    /// Returns `true` if this entity has completed service at its current
    /// activity.
    pub fn is_processed(&self) -> bool {
        self.departure_time.is_some()
    }
}

/// A reusable, disposable, or generated object whose availability gates
/// activity starts (e.g. a machine, a server, a one-shot token).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntity {
    /// Stable unique identifier.
    pub id: String,
    /// The resource class that activities demand by name.
    pub resource_type: String,
    /// Simulated time at which this resource next becomes available.
    pub ready_time: f64,
    /// `false` permanently disables the resource.
    pub available: bool,
    /// If `true`, the resource is consumed (marked unavailable) when
    /// acquired, and is never released.
    pub disposable: bool,
    /// Opaque attribute bag, carried but not interpreted by the engine.
    pub attributes: Attributes,
}

impl ResourceEntity {
    /// Create a new, available, non-disposable resource of type
    /// `resource_type`, ready at time `0.0`.
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        ResourceEntity {
            id: id.into(),
            resource_type: resource_type.into(),
            ready_time: 0.0,
            available: true,
            disposable: false,
            attributes: Attributes::new(),
        }
    }

    /// Mark this resource as disposable (builder style).
    pub fn disposable(mut self) -> Self {
        self.disposable = true;
        self
    }

    /// Set the time at which this resource is first ready (builder style).
    pub fn ready_at(mut self, ready_time: f64) -> Self {
        self.ready_time = ready_time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_flow_entity_is_unprocessed() {
        let e = FlowEntity::new("e1", "load", 0.0);
        assert!(!e.is_processed());
        assert_eq!(e.departure_time, None);
    }

    #[test]
    fn stamping_departure_marks_processed() {
        let mut e = FlowEntity::new("e1", "load", 0.0);
        e.departure_time = Some(0.0);
        assert!(e.is_processed());
    }

    #[test]
    fn disposable_resource_builder() {
        let r = ResourceEntity::new("t1", "token").disposable().ready_at(3.0);
        assert!(r.disposable);
        assert_eq!(r.ready_time, 3.0);
        assert!(r.available);
    }
}
