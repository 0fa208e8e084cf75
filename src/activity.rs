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

//! Activities: the static nodes of the model graph.

use std::fmt;

/// A capability that produces a non-negative duration when an activity
/// begins service.
///
/// The engine treats this entirely opaquely: it calls `sample` once per
/// begin-service attempt and otherwise never inspects the implementor.
/// Implementations may be stateless (a constant) or stateful (an RNG
/// wrapped around a distribution); determinism is the caller's
/// responsibility, not the engine's.
pub trait DurationSampler {
    /// Produce the next duration. Must be finite and non-negative; the
    /// engine surfaces a negative value as
    /// [`crate::error::EngineError::NegativeDuration`].
    fn sample(&mut self) -> f64;
}

/// A [`DurationSampler`] that always returns the same value. Useful for
/// tests and for activities with a fixed, deterministic duration.
#[derive(Debug, Clone, Copy)]
pub struct ConstantDuration(pub f64);

impl DurationSampler for ConstantDuration {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

impl<F> DurationSampler for F
where
    F: FnMut() -> f64,
{
    fn sample(&mut self) -> f64 {
        self()
    }
}

/// A named operation with a duration, optional resource requirements, and
/// successors.
pub struct Activity {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Higher values are scheduled first among events tied on timestamp and
    /// kind.
    pub priority: i32,
    /// Resource types that must all be acquired, atomically, before this
    /// activity can begin.
    pub required_resources: Vec<String>,
    /// Subset of `required_resources` that are released (become available
    /// again) when this activity ends, rather than being disposed of or
    /// held indefinitely.
    pub released_resources: Vec<String>,
    /// Resource types freshly created (as disposable resources) when this
    /// activity ends.
    pub generated_resources: Vec<String>,
    /// Activity ids that receive a freshly spawned flow entity when this
    /// activity ends.
    pub successor_activities: Vec<String>,
    /// Produces the service duration for each instance of this activity.
    pub duration_sampler: Box<dyn DurationSampler>,
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("required_resources", &self.required_resources)
            .field("released_resources", &self.released_resources)
            .field("generated_resources", &self.generated_resources)
            .field("successor_activities", &self.successor_activities)
            .finish()
    }
}

impl Activity {
    /// Create a new activity with no resource requirements, no successors,
    /// and default priority `0`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        duration_sampler: impl DurationSampler + 'static,
    ) -> Self {
        Activity {
            id: id.into(),
            name: name.into(),
            priority: 0,
            required_resources: Vec::new(),
            released_resources: Vec::new(),
            generated_resources: Vec::new(),
            successor_activities: Vec::new(),
            duration_sampler: Box::new(duration_sampler),
        }
    }

    /// Set the priority (builder style).
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a required resource type (builder style).
    pub fn requires(mut self, resource_type: impl Into<String>) -> Self {
        self.required_resources.push(resource_type.into());
        self
    }

    /// Mark a resource type as released at end of service (builder style).
    /// Has no effect unless the same type is also in `required_resources`.
    pub fn releases(mut self, resource_type: impl Into<String>) -> Self {
        self.released_resources.push(resource_type.into());
        self
    }

    /// Add a resource type generated at end of service (builder style).
    pub fn generates(mut self, resource_type: impl Into<String>) -> Self {
        self.generated_resources.push(resource_type.into());
        self
    }

    /// Add a successor activity (builder style).
    pub fn then(mut self, activity_id: impl Into<String>) -> Self {
        self.successor_activities.push(activity_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_duration_is_stable() {
        let mut s = ConstantDuration(2.0);
        assert_eq!(s.sample(), 2.0);
        assert_eq!(s.sample(), 2.0);
    }

    #[test]
    fn closure_duration_sampler() {
        let mut n = 0.0;
        let mut s = move || {
            n += 1.0;
            n
        };
        assert_eq!(s.sample(), 1.0);
        assert_eq!(s.sample(), 2.0);
    }

    #[test]
    fn builder_assembles_activity() {
        let a = Activity::new("load", "Load truck", ConstantDuration(2.0))
            .priority(5)
            .requires("loader")
            .releases("loader")
            .then("haul");
        assert_eq!(a.priority, 5);
        assert_eq!(a.required_resources, vec!["loader".to_string()]);
        assert_eq!(a.released_resources, vec!["loader".to_string()]);
        assert_eq!(a.successor_activities, vec!["haul".to_string()]);
    }
}
