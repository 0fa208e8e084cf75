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

//! Error types surfaced by model validation and the engine.
//!
//! Resource starvation is deliberately absent from [`EngineError`]: a flow
//! entity that can never acquire its required resources is a modelling
//! outcome, not a failure, and is only observable through
//! [`crate::engine::Engine::pending_entities`].

use thiserror::Error;

/// A structural problem found while validating a [`crate::model::Model`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelStructureError {
    /// Two activities were registered under the same id.
    #[error("duplicate activity id: {0}")]
    DuplicateActivity(String),

    /// An activity's successor list names an activity that does not exist.
    #[error("activity {activity} has a successor {successor} that does not exist")]
    DanglingSuccessor {
        /// The activity declaring the successor.
        activity: String,
        /// The missing successor id.
        successor: String,
    },

    /// An initial flow entity references an activity that does not exist.
    #[error("initial flow entity {entity} references unknown activity {activity}")]
    UnknownInitialActivity {
        /// The offending flow entity id.
        entity: String,
        /// The missing activity id.
        activity: String,
    },
}

/// Errors raised by [`crate::model::Model`] construction/validation and by
/// [`crate::engine::Engine`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The model failed structural validation; every problem found is
    /// reported, not just the first.
    #[error("invalid model: {0:?}")]
    InvalidModel(Vec<ModelStructureError>),

    /// A component attempted to move simulated time backwards.
    #[error("clock monotonicity violated: attempted to advance to {attempted}, current time is {current}")]
    MonotonicityViolation {
        /// The timestamp that was rejected.
        attempted: f64,
        /// The clock's current time.
        current: f64,
    },

    /// A duration sampler returned a negative value.
    #[error("activity {activity} sampled a negative duration: {duration}")]
    NegativeDuration {
        /// The activity whose sampler misbehaved.
        activity: String,
        /// The offending sampled value.
        duration: f64,
    },
}
