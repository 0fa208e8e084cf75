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

//! A discrete-event simulation engine built around the SDESA triad: an
//! event calendar, an all-or-nothing resource allocation protocol, and an
//! entity-propagation rule that spawns successor entities as each activity
//! completes.
//!
//! # Model
//! A [`model::Model`] is a static, id-keyed table of [`activity::Activity`]
//! nodes plus the [`entity::FlowEntity`] and [`entity::ResourceEntity`]
//! instances present at time zero. Activities declare the resource types
//! they require and release, the resource types they generate on
//! completion, and the successor activities a completing entity spawns
//! fresh entities at.
//!
//! # Engine
//! An [`engine::Engine`] drives a validated model forward in simulated
//! time. After every clock advance it eagerly starts service for every
//! flow entity that can acquire its activity's required resources (the
//! drain phase), and only blocks on the event calendar when none remain
//! eligible. A flow entity that never acquires its resources is left
//! pending rather than erroring: [`engine::Engine::pending_entities`] is
//! the only way to observe resource starvation.
//!
//! # Statistics
//! [`statistics::Statistics`] accumulates per-activity waiting/service
//! samples and per-resource busy intervals as a side effect of running the
//! engine; idle intervals are derived on demand rather than stored.
//!
//! ```
//! use sdesa_core::prelude::*;
//!
//! let mut model = Model::new("single loader");
//! model.add_activity(
//!     Activity::new("load", "Load truck", ConstantDuration(2.0))
//!         .requires("loader")
//!         .releases("loader"),
//! );
//! model.add_resource(ResourceEntity::new("loader-1", "loader"));
//! model.add_flow_entity(FlowEntity::new("truck-1", "load", 0.0));
//!
//! let mut engine = Engine::new(model).unwrap();
//! let stats = engine.run(f64::INFINITY).unwrap();
//! assert_eq!(stats.activity("load").unwrap().completion_count, 1);
//! ```

pub mod activity;
pub mod clock;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod model;
pub mod prelude;
pub mod queue;
pub mod statistics;
