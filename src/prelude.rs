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

//! The sdesa-core prelude.
//!
//! The prelude is a list of things that you can import into your program
//! with a single `use`. It includes the types used in almost every
//! simulation built with this crate.
//!
//! ```
//! use sdesa_core::prelude::*;
//! ```

pub use crate::activity::{Activity, ConstantDuration, DurationSampler};
pub use crate::engine::Engine;
pub use crate::entity::{AttributeValue, FlowEntity, ResourceEntity};
pub use crate::error::{EngineError, ModelStructureError};
pub use crate::event::{Event, EventCalendar, EventKind};
pub use crate::model::Model;
pub use crate::statistics::{ActivityStatistics, ResourceStatistics, Statistics};
