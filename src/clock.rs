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

//! The simulation clock. Holds the current simulated time and enforces
//! that it only ever moves forward.

use crate::error::EngineError;

/// Tracks the current simulated time.
///
/// Time only ever moves forward: [`Clock::advance`] refuses a timestamp
/// earlier than the current one.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Clock {
    now: f64,
}

impl Clock {
    /// Create a clock starting at time zero.
    pub fn new() -> Clock {
        Clock { now: 0.0 }
    }

    /// Returns the current simulated time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Advances the clock to `t`.
    ///
    /// # Errors
    /// Returns [`EngineError::MonotonicityViolation`] if `t` is earlier than
    /// the current time.
    pub fn advance(&mut self, t: f64) -> Result<(), EngineError> {
        if t < self.now {
            return Err(EngineError::MonotonicityViolation {
                attempted: t,
                current: self.now,
            });
        }
        self.now = t;
        Ok(())
    }
}
