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

//! Raw per-activity and per-resource samples collected as a side effect of
//! the engine's begin/end handlers. Exporting these to CSV/JSON or a
//! dashboard is a collaborator's job, not this crate's.

use std::collections::HashMap;

/// Waiting/service samples and completion count for a single activity.
#[derive(Debug, Default, Clone)]
pub struct ActivityStatistics {
    /// One sample per completed service: time spent waiting for resources
    /// (or `0.0` for activities with no requirements).
    pub waiting_times: Vec<f64>,
    /// One sample per completed service: the sampled duration.
    pub service_times: Vec<f64>,
    /// Number of times this activity has completed service.
    pub completion_count: u64,
}

/// Busy intervals recorded for a single resource.
#[derive(Debug, Default, Clone)]
pub struct ResourceStatistics {
    /// Non-overlapping `[start, end]` intervals during which the resource
    /// was held by some activity instance.
    pub busy_intervals: Vec<(f64, f64)>,
}

impl ResourceStatistics {
    /// Total time this resource spent busy.
    pub fn busy_time(&self) -> f64 {
        self.busy_intervals.iter().map(|(s, e)| e - s).sum()
    }

    /// Fraction of `total_time` this resource spent busy, in `[0, 1]`.
    /// Returns `0.0` if `total_time` is not positive.
    pub fn utilization(&self, total_time: f64) -> f64 {
        if total_time > 0.0 {
            self.busy_time() / total_time
        } else {
            0.0
        }
    }

    /// The complement of the busy intervals against `[0, total_time]`,
    /// i.e. the periods during which the resource was idle. Derived on
    /// demand rather than stored, per the collector's invariants.
    pub fn idle_intervals(&self, total_time: f64) -> Vec<(f64, f64)> {
        let mut sorted: Vec<(f64, f64)> = self.busy_intervals.clone();
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("interval start must not be NaN"));

        let mut idle = Vec::new();
        let mut cursor = 0.0;
        for (start, end) in sorted {
            if start > cursor {
                idle.push((cursor, start));
            }
            cursor = cursor.max(end);
        }
        if cursor < total_time {
            idle.push((cursor, total_time));
        }
        idle
    }
}

/// Accumulates per-activity and per-resource samples over the course of a
/// run.
#[derive(Debug, Default)]
pub struct Statistics {
    activities: HashMap<String, ActivityStatistics>,
    resources: HashMap<String, ResourceStatistics>,
    /// Total simulated time the run covered, set at finalize.
    pub total_simulation_time: f64,
}

impl Statistics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Ensure an activity has a statistics row, creating an empty one if
    /// absent.
    pub fn init_activity(&mut self, activity_id: &str) {
        self.activities
            .entry(activity_id.to_string())
            .or_insert_with(ActivityStatistics::default);
    }

    /// Ensure a resource has a statistics row, creating an empty one if
    /// absent.
    pub fn init_resource(&mut self, resource_id: &str) {
        self.resources
            .entry(resource_id.to_string())
            .or_insert_with(ResourceStatistics::default);
    }

    /// Record one completed service instance at `activity_id`.
    pub fn record_service(&mut self, activity_id: &str, waiting_time: f64, service_time: f64) {
        let row = self
            .activities
            .entry(activity_id.to_string())
            .or_insert_with(ActivityStatistics::default);
        row.waiting_times.push(waiting_time);
        row.service_times.push(service_time);
    }

    /// Record that `activity_id` completed one more instance.
    pub fn record_completion(&mut self, activity_id: &str) {
        let row = self
            .activities
            .entry(activity_id.to_string())
            .or_insert_with(ActivityStatistics::default);
        row.completion_count += 1;
    }

    /// Record that `resource_id` was busy over `[start, end]`.
    pub fn record_busy_interval(&mut self, resource_id: &str, start: f64, end: f64) {
        let row = self
            .resources
            .entry(resource_id.to_string())
            .or_insert_with(ResourceStatistics::default);
        row.busy_intervals.push((start, end));
    }

    /// Statistics for a single activity, if any samples were recorded.
    pub fn activity(&self, activity_id: &str) -> Option<&ActivityStatistics> {
        self.activities.get(activity_id)
    }

    /// Statistics for a single resource, if any samples were recorded.
    pub fn resource(&self, resource_id: &str) -> Option<&ResourceStatistics> {
        self.resources.get(resource_id)
    }

    /// All per-activity rows, keyed by activity id.
    pub fn activities(&self) -> &HashMap<String, ActivityStatistics> {
        &self.activities
    }

    /// All per-resource rows, keyed by resource id.
    pub fn resources(&self) -> &HashMap<String, ResourceStatistics> {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_service_samples() {
        let mut stats = Statistics::new();
        stats.record_service("load", 2.0, 3.0);
        stats.record_completion("load");
        let row = stats.activity("load").unwrap();
        assert_eq!(row.waiting_times, vec![2.0]);
        assert_eq!(row.service_times, vec![3.0]);
        assert_eq!(row.completion_count, 1);
    }

    #[test]
    fn utilization_is_busy_over_total() {
        let mut stats = Statistics::new();
        stats.record_busy_interval("loader", 0.0, 4.0);
        stats.record_busy_interval("loader", 10.0, 14.0);
        let row = stats.resource("loader").unwrap();
        assert_eq!(row.busy_time(), 8.0);
        assert_eq!(row.utilization(20.0), 0.4);
    }

    #[test]
    fn idle_intervals_fill_the_gaps() {
        let mut stats = Statistics::new();
        stats.record_busy_interval("loader", 2.0, 4.0);
        let row = stats.resource("loader").unwrap();
        assert_eq!(row.idle_intervals(10.0), vec![(0.0, 2.0), (4.0, 10.0)]);
    }
}
