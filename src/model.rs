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

//! The static model: activities, initial flow entities and initial
//! resources, and the validation that binds them together.

use std::collections::HashMap;

use crate::activity::Activity;
use crate::entity::{FlowEntity, ResourceEntity};
use crate::error::ModelStructureError;

/// The static topology a [`crate::engine::Engine`] runs: a named id-keyed
/// table of activities, plus the flow entities and resources present at
/// time zero.
#[derive(Default)]
pub struct Model {
    /// The model's name, for diagnostics only.
    pub name: String,
    /// Activities, keyed by id.
    pub activities: HashMap<String, Activity>,
    /// Flow entities present in the simulation at time zero.
    pub initial_flow_entities: Vec<FlowEntity>,
    /// Resources present in the simulation at time zero.
    pub initial_resources: Vec<ResourceEntity>,
}

impl Model {
    /// Create an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Model {
            name: name.into(),
            activities: HashMap::new(),
            initial_flow_entities: Vec::new(),
            initial_resources: Vec::new(),
        }
    }

    /// Register an activity. Returns `false` (and does not insert) if an
    /// activity with the same id is already present.
    pub fn add_activity(&mut self, activity: Activity) -> bool {
        if self.activities.contains_key(&activity.id) {
            return false;
        }
        self.activities.insert(activity.id.clone(), activity);
        true
    }

    /// Add a flow entity present at time zero.
    pub fn add_flow_entity(&mut self, entity: FlowEntity) {
        self.initial_flow_entities.push(entity);
    }

    /// Add a resource present at time zero.
    pub fn add_resource(&mut self, resource: ResourceEntity) {
        self.initial_resources.push(resource);
    }

    /// Look up an activity by id.
    pub fn get_activity(&self, activity_id: &str) -> Option<&Activity> {
        self.activities.get(activity_id)
    }

    /// Validate the model's structure, returning every problem found.
    ///
    /// Checks: every `successor_activities` target exists; every initial
    /// flow entity's `activity_id` exists. Duplicate activity ids are not
    /// checked here: `activities` is keyed by id, so the table itself can
    /// never hold two entries under the same id by the time `validate` sees
    /// it. [`Self::add_activity`] is the place a collision is actually
    /// observable (it rejects the second insertion and reports `false`);
    /// [`ModelStructureError::DuplicateActivity`] is reserved for a future
    /// bulk-construction API that wants to collect every problem at once
    /// instead of failing on first insert.
    pub fn validate(&self) -> Vec<ModelStructureError> {
        let mut errors = Vec::new();

        for activity in self.activities.values() {
            for successor in &activity.successor_activities {
                if !self.activities.contains_key(successor) {
                    errors.push(ModelStructureError::DanglingSuccessor {
                        activity: activity.id.clone(),
                        successor: successor.clone(),
                    });
                }
            }
        }

        for entity in &self.initial_flow_entities {
            if !self.activities.contains_key(&entity.activity_id) {
                errors.push(ModelStructureError::UnknownInitialActivity {
                    entity: entity.id.clone(),
                    activity: entity.activity_id.clone(),
                });
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{Activity, ConstantDuration};

    #[test]
    fn empty_model_is_valid() {
        let m = Model::new("empty");
        assert!(m.validate().is_empty());
    }

    #[test]
    fn rejects_duplicate_activity_on_insert() {
        let mut m = Model::new("m");
        assert!(m.add_activity(Activity::new("a", "A", ConstantDuration(1.0))));
        assert!(!m.add_activity(Activity::new("a", "A again", ConstantDuration(1.0))));
        assert_eq!(m.activities.len(), 1);
    }

    #[test]
    fn flags_dangling_successor() {
        let mut m = Model::new("m");
        m.add_activity(Activity::new("a", "A", ConstantDuration(1.0)).then("b"));
        let errors = m.validate();
        assert_eq!(
            errors,
            vec![ModelStructureError::DanglingSuccessor {
                activity: "a".into(),
                successor: "b".into(),
            }]
        );
    }

    #[test]
    fn flags_unknown_initial_activity() {
        let mut m = Model::new("m");
        m.add_flow_entity(FlowEntity::new("e1", "missing", 0.0));
        let errors = m.validate();
        assert_eq!(
            errors,
            vec![ModelStructureError::UnknownInitialActivity {
                entity: "e1".into(),
                activity: "missing".into(),
            }]
        );
    }
}
