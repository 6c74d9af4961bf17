//! In-process store used by tests and local drivers

use chrono::Utc;

use super::{
    NewSimulation, Permission, ScenarioRecord, ShareRecord, SimulationRecord, SimulationStore, TemplateRecord,
    VersionRecord,
};
use crate::error::{Result, SimError};
use crate::params::SimulationParameters;
use crate::projection::MetricsSnapshot;
use crate::scenario::Scenario;

/// Vector-backed store. Records are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: u64,
    simulations: Vec<SimulationRecord>,
    templates: Vec<TemplateRecord>,
    scenarios: Vec<ScenarioRecord>,
    versions: Vec<VersionRecord>,
    shares: Vec<ShareRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:06}", prefix, self.next_id)
    }

    fn simulation_mut(&mut self, id: &str) -> Result<&mut SimulationRecord> {
        self.simulations
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SimError::not_found("simulation", id))
    }

    fn require_simulation(&self, id: &str) -> Result<()> {
        self.get_simulation(id).map(|_| ())
    }
}

fn require_name(name: &str, kind: &'static str) -> Result<()> {
    if name.trim().is_empty() {
        Err(SimError::EmptyName(kind))
    } else {
        Ok(())
    }
}

fn newest_first<T: Clone>(records: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
    records.rev().collect()
}

impl SimulationStore for MemoryStore {
    fn insert_simulation(&mut self, new: NewSimulation) -> Result<SimulationRecord> {
        let now = Utc::now();
        let record = SimulationRecord {
            id: self.new_id("sim"),
            user_id: new.user_id,
            business_model: new.business_model,
            parameters: new.parameters,
            results: new.results,
            created_at: now,
            updated_at: now,
        };
        self.simulations.push(record.clone());
        log::debug!("stored simulation {}", record.id);
        Ok(record)
    }

    fn get_simulation(&self, id: &str) -> Result<SimulationRecord> {
        self.simulations
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| SimError::not_found("simulation", id))
    }

    fn get_simulations(&self, ids: &[&str]) -> Result<Vec<SimulationRecord>> {
        ids.iter().map(|id| self.get_simulation(id)).collect()
    }

    fn list_simulations(&self, user_id: &str) -> Vec<SimulationRecord> {
        newest_first(self.simulations.iter().filter(|s| s.user_id == user_id).cloned())
    }

    fn update_simulation(
        &mut self,
        id: &str,
        parameters: SimulationParameters,
        results: MetricsSnapshot,
    ) -> Result<SimulationRecord> {
        let record = self.simulation_mut(id)?;
        record.parameters = parameters;
        record.results = results;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn delete_simulation(&mut self, id: &str) -> Result<()> {
        self.require_simulation(id)?;
        self.simulations.retain(|s| s.id != id);
        self.scenarios.retain(|s| s.simulation_id != id);
        self.versions.retain(|v| v.simulation_id != id);
        self.shares.retain(|s| s.simulation_id != id);
        Ok(())
    }

    fn save_template(
        &mut self,
        user_id: &str,
        template_name: &str,
        business_model: &str,
        parameters: SimulationParameters,
        description: Option<String>,
    ) -> Result<TemplateRecord> {
        require_name(template_name, "template")?;

        let record = TemplateRecord {
            id: self.new_id("tpl"),
            user_id: user_id.to_string(),
            template_name: template_name.trim().to_string(),
            business_model: business_model.to_string(),
            parameters,
            description,
            created_at: Utc::now(),
        };
        self.templates.push(record.clone());
        Ok(record)
    }

    fn list_templates(&self, user_id: &str, business_model: &str) -> Vec<TemplateRecord> {
        newest_first(
            self.templates
                .iter()
                .filter(|t| t.user_id == user_id && t.business_model == business_model)
                .cloned(),
        )
    }

    fn delete_template(&mut self, id: &str) -> Result<()> {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        if self.templates.len() == before {
            return Err(SimError::not_found("template", id));
        }
        Ok(())
    }

    fn save_scenario(
        &mut self,
        simulation_id: &str,
        scenario: &Scenario,
        results: Option<MetricsSnapshot>,
    ) -> Result<ScenarioRecord> {
        self.require_simulation(simulation_id)?;
        require_name(&scenario.name, "scenario")?;

        let description = Some(scenario.description.clone()).filter(|d| !d.is_empty());
        let record = ScenarioRecord {
            id: self.new_id("scn"),
            simulation_id: simulation_id.to_string(),
            scenario_name: scenario.name.clone(),
            description,
            parameters: scenario.parameters,
            results,
            created_at: Utc::now(),
        };
        self.scenarios.push(record.clone());
        Ok(record)
    }

    fn list_scenarios(&self, simulation_id: &str) -> Vec<ScenarioRecord> {
        newest_first(self.scenarios.iter().filter(|s| s.simulation_id == simulation_id).cloned())
    }

    fn snapshot_version(
        &mut self,
        simulation_id: &str,
        created_by: &str,
        notes: Option<String>,
    ) -> Result<VersionRecord> {
        let simulation = self.get_simulation(simulation_id)?;
        let version_number = self
            .versions
            .iter()
            .filter(|v| v.simulation_id == simulation_id)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;

        let record = VersionRecord {
            id: self.new_id("ver"),
            simulation_id: simulation_id.to_string(),
            version_number,
            parameters: simulation.parameters,
            results: simulation.results,
            notes,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        };
        self.versions.push(record.clone());
        log::debug!("simulation {} saved as version {}", simulation_id, version_number);
        Ok(record)
    }

    fn list_versions(&self, simulation_id: &str) -> Vec<VersionRecord> {
        let mut versions: Vec<_> = self
            .versions
            .iter()
            .filter(|v| v.simulation_id == simulation_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        versions
    }

    fn restore_version(&mut self, simulation_id: &str, version_number: u32) -> Result<SimulationRecord> {
        let version = self
            .versions
            .iter()
            .find(|v| v.simulation_id == simulation_id && v.version_number == version_number)
            .cloned()
            .ok_or_else(|| SimError::VersionNotFound {
                simulation_id: simulation_id.to_string(),
                version: version_number,
            })?;

        self.update_simulation(simulation_id, version.parameters, version.results)
    }

    fn share(
        &mut self,
        simulation_id: &str,
        shared_by: &str,
        email: &str,
        permission: Permission,
    ) -> Result<ShareRecord> {
        self.require_simulation(simulation_id)?;

        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(SimError::invalid("sharedWithEmail", format!("'{}' is not an email address", email)));
        }

        if let Some(existing) = self
            .shares
            .iter_mut()
            .find(|s| s.simulation_id == simulation_id && s.shared_with_email == email)
        {
            existing.permission = permission;
            return Ok(existing.clone());
        }

        let record = ShareRecord {
            id: self.new_id("shr"),
            simulation_id: simulation_id.to_string(),
            shared_by: shared_by.to_string(),
            shared_with_email: email,
            permission,
            created_at: Utc::now(),
        };
        self.shares.push(record.clone());
        Ok(record)
    }

    fn list_shares(&self, simulation_id: &str) -> Vec<ShareRecord> {
        newest_first(self.shares.iter().filter(|s| s.simulation_id == simulation_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::BusinessModelProfile;
    use crate::projection::project;
    use crate::scenario::{Preset, Scenario};

    fn stored(store: &mut MemoryStore) -> SimulationRecord {
        let profile = BusinessModelProfile::zero_g_manufacturing();
        let result = project(&profile.defaults, &profile);
        store.insert_simulation(NewSimulation::from_result("user-1", &result)).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = MemoryStore::new();
        let record = stored(&mut store);

        assert_eq!(record.business_model, "Zero-G Manufacturing");
        assert_eq!(record.results.break_even_year, 3);
        assert_eq!(store.get_simulation(&record.id).unwrap(), record);
        assert!(matches!(store.get_simulation("sim-999999"), Err(SimError::NotFound { .. })));
        assert_eq!(store.list_simulations("user-1").len(), 1);
        assert!(store.list_simulations("user-2").is_empty());
    }

    #[test]
    fn test_get_many_fails_on_unknown_id() {
        let mut store = MemoryStore::new();
        let a = stored(&mut store);
        let b = stored(&mut store);

        let both = store.get_simulations(&[&a.id, &b.id]).unwrap();
        assert_eq!(both.len(), 2);
        assert!(store.get_simulations(&[&a.id, "nope"]).is_err());
    }

    #[test]
    fn test_versions_are_sequential_and_restorable() {
        let mut store = MemoryStore::new();
        let record = stored(&mut store);

        let v1 = store.snapshot_version(&record.id, "user-1", None).unwrap();
        assert_eq!(v1.version_number, 1);

        let mut changed = record.parameters;
        changed.years = 5;
        store
            .update_simulation(&record.id, changed, MetricsSnapshot::default())
            .unwrap();
        let v2 = store
            .snapshot_version(&record.id, "user-1", Some("shorter horizon".to_string()))
            .unwrap();
        assert_eq!(v2.version_number, 2);

        let numbers: Vec<_> = store.list_versions(&record.id).iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![2, 1]);

        let restored = store.restore_version(&record.id, 1).unwrap();
        assert_eq!(restored.parameters, record.parameters);
        assert_eq!(restored.results, record.results);

        assert!(matches!(
            store.restore_version(&record.id, 7),
            Err(SimError::VersionNotFound { version: 7, .. })
        ));
    }

    #[test]
    fn test_templates_are_scoped_and_named() {
        let mut store = MemoryStore::new();
        let params = BusinessModelProfile::space_tourism().defaults;

        assert!(matches!(
            store.save_template("user-1", "  ", "Space Tourism", params, None),
            Err(SimError::EmptyName("template"))
        ));

        let first = store.save_template("user-1", "aggressive", "Space Tourism", params, None).unwrap();
        store.save_template("user-1", "cautious", "Space Tourism", params, None).unwrap();
        store.save_template("user-1", "other", "Satellite Services", params, None).unwrap();
        store.save_template("user-2", "theirs", "Space Tourism", params, None).unwrap();

        let names: Vec<_> = store
            .list_templates("user-1", "Space Tourism")
            .into_iter()
            .map(|t| t.template_name)
            .collect();
        assert_eq!(names, vec!["cautious", "aggressive"]);

        store.delete_template(&first.id).unwrap();
        assert_eq!(store.list_templates("user-1", "Space Tourism").len(), 1);
        assert!(store.delete_template(&first.id).is_err());
    }

    #[test]
    fn test_scenarios_and_cascade_delete() {
        let mut store = MemoryStore::new();
        let record = stored(&mut store);

        let scenario = Scenario::from_preset(&record.parameters, Preset::WorstCase);
        let saved = store.save_scenario(&record.id, &scenario, None).unwrap();
        assert_eq!(saved.scenario_name, "Worst Case");
        assert_eq!(saved.parameters.years, 7);
        assert!(store.save_scenario("sim-missing", &scenario, None).is_err());

        store.snapshot_version(&record.id, "user-1", None).unwrap();
        store.share(&record.id, "user-1", "a@b.io", Permission::View).unwrap();

        store.delete_simulation(&record.id).unwrap();
        assert!(store.list_scenarios(&record.id).is_empty());
        assert!(store.list_versions(&record.id).is_empty());
        assert!(store.list_shares(&record.id).is_empty());
    }

    #[test]
    fn test_sharing() {
        let mut store = MemoryStore::new();
        let record = stored(&mut store);

        let share = store.share(&record.id, "user-1", " Crew@Orbit.io ", Permission::View).unwrap();
        assert_eq!(share.shared_with_email, "crew@orbit.io");
        assert!(!share.permission.can_edit());

        let upgraded = store.share(&record.id, "user-1", "crew@orbit.io", Permission::Edit).unwrap();
        assert_eq!(upgraded.id, share.id);
        assert_eq!(store.list_shares(&record.id).len(), 1);
        assert!(store.list_shares(&record.id)[0].permission.can_edit());

        assert!(matches!(
            store.share(&record.id, "user-1", "not-an-email", Permission::View),
            Err(SimError::InvalidParameter { .. })
        ));
        assert_eq!(serde_json::to_string(&Permission::Edit).unwrap(), "\"edit\"");
    }
}
