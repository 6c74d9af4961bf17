//! Persistence interface for simulations and their auxiliary records
//!
//! The engine never touches storage. Callers decide what to persist: a
//! simulation holds its parameters plus a `MetricsSnapshot` of the results,
//! and templates, scenarios, versions and shares hang off it.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::SimulationParameters;
use crate::projection::{MetricsSnapshot, ProjectionResult};
use crate::scenario::Scenario;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub id: String,
    pub user_id: String,
    pub business_model: String,
    pub parameters: SimulationParameters,
    pub results: MetricsSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSimulation {
    pub user_id: String,
    pub business_model: String,
    pub parameters: SimulationParameters,
    pub results: MetricsSnapshot,
}

impl NewSimulation {
    /// Payload for a finished projection run
    pub fn from_result(user_id: impl Into<String>, result: &ProjectionResult) -> Self {
        Self {
            user_id: user_id.into(),
            business_model: result.model.clone(),
            parameters: result.params,
            results: result.metrics.snapshot(),
        }
    }
}

/// A saved named parameter set, scoped to a user and business model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    pub user_id: String,
    pub template_name: String,
    pub business_model: String,
    pub parameters: SimulationParameters,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: String,
    pub simulation_id: String,
    pub scenario_name: String,
    pub description: Option<String>,
    pub parameters: SimulationParameters,
    pub results: Option<MetricsSnapshot>,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time copy of a simulation, numbered 1, 2, 3... per simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    pub simulation_id: String,
    pub version_number: u32,
    pub parameters: SimulationParameters,
    pub results: MetricsSnapshot,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
}

impl Permission {
    pub fn can_edit(&self) -> bool {
        matches!(self, Permission::Edit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub id: String,
    pub simulation_id: String,
    pub shared_by: String,
    pub shared_with_email: String,
    pub permission: Permission,
    pub created_at: DateTime<Utc>,
}

/// Storage operations the simulator needs from its backing store.
///
/// Listings come back newest first, except versions which are ordered by
/// descending version number.
pub trait SimulationStore {
    fn insert_simulation(&mut self, new: NewSimulation) -> Result<SimulationRecord>;
    fn get_simulation(&self, id: &str) -> Result<SimulationRecord>;
    /// Fetch several simulations; fails if any id is unknown
    fn get_simulations(&self, ids: &[&str]) -> Result<Vec<SimulationRecord>>;
    fn list_simulations(&self, user_id: &str) -> Vec<SimulationRecord>;
    fn update_simulation(
        &mut self,
        id: &str,
        parameters: SimulationParameters,
        results: MetricsSnapshot,
    ) -> Result<SimulationRecord>;
    /// Removes the simulation with its scenarios, versions and shares
    fn delete_simulation(&mut self, id: &str) -> Result<()>;

    fn save_template(
        &mut self,
        user_id: &str,
        template_name: &str,
        business_model: &str,
        parameters: SimulationParameters,
        description: Option<String>,
    ) -> Result<TemplateRecord>;
    fn list_templates(&self, user_id: &str, business_model: &str) -> Vec<TemplateRecord>;
    fn delete_template(&mut self, id: &str) -> Result<()>;

    fn save_scenario(
        &mut self,
        simulation_id: &str,
        scenario: &Scenario,
        results: Option<MetricsSnapshot>,
    ) -> Result<ScenarioRecord>;
    fn list_scenarios(&self, simulation_id: &str) -> Vec<ScenarioRecord>;

    /// Copy the simulation's current parameters and results into the next version
    fn snapshot_version(
        &mut self,
        simulation_id: &str,
        created_by: &str,
        notes: Option<String>,
    ) -> Result<VersionRecord>;
    fn list_versions(&self, simulation_id: &str) -> Vec<VersionRecord>;
    /// Write a version's parameters and results back onto the simulation
    fn restore_version(&mut self, simulation_id: &str, version_number: u32) -> Result<SimulationRecord>;

    /// Grant access; sharing again with the same address replaces the permission
    fn share(
        &mut self,
        simulation_id: &str,
        shared_by: &str,
        email: &str,
        permission: Permission,
    ) -> Result<ShareRecord>;
    fn list_shares(&self, simulation_id: &str) -> Vec<ShareRecord>;
}
