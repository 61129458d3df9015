//! End-to-end user scenario over any repository.
//!
//! The scenario owns the ids it creates and threads them explicitly from
//! one step to the next; nothing is kept between runs.

use std::fmt::Debug;
use std::sync::Arc;

use common::{AppError, AppResult};

use crate::repository::UserRepository;

/// One executed step and what it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub operation: String,
    pub outcome: String,
}

/// Steps executed by a scenario run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioReport {
    pub user_id: Option<i64>,
    pub steps: Vec<Step>,
}

impl ScenarioReport {
    fn record(&mut self, operation: impl Into<String>, outcome: impl Debug) {
        let step = Step {
            operation: operation.into(),
            outcome: format!("{:?}", outcome),
        };
        tracing::info!(operation = %step.operation, outcome = %step.outcome, "Scenario step");
        self.steps.push(step);
    }
}

fn expect<T: PartialEq + Debug>(operation: &str, actual: &T, expected: &T) -> AppResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(AppError::scenario(format!(
            "{} returned {:?}, expected {:?}",
            operation, actual, expected
        )))
    }
}

/// Drives the create/read/update/delete scenario.
pub struct UserScenario {
    repo: Arc<dyn UserRepository>,
}

impl UserScenario {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Create `name`, read it back, rename it to `renamed`, delete it, and
    /// check that the id then reads as absent and mutates nothing.
    pub async fn run(&self, name: &str, renamed: &str) -> AppResult<ScenarioReport> {
        let mut report = ScenarioReport::default();

        let id = self.repo.create(name).await?;
        report.user_id = Some(id);
        report.record(format!("create({:?})", name), id);

        let fetched = self.repo.get_by_id(id).await?;
        report.record(format!("get_by_id({})", id), &fetched);
        expect("get_by_id", &fetched, &Some(name.to_string()))?;

        let updated = self.repo.update(id, renamed).await?;
        report.record(format!("update({}, {:?})", id, renamed), updated);
        expect("update", &updated, &1)?;

        let fetched = self.repo.get_by_id(id).await?;
        report.record(format!("get_by_id({})", id), &fetched);
        expect("get_by_id", &fetched, &Some(renamed.to_string()))?;

        let deleted = self.repo.delete(id).await?;
        report.record(format!("delete({})", id), deleted);
        expect("delete", &deleted, &1)?;

        let fetched = self.repo.get_by_id(id).await?;
        report.record(format!("get_by_id({})", id), &fetched);
        expect("get_by_id", &fetched, &None)?;

        self.check_missing(id, renamed, &mut report).await?;

        Ok(report)
    }

    /// Mutating a missing id affects nothing and is not an error.
    async fn check_missing(
        &self,
        missing_id: i64,
        name: &str,
        report: &mut ScenarioReport,
    ) -> AppResult<()> {
        let updated = self.repo.update(missing_id, name).await?;
        report.record(format!("update({}, {:?})", missing_id, name), updated);
        expect("update of a missing id", &updated, &0)?;

        let deleted = self.repo.delete(missing_id).await?;
        report.record(format!("delete({})", missing_id), deleted);
        expect("delete of a missing id", &deleted, &0)
    }

    /// Create every name, check the listing contains them all, then delete them.
    pub async fn check_listing(&self, names: &[&str]) -> AppResult<ScenarioReport> {
        let mut report = ScenarioReport::default();

        let ids = futures::future::try_join_all(names.iter().map(|name| self.repo.create(name)))
            .await?;
        report.record(format!("create {:?}", names), &ids);

        let users = self.repo.list_all().await?;
        report.record("list_all()", users.len());

        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !users.iter().any(|user| user.name == *name))
            .collect();

        for id in ids {
            let deleted = self.repo.delete(id).await?;
            report.record(format!("delete({})", id), deleted);
        }

        if missing.is_empty() {
            Ok(report)
        } else {
            Err(AppError::scenario(format!(
                "list_all() is missing {:?}",
                missing
            )))
        }
    }
}
