//! Provisioning and teardown of the stored routine group.

mod routines;

pub use routines::{
    group_body, group_definition, group_drop, identifier, ParamType, Routine, USER_ROUTINES,
};

use tracing::info;

use common::AppResult;

use crate::executor::ScriptExecutor;

/// Creates the routine group before a run and drops it afterwards.
pub struct RoutineLifecycle {
    scripts: ScriptExecutor,
    group: String,
    module: String,
}

impl RoutineLifecycle {
    /// Create a fixture for `group`, bound to the implementation `module`.
    pub fn new(scripts: ScriptExecutor, group: &str, module: &str) -> AppResult<Self> {
        Ok(Self {
            scripts,
            group: identifier("routine group", group)?.to_string(),
            module: identifier("routine module", module)?.to_string(),
        })
    }

    /// Submit the group definition, then the group body.
    pub async fn setup(&self) -> AppResult<()> {
        self.scripts
            .run(&group_definition(&self.group, &self.module))
            .await?;
        info!(group = %self.group, module = %self.module, "Routine group declared");

        self.scripts
            .run(&group_body(&self.group, &self.module))
            .await?;
        info!(group = %self.group, routines = USER_ROUTINES.len(), "Routine group created");

        Ok(())
    }

    /// Drop the routine group.
    pub async fn teardown(&self) -> AppResult<()> {
        self.scripts.run(&group_drop(&self.group)).await?;
        info!(group = %self.group, "Routine group dropped");
        Ok(())
    }
}
