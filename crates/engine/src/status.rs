// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container status for the HTTP surface.

use crate::deps::EngineDeps;
use crate::error::PipelineError;
use ob_adapters::ContainerStatus;
use serde::Serialize;

/// One configured container's state, tagged with its app.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppContainerStatus {
    pub app: String,
    #[serde(flatten)]
    pub container: ContainerStatus,
}

/// Inspect every container declared in the apps config.
pub fn status_apps(deps: &EngineDeps) -> Result<Vec<AppContainerStatus>, PipelineError> {
    let apps = deps.load_apps()?;
    let mut statuses = Vec::new();
    for (app, cfg) in &apps.apps {
        for name in &cfg.containers {
            statuses.push(AppContainerStatus {
                app: app.clone(),
                container: deps.docker.inspect(name),
            });
        }
    }
    Ok(statuses)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
