//! Task files
//!
//! A task file is a YAML list of invocations:
//!
//! ```yaml
//! - name: Create the admins group
//!   resource: groups
//!   action: create
//!   params:
//!     name: Admins
//! - resource: users
//!   action: delete
//!   params: { id: 00u1abcd }
//! ```
//!
//! Tasks run through a buffered stream, so results come back in file order
//! whatever the concurrency. After the first failed task no new task is
//! started; tasks already running finish and are reported.

use crate::error::{OktaError, ValidationError};
use crate::okta::client::OktaClient;
use crate::okta::http::Transport;
use crate::resource::{Action, Invocation, Outcome, ParameterSet, ResourceKind};
use anyhow::{Context, Result};
use futures::future;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// One entry of a task file
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub name: Option<String>,
    pub resource: String,
    pub action: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Task {
    pub fn to_invocation(&self) -> Result<Invocation, ValidationError> {
        let kind: ResourceKind = self.resource.parse()?;
        let action: Action = self.action.parse()?;
        Ok(Invocation::new(
            kind,
            action,
            ParameterSet::from_json_map(self.params.clone()),
        ))
    }

    /// Label used in output and logs
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.resource, self.action))
    }
}

/// Parse a task file's contents
pub fn parse_tasks(content: &str) -> Result<Vec<Task>> {
    serde_yaml::from_str(content).context("Failed to parse task file")
}

/// Load tasks from disk
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file {}", path.display()))?;
    parse_tasks(&content)
}

/// Result of one task
#[derive(Debug)]
pub struct TaskResult {
    pub label: String,
    pub result: std::result::Result<Outcome, OktaError>,
}

/// Run tasks in order, at most `concurrency` in flight.
///
/// Once a task fails no further task is started. Tasks already in flight
/// still finish and are reported, so the returned list holds every task
/// that reached the backend; tasks past its end never started.
pub async fn run_tasks<T: Transport>(
    client: &OktaClient<T>,
    tasks: &[Task],
    concurrency: usize,
) -> Vec<TaskResult> {
    let stopped = AtomicBool::new(false);

    let mut results = stream::iter(tasks)
        .take_while(|_| future::ready(!stopped.load(Ordering::SeqCst)))
        .map(|task| async move {
            let label = task.label();
            tracing::info!("Running task: {}", label);
            let result = match task.to_invocation() {
                Ok(invocation) => client.invoke(&invocation).await,
                Err(e) => Err(e.into()),
            };
            TaskResult { label, result }
        })
        .buffered(concurrency.max(1));

    let mut completed = Vec::with_capacity(tasks.len());
    while let Some(task_result) = results.next().await {
        if task_result.result.is_err() && !stopped.swap(true, Ordering::SeqCst) {
            tracing::warn!(
                "Task '{}' failed; not starting further tasks",
                task_result.label
            );
        }
        completed.push(task_result);
    }

    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{AppVariant, ParamValue};

    const TASKS: &str = r#"
- name: Create the admins group
  resource: groups
  action: create
  params:
    name: Admins
    description: People with keys
- resource: saml_apps
  action: assign_user
  params: { id: A1, user_id: U1, send_email: true }
- resource: users
  action: list
"#;

    #[test]
    fn test_parse_tasks() {
        let tasks = parse_tasks(TASKS).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].label(), "Create the admins group");
        assert_eq!(tasks[2].label(), "users list");
        assert!(tasks[2].params.is_empty());
    }

    #[test]
    fn test_task_to_invocation() {
        let tasks = parse_tasks(TASKS).unwrap();
        let invocation = tasks[1].to_invocation().unwrap();
        assert_eq!(invocation.kind, ResourceKind::Application(AppVariant::Saml));
        assert_eq!(invocation.action, Action::AssignUser);
        assert_eq!(invocation.params.get("send_email"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn test_unknown_resource_in_task() {
        let task = Task {
            name: None,
            resource: "widgets".to_string(),
            action: "list".to_string(),
            params: Map::new(),
        };
        assert_eq!(
            task.to_invocation().unwrap_err(),
            ValidationError::UnknownResource("widgets".to_string())
        );
    }

    #[test]
    fn test_malformed_task_file() {
        assert!(parse_tasks("- resource: groups\n  params: [").is_err());
    }
}
