//! Defines the interface that [`TargetResolver`](crate::TargetResolver) requires in order
//! to list the tasks of a given service.

use crate::{ServiceId, Task, TaskState};

/// Which tasks to list: those of `service` the orchestrator wants in `desired_state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub service: ServiceId,
    pub desired_state: TaskState,
}

impl TaskFilter {
    /// Tasks of `service` that are meant to be running.
    pub fn running(service: ServiceId) -> Self {
        Self {
            service,
            desired_state: TaskState::Running,
        }
    }
}

/// Interface that provides functionality to
/// list the tasks of a service from the orchestration control plane.
#[async_trait::async_trait]
pub trait TaskLookup {
    /// Return the tasks matching [`TaskFilter`], in the order the control plane reports them.
    /// If no task matches, an empty Vec is returned.
    ///
    /// Errors are the control plane call itself failing, e.g. connectivity loss.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, anyhow::Error>;
}
