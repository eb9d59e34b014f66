use std::sync::Arc;
use swarm_targets::{ServiceId, Task, TaskFilter, TaskLookup};
use tokio::sync::Mutex;

/// In-memory control plane.
///
/// Applies the service and desired-state filter the way the engine does and
/// records every filter it was asked for.
#[derive(Clone, Default)]
pub struct TestTaskLookup {
    tasks: Arc<Mutex<Vec<Task>>>,
    failure: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<TaskFilter>>>,
}

impl TestTaskLookup {
    pub async fn add_task(&mut self, task: Task) {
        self.tasks.lock().await.push(task);
    }

    pub async fn remove_tasks_of(&mut self, service: &ServiceId) {
        self.tasks.lock().await.retain(|task| &task.service != service);
    }

    /// Make every following listing fail with `message`.
    pub async fn fail_with(&mut self, message: &str) {
        *self.failure.lock().await = Some(message.to_string());
    }

    pub async fn calls(&self) -> Vec<TaskFilter> {
        self.calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl TaskLookup for TestTaskLookup {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, anyhow::Error> {
        self.calls.lock().await.push(filter.clone());

        if let Some(message) = self.failure.lock().await.as_ref() {
            return Err(anyhow::anyhow!(message.clone()));
        }

        Ok(self
            .tasks
            .lock()
            .await
            .iter()
            .filter(|task| task.service == filter.service && task.desired_state == filter.desired_state)
            .cloned()
            .collect())
    }
}
