// ABOUTME: Decides whether a set of watched tasks has succeeded, failed or is still starting.
// ABOUTME: The first RUNNING or STOPPED task in order decides the outcome.

use crate::aws::shared_types::{TaskInfo, TaskStatus};

/// Outcome of one look at the watched tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskWatchStatus {
    /// Nothing decisive yet, poll again.
    Continue,
    /// A watched task reached RUNNING.
    Finish,
    /// A watched task stopped before one reached RUNNING.
    Terminate { task: String },
}

impl TaskWatchStatus {
    pub fn from_tasks(tasks: &[TaskInfo]) -> Self {
        for task in tasks {
            match task.last_status {
                TaskStatus::Running => return TaskWatchStatus::Finish,
                TaskStatus::Stopped => {
                    return TaskWatchStatus::Terminate {
                        task: task.arn.to_string(),
                    };
                }
                _ => {}
            }
        }
        TaskWatchStatus::Continue
    }
}
