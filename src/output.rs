// ABOUTME: Output formatting for CLI feedback and plan reports.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::aws::shared_types::RegisteredTaskDefinition;
use crate::bluegreen::{BlueGreenPlan, CutoverReport};
use crate::config::TaskDefinition;
use crate::plan::ServiceUpdatePlan;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => self.emit_event("warning", message, true),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => self.emit_event("success", message, false),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => self.emit_event("error", message, true),
        }
    }

    /// Print service update plans.
    pub fn service_plans(&self, plans: &[ServiceUpdatePlan]) {
        match self.mode {
            OutputMode::Normal => {
                for plan in plans {
                    print!("{}", render_service_plan(plan));
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_document("service_plans", plans),
        }
    }

    /// Print blue-green plans.
    pub fn blue_green_plans(&self, plans: &[BlueGreenPlan]) {
        match self.mode {
            OutputMode::Normal => {
                for plan in plans {
                    print!("{}", render_blue_green_plan(plan));
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_document("bluegreen_plans", plans),
        }
    }

    /// Print the task definitions `task apply` would register.
    pub fn task_plans(&self, tasks: &[TaskDefinition]) {
        match self.mode {
            OutputMode::Normal => {
                for task in tasks {
                    print!("{}", render_task_plan(task));
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_document("task_plans", tasks),
        }
    }

    pub fn registered_task_definitions(&self, registered: &[RegisteredTaskDefinition]) {
        match self.mode {
            OutputMode::Json => self.emit_document("task_definitions", registered),
            _ => {
                for revision in registered {
                    self.success(&format!("Registered task definition {}", revision.reference()));
                }
            }
        }
    }

    pub fn cutover_reports(&self, reports: &[CutoverReport]) {
        match self.mode {
            OutputMode::Json => self.emit_document("cutovers", reports),
            _ => {
                for report in reports {
                    self.success(&format!(
                        "{}: {} -> {}",
                        report.name, report.previous, report.live
                    ));
                }
            }
        }
    }

    fn emit_event(&self, event: &str, message: &str, to_stderr: bool) {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.start_time.map(|_| self.elapsed_secs()),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            if to_stderr {
                eprintln!("{json}");
            } else {
                println!("{json}");
            }
        }
    }

    fn emit_document<T: Serialize + ?Sized>(&self, kind: &str, body: &T) {
        let doc = JsonDocument { event: kind, body };
        match serde_json::to_string(&doc) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!("failed to encode {kind}: {e}"),
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonDocument<'a, T: ?Sized> {
    event: &'a str,
    body: &'a T,
}

/// Human-readable summary of one cluster's plan.
pub fn render_service_plan(plan: &ServiceUpdatePlan) -> String {
    let mut out = format!(
        "Cluster '{}' ({} container instances)\n",
        plan.cluster,
        plan.instance_arns.len()
    );

    for stack in plan.to_delete() {
        out.push_str(&format!("  - remove {}\n", stack.service.name));
    }
    for desired in plan.to_create() {
        out.push_str(&format!(
            "  + add    {} ({}, desired {})\n",
            desired.name, desired.task_definition, desired.desired_count
        ));
    }
    for (live, desired) in plan.to_update() {
        let desired_count = desired.next_desired_count(live.service.desired_count);
        out.push_str(&format!(
            "  ~ update {} ({} -> {}, desired {} -> {})\n",
            desired.name,
            live.service.task_definition,
            desired.task_definition,
            live.service.desired_count,
            desired_count
        ));
    }
    out
}

pub fn render_task_plan(task: &TaskDefinition) -> String {
    let mut out = format!("Task definition '{}'\n", task.family);
    for container in &task.container_definitions {
        let name = container.get("name").and_then(|v| v.as_str()).unwrap_or("?");
        match container.get("image").and_then(|v| v.as_str()) {
            Some(image) => out.push_str(&format!("  + {name} ({image})\n")),
            None => out.push_str(&format!("  + {name}\n")),
        }
    }
    out
}

pub fn render_blue_green_plan(plan: &BlueGreenPlan) -> String {
    let current = plan.current_side();
    let next = current.other();
    let next_set = plan.side(next);

    let mut out = format!("Blue-green '{}'\n", plan.name);
    out.push_str(&format!(
        "  current: {} ({}@{}, group {})\n",
        current,
        plan.side(current).target.service,
        plan.side(current).target.cluster,
        plan.side(current).group.name
    ));
    out.push_str(&format!(
        "  next:    {} ({}@{}, group {})\n",
        next, next_set.target.service, next_set.target.cluster, next_set.group.name
    ));
    out.push_str(&format!(
        "  primary: {}\n  standby: {}\n",
        plan.mode.primary_group().join(", "),
        plan.mode.standby_group().join(", ")
    ));
    out.push_str(&render_service_plan(&next_set.cluster_plan));
    out
}
