// ABOUTME: Integration tests for applying service update plans against the AWS fake.
// ABOUTME: Covers create/update/delete ordering, task replacement and failure detection.

mod support;

use std::time::Duration;

use ecs_cutover::aws::shared_types::{ServiceStatus, TaskStatus};
use ecs_cutover::config::DesiredCluster;
use ecs_cutover::diagnostics::{Diagnostics, WarningKind};
use ecs_cutover::plan::{Inventory, PlanError, PlanErrorKind, ServicePlanExecutor, ServiceUpdatePlan};
use ecs_cutover::poll::PollPolicy;
use support::fake_aws::FakeAws;

fn poll(max_attempts: u32) -> PollPolicy {
    PollPolicy::new(Duration::ZERO, max_attempts)
}

async fn plan_for(api: &FakeAws, cluster: &str, yaml: &str) -> ServiceUpdatePlan {
    let desired = DesiredCluster::from_yaml(cluster, yaml).unwrap();
    let mut diag = Diagnostics::default();
    Inventory::new(api)
        .build_service_update_plan(&desired, &mut diag)
        .await
        .unwrap()
        .unwrap()
}

async fn apply(api: &FakeAws, plan: &ServiceUpdatePlan) -> (Result<(), PlanError>, Diagnostics) {
    let mut diag = Diagnostics::default();
    let result = ServicePlanExecutor::new(api, poll(10))
        .apply_service_plan(plan, &mut diag)
        .await;
    (result, diag)
}

fn position(calls: &[String], operation: &str) -> usize {
    calls
        .iter()
        .position(|c| c == operation)
        .unwrap_or_else(|| panic!("{operation} was never called: {calls:?}"))
}

mod create {
    use super::*;

    #[tokio::test]
    async fn creates_missing_service_and_waits_for_running_task() {
        support::init_tracing();
        let api = FakeAws::new().with_cluster("api", 1);
        let plan = plan_for(&api, "api", "web:\n  task_definition: web:1\n  desired_count: 2\n").await;

        let (result, diag) = apply(&api, &plan).await;

        result.unwrap();
        assert!(!diag.has_warnings());
        let web = api.service("api", "web").unwrap();
        assert_eq!(web.task_definition, "web:1");
        assert_eq!(web.desired_count, 2);
        assert_eq!(api.live_tasks("api", "web").len(), 2);
        // Pending on the first look, Running on the second.
        assert_eq!(api.count_calls("ecs:DescribeTasks"), 2);

        let replanned = plan_for(&api, "api", "web:\n  task_definition: web:1\n  desired_count: 2\n").await;
        assert!(replanned.is_settled());
    }

    #[tokio::test]
    async fn registers_declared_autoscaling_target() {
        let api = FakeAws::new().with_cluster("api", 1);
        let yaml = r#"
web:
  task_definition: web:1
  desired_count: 2
  autoscaling:
    min_capacity: 2
    max_capacity: 8
    role: arn:aws:iam::123456789012:role/ecsAutoscaleRole
"#;
        let plan = plan_for(&api, "api", yaml).await;

        apply(&api, &plan).await.0.unwrap();

        let target = api.scalable_target("api", "web").unwrap();
        assert_eq!((target.min_capacity, target.max_capacity), (2, 8));
        assert_eq!(
            target.role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/ecsAutoscaleRole")
        );
    }

    #[tokio::test]
    async fn placement_failure_event_fails_fast() {
        let api = FakeAws::new().with_cluster("api", 1).with_placement_failure(
            "(service web) was unable to place a task because no container instance met all of its requirements.",
        );
        let plan = plan_for(&api, "api", "web:\n  task_definition: web:1\n  desired_count: 1\n").await;

        let err = apply(&api, &plan).await.0.unwrap_err();

        assert_eq!(err.kind(), PlanErrorKind::PlacementFailed);
        assert!(err.to_string().contains("no container instance"));
        assert_eq!(api.count_calls("ecs:DescribeTasks"), 0);
    }

    #[tokio::test]
    async fn watched_task_stopping_first_is_an_error() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_task_script(&[TaskStatus::Pending, TaskStatus::Stopped]);
        let plan = plan_for(&api, "api", "web:\n  task_definition: web:1\n  desired_count: 1\n").await;

        let err = apply(&api, &plan).await.0.unwrap_err();

        assert_eq!(err.kind(), PlanErrorKind::TaskStopped);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_task_script(&[TaskStatus::Pending]);
        let plan = plan_for(&api, "api", "web:\n  task_definition: web:1\n  desired_count: 1\n").await;

        let mut diag = Diagnostics::default();
        let err = ServicePlanExecutor::new(&api, poll(3))
            .apply_service_plan(&plan, &mut diag)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), PlanErrorKind::ConvergenceTimeout);
        match err {
            PlanError::ConvergenceTimeout { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_at_the_configured_interval() {
        let api = FakeAws::new().with_cluster("api", 1);
        let plan = plan_for(&api, "api", "web:\n  task_definition: web:1\n  desired_count: 1\n").await;

        let started = tokio::time::Instant::now();
        let mut diag = Diagnostics::default();
        ServicePlanExecutor::new(&api, PollPolicy::new(Duration::from_secs(10), 5))
            .apply_service_plan(&plan, &mut diag)
            .await
            .unwrap();

        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn scales_down_then_deletes_before_creating() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_service("api", "legacy", "legacy:3", 2);
        let plan = plan_for(&api, "api", "web:\n  task_definition: web:1\n  desired_count: 1\n").await;
        api.clear_calls();

        apply(&api, &plan).await.0.unwrap();

        let calls = api.calls();
        let scale_down = position(&calls, "ecs:UpdateService");
        let delete = position(&calls, "ecs:DeleteService");
        let create = position(&calls, "ecs:CreateService");
        assert!(scale_down < delete, "{calls:?}");
        assert!(delete < create, "{calls:?}");

        assert!(api.service("api", "legacy").is_none());
        assert!(api.live_tasks("api", "legacy").is_empty());
        assert!(api.service("api", "web").is_some());
    }

    #[tokio::test]
    async fn waits_for_drain_and_record_removal() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_service("api", "legacy", "legacy:3", 2)
            .with_drain(&[
                (2, ServiceStatus::Active),
                (1, ServiceStatus::Active),
                (0, ServiceStatus::Draining),
                (0, ServiceStatus::Active),
            ])
            .with_delete_lag(1);
        let plan = plan_for(&api, "api", "").await;
        api.clear_calls();

        apply(&api, &plan).await.0.unwrap();

        let describe = "ecs:DescribeServices";
        assert_eq!(
            api.calls(),
            vec![
                "ecs:UpdateService",
                describe,
                describe,
                describe,
                describe,
                "ecs:DeleteService",
                describe,
                describe,
            ]
        );
        assert!(api.service("api", "legacy").is_none());
    }

    #[tokio::test]
    async fn service_stuck_draining_times_out_before_delete() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_service("api", "legacy", "legacy:3", 1)
            .with_drain(&[(0, ServiceStatus::Draining)]);
        let plan = plan_for(&api, "api", "").await;
        api.clear_calls();

        let mut diag = Diagnostics::default();
        let err = ServicePlanExecutor::new(&api, poll(3))
            .apply_service_plan(&plan, &mut diag)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), PlanErrorKind::ConvergenceTimeout);
        assert!(matches!(err, PlanError::ConvergenceTimeout { attempts: 3, .. }), "{err}");
        assert_eq!(api.count_calls("ecs:DescribeServices"), 3);
        assert_eq!(api.count_calls("ecs:DeleteService"), 0);
        assert_eq!(
            api.service("api", "legacy").unwrap().status,
            ServiceStatus::Draining
        );
    }
}

mod update {
    use super::*;

    const WEB_V2: &str = "web:\n  task_definition: web:2\n  desired_count: 2\n";

    #[tokio::test]
    async fn rolls_task_definition_and_stops_outgoing_tasks() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_service("api", "web", "web:1", 2);
        let old_tasks = api.live_tasks("api", "web");
        let plan = plan_for(&api, "api", WEB_V2).await;

        let (result, diag) = apply(&api, &plan).await;

        result.unwrap();
        assert!(!diag.has_warnings());
        assert_eq!(api.service("api", "web").unwrap().task_definition, "web:2");
        assert_eq!(api.count_calls("ecs:StopTask"), 2);

        let live = api.live_tasks("api", "web");
        assert_eq!(live.len(), 2);
        assert!(live.iter().all(|t| !old_tasks.contains(t)));
    }

    #[tokio::test]
    async fn stop_failures_are_warnings() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_service("api", "web", "web:1", 2)
            .failing_stop_task();
        let plan = plan_for(&api, "api", WEB_V2).await;

        let (result, diag) = apply(&api, &plan).await;

        result.unwrap();
        assert_eq!(diag.warnings().len(), 2);
        assert!(diag.warnings().iter().all(|w| w.kind == WarningKind::TaskStopFailed));
    }

    #[tokio::test]
    async fn keep_desired_count_preserves_live_count() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_service("api", "web", "web:1", 5);
        let yaml = "web:\n  task_definition: web:2\n  desired_count: 2\n  keep_desired_count: true\n";
        let plan = plan_for(&api, "api", yaml).await;

        apply(&api, &plan).await.0.unwrap();

        assert_eq!(api.service("api", "web").unwrap().desired_count, 5);
    }

    #[tokio::test]
    async fn undeclared_autoscaling_target_is_deregistered() {
        let api = FakeAws::new()
            .with_cluster("api", 1)
            .with_service("api", "web", "web:1", 2)
            .with_scalable_target("api", "web", 2, 4);
        let plan = plan_for(&api, "api", WEB_V2).await;

        apply(&api, &plan).await.0.unwrap();

        assert!(api.scalable_target("api", "web").is_none());
        assert_eq!(
            api.count_calls("application-autoscaling:DeregisterScalableTarget"),
            1
        );
    }
}
