use crate::fixtures::{ingress, PRIVATE_NET, PROXY_NET};
use serde_json::json;
use swarm_targets::{
    Diagnostics, DockerApiError, ProxyStrategy, ResolveError, Service, ServiceId, TargetResolver,
    TaskFilter, TaskLookup, TaskState,
};
use tests::docker_engine::{service_json, task_json, FakeDockerEngine};

#[tokio::test]
async fn tasks_are_listed_with_the_running_filter() {
    // Arrange
    let engine = FakeDockerEngine::start().await;
    let mock = engine
        .serve_tasks(
            "svc1",
            json!([
                task_json("t1", "svc1", "running", &[(PROXY_NET, &["10.0.0.2/24"])]),
                task_json("t2", "svc1", "preparing", &[]),
            ]),
        )
        .await;

    // Act
    let tasks = engine
        .api()
        .list_tasks(&TaskFilter::running("svc1".into()))
        .await
        .expect("failed to list tasks");

    // Assert
    mock.assert_async().await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].state, TaskState::Running);
    assert_eq!(tasks[0].network_attachments[0].addresses, vec!["10.0.0.2/24"]);
    assert_eq!(tasks[1].state, TaskState::Preparing);
    assert_eq!(tasks[1].desired_state, TaskState::Running);
}

#[tokio::test]
async fn api_version_prefix_is_kept() {
    let engine = FakeDockerEngine::start().await;
    let mock = engine
        .serve_tasks_under(
            "/v1.43",
            "svc1",
            json!([task_json("t1", "svc1", "running", &[(PROXY_NET, &["10.0.0.2/24"])])]),
        )
        .await;

    let tasks = engine
        .api_under("/v1.43")
        .list_tasks(&TaskFilter::running("svc1".into()))
        .await
        .expect("failed to list tasks");

    mock.assert_async().await;
    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn engine_error_carries_status_and_message() {
    let engine = FakeDockerEngine::start().await;
    let _mock = engine
        .fail_tasks(503, "This node is not a swarm manager.")
        .await;

    let err = engine
        .api()
        .list_tasks(&TaskFilter::running("svc1".into()))
        .await
        .expect_err("listing should fail");

    match err.downcast_ref::<DockerApiError>() {
        Some(DockerApiError::Status { status, message }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "This node is not a swarm manager.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn services_are_listed_and_inspected() {
    let engine = FakeDockerEngine::start().await;
    let _list = engine
        .serve_services(json!([
            service_json("svc1", "web", &[(PROXY_NET, "10.0.0.5/24")]),
            service_json("svc2", "worker", &[]),
        ]))
        .await;
    let _inspect = engine
        .serve_service("svc1", service_json("svc1", "web", &[(PROXY_NET, "10.0.0.5/24")]))
        .await;
    let api = engine.api();

    let services = api.list_services().await.expect("failed to list services");
    let service = api
        .inspect_service(&ServiceId::from("svc1"))
        .await
        .expect("failed to inspect service");

    assert_eq!(
        services,
        vec![
            Service::new("svc1", "web").with_virtual_address(PROXY_NET, "10.0.0.5/24"),
            Service::new("svc2", "worker"),
        ]
    );
    assert_eq!(service, services[0]);
}

#[tokio::test]
async fn task_strategy_resolves_against_the_engine() {
    // Arrange
    let engine = FakeDockerEngine::start().await;
    let _mock = engine
        .serve_tasks(
            "svc1",
            json!([
                task_json(
                    "t1",
                    "svc1",
                    "running",
                    &[(PROXY_NET, &["10.0.0.2/24"]), (PRIVATE_NET, &["10.9.0.2/24"])]
                ),
                task_json("t2", "svc1", "starting", &[(PROXY_NET, &["10.0.0.3/24"])]),
                task_json("t3", "svc1", "running", &[(PROXY_NET, &["10.0.0.4/24"])]),
            ]),
        )
        .await;
    let resolver = TargetResolver::builder(engine.api())
        .strategy(ProxyStrategy::TaskAddresses)
        .ingress_networks(ingress())
        .build();

    // Act
    let resolution = resolver
        .resolve(&Service::new("svc1", "web"))
        .await
        .expect("failed to resolve");

    // Assert
    assert_eq!(resolution.targets, vec!["10.0.0.2", "10.0.0.4"]);
    assert!(resolution.diagnostics.is_empty());
}

#[tokio::test]
async fn unreachable_engine_is_an_orchestration_error() {
    let engine = FakeDockerEngine::start().await;
    let _mock = engine.fail_tasks(500, "internal error").await;
    let resolver = TargetResolver::builder(engine.api())
        .strategy(ProxyStrategy::TaskAddresses)
        .ingress_networks(ingress())
        .build();
    let mut diagnostics = Diagnostics::new();

    let result = resolver
        .resolve_targets(&Service::new("svc1", "web"), &mut diagnostics, true)
        .await;

    assert!(matches!(result, Err(ResolveError::OrchestrationQuery(_))));
    assert!(diagnostics.is_empty());
}
