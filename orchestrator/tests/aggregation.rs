//! Single-agent executor and parallel aggregator behaviour

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{context, CountingConnector, Script, ScriptedBackend};
use vira_agent::{Agent, FailureKind, ModelPreferences, RequestParams};
use vira_orchestrator::{
    ParallelAggregator, ParallelTaskSet, SingleAgentExecutor, WorkflowContext, WorkflowResult,
};

fn team(ctx: &WorkflowContext) -> ParallelTaskSet {
    let specialists = ["architect", "developer", "tester"]
        .map(|name| Agent::new(name, format!("You are the {name}")).scope_to(&ctx.capabilities, &["filesystem"]));
    ParallelTaskSet::broadcast("Build a rate limiter", specialists, Agent::new("reviewer", "Review"))
}

#[tokio::test]
async fn test_executor_selects_model_and_releases() {
    let backend = Arc::new(ScriptedBackend::new().script("planner", Script::Respond("the plan".into())));
    let connector = Arc::new(CountingConnector::new());
    let ctx = context(backend.clone(), connector.clone());

    let agent = Agent::new("planner", "Plan").scope_to(&ctx.capabilities, &["filesystem", "fetch"]);
    let params = RequestParams::new(ModelPreferences::new(1.0, 0.0, 0.0).unwrap());
    let result = SingleAgentExecutor::new(&ctx).run(&agent, "Ship v2", &params).await;

    assert_eq!(result, WorkflowResult::success_text("the plan"));
    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "scripted-large");
    assert_eq!(calls[0].system_prompt.as_deref(), Some("Plan"));
    assert_eq!(connector.opened(), 2);
    assert_eq!(connector.live(), 0);
}

#[tokio::test]
async fn test_executor_reports_connection_failure() {
    let backend = Arc::new(ScriptedBackend::new());
    let connector = Arc::new(CountingConnector::failing_on("fetch"));
    let ctx = context(backend.clone(), connector.clone());

    let agent = Agent::new("researcher", "Research").scope_to(&ctx.capabilities, &["filesystem", "fetch"]);
    let result = SingleAgentExecutor::new(&ctx)
        .run(&agent, "topic", &RequestParams::default())
        .await;

    assert_eq!(result.kind(), Some(FailureKind::ConnectionFailed));
    assert!(backend.calls().is_empty());
    assert_eq!(connector.live(), 0);
}

#[tokio::test]
async fn test_fan_in_sees_outputs_in_declaration_order() {
    // The first branch finishes last
    let backend = Arc::new(
        ScriptedBackend::new()
            .script("architect", Script::Delay(Duration::from_millis(40), "design doc".into()))
            .script("developer", Script::Respond("implementation".into()))
            .script("tester", Script::Delay(Duration::from_millis(10), "test plan".into()))
            .script("reviewer", Script::Respond("final solution".into())),
    );
    let connector = Arc::new(CountingConnector::new());
    let ctx = context(backend.clone(), connector.clone());

    let result = ParallelAggregator::new(&ctx)
        .run(&team(&ctx), &RequestParams::default())
        .await;

    assert_eq!(result, WorkflowResult::success_text("final solution"));

    let reviewer = backend.calls_for("reviewer");
    assert_eq!(reviewer.len(), 1);
    let composite = &reviewer[0].prompt;
    let architect = composite.find("### architect\ndesign doc").unwrap();
    let developer = composite.find("### developer\nimplementation").unwrap();
    let tester = composite.find("### tester\ntest plan").unwrap();
    assert!(architect < developer && developer < tester);

    assert_eq!(connector.opened(), 3);
    assert_eq!(connector.live(), 0);
}

#[tokio::test]
async fn test_failed_branch_is_excluded() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .script("developer", Script::Fail("model offline".into()))
            .script("reviewer", Script::Respond("reviewed".into())),
    );
    let connector = Arc::new(CountingConnector::new());
    let ctx = context(backend.clone(), connector.clone());

    let result = ParallelAggregator::new(&ctx)
        .run(&team(&ctx), &RequestParams::default())
        .await;

    assert!(result.is_success());
    let composite = &backend.calls_for("reviewer")[0].prompt;
    assert!(composite.contains("### architect"));
    assert!(composite.contains("### tester"));
    assert!(!composite.contains("### developer"));
    assert_eq!(connector.live(), 0);
}

#[tokio::test]
async fn test_all_branches_failing_skips_fan_in() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .script("architect", Script::Fail("quota exceeded".into()))
            .script("developer", Script::Fail("model offline".into()))
            .script("tester", Script::Fail("context too long".into())),
    );
    let connector = Arc::new(CountingConnector::new());
    let ctx = context(backend.clone(), connector.clone());

    let outcomes = ParallelAggregator::new(&ctx)
        .fan_out(&team(&ctx), &RequestParams::default())
        .await;
    assert_eq!(
        outcomes.iter().map(|o| o.agent.as_str()).collect::<Vec<_>>(),
        vec!["architect", "developer", "tester"]
    );
    assert!(outcomes
        .iter()
        .all(|o| o.result.kind() == Some(FailureKind::BackendFailure)));

    let result = ParallelAggregator::new(&ctx)
        .run(&team(&ctx), &RequestParams::default())
        .await;

    match &result {
        WorkflowResult::Failure { kind, message, .. } => {
            assert_eq!(*kind, FailureKind::AggregationFailed);
            let architect = message.find("architect (backend_failure): ").unwrap();
            let developer = message.find("developer (backend_failure): ").unwrap();
            let tester = message.find("tester (backend_failure): ").unwrap();
            assert!(architect < developer && developer < tester);
            assert!(message.contains("quota exceeded"));
            assert!(message.contains("model offline"));
            assert!(message.contains("context too long"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(backend.calls_for("reviewer").is_empty());
    assert_eq!(connector.live(), 0);
}

#[tokio::test]
async fn test_invalid_task_set_runs_nothing() {
    let backend = Arc::new(ScriptedBackend::new());
    let connector = Arc::new(CountingConnector::new());
    let ctx = context(backend.clone(), connector.clone());

    let empty = ParallelTaskSet::new(Agent::new("reviewer", "Review"));
    let result = ParallelAggregator::new(&ctx)
        .run(&empty, &RequestParams::default())
        .await;
    assert_eq!(result.kind(), Some(FailureKind::InvalidInput));

    let overlapping = ParallelTaskSet::new(Agent::new("reviewer", "Review"))
        .with_fan_out(Agent::new("reviewer", "Review"), "self review");
    let result = ParallelAggregator::new(&ctx)
        .run(&overlapping, &RequestParams::default())
        .await;
    assert_eq!(result.kind(), Some(FailureKind::InvalidInput));

    let repeated = ParallelTaskSet::new(Agent::new("reviewer", "Review"))
        .with_fan_out(Agent::new("developer", "Develop"), "backend")
        .with_fan_out(Agent::new("developer", "Develop"), "frontend");
    let result = ParallelAggregator::new(&ctx)
        .run(&repeated, &RequestParams::default())
        .await;
    assert_eq!(result.kind(), Some(FailureKind::InvalidInput));

    assert!(backend.calls().is_empty());
    assert_eq!(connector.opened(), 0);
}

#[tokio::test]
async fn test_dropped_aggregation_releases_connections() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .script("architect", Script::Hang)
            .script("developer", Script::Hang)
            .script("tester", Script::Hang),
    );
    let connector = Arc::new(CountingConnector::new());
    let ctx = context(backend.clone(), connector.clone());

    let tasks = team(&ctx);
    let params = RequestParams::default();
    let aggregator = ParallelAggregator::new(&ctx);
    let run = aggregator.run(&tasks, &params);

    let outcome = tokio::time::timeout(Duration::from_millis(50), run).await;
    assert!(outcome.is_err());

    ctx.releases.close();
    ctx.releases.wait().await;
    assert_eq!(connector.opened(), 3);
    assert_eq!(connector.live(), 0);
}
