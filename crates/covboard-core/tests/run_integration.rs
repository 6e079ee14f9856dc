//! End-to-end runs against mock Codecov and Geckoboard servers

use covboard_core::output::ActionOutput;
use covboard_core::{run_action, ActionInputs, RunOutcome, RunState};
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CODECOV_PATH: &str = "/api/v2/github/my-org/repos/my-repo/";
const SCHEMA_PATH: &str = "/datasets/myorgmyrepo.by_day";
const DATA_PATH: &str = "/datasets/myorgmyrepo.by_day/data";

struct Servers {
    codecov: MockServer,
    geckoboard: MockServer,
}

impl Servers {
    async fn start() -> Self {
        Self {
            codecov: MockServer::start().await,
            geckoboard: MockServer::start().await,
        }
    }

    fn env(&self) -> HashMap<String, String> {
        [
            ("GITHUB_REPOSITORY", "my-org/my-repo".to_string()),
            ("GITHUB_REPOSITORY_OWNER", "my-org".to_string()),
            ("CODECOV_TOKEN", "cc-token".to_string()),
            ("GECKOBOARD_TOKEN", "gb-token".to_string()),
            ("CODECOV_API_URL", self.codecov.uri()),
            ("GECKOBOARD_API_URL", self.geckoboard.uri()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    async fn codecov_responds(&self, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(CODECOV_PATH))
            .respond_with(response)
            .mount(&self.codecov)
            .await;
    }

    async fn geckoboard_accepts(&self, schema_status: u16, expected_appends: u64) {
        Mock::given(method("PUT"))
            .and(path(SCHEMA_PATH))
            .respond_with(ResponseTemplate::new(schema_status))
            .mount(&self.geckoboard)
            .await;
        Mock::given(method("POST"))
            .and(path(DATA_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(expected_appends)
            .mount(&self.geckoboard)
            .await;
    }

    async fn request_count(&self) -> usize {
        self.codecov.received_requests().await.unwrap().len()
            + self.geckoboard.received_requests().await.unwrap().len()
    }
}

fn coverage_body(coverage: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"totals": {"coverage": coverage}}))
}

#[tokio::test]
async fn test_publishes_fetched_coverage() {
    let servers = Servers::start().await;
    servers.codecov_responds(coverage_body(json!(87.5))).await;
    servers.geckoboard_accepts(200, 1).await;

    let outcome = run_action(&servers.env(), &ActionInputs::default()).await;
    assert_eq!(outcome, RunOutcome::Succeeded { coverage: 87.5 });

    let requests = servers.geckoboard.received_requests().await.unwrap();
    let methods: Vec<String> = requests.iter().map(|r| r.method.to_string()).collect();
    assert_eq!(methods, vec!["PUT", "POST"]);

    let body: Value = requests[1].body_json().unwrap();
    assert_eq!(body["data"][0]["coverage"], json!(87.5));
    assert!(body["data"][0]["coverage"].is_number());
}

#[tokio::test]
async fn test_success_writes_step_output() {
    let servers = Servers::start().await;
    servers.codecov_responds(coverage_body(json!(90))).await;
    servers.geckoboard_accepts(200, 1).await;

    let dir = tempfile::TempDir::new().unwrap();
    let output_path = dir.path().join("github_output");
    let mut env = servers.env();
    env.insert(
        "GITHUB_OUTPUT".to_string(),
        output_path.to_string_lossy().into_owned(),
    );

    let outcome = run_action(&env, &ActionInputs::default()).await;
    let mut stdout = Vec::new();
    ActionOutput::from_env(&env)
        .report(&outcome, &mut stdout)
        .unwrap();

    assert!(stdout.is_empty());
    assert_eq!(std::fs::read_to_string(output_path).unwrap(), "coverage=90\n");
}

#[tokio::test]
async fn test_missing_repository_makes_no_requests() {
    let servers = Servers::start().await;
    let mut env = servers.env();
    env.remove("GITHUB_REPOSITORY");

    let outcome = run_action(&env, &ActionInputs::default()).await;

    let message = outcome.message().unwrap();
    assert!(message.contains("GITHUB_REPOSITORY"), "{message}");
    assert_eq!(servers.request_count().await, 0);
}

#[tokio::test]
async fn test_missing_tokens_make_no_requests() {
    let servers = Servers::start().await;

    for (var, input) in [
        ("CODECOV_TOKEN", "codecov-token"),
        ("GECKOBOARD_TOKEN", "geckoboard-token"),
    ] {
        let mut env = servers.env();
        env.remove(var);

        let outcome = run_action(&env, &ActionInputs::default()).await;

        let message = outcome.message().unwrap();
        assert!(message.contains(input), "{message}");
        assert_eq!(
            outcome,
            RunOutcome::Failed {
                message: message.to_string(),
                stage: RunState::Start,
            }
        );
    }
    assert_eq!(servers.request_count().await, 0);
}

#[tokio::test]
async fn test_explicit_token_overrides_env() {
    let servers = Servers::start().await;
    servers.codecov_responds(coverage_body(json!(55.5))).await;
    servers.geckoboard_accepts(200, 1).await;

    let mut env = servers.env();
    env.remove("CODECOV_TOKEN");
    env.insert("INPUT_GECKOBOARD-TOKEN".to_string(), "gb-input".to_string());
    let inputs = ActionInputs {
        codecov_token: Some("cc-flag".to_string()),
        geckoboard_token: None,
    };

    let outcome = run_action(&env, &inputs).await;
    assert!(outcome.is_success());

    let codecov = servers.codecov.received_requests().await.unwrap();
    assert_eq!(
        codecov[0].headers.get("authorization").unwrap(),
        "Bearer cc-flag"
    );
    let geckoboard = servers.geckoboard.received_requests().await.unwrap();
    // base64("gb-input:")
    assert_eq!(
        geckoboard[0].headers.get("authorization").unwrap(),
        "Basic Z2ItaW5wdXQ6"
    );
}

#[tokio::test]
async fn test_missing_coverage_skips_dashboard() {
    let servers = Servers::start().await;
    servers
        .codecov_responds(ResponseTemplate::new(200).set_body_json(json!({"totals": {}})))
        .await;

    let outcome = run_action(&servers.env(), &ActionInputs::default()).await;

    let message = outcome.message().unwrap();
    assert!(message.starts_with("Failed to get current"), "{message}");
    assert!(message.ends_with("from Codecov"), "{message}");
    assert!(servers
        .geckoboard
        .received_requests()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_codecov_failure_reports_code() {
    let servers = Servers::start().await;
    servers.codecov_responds(ResponseTemplate::new(503)).await;

    let outcome = run_action(&servers.env(), &ActionInputs::default()).await;

    let message = outcome.message().unwrap();
    assert!(message.starts_with("Error from Codecov:"), "{message}");
    assert!(message.contains("503"), "{message}");
    assert!(servers
        .geckoboard
        .received_requests()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_codecov_unreachable() {
    let servers = Servers::start().await;
    let mut env = servers.env();
    env.insert("CODECOV_API_URL".to_string(), "http://127.0.0.1:1".to_string());

    let outcome = run_action(&env, &ActionInputs::default()).await;

    let message = outcome.message().unwrap();
    assert!(message.starts_with("Error from Codecov: ECONNECT"), "{message}");
}

#[tokio::test]
async fn test_schema_failure_never_appends() {
    let servers = Servers::start().await;
    servers.codecov_responds(coverage_body(json!(87.5))).await;
    servers.geckoboard_accepts(500, 0).await;

    let outcome = run_action(&servers.env(), &ActionInputs::default()).await;

    assert_matches::assert_matches!(
        outcome,
        RunOutcome::Failed { stage: RunState::CoverageFetched, .. }
    );
    let message = outcome.message().unwrap();
    assert!(message.contains("500"), "{message}");

    let requests = servers.geckoboard.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), SCHEMA_PATH);
}

#[tokio::test]
async fn test_rerun_upserts_schema_again() {
    let servers = Servers::start().await;
    servers.codecov_responds(coverage_body(json!(70))).await;
    servers.geckoboard_accepts(200, 2).await;

    let env = servers.env();
    assert!(run_action(&env, &ActionInputs::default()).await.is_success());
    assert!(run_action(&env, &ActionInputs::default()).await.is_success());

    let puts: Vec<Vec<u8>> = servers
        .geckoboard
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == SCHEMA_PATH)
        .map(|r| r.body)
        .collect();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0], puts[1]);
}
