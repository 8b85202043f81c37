//! CLI route table driven end to end against a mock OpenAI-compatible endpoint.

use crate::integration::test_utils::{echo_results, ids_in};
use essayist::cli::{Commands, RunContext, StyleArgs};
use essayist::config::{AppConfig, ProviderType};
use essayist::error::ApiError;
use essayist::settings::DetailLevel;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Mock server on its own runtime so the CLI can build and block on its own.
struct Endpoint {
    runtime: tokio::runtime::Runtime,
    server: MockServer,
}

impl Endpoint {
    fn start() -> Self {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { runtime, server }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn request_count(&self) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.provider.provider_type = ProviderType::Custom;
        config.provider.model = "local-writer".to_string();
        config.provider.endpoint = Some(format!("{}/v1", self.server.uri()));
        config.run.batch_delay_ms = 0;
        config
    }
}

fn echo_responder(req: &Request) -> ResponseTemplate {
    let body: Value = req.body_json().unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
    let content = if body.get("response_format").map_or(false, |f| !f.is_null()) {
        echo_results(&ids_in(&prompt))
    } else {
        "A single written section.".to_string()
    };
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

fn outline_file(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("outline.txt");
    std::fs::write(&path, text).unwrap();
    path
}

fn write_command(input: &Path, output: &Path, events: &Path, retries: u32) -> Commands {
    Commands::Write {
        input: input.to_path_buf(),
        style: StyleArgs {
            tones: vec!["Gentle, emotional".to_string()],
            detail: Some(DetailLevel::Brief),
            ..Default::default()
        },
        batch_size: Some(3),
        output: Some(output.to_path_buf()),
        resume_failed_retries: retries,
        events: Some(events.to_path_buf()),
    }
}

#[test]
fn write_retries_a_failed_group_and_saves_the_essay() {
    let endpoint = Endpoint::start();
    endpoint.mount(
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .up_to_n_times(1),
    );
    endpoint.mount(
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(echo_responder),
    );

    let dir = TempDir::new().unwrap();
    let input = outline_file(&dir, "Title\n- One\n- Two\n- Three\n- Four");
    let output = dir.path().join("essay.txt");
    let events = dir.path().join("events.jsonl");

    let ctx = RunContext::with_config(endpoint.config());
    let message = ctx.execute(&write_command(&input, &output, &events, 1)).unwrap();
    assert!(message.contains("essay.txt"));

    let essay = std::fs::read_to_string(&output).unwrap();
    assert_eq!(essay.matches("Prose for ").count(), 5);
    assert_eq!(essay.split("\n\n").count(), 5);
    // 1 failed call, then 2 groups of the retry run.
    assert_eq!(endpoint.request_count(), 3);

    let lines: Vec<Value> = std::fs::read_to_string(&events)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let types: Vec<&str> = lines.iter().filter_map(|e| e["type"].as_str()).collect();
    assert!(types.contains(&"batch_failed"));
    assert_eq!(types.iter().filter(|t| **t == "run_completed").count(), 2);
}

#[test]
fn write_without_retries_keeps_partial_output() {
    let endpoint = Endpoint::start();
    endpoint.mount(
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down")),
    );

    let dir = TempDir::new().unwrap();
    let input = outline_file(&dir, "Title\n- One");
    let output = dir.path().join("essay.txt");
    let events = dir.path().join("events.jsonl");

    let ctx = RunContext::with_config(endpoint.config());
    ctx.execute(&write_command(&input, &output, &events, 0)).unwrap();
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    assert_eq!(endpoint.request_count(), 1);
}

#[test]
fn point_command_writes_one_section() {
    let endpoint = Endpoint::start();
    endpoint.mount(Mock::given(method("POST")).respond_with(echo_responder));

    let dir = TempDir::new().unwrap();
    let ctx = RunContext::with_config(endpoint.config());
    let text = ctx
        .execute(&Commands::Point {
            input: outline_file(&dir, "Title\n- One\n- Two"),
            point: 2,
            style: StyleArgs::default(),
        })
        .unwrap();
    assert_eq!(text, "A single written section.");
}

#[test]
fn point_command_surfaces_provider_failure() {
    let endpoint = Endpoint::start();
    endpoint.mount(
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(401).set_body_string("bad key")),
    );

    let dir = TempDir::new().unwrap();
    let ctx = RunContext::with_config(endpoint.config());
    let err = ctx
        .execute(&Commands::Point {
            input: outline_file(&dir, "Title"),
            point: 1,
            style: StyleArgs::default(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::GenerationFailed(ref m) if m.contains("bad key")));
}

#[test]
fn write_refuses_invalid_provider_config_before_any_call() {
    let mut config = AppConfig::default();
    config.provider.provider_type = ProviderType::Custom;
    config.provider.endpoint = None;

    let dir = TempDir::new().unwrap();
    let input = outline_file(&dir, "Title\n- One");
    let ctx = RunContext::with_config(config);
    let err = ctx
        .execute(&write_command(
            &input,
            &dir.path().join("essay.txt"),
            &dir.path().join("events.jsonl"),
            0,
        ))
        .unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(ref m) if m.contains("endpoint")));
    assert!(!dir.path().join("essay.txt").exists());
}
