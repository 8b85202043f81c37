//! Layered configuration feeding a real orchestrator.

use crate::integration::test_utils::{flat_outline, ScriptedService};
use essayist::config::{global_config_path, AppConfig, ConfigLoader, ProviderType};
use essayist::generation::GenerationClient;
use essayist::orchestrator::Orchestrator;
use essayist::settings::DetailLevel;
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const FULL_CONFIG: &str = r#"
[provider]
provider_type = "custom"
model = "local-writer"
endpoint = "http://localhost:8080/v1"
temperature = 0.4

[run]
batch_size = 2
batch_delay_ms = 0
look_ahead = 1
context_tail_chars = 500
request_timeout_secs = 30

[defaults]
tones = ["Persuasive, rousing", "Humorous, witty"]
language = "Vietnamese"
detail_level = "brief"

[logging]
level = "debug"
format = "json"

[logging.modules]
"essayist::orchestrator" = "trace"
"#;

fn load(path: &std::path::Path, env: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ConfigLoader::new()
        .with_explicit_file(path)
        .with_env(vars)
        .build()
        .unwrap()
}

#[test]
fn full_file_populates_every_section() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("essayist.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = load(&path, &[]);
    assert_eq!(config.provider.provider_type, ProviderType::Custom);
    assert_eq!(config.provider.endpoint.as_deref(), Some("http://localhost:8080/v1"));
    assert_eq!(config.provider.temperature, Some(0.4));
    assert_eq!(config.run.request_timeout().as_secs(), 30);
    assert_eq!(config.defaults.detail_level, DetailLevel::Brief);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.logging.modules.get("essayist::orchestrator").map(String::as_str),
        Some("trace")
    );
    assert!(config.validate().is_ok());

    let settings = config.defaults.generation_config();
    assert_eq!(settings.tone_descriptor(), "Persuasive, rousing, Humorous, witty");
    assert_eq!(settings.language, "Vietnamese");
}

#[test]
fn environment_wins_over_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("essayist.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = load(
        &path,
        &[
            ("ESSAYIST__PROVIDER__MODEL", "bigger-writer"),
            ("ESSAYIST__RUN__LOOK_AHEAD", "4"),
            ("ESSAYIST__DEFAULTS__DETAIL_LEVEL", "detailed"),
        ],
    );
    assert_eq!(config.provider.model, "bigger-writer");
    assert_eq!(config.run.look_ahead, 4);
    assert_eq!(config.run.batch_size, 2);
    assert_eq!(config.defaults.detail_level, DetailLevel::Detailed);
}

#[tokio::test]
async fn run_policy_from_config_shapes_the_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("essayist.toml");
    fs::write(&path, FULL_CONFIG).unwrap();
    let config = load(&path, &[]);

    let service = ScriptedService::new();
    let orchestrator = Orchestrator::new(
        GenerationClient::with_timeout(Arc::clone(&service), config.run.request_timeout()),
        config.defaults.generation_config(),
    )
    .with_policy(config.run_policy());
    orchestrator.process_outline(&flat_outline(5));

    let summary = orchestrator.generate_all().await.unwrap();
    assert_eq!(summary.batches_attempted(), 3);
    let prompts = service.prompts();
    assert!(prompts[0].contains("Vietnamese"));
    assert!(prompts[0].contains("Persuasive, rousing"));
    // look_ahead = 1: only the next point is previewed.
    assert!(prompts[0].contains("\"- Point 3...\""));
}

#[test]
fn global_path_follows_xdg_config_home() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let path = global_config_path().unwrap();
    assert_eq!(path, dir.path().join("essayist").join("config.toml"));

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[run]\nbatch_size = 9\n").unwrap();
    let config = ConfigLoader::new()
        .with_global_file(global_config_path())
        .with_env(HashMap::new())
        .build()
        .unwrap();
    assert_eq!(config.run.batch_size, 9);

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
}
