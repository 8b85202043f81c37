//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, StyleArgs};
use crate::cli::presentation::{format_outline_json, format_outline_text, format_run_report};
use crate::config::{AppConfig, ConfigLoader};
use crate::context::{accumulated_before, look_ahead_after};
use crate::error::ApiError;
use crate::generation::GenerationClient;
use crate::orchestrator::{BatchPlan, Orchestrator, RunOutcome, RunPolicy, RunSummary, SingleOutcome};
use crate::outline::{Outline, PointState, SAMPLE_OUTLINE};
use crate::progress::ProgressLog;
use crate::prompt::{build_batch_prompt, build_single_prompt, PromptContext};
use crate::provider::{GenerationService, ProviderFactory};
use crate::settings::{ConfigUpdate, GenerationConfig};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const REDACTED: &str = "<redacted>";

/// Runtime context for CLI execution: loaded config and the progress log.
pub struct RunContext {
    config: AppConfig,
    progress: Arc<ProgressLog>,
}

impl RunContext {
    /// Create run context from an optional explicit config path. Uses ConfigLoader only.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            progress: Arc::new(ProgressLog::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Progress log shared with every orchestrator this context builds.
    pub fn progress(&self) -> Arc<ProgressLog> {
        Arc::clone(&self.progress)
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        let result = self.execute_inner(command);
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(command = name, duration_ms, "Command completed"),
            Err(e) => warn!(command = name, duration_ms, error = %e, "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Sample => Ok(SAMPLE_OUTLINE.to_string()),
            Commands::Config => self.handle_config(),
            Commands::Outline { input, format } => {
                let outline = Outline::parse(&read_input(input)?);
                match format.as_str() {
                    "text" => Ok(format_outline_text(&outline)),
                    "json" => Ok(format_outline_json(&outline)),
                    _ => Err(ApiError::ConfigError(format!(
                        "Invalid format: '{}'. Must be 'text' or 'json'.",
                        format
                    ))),
                }
            }
            Commands::Prompt {
                input,
                point,
                batch,
                style,
            } => self.handle_prompt(input, *point, *batch, style),
            Commands::Write {
                input,
                style,
                batch_size,
                output,
                resume_failed_retries,
                events,
            } => self.handle_write(
                input,
                style,
                *batch_size,
                output.as_deref(),
                *resume_failed_retries,
                events.as_deref(),
            ),
            Commands::Point {
                input,
                point,
                style,
            } => self.handle_point(input, *point, style),
        }
    }

    /// Configured defaults with the command-line style overrides applied.
    fn resolve_settings(&self, style: &StyleArgs) -> Result<GenerationConfig, ApiError> {
        let mut settings = self.config.defaults.generation_config();
        for update in style_updates(style) {
            settings.apply(update)?;
        }
        Ok(settings)
    }

    fn build_orchestrator(
        &self,
        settings: GenerationConfig,
        policy: RunPolicy,
    ) -> Result<Orchestrator<Arc<dyn GenerationService>>, ApiError> {
        self.config.ensure_valid()?;
        let service = ProviderFactory::create_client(&self.config.provider)?;
        info!(
            provider = service.provider_name(),
            model = service.model_name(),
            "Generation provider ready"
        );
        let client = GenerationClient::with_timeout(service, self.config.run.request_timeout());
        Ok(Orchestrator::new(client, settings)
            .with_policy(policy)
            .with_progress(self.progress()))
    }

    fn handle_prompt(
        &self,
        input: &Path,
        number: usize,
        batch: bool,
        style: &StyleArgs,
    ) -> Result<String, ApiError> {
        let outline = Outline::parse(&read_input(input)?);
        let index = point_index(&outline, number)?;
        let settings = self.resolve_settings(style)?;
        let policy = self.config.run_policy();
        let raw_text = outline.raw_text.as_str();

        if !batch {
            let accumulated = accumulated_before(index, &outline.points);
            let look_ahead = look_ahead_after(index, &outline.points, policy.look_ahead);
            let ctx = PromptContext::new(raw_text, &accumulated, &look_ahead, &settings)
                .with_tail_chars(policy.context_tail_chars);
            let is_last = index + 1 == outline.len();
            return Ok(build_single_prompt(&outline.points[index], &ctx, is_last));
        }

        let plan = BatchPlan::from_points(&outline.points, policy.batch_size);
        let (group_index, group) = plan
            .groups
            .iter()
            .enumerate()
            .find(|(_, group)| group.contains(&index))
            .ok_or_else(|| ApiError::PointNotFound(outline.points[index].id))?;
        let (Some(&first), Some(&last)) = (group.first(), group.last()) else {
            return Err(ApiError::PointNotFound(outline.points[index].id));
        };
        let accumulated = accumulated_before(first, &outline.points);
        let look_ahead = look_ahead_after(last, &outline.points, policy.look_ahead);
        let ctx = PromptContext::new(raw_text, &accumulated, &look_ahead, &settings)
            .with_tail_chars(policy.context_tail_chars);
        let points: Vec<_> = group.iter().map(|&i| outline.points[i].clone()).collect();
        let prompt = build_batch_prompt(&points, &ctx, plan.is_last_batch(group_index));
        let schema = serde_json::to_string_pretty(&prompt.schema)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render schema: {}", e)))?;
        Ok(format!("{}\n--- response schema ---\n{}", prompt.text, schema))
    }

    fn handle_write(
        &self,
        input: &Path,
        style: &StyleArgs,
        batch_size: Option<usize>,
        output: Option<&Path>,
        retries: u32,
        events: Option<&Path>,
    ) -> Result<String, ApiError> {
        let raw = read_input(input)?;
        let settings = self.resolve_settings(style)?;
        let mut policy = self.config.run_policy();
        if let Some(size) = batch_size {
            if size == 0 {
                return Err(ApiError::ConfigError("--batch-size must be at least 1".to_string()));
            }
            policy.batch_size = size;
        }
        let orchestrator = self.build_orchestrator(settings, policy)?;
        if orchestrator.process_outline(&raw) == 0 {
            warn!("Outline has no points; nothing to write");
            return Ok(String::new());
        }

        let runtime = tokio::runtime::Runtime::new()?;
        let summary = runtime.block_on(run_until_settled(&orchestrator, retries))?;

        let outline = orchestrator.outline();
        eprintln!("{}", format_run_report(&outline, &summary));
        if let Some(path) = events {
            self.write_events(path)?;
        }

        let essay = outline.compose_document();
        match output {
            Some(path) => {
                std::fs::write(path, &essay)?;
                Ok(format!("Essay written to {}", path.display()))
            }
            None => Ok(essay),
        }
    }

    fn handle_point(&self, input: &Path, number: usize, style: &StyleArgs) -> Result<String, ApiError> {
        let raw = read_input(input)?;
        let settings = self.resolve_settings(style)?;
        let orchestrator = self.build_orchestrator(settings, self.config.run_policy())?;
        orchestrator.process_outline(&raw);
        let outline = orchestrator.outline();
        let id = outline.points[point_index(&outline, number)?].id;

        let runtime = tokio::runtime::Runtime::new()?;
        match runtime.block_on(orchestrator.generate_single(id))? {
            SingleOutcome::Generated => Ok(orchestrator
                .outline()
                .point_text(id)
                .unwrap_or_default()
                .to_string()),
            SingleOutcome::Failed(message) => Err(ApiError::GenerationFailed(message)),
            SingleOutcome::NotFound => Err(ApiError::PointNotFound(id)),
            SingleOutcome::Cancelled | SingleOutcome::Discarded => Err(ApiError::GenerationFailed(
                "Generation was stopped before a result was kept".to_string(),
            )),
        }
    }

    fn handle_config(&self) -> Result<String, ApiError> {
        let mut shown = self.config.clone();
        if shown.provider.api_key.is_some() {
            shown.provider.api_key = Some(REDACTED.to_string());
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))
    }

    fn write_events(&self, path: &Path) -> Result<(), ApiError> {
        let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
        for event in self.progress.events() {
            let line = serde_json::to_string(&event)
                .map_err(|e| ApiError::ConfigError(format!("Failed to encode event: {}", e)))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}

/// Run `generate_all`, then re-run up to `retries` times while points are
/// left `Failed`. Ctrl-C stops the run after the in-flight request.
async fn run_until_settled<S: GenerationService>(
    orchestrator: &Orchestrator<S>,
    retries: u32,
) -> Result<RunSummary, ApiError> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let handle = orchestrator.cancellation_handle();
    let watcher = {
        let interrupted = Arc::clone(&interrupted);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; stopping after the current request");
                interrupted.store(true, Ordering::SeqCst);
                handle.stop();
            }
        })
    };

    let mut summary = orchestrator.generate_all().await;
    let mut attempt = 0;
    while let Ok(current) = &summary {
        let has_failures = orchestrator.outline().count_in(PointState::Failed) > 0;
        let stopped = interrupted.load(Ordering::SeqCst)
            || matches!(current.outcome, RunOutcome::Cancelled | RunOutcome::OutlineReplaced);
        if attempt >= retries || !has_failures || stopped {
            break;
        }
        attempt += 1;
        info!(attempt, retries, "Retrying failed points");
        summary = orchestrator.generate_all().await;
    }
    watcher.abort();
    summary
}

/// Convert a 1-based point number into an index, rejecting out-of-range values.
fn point_index(outline: &Outline, number: usize) -> Result<usize, ApiError> {
    if number == 0 || number > outline.len() {
        return Err(ApiError::ConfigError(format!(
            "Point {} is out of range (outline has {} point(s))",
            number,
            outline.len()
        )));
    }
    Ok(number - 1)
}

fn style_updates(style: &StyleArgs) -> Vec<ConfigUpdate> {
    let mut updates = Vec::new();
    if !style.tones.is_empty() {
        updates.push(ConfigUpdate::SetTones(style.tones.clone()));
    }
    updates.extend(style.custom_tones.iter().cloned().map(ConfigUpdate::AddCustomTone));
    if let Some(language) = &style.language {
        updates.push(ConfigUpdate::Language(language.clone()));
    }
    if let Some(detail) = style.detail {
        updates.push(ConfigUpdate::DetailLevel(detail));
    }
    updates
}

/// Read outline text from a file, or from stdin when the path is "-".
fn read_input(path: &Path) -> Result<String, ApiError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}
