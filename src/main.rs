use std::env;
use std::path::PathBuf;

use anyhow::anyhow;

use ttseval::EvalConfig;
use ttseval::core::emotion::{ProviderId, profile_for};
use ttseval::core::session::{ComparisonSession, OutcomeError, ProviderOutcome};
use ttseval::utils::audio::{ProviderSettings, create_request_folder, recent_requests, save_audio};

const USAGE: &str = "Usage:
  ttseval <text> [options]      synthesize <text> on every configured provider
  ttseval history [--limit N]   list past submissions, newest first

Options:
  --providers a,b,c    only these providers (cartesia, inworld, elevenlabs, hume, speechify)
  --model p=m          model override for one provider (repeatable)
  --timeout SECONDS    per-provider synthesis timeout
  --out DIR            data directory for saved audio
  --no-save            skip writing audio to disk";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut config = EvalConfig::from_env().map_err(|e| anyhow!("Failed to load config: {e}"))?;

    let mut args = env::args();
    let _ = args.next();

    let Some(first) = args.next() else {
        anyhow::bail!("{USAGE}");
    };

    if first == "history" {
        let mut limit = 10usize;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--limit" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--limit requires a number"))?;
                    limit = value
                        .parse()
                        .map_err(|e| anyhow!("Invalid --limit '{value}': {e}"))?;
                }
                "--out" => {
                    let dir = args
                        .next()
                        .ok_or_else(|| anyhow!("--out requires a directory"))?;
                    config.data_dir = PathBuf::from(dir);
                }
                other => anyhow::bail!("Unknown option '{other}' for 'history'"),
            }
        }
        print_history(&config, limit);
        return Ok(());
    }

    if first == "--help" || first == "-h" {
        println!("{USAGE}");
        return Ok(());
    }

    let text = first;
    let mut providers: Vec<ProviderId> = ProviderId::ALL.to_vec();
    let mut model_overrides: Vec<(ProviderId, String)> = Vec::new();
    let mut save = true;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--providers" => {
                let list = args
                    .next()
                    .ok_or_else(|| anyhow!("--providers requires a comma-separated list"))?;
                providers = list
                    .split(',')
                    .map(|name| name.trim().parse::<ProviderId>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| anyhow!("{e}"))?;
            }
            "--model" => {
                let pair = args
                    .next()
                    .ok_or_else(|| anyhow!("--model requires provider=model"))?;
                let (provider, model) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Invalid --model '{pair}', expected provider=model"))?;
                let provider = provider.trim().parse::<ProviderId>().map_err(|e| anyhow!("{e}"))?;
                model_overrides.push((provider, model.trim().to_string()));
            }
            "--timeout" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--timeout requires a number of seconds"))?;
                config.request_timeout_seconds = value
                    .parse()
                    .map_err(|e| anyhow!("Invalid --timeout '{value}': {e}"))?;
            }
            "--out" => {
                let dir = args
                    .next()
                    .ok_or_else(|| anyhow!("--out requires a directory"))?;
                config.data_dir = PathBuf::from(dir);
            }
            "--no-save" => save = false,
            other => anyhow::bail!("Unknown option '{other}'\n\n{USAGE}"),
        }
    }

    let selections: Vec<(ProviderId, String)> = providers
        .iter()
        .map(|&id| {
            let model = model_overrides
                .iter()
                .find(|(p, _)| *p == id)
                .map(|(_, m)| m.clone())
                .unwrap_or_else(|| profile_for(id).default_model().to_string());
            (id, model)
        })
        .collect();

    let session = ComparisonSession::new(config)
        .map_err(|e| anyhow!("Failed to start session: {e}"))?;

    let report = session
        .submit(&text, &selections)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    println!("Text sent to providers: {}", report.base_text);
    println!();

    let mut folder = None;
    if save && report.success_count() > 0 {
        let settings: Vec<ProviderSettings> = report
            .outcomes
            .iter()
            .map(|o| ProviderSettings {
                name: o.provider.display_name().to_string(),
                model_id: o.model.clone(),
                voice_id: o.voice_id.clone().unwrap_or_default(),
            })
            .collect();
        let (uuid, path) =
            create_request_folder(&session.config().data_dir, &report.base_text, &settings)
                .map_err(|e| anyhow!("Failed to create request folder: {e}"))?;
        println!("Saving audio to {} (request {uuid})", path.display());
        folder = Some(path);
    }

    for outcome in &report.outcomes {
        print_outcome(outcome, folder.as_deref())?;
    }

    println!();
    println!(
        "{}/{} providers returned audio",
        report.success_count(),
        report.outcomes.len()
    );
    Ok(())
}

fn print_outcome(outcome: &ProviderOutcome, folder: Option<&std::path::Path>) -> anyhow::Result<()> {
    let label = outcome.provider.display_name();
    match &outcome.result {
        Ok(audio) => {
            println!(
                "  {label} ({}): {} bytes of {}",
                outcome.model,
                audio.data.len(),
                audio.format.extension()
            );
            if let Some(folder) = folder {
                let path = save_audio(&audio.data, outcome.provider, audio.format, folder)
                    .map_err(|e| anyhow!("Failed to save {label} audio: {e}"))?;
                println!("    saved {}", path.display());
            }
        }
        Err(OutcomeError::Render(e)) => println!("  {label} ({}): {e}", outcome.model),
        Err(OutcomeError::Synthesis(e)) => println!("  {label} ({}): {e}", outcome.model),
    }
    for warning in &outcome.warnings {
        println!("    warning: {warning}");
    }
    Ok(())
}

fn print_history(config: &EvalConfig, limit: usize) {
    let records = recent_requests(&config.data_dir, limit);
    if records.is_empty() {
        println!("No saved requests under {}", config.data_dir.display());
        return;
    }
    for (folder, record) in records {
        println!(
            "{}  {}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.uuid,
            record.text
        );
        for settings in &record.provider_settings {
            println!("    {} ({})", settings.name, settings.model_id);
        }
        println!("    {}", folder.display());
    }
}
