//! Upload command implementation - Compile a sketch and flash it

use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::{AppConfig, BoardCatalog};
use crate::models::board::BoardDescriptor;
use crate::models::compile::Annotation;
use crate::models::status::SessionStatus;
use crate::services::{SessionRunner, SessionSettings};

pub struct UploadArgs {
    pub sketch: PathBuf,
    pub board: Option<String>,
    pub port: Option<String>,
    pub compile_url: Option<String>,
    /// Seconds to wait for the agent and its ports
    pub wait: u64,
    /// Seconds to wait for the session to finish
    pub timeout: u64,
}

pub async fn execute_upload_command(config: &AppConfig, args: UploadArgs) -> Result<()> {
    let source = tokio::fs::read_to_string(&args.sketch)
        .await
        .with_context(|| format!("Failed to read sketch {}", args.sketch.display()))?;

    let catalog = BoardCatalog::with_extra(&config.boards);
    let board = resolve_board(&catalog, config, args.board.as_deref())?;

    let mut settings = SessionSettings::from_config(config);
    if let Some(url) = args.compile_url {
        settings.compile_url = url;
    }

    println!("🚀 Uploading {} to {}", args.sketch.display(), board.label);
    let handle = SessionRunner::new(settings, board)?
        .with_source(source)
        .spawn();

    let wait = Duration::from_secs(args.wait);
    let wanted_port = args.port.clone();
    let ready = handle
        .wait_for(wait, |s| {
            s.agent.is_some()
                && match &wanted_port {
                    Some(name) => s.ports.iter().any(|p| &p.value == name),
                    None => s.selected_port.is_some(),
                }
        })
        .await;

    if ready.is_none() {
        let snapshot = handle.snapshot();
        handle.shutdown().await;
        return Err(match (&snapshot.agent, &args.port) {
            (None, _) => anyhow!("Device agent not found within {}s. Is it running?", args.wait),
            (Some(_), Some(name)) => anyhow!("Port {} was not reported by the agent", name),
            (Some(_), None) => anyhow!("The agent reports no serial ports"),
        });
    }

    if let Some(name) = &args.port {
        handle.select_port(name.clone());
    }
    handle.request_upload();

    let mut snapshots = handle.subscribe();
    let deadline = Instant::now() + Duration::from_secs(args.timeout);
    let mut last_status = SessionStatus::Ready;
    let final_snapshot = loop {
        let snapshot = snapshots.borrow_and_update().clone();
        if snapshot.status != last_status {
            println!("{} {}", snapshot.status.symbol(), snapshot.status);
            last_status = snapshot.status;
        }
        if snapshot.attempt > 0 && snapshot.status.is_terminal() {
            break Some(snapshot);
        }
        match tokio::time::timeout_at(deadline, snapshots.changed()).await {
            Ok(Ok(())) => continue,
            Ok(Err(_)) | Err(_) => break None,
        }
    };
    handle.shutdown().await;

    let Some(snapshot) = final_snapshot else {
        return Err(anyhow!(
            "Session did not finish within {}s (last status: {})",
            args.timeout,
            last_status
        ));
    };

    match snapshot.status {
        SessionStatus::Done => {
            println!("✅ Upload complete");
            Ok(())
        }
        SessionStatus::CompileError => {
            for annotation in &snapshot.annotations {
                eprintln!("{}", format_diagnostic(&args.sketch, annotation));
            }
            Err(anyhow!("Compilation failed"))
        }
        other => Err(anyhow!("Upload failed: {}", other)),
    }
}

fn resolve_board(
    catalog: &BoardCatalog,
    config: &AppConfig,
    requested: Option<&str>,
) -> Result<BoardDescriptor> {
    let board = match requested.or(config.default_board.as_deref()) {
        Some(id) => catalog
            .get_board(id)
            .ok_or_else(|| anyhow!("Unknown board '{}'. Run `sketchbridge boards`.", id))?,
        None => catalog
            .default_board()
            .ok_or_else(|| anyhow!("Board catalog is empty"))?,
    };
    Ok(board.clone())
}

/// `file:line:col: error: text`, 1-based like compiler output
fn format_diagnostic(sketch: &Path, annotation: &Annotation) -> String {
    format!(
        "{}:{}:{}: {}: {}",
        sketch.display(),
        annotation.row + 1,
        annotation.column + 1,
        annotation.kind,
        annotation.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_diagnostic() {
        let annotation = Annotation {
            row: 4,
            column: 0,
            kind: "error".to_string(),
            text: "expected ';' before '}' token".to_string(),
        };
        assert_eq!(
            format_diagnostic(Path::new("blink.ino"), &annotation),
            "blink.ino:5:1: error: expected ';' before '}' token"
        );
    }

    #[test]
    fn test_resolve_board() {
        let catalog = BoardCatalog::builtin();
        let mut config = AppConfig::default();

        let board = resolve_board(&catalog, &config, None).unwrap();
        assert_eq!(board.id, catalog.default_board().unwrap().id);

        config.default_board = Some("arduino:avr:micro".to_string());
        let board = resolve_board(&catalog, &config, None).unwrap();
        assert_eq!(board.id, "arduino:avr:micro");

        let board = resolve_board(&catalog, &config, Some("arduino:avr:uno")).unwrap();
        assert_eq!(board.id, "arduino:avr:uno");

        assert!(resolve_board(&catalog, &config, Some("nope:nope:nope")).is_err());
    }
}
