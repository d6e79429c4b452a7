//! OpenChamber - headless workspace driver
//!
//! Reads JSON commands from stdin (one per line), applies them to the pane/tab
//! workspace model and writes notifications to stdout as JSON lines. Logs go
//! to stderr so stdout stays machine readable. The layout is flushed to disk
//! when stdin closes.
//!
//! ```text
//! openchamber [--workspace <key>] [--layout <path>] [--strict] [directory]
//! ```

use anyhow::{Context, Result};
use chamber_core::config::load_config;
use chamber_core::{ChamberConfig, Command, Notification, WorkspaceKey, WorkspaceService};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line arguments
#[derive(Debug, Default, PartialEq)]
struct Args {
    /// Directory whose workspace is opened on start
    path: Option<PathBuf>,
    /// Explicit workspace key, overrides the directory
    workspace: Option<String>,
    /// Layout file, overrides the configured one
    layout: Option<PathBuf>,
    strict: bool,
}

impl Args {
    fn parse() -> Self {
        Self::parse_from(std::env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Self {
        let mut args = args.into_iter();
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--workspace" | "-w" => {
                    parsed.workspace = args.next();
                }
                "--layout" => {
                    parsed.layout = args.next().map(PathBuf::from);
                }
                "--strict" => {
                    parsed.strict = true;
                }
                _ if !arg.starts_with('-') => {
                    parsed.path = Some(PathBuf::from(arg));
                }
                _ => {
                    // Ignore unknown flags
                }
            }
        }

        parsed
    }

    /// Workspace to open on start
    fn workspace_key(&self) -> WorkspaceKey {
        match &self.workspace {
            Some(key) if !key.is_empty() => WorkspaceKey::new(key.clone()),
            _ => WorkspaceKey::from_directory(self.path.as_deref()),
        }
    }

    fn apply(&self, config: &mut ChamberConfig) {
        if self.strict {
            config.strict = true;
        }
        if let Some(layout) = &self.layout {
            config.persistence.path = Some(layout.to_string_lossy().into_owned());
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "openchamber=info,chamber_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = load_config(&cwd).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default configuration");
        ChamberConfig::default()
    });
    args.apply(&mut config);

    let service = WorkspaceService::new(&config).context("Failed to start workspace service")?;
    let key = args.workspace_key();
    tracing::info!(workspace = %key, strict = config.strict, "openchamber ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    service.send(Command::EnsureWorkspace { workspace: key })?;
    drain(&service, &mut out)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Command>(line) {
            Ok(command) => service.send(command)?,
            Err(e) => {
                tracing::debug!(error = %e, "malformed command");
                write_notification(&mut out, &Notification::error(format!("Invalid command: {}", e)))?;
            }
        }
        drain(&service, &mut out)?;
    }

    service.flush()?;
    tracing::info!("layout flushed, exiting");
    Ok(())
}

/// Write every pending notification
fn drain(service: &WorkspaceService, out: &mut impl Write) -> Result<()> {
    while let Some(notif) = service.poll_notification() {
        write_notification(out, &notif)?;
    }
    out.flush()?;
    Ok(())
}

fn write_notification(out: &mut impl Write, notif: &Notification) -> Result<()> {
    serde_json::to_writer(&mut *out, notif)?;
    out.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Args {
        Args::parse_from(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_flags() {
        let parsed = args(&["--workspace", "proj", "--layout", "/tmp/l.json", "--strict"]);
        assert_eq!(
            parsed,
            Args {
                path: None,
                workspace: Some("proj".into()),
                layout: Some(PathBuf::from("/tmp/l.json")),
                strict: true,
            }
        );
    }

    #[test]
    fn test_workspace_key_resolution() {
        assert!(args(&[]).workspace_key().is_global());
        assert_eq!(args(&["/srv/app"]).workspace_key().as_str(), "/srv/app");
        assert_eq!(args(&["/srv/app", "-w", "other"]).workspace_key().as_str(), "other");
    }

    #[test]
    fn test_apply_overrides_config() {
        let mut config = ChamberConfig::default();
        args(&["--strict", "--layout", "/tmp/x.json"]).apply(&mut config);
        assert!(config.strict);
        assert_eq!(config.persistence.path.as_deref(), Some("/tmp/x.json"));
    }

    #[test]
    fn test_notifications_are_json_lines() {
        let service = WorkspaceService::with_storage(&ChamberConfig::default(), None).unwrap();
        service.send(Command::ToggleRightPane).unwrap();

        let mut buf = Vec::new();
        drain(&service, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["type"], "UiChanged");
        assert_eq!(value["rightPaneVisible"], false);
    }
}
