use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use unscroll_core::blocker::monitor::run_monitor;
use unscroll_core::blocker::RearmGuard;
use unscroll_core::error::CoreError;
use unscroll_core::{BlockerRuntime, Config, Database, ForegroundSource};

#[derive(Subcommand)]
pub enum MonitorAction {
    /// Poll a watch file for the foreground app and print block events
    Run {
        /// File whose first line names the current foreground app id
        #[arg(long)]
        watch_file: PathBuf,
    },
}

/// Reference [`ForegroundSource`] for desktop use: the first line of a watch
/// file names the foreground app. A missing file or blank line reads as "no
/// foreground app".
struct FileForeground {
    path: PathBuf,
}

impl ForegroundSource for FileForeground {
    fn current_foreground(&mut self) -> Result<Option<String>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.lines().next().unwrap_or("").trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Foreground(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))),
        }
    }
}

pub fn run(action: MonitorAction) -> Result<(), Box<dyn std::error::Error>> {
    let MonitorAction::Run { watch_file } = action;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(run_async(&watch_file))
}

async fn run_async(watch_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = Arc::new(BlockerRuntime::new(Database::open()?, config));

    let (tx, mut rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    let monitor = tokio::spawn(run_monitor(
        runtime,
        FileForeground {
            path: watch_file.to_path_buf(),
        },
        tx,
        cancel.clone(),
    ));

    // Fires if the loop ends without an explicit Ctrl-C, e.g. the monitor
    // task dying. A GUI host would relaunch its service here.
    let guard = RearmGuard::new(|| log::error!("monitor terminated unexpectedly"));

    eprintln!("monitoring {} (Ctrl-C to stop)", watch_file.display());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                guard.disarm();
                break;
            }
            event = rx.recv() => match event {
                Some(event) => {
                    let line = json!({
                        "target_id": event.target_id,
                        "display_name": event.display_name,
                        "detected_at": event.detected_at.to_rfc3339(),
                    });
                    println!("{line}");
                }
                None => break,
            }
        }
    }

    monitor.await?;
    Ok(())
}
