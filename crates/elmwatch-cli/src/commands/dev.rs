//! Dev command implementation.
//!
//! Orchestrates the session lifecycle:
//! - Initial build
//! - Source watching with a rebuild per change
//! - HTTP server with live reload
//! - Graceful shutdown on Ctrl+C

use crate::cli::DevArgs;
use crate::dev::{DevConfig, DevServer, DevServerState, Session};
use crate::error::{CliError, Result};
use crate::ui;
use std::sync::Arc;
use tokio::signal;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Load and validate configuration, pick a free port
/// 2. Start the session (source watcher + initial build)
/// 3. Bind the HTTP server and start its reload watcher, then serve in a task
/// 4. Main event loop:
///    - Rebuild on every source change
///    - Stop on Ctrl+C or when the server task ends
///
/// # Errors
///
/// Returns errors for invalid configuration, a watcher that cannot be
/// created, an address that cannot be bound, or a server task that fails.
/// Compiler failures are printed and never end the loop.
pub async fn execute(args: DevArgs) -> Result<()> {
    let config = DevConfig::from_args(&args)?;
    ui::debug(&format!("Project root: {}", config.root.display()));

    let server_root = config.server_root();
    if !server_root.is_dir() {
        ui::warning(&format!(
            "Server root does not exist yet: {}",
            server_root.display()
        ));
    }

    let mut session = Session::start(&config)?;
    ui::info(&format!("Watching {}", session.globs().join(", ")));

    let state = Arc::new(DevServerState::new(server_root, config.base.notify));
    let server = DevServer::new(config.clone(), state).bind().await?;
    let mut server_handle = tokio::spawn(server.serve());

    if config.base.open {
        open_browser(&config.server_url());
    }

    loop {
        tokio::select! {
            Some(change) = session.next_change() => {
                session.handle_change(&change);
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down...");
                break;
            }

            result = &mut server_handle => {
                match result {
                    Ok(Ok(())) => {
                        ui::warning("Server task completed unexpectedly");
                        break;
                    }
                    Ok(Err(e)) => return Err(e),
                    Err(e) => return Err(CliError::Server(format!("Server task failed: {}", e))),
                }
            }
        }
    }

    server_handle.abort();
    tracing::debug!(builds = session.builder().invocations(), "session ended");
    Ok(())
}

/// Open the default browser at `url`.
fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {}", url)),
        Err(e) => ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
