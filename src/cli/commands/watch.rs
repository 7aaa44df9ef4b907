//! Long-running poll loop.

use console::style;

use crate::cli::helpers::{build_monitor, parse_bind_address};
use crate::cli::icons::{dim_arrow, info, success, warn};
use crate::config::Settings;
use crate::monitor::MonitorHandle;

const DEFAULT_PORT: u16 = 8787;

/// Poll until Ctrl+C, optionally serving the control surface.
pub async fn cmd_watch(settings: &Settings, serve: bool, bind: Option<&str>) -> anyhow::Result<()> {
    let monitor = build_monitor(settings)?;

    // Bind before spawning so a busy port fails the command cleanly.
    let listener = if serve {
        let bind = bind.unwrap_or(settings.bind.as_str());
        let (host, port) = parse_bind_address(bind, DEFAULT_PORT);
        Some(crate::server::bind(&host, port).await?)
    } else {
        if bind.is_some() {
            println!("{} --bind has no effect without --serve", warn());
        }
        None
    };

    println!(
        "{} Watching {} every {}s",
        info(),
        style(&settings.target_url).bold(),
        settings.poll_interval.as_secs()
    );
    println!("  {} State: {}", dim_arrow(), settings.state_path.display());
    if settings.telegram.is_none() {
        println!("  {} Telegram not configured, alerts are logged only", warn());
    }

    let handle = MonitorHandle::spawn(monitor, settings.poll_interval);

    if let Some(listener) = listener {
        println!(
            "  {} Control surface at http://{}",
            dim_arrow(),
            listener.local_addr()?
        );
        let server_handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::server::serve(listener, server_handle).await {
                tracing::error!("Control server failed: {}", e);
            }
        });
    }
    println!("  Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    println!();
    println!("{} Shutting down...", info());

    handle.shutdown().await?;
    let status = handle.status();

    println!(
        "{} Stopped after {} polls, {} fingerprints stored",
        success(),
        status.poll_count,
        status.stored_fingerprints
    );
    Ok(())
}
