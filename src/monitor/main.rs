/**
 * RDM Sync Monitor
 *
 * Connects the realtime layer to the configured RDM server and logs every
 * refresh of one data key. Useful for checking which channel (WebSocket,
 * SSE or polling) is carrying updates.
 *
 * Usage: rdm-sync-monitor [data-key]
 */

#[cfg(feature = "monitor")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use rdm_sync::client::realtime::{fetch_fn, RealtimeOptions};
    use rdm_sync::client::{Config, SyncContext};

    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let data_key = std::env::args().nth(1).unwrap_or_else(|| "update".to_string());
    let config = Config::from_env()?;
    tracing::info!(server = %config.server_url(), %data_key, "starting sync monitor");

    let sync = SyncContext::new(&config)?;
    let key = data_key.clone();
    let session = sync.coordinator().subscribe(
        data_key,
        fetch_fn(move |ticket| {
            let key = key.clone();
            async move {
                if ticket.try_commit() {
                    tracing::info!(%key, seq = ticket.seq(), trigger = ?ticket.trigger(), "refresh");
                }
                Ok(())
            }
        }),
        RealtimeOptions::default(),
    );
    session.connect();

    let mut report = tokio::time::interval(std::time::Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = report.tick() => {
                let status = session.status();
                tracing::info!(
                    websocket = %status.websocket,
                    sse = %status.sse,
                    polling = status.polling,
                    active = status.is_active,
                    "channel status"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    session.close();
    sync.shutdown();
    Ok(())
}

#[cfg(not(feature = "monitor"))]
fn main() {
    eprintln!("The monitor requires the 'monitor' feature to be enabled.");
    eprintln!("Run with: cargo run --bin rdm-sync-monitor --features monitor");
    std::process::exit(1);
}
