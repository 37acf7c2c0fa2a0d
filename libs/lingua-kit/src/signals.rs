use anyhow::{Context, Result};
use tokio::signal;

/// Completes once the process is asked to stop: ctrl-c everywhere, plus
/// SIGTERM on unix (container runtimes send it before killing the server).
///
/// # Errors
/// A signal listener could not be installed.
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    let terminated = {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("installing SIGTERM listener")?;
        async move {
            sigterm.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminated = std::future::pending::<()>();

    let source = tokio::select! {
        result = signal::ctrl_c() => {
            result.context("listening for ctrl-c")?;
            "ctrl-c"
        }
        () = terminated => "SIGTERM",
    };
    tracing::info!(signal = source, "stopping lingua-server, finishing in-flight requests");
    Ok(())
}
