use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancel `token` on SIGTERM or SIGINT.
///
/// Handlers are registered before returning so a signal arriving during startup is not lost.
pub(crate) fn install_shutdown_handler(token: CancellationToken) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, draining in-flight requests"),
            _ = sigint.recv() => info!("received SIGINT, draining in-flight requests"),
            _ = token.cancelled() => return,
        }
        token.cancel();
    });

    Ok(())
}
