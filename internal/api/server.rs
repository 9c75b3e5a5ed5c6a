use axum::Router;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub async fn bind(addr: &str) -> Result<TcpListener, String> {
    let socket: SocketAddr = addr
        .parse()
        .map_err(|_| format!("invalid listen addr {addr}"))?;
    TcpListener::bind(socket)
        .await
        .map_err(|err| format!("listen on {addr} failed: {err}"))
}

/// Serve `app` until `shutdown` resolves, then give in-flight requests at
/// most `drain` to finish.
pub async fn serve_with_drain<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    drain: Duration,
) -> Result<(), String>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (draining_tx, draining_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("start server shutdown");
            let _ = draining_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result.map_err(|err| format!("server error: {err}")),
        Ok(()) = draining_rx => match tokio::time::timeout(drain, &mut server).await {
            Ok(result) => result.map_err(|err| format!("server error: {err}")),
            Err(_) => Err(format!(
                "server shutdown timed out after {}s",
                drain.as_secs()
            )),
        },
    }
}
