use std::{future, io, sync::Arc};

use fedavg_server::{ServerBuilder, ServerConfig, service};
use log::{info, warn};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let config = ServerConfig::from_env()?;
    let (server, dispatcher) = ServerBuilder::new()
        .build(&config)
        .map_err(io::Error::other)?;

    let addr = config.addr();
    let list = TcpListener::bind(&addr).await?;
    info!(quorum = config.quorum_threshold.get(); "listening at {addr}");

    let app = service::router(Arc::new(server));
    axum::serve(list, app)
        .with_graceful_shutdown(async {
            match signal::ctrl_c().await {
                Ok(()) => info!("received SIGTERM"),
                Err(e) => {
                    warn!("can't listen for shutdown signals: {e}");
                    future::pending::<()>().await
                }
            }
        })
        .await?;

    info!("wrapping up, waiting on queued aggregations...");
    dispatcher.join().await;
    Ok(())
}
