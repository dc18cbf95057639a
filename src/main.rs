use std::{sync::Arc, time::Duration};

use colony_game::{
    actor::{broker::Broker, dispatcher::Dispatcher},
    api::websocket,
    blueprint::Catalog,
    colony::{Game, grid::Grid, save::SaveStore},
    instrumentation,
    settings::Settings,
};
use tokio::task::JoinSet;

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    if let Err(e) = instrumentation::tracing::init_tracing_subscriber(settings.log_format) {
        eprintln!("Failed to set global subscriber: {e}");
        return;
    }
    tracing::info!("Starting the colony...");

    let catalog = Arc::new(Catalog::load(&settings.balance_path));
    let mut game = Game::new(catalog, Grid::new(settings.layout))
        .with_store(SaveStore::new(&settings.save_path));
    if !game.load() {
        tracing::info!("Starting a new colony");
    }

    let broker = Broker::new();
    let mut dispatcher = Dispatcher::new(broker.clone());
    let intents = dispatcher.start(game, settings.frame, settings.snapshot_every);

    let listener = match tokio::net::TcpListener::bind(&settings.addr).await {
        Ok(socket) => socket,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", settings.addr, e);
            dispatcher.stop().await;
            return;
        }
    };
    tracing::info!("Listening for TCP connections on {}", settings.addr);

    let mut handles = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::info!("New connection from {}", peer);
                    handles.spawn(websocket::accept_connection(stream, intents.clone(), broker.clone()));
                }
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, stopping dispatcher...");
                break;
            }
        }
    }

    dispatcher.stop().await;
    drop(intents);

    if tokio::time::timeout(Duration::from_secs(5), handles.join_all())
        .await
        .is_err()
    {
        tracing::warn!("Connections did not close in time");
    }

    tracing::info!("Colony stopped.");
}
