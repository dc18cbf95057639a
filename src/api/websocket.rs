use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::{
    Message,
    handshake::server::{Request, Response},
};
use uuid::Uuid;

use crate::actor::broker::{Broker, SNAPSHOT_TOPIC};
use crate::actor::model::{IntentRequest, InternalMessage, ResponseSignal};
use crate::api::model::{ApiRequest, ApiResponse};
use crate::colony::Intent;
use crate::error::Error;

const RESPONSE_QUEUE: usize = 100;

/// Serve one websocket client: requests go to the dispatcher, replies and
/// broadcast snapshots come back as text frames.
pub async fn accept_connection(
    stream: TcpStream,
    intents: mpsc::Sender<InternalMessage>,
    broker: Broker,
) {
    let addr = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(e) => {
            tracing::warn!("Connection without peer address: {}", e);
            "unknown".to_string()
        }
    };
    let mut id = Uuid::new_v4();

    let callback = |req: &Request, response: Response| {
        if let Some(id_header) = req.headers().get("Authorization") {
            match id_header.to_str().map(Uuid::parse_str) {
                Ok(Ok(parsed_id)) => id = parsed_id,
                Ok(Err(_)) => tracing::warn!("Invalid UUID in Authorization header"),
                Err(_) => tracing::warn!("Failed to convert Authorization header to string"),
            }
        }
        Ok(response)
    };

    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("WebSocket handshake failed for address {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Accepted connection with ID: {}, address: {}", id, addr);

    let (mut write, mut read) = ws_stream.split();
    let (response_tx, mut response_rx) = mpsc::channel::<ResponseSignal>(RESPONSE_QUEUE);

    let writer = tokio::spawn(async move {
        while let Some(response) = response_rx.recv().await {
            if let ResponseSignal::Stop = response {
                tracing::debug!("Stopping response handler for ID: {}", id);
                break;
            }
            if let Err(e) = write.send(Message::Text(response.to_string().into())).await {
                tracing::warn!("Failed to write to {}: {}", id, e);
                break;
            }
        }
        if let Err(e) = write.close().await {
            tracing::debug!("Close for {} failed: {}", id, e);
        }
    });

    let forwarder = tokio::spawn(forward_snapshots(
        broker.subscribe(SNAPSHOT_TOPIC),
        response_tx.clone(),
        id,
    ));

    while let Some(message) = read.next().await {
        let msg = match message {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("Error reading message from {}: {}", id, e);
                break;
            }
        };
        if msg.is_close() {
            break;
        }
        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else {
            continue;
        };

        let request = match serde_json::from_str::<ApiRequest>(text) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Failed to parse message from {}: {}", id, e);
                let error = Error::BadRequest {
                    message: e.to_string(),
                };
                reply(&response_tx, ApiResponse::failure(None, &error)).await;
                continue;
            }
        };

        let request_id = request.id.clone();
        let intent = match Intent::try_from(request) {
            Ok(intent) => intent,
            Err(e) => {
                reply(&response_tx, ApiResponse::failure(Some(request_id), &e)).await;
                continue;
            }
        };

        let message = InternalMessage::Intent(IntentRequest {
            owner: id,
            request_id: request_id.clone(),
            intent,
            respond_to: response_tx.clone(),
        });
        if let Err(e) = intents.send(message).await {
            tracing::error!("Failed to send intent to dispatcher: {}", e);
            let error = Error::BadRequest {
                message: "server is shutting down".to_string(),
            };
            reply(&response_tx, ApiResponse::failure(Some(request_id), &error)).await;
            break;
        }
    }

    forwarder.abort();
    if response_tx.send(ResponseSignal::Stop).await.is_err() {
        tracing::debug!("Response handler for {} already gone", id);
    }
    if let Err(e) = writer.await {
        tracing::debug!("Response handler for {} ended with error: {}", id, e);
    }
    tracing::info!("Connection {} closed", id);
}

async fn reply(response_tx: &mpsc::Sender<ResponseSignal>, response: ApiResponse) {
    if response_tx
        .send(ResponseSignal::Reply(response))
        .await
        .is_err()
    {
        tracing::debug!("Response handler gone, dropping reply");
    }
}

async fn forward_snapshots(
    mut snapshots: broadcast::Receiver<InternalMessage>,
    response_tx: mpsc::Sender<ResponseSignal>,
    id: Uuid,
) {
    loop {
        match snapshots.recv().await {
            Ok(InternalMessage::Snapshot(snapshot)) => {
                // a full client queue only costs it this snapshot
                if let Err(mpsc::error::TrySendError::Closed(_)) =
                    response_tx.try_send(ResponseSignal::Snapshot(snapshot))
                {
                    break;
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Client {} skipped {} snapshots", id, skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
