use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::actor::broker::{Broker, SNAPSHOT_TOPIC, Topic};
use crate::actor::model::{IntentRequest, InternalMessage, ResponseSignal};
use crate::api::model::ApiResponse;
use crate::colony::Game;

const MAX_WAIT_TIME: u64 = 10; // seconds
const INTENT_QUEUE: usize = 100;

/// Runs the single [`Game`] in its own task. Intents arrive over an mpsc
/// channel and are applied between frames, so the game is never shared.
pub struct Dispatcher {
    broker: Broker,
    sender: Option<mpsc::Sender<InternalMessage>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(broker: Broker) -> Self {
        Self {
            broker,
            sender: None,
            task_handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start the frame loop and return the channel intents are sent on.
    pub fn start(
        &mut self,
        game: Game,
        frame: Duration,
        snapshot_every: u32,
    ) -> mpsc::Sender<InternalMessage> {
        let (sender, receiver) = mpsc::channel(INTENT_QUEUE);
        let topic = self.broker.topic(SNAPSHOT_TOPIC);

        self.task_handle = Some(tokio::spawn(run(
            game,
            receiver,
            topic,
            frame,
            snapshot_every.max(1),
        )));
        self.sender = Some(sender.clone());

        tracing::info!("Dispatcher started, frame every {:?}", frame);
        sender
    }

    /// Ask the loop to save and exit, waiting at most `MAX_WAIT_TIME`.
    pub async fn stop(&mut self) {
        tracing::info!("Initiating graceful shutdown...");

        if let Some(sender) = self.sender.take() {
            if sender.send(InternalMessage::Stop).await.is_err() {
                tracing::debug!("Dispatcher loop already gone");
            }
        }

        let Some(task_handle) = self.task_handle.take() else {
            return;
        };
        let abort = task_handle.abort_handle();
        match tokio::time::timeout(Duration::from_secs(MAX_WAIT_TIME), task_handle).await {
            Ok(Ok(())) => tracing::info!("Dispatcher stopped gracefully"),
            Ok(Err(e)) => tracing::warn!("Dispatcher stopped with error: {:?}", e),
            Err(_) => {
                tracing::warn!("Timeout waiting for dispatcher to stop, aborting");
                abort.abort();
            }
        }
    }
}

async fn run(
    mut game: Game,
    mut receiver: mpsc::Receiver<InternalMessage>,
    topic: Topic,
    frame: Duration,
    snapshot_every: u32,
) {
    let mut interval = tokio::time::interval(frame);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();
    let mut frames = 0u32;

    loop {
        tokio::select! {
            now = interval.tick() => {
                game.update(now.duration_since(last_frame));
                last_frame = now;

                frames += 1;
                if frames >= snapshot_every {
                    frames = 0;
                    topic.publish(InternalMessage::Snapshot(Arc::new(game.snapshot())));
                }
            }
            message = receiver.recv() => match message {
                Some(InternalMessage::Intent(request)) => handle_intent(&mut game, request),
                Some(InternalMessage::Stop) | None => break,
                Some(other) => tracing::debug!("skipping message: {:?}", other),
            },
        }
    }

    if let Err(e) = game.save() {
        tracing::error!("Failed to save on shutdown: {}", e);
    }
    tracing::info!("Dispatcher loop stopped.");
}

fn handle_intent(game: &mut Game, request: IntentRequest) {
    tracing::debug!(
        "Intent {} from {}: {:?}",
        request.request_id,
        request.owner,
        request.intent
    );

    let response = match game.apply(request.intent) {
        Ok(outcome) => ApiResponse::success(request.request_id, &outcome),
        Err(e) => {
            tracing::debug!("Intent refused: {}", e);
            ApiResponse::failure(Some(request.request_id), &e)
        }
    };

    // never block the frame loop on a slow client
    if let Err(e) = request.respond_to.try_send(ResponseSignal::Reply(response)) {
        tracing::warn!("Dropping response for {}: {}", request.owner, e);
    }
}
