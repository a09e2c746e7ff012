//! WebSocket subscriber transport.
//!
//! Dashboards connect here for live tallies. On connect the server sends a
//! snapshot of the current run's tally (when one exists) so late joiners see
//! the right value, then forwards bus events as they are published.
//!
//! Liveness: the server pings every 25 seconds and closes connections that
//! have been silent for more than 60 seconds. A subscriber whose send stalls
//! past the configured bound is closed without affecting anyone else; the
//! bus's drop-oldest policy means a lagging subscriber resumes at the newest
//! tally rather than stalling the publisher.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, timeout, Instant};

use crate::app::AppState;
use crate::middleware::metrics;
use domain::events::TallyEvent;

/// Interval between server pings.
const PING_INTERVAL: Duration = Duration::from_secs(25);

/// Connections silent longer than this are closed.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// GET /events
pub async fn events_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_subscriber(socket, state))
}

async fn handle_subscriber(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.bus.subscribe();
    let send_timeout = Duration::from_secs(state.config.subscriber_send_timeout_secs);

    metrics::record_subscriber_count(state.bus.subscriber_count());
    tracing::debug!(
        subscribers = state.bus.subscriber_count(),
        "Dashboard subscriber connected"
    );

    // Late joiners get the current tally before any deltas.
    if let Some(snapshot) = current_snapshot(&state).await {
        if send_event(&mut sender, &snapshot, send_timeout).await.is_err() {
            finish(state).await;
            return;
        }
    }

    let mut ping = interval(PING_INTERVAL);
    ping.reset(); // first tick fires after the interval, not immediately
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if send_event(&mut sender, &event, send_timeout).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // Dropped tallies are superseded by the next one; keep going.
                    tracing::warn!(missed, "Subscriber lagged; dropped oldest tally updates");
                }
                Err(RecvError::Closed) => break,
            },
            message = receiver.next() => match message {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => last_activity = Instant::now(),
                Some(Err(err)) => {
                    tracing::debug!(error = %err, "Subscriber stream error");
                    break;
                }
            },
            _ = ping.tick() => {
                if last_activity.elapsed() > IDLE_TIMEOUT {
                    tracing::debug!("Closing idle subscriber");
                    break;
                }
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Dropping the receiver unsubscribes and releases its buffer.
    drop(events);
    finish(state).await;
}

async fn finish(state: AppState) {
    metrics::record_subscriber_count(state.bus.subscriber_count());
    tracing::debug!(
        subscribers = state.bus.subscriber_count(),
        "Dashboard subscriber disconnected"
    );
}

/// The current run's tally, when today has one.
async fn current_snapshot(state: &AppState) -> Option<TallyEvent> {
    let today = chrono::Utc::now()
        .with_timezone(&state.config.tz())
        .date_naive();
    let runs = persistence::repositories::RunRepository::new(state.pool.clone());
    let attendance = persistence::repositories::AttendanceRepository::new(state.pool.clone());

    let run = match runs.find_by_date(today).await {
        Ok(run) => run?,
        Err(err) => {
            tracing::warn!(error = %err, "Snapshot lookup failed; subscriber starts without one");
            return None;
        }
    };

    match attendance.count_for_run(run.id).await {
        Ok(count) => Some(TallyEvent::Snapshot {
            run_id: run.id,
            count,
        }),
        Err(err) => {
            tracing::warn!(error = %err, "Snapshot count failed; subscriber starts without one");
            None
        }
    }
}

/// Sends one event, bounded by the subscriber send timeout. An error (or an
/// elapsed bound) means this subscriber is done.
async fn send_event(
    sender: &mut (impl futures::Sink<Message, Error = axum::Error> + Unpin),
    event: &TallyEvent,
    bound: Duration,
) -> Result<(), ()> {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialise tally event");
            return Ok(()); // skip the event, keep the subscriber
        }
    };

    match timeout(bound, sender.send(Message::Text(payload))).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "Subscriber send failed");
            Err(())
        }
        Err(_elapsed) => {
            tracing::warn!("Subscriber send exceeded bound; closing slow subscriber");
            Err(())
        }
    }
}
