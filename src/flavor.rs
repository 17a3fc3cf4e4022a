use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use uuid::Uuid;
use crate::state::session::GameMessage;

/// Produces a short radio message for a score milestone.
///
/// Implementations may block (network calls, model inference); the worker
/// runs them on the blocking pool under a timeout.
pub trait FlavorTextSource: Send + Sync {
    fn compose(&self, score: u32) -> Option<String>;
}

/// Canned survivor radio lines, picked deterministically from the score
#[derive(Debug, Default, Clone, Copy)]
pub struct RadioChatter;

const CHATTER: [&str; 8] = [
    "Static clears. Someone out there saw your muzzle flash. Keep moving.",
    "Sector grid is dark past the overpass. Whatever you're doing, it's working.",
    "They're coming out of the subway vents now. Watch the alleys.",
    "Heard the big ones shake the street two blocks east. Don't let them corner you.",
    "Neon's still burning on Fifth. As long as it's lit, so are we.",
    "Supply drone went down near the tower. Not worth it. Stay alive.",
    "Whoever's running the streets tonight, the shelter owes you one.",
    "Signal's fading. If anyone hears this, the city isn't lost yet.",
];

impl FlavorTextSource for RadioChatter {
    fn compose(&self, score: u32) -> Option<String> {
        let line = CHATTER[(score / 100) as usize % CHATTER.len()];
        Some(format!("{} [{} pts]", line, score))
    }
}

/// Milestone request emitted by the tick when the score crosses a boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlavorRequest {
    /// Session generation at the time of the crossing
    pub generation: u64,
    pub score: u32,
}

/// Resolved message routed back into the tick's reply inbox
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorReply {
    pub generation: u64,
    pub message: GameMessage,
}

pub fn new_message(text: String) -> GameMessage {
    GameMessage {
        id: Uuid::new_v4().to_string(),
        text,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}

/// Resolve one request; `None` when the source declines, fails or times out
pub async fn resolve(
    source: Arc<dyn FlavorTextSource>,
    request: FlavorRequest,
    limit: Duration,
) -> Option<FlavorReply> {
    let score = request.score;
    let job = tokio::task::spawn_blocking(move || source.compose(score));

    match timeout(limit, job).await {
        Ok(Ok(Some(text))) => Some(FlavorReply {
            generation: request.generation,
            message: new_message(text),
        }),
        Ok(Ok(None)) => {
            log::debug!("Flavor source had nothing for score {}", score);
            None
        }
        Ok(Err(e)) => {
            log::warn!("Flavor source failed for score {}: {}", score, e);
            None
        }
        Err(_) => {
            log::warn!("Flavor source timed out after {:?} for score {}", limit, score);
            None
        }
    }
}

/// Spawn the worker that turns requests into replies off the tick.
/// Each request resolves in its own task so a slow source never stalls the queue.
pub fn spawn_flavor_worker(
    source: Arc<dyn FlavorTextSource>,
    mut requests: mpsc::Receiver<FlavorRequest>,
    replies: mpsc::UnboundedSender<FlavorReply>,
    timeout_ms: u64,
) -> JoinHandle<()> {
    let limit = Duration::from_millis(timeout_ms);

    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let source = source.clone();
            let replies = replies.clone();
            tokio::spawn(async move {
                if let Some(reply) = resolve(source, request, limit).await {
                    if replies.send(reply).is_err() {
                        log::debug!("Reply inbox closed, dropping flavor message");
                    }
                }
            });
        }
        log::debug!("Flavor request queue closed, worker exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl FlavorTextSource for Silent {
        fn compose(&self, _score: u32) -> Option<String> {
            None
        }
    }

    struct Slow;

    impl FlavorTextSource for Slow {
        fn compose(&self, _score: u32) -> Option<String> {
            std::thread::sleep(std::time::Duration::from_millis(200));
            Some("late".to_string())
        }
    }

    #[test]
    fn test_radio_chatter_is_deterministic() {
        let chatter = RadioChatter;
        assert_eq!(chatter.compose(300), chatter.compose(300));
        assert_ne!(chatter.compose(100), chatter.compose(200));
        assert!(chatter.compose(100).unwrap().ends_with("[100 pts]"));
    }

    #[test]
    fn test_resolve_tags_generation() {
        let request = FlavorRequest { generation: 4, score: 200 };
        let reply = tokio_test::block_on(resolve(Arc::new(RadioChatter), request, Duration::from_secs(1)))
            .unwrap();
        assert_eq!(reply.generation, 4);
        assert!(reply.message.text.contains("200"));
        assert!(Uuid::parse_str(&reply.message.id).is_ok());
    }

    #[test]
    fn test_resolve_declined() {
        let request = FlavorRequest { generation: 1, score: 100 };
        assert!(tokio_test::block_on(resolve(Arc::new(Silent), request, Duration::from_secs(1))).is_none());
    }

    #[test]
    fn test_resolve_times_out() {
        let request = FlavorRequest { generation: 1, score: 100 };
        assert!(tokio_test::block_on(resolve(Arc::new(Slow), request, Duration::from_millis(20))).is_none());
    }

    #[tokio::test]
    async fn test_worker_round_trip() {
        let (request_tx, request_rx) = mpsc::channel(4);
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
        let worker = spawn_flavor_worker(Arc::new(RadioChatter), request_rx, reply_tx, 1000);

        request_tx.try_send(FlavorRequest { generation: 2, score: 100 }).unwrap();
        let reply = reply_rx.recv().await.unwrap();
        assert_eq!(reply.generation, 2);

        drop(request_tx);
        worker.await.unwrap();
    }
}
