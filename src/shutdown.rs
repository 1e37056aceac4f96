//! Graceful shutdown handling with turn draining.
//!
//! This module provides:
//! - Signal handling (SIGTERM, SIGINT, Ctrl+C)
//! - Draining of in-flight bot turns with a configurable timeout
//! - Release of conversation history

use crate::bot::TeamsBot;
use crate::constants::{DEFAULT_DRAIN_TIMEOUT, DRAIN_POLL_INTERVAL};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

/// Shutdown signal that can be awaited.
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait for the shutdown signal.
    pub async fn recv(&mut self) {
        let _ = self.receiver.wait_for(|&v| v).await;
    }

    /// Check if shutdown has been signaled without blocking.
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Shutdown phases for coordinated cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    /// Shutdown has been initiated.
    Initiated,

    /// Waiting for running turns to finish.
    DrainingTurns,

    /// Dropping conversation history.
    ClearingHistory,

    /// Final cleanup complete.
    Complete,
}

impl std::fmt::Display for ShutdownPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownPhase::Initiated => write!(f, "initiated"),
            ShutdownPhase::DrainingTurns => write!(f, "draining_turns"),
            ShutdownPhase::ClearingHistory => write!(f, "clearing_history"),
            ShutdownPhase::Complete => write!(f, "complete"),
        }
    }
}

/// Controller for managing graceful shutdown.
pub struct ShutdownController {
    sender: watch::Sender<bool>,
    shutting_down: AtomicBool,
    phase_sender: broadcast::Sender<ShutdownPhase>,
    drain_timeout: Duration,
}

impl ShutdownController {
    /// Create a new shutdown controller with the default drain timeout.
    pub fn new() -> Self {
        Self::with_drain_timeout(DEFAULT_DRAIN_TIMEOUT)
    }

    /// Create a shutdown controller with a custom drain timeout.
    pub fn with_drain_timeout(drain_timeout: Duration) -> Self {
        let (sender, _) = watch::channel(false);
        let (phase_sender, _) = broadcast::channel(16);

        Self {
            sender,
            shutting_down: AtomicBool::new(false),
            phase_sender,
            drain_timeout,
        }
    }

    /// Get a shutdown signal receiver.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to shutdown phase notifications.
    pub fn subscribe_phases(&self) -> broadcast::Receiver<ShutdownPhase> {
        self.phase_sender.subscribe()
    }

    /// Check if shutdown is in progress.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Initiate shutdown. Only the first call has an effect.
    pub fn shutdown(&self) {
        if self
            .shutting_down
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Initiating graceful shutdown...");
            self.sender.send_replace(true);
            let _ = self.phase_sender.send(ShutdownPhase::Initiated);
        }
    }

    fn notify_phase(&self, phase: ShutdownPhase) {
        info!("Shutdown phase: {}", phase);
        let _ = self.phase_sender.send(phase);
    }

    /// Perform graceful shutdown.
    ///
    /// 1. Signals every listener to stop accepting work
    /// 2. Waits for in-flight turns to complete (up to the drain timeout)
    /// 3. Clears conversation history
    pub async fn graceful_shutdown(&self, bot: &TeamsBot) {
        self.shutdown();

        self.notify_phase(ShutdownPhase::DrainingTurns);
        self.drain_turns(bot).await;

        self.notify_phase(ShutdownPhase::ClearingHistory);
        bot.store().clear().await;

        self.notify_phase(ShutdownPhase::Complete);
        info!("Graceful shutdown complete");
    }

    async fn drain_turns(&self, bot: &TeamsBot) {
        let start = Instant::now();

        loop {
            let running = bot.in_flight();
            if running == 0 {
                info!("All turns drained");
                break;
            }

            if start.elapsed() > self.drain_timeout {
                warn!("Drain timeout exceeded with {} turn(s) still running", running);
                break;
            }

            info!("Waiting for {} in-flight turn(s) to complete...", running);
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }

    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared shutdown controller type.
pub type SharedShutdownController = Arc<ShutdownController>;

/// Create a shared shutdown controller with a custom drain timeout.
pub fn new_shutdown_controller(drain_timeout: Duration) -> SharedShutdownController {
    Arc::new(ShutdownController::with_drain_timeout(drain_timeout))
}

/// Install signal handlers for graceful shutdown.
///
/// Ctrl+C and, on Unix, SIGTERM trigger the shutdown controller.
pub fn install_signal_handlers(controller: SharedShutdownController) {
    let ctrl_c_controller = controller.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown...");
                ctrl_c_controller.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C signal: {}", e);
            }
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, initiating shutdown...");
                controller.shutdown();
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    });

    #[cfg(not(unix))]
    drop(controller);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::config::HistoryConfig;
    use crate::error::BotError;
    use crate::history::{ChatMessage, ConversationStore};
    use crate::activity::{Activity, ConversationAccount};
    use async_trait::async_trait;

    struct SlowAgent(Duration);

    #[async_trait]
    impl Agent for SlowAgent {
        async fn respond(&self, input: &str, _history: &[ChatMessage]) -> Result<String, BotError> {
            tokio::time::sleep(self.0).await;
            Ok(input.to_string())
        }
    }

    fn bot(delay: Duration) -> Arc<TeamsBot> {
        let store = Arc::new(ConversationStore::new(HistoryConfig::default()));
        Arc::new(TeamsBot::new(Arc::new(SlowAgent(delay)), store))
    }

    fn message(text: &str) -> Activity {
        Activity {
            conversation: Some(ConversationAccount {
                id: "conv".to_string(),
                ..Default::default()
            }),
            ..Activity::message(text)
        }
    }

    #[test]
    fn test_shutdown_signal() {
        let controller = ShutdownController::new();
        let signal = controller.signal();
        assert!(!signal.is_shutdown());
        assert_eq!(controller.drain_timeout(), Duration::from_secs(30));

        controller.shutdown();
        assert!(controller.is_shutting_down());
        assert!(signal.is_shutdown());

        // Second call is a no-op
        controller.shutdown();
        assert!(controller.is_shutting_down());
    }

    #[tokio::test]
    async fn test_signal_recv_after_shutdown() {
        let controller = ShutdownController::new();
        let mut signal = controller.signal();
        controller.shutdown();
        signal.recv().await;
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn test_graceful_shutdown_clears_history() {
        let controller = ShutdownController::new();
        let bot = bot(Duration::ZERO);
        bot.handle(&message("hi")).await;
        assert!(!bot.store().is_empty().await);

        let mut phases = controller.subscribe_phases();
        controller.graceful_shutdown(&bot).await;

        assert!(bot.store().is_empty().await);
        assert_eq!(phases.recv().await.unwrap(), ShutdownPhase::Initiated);
        assert_eq!(phases.recv().await.unwrap(), ShutdownPhase::DrainingTurns);
        assert_eq!(phases.recv().await.unwrap(), ShutdownPhase::ClearingHistory);
        assert_eq!(phases.recv().await.unwrap(), ShutdownPhase::Complete);
    }

    #[tokio::test]
    async fn test_drain_waits_for_running_turn() {
        let controller = ShutdownController::with_drain_timeout(Duration::from_secs(5));
        let bot = bot(Duration::from_millis(100));

        let running = bot.clone();
        let turn = tokio::spawn(async move { running.handle(&message("slow")).await });
        while bot.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        controller.graceful_shutdown(&bot).await;
        assert_eq!(bot.in_flight(), 0);
        assert_eq!(turn.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_drain_timeout() {
        let controller = ShutdownController::with_drain_timeout(Duration::from_millis(10));
        let bot = bot(Duration::from_secs(60));

        let running = bot.clone();
        let turn = tokio::spawn(async move { running.handle(&message("stuck")).await });
        while bot.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        controller.graceful_shutdown(&bot).await;
        assert_eq!(bot.in_flight(), 1);
        turn.abort();
    }

    #[test]
    fn test_shutdown_phase_display() {
        assert_eq!(ShutdownPhase::Initiated.to_string(), "initiated");
        assert_eq!(ShutdownPhase::DrainingTurns.to_string(), "draining_turns");
        assert_eq!(ShutdownPhase::ClearingHistory.to_string(), "clearing_history");
        assert_eq!(ShutdownPhase::Complete.to_string(), "complete");
    }
}
