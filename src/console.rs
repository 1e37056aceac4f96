//! Interactive console front end.
//!
//! Reads one line per turn and prints the agent's answer. History is kept
//! in the shared store under a fixed conversation id.

use crate::agent::Agent;
use crate::constants::CONSOLE_CONVERSATION_ID;
use crate::history::ConversationStore;
use crate::shutdown::ShutdownSignal;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

const BANNER: &str = "Welcome to the Agent Console! Type 'exit' to quit.\n\
                      ======================================\n";

/// Run the read-eval-print loop until `exit`, end of input or shutdown.
pub async fn run_console<R, W>(
    agent: &dyn Agent,
    store: &ConversationStore,
    input: R,
    mut output: W,
    mut shutdown: ShutdownSignal,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(BANNER.as_bytes()).await?;
    let mut lines = input.lines();

    loop {
        output.write_all(b"You: ").await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.recv() => {
                debug!("Console stopped by shutdown signal");
                output.write_all(b"\n").await?;
                break;
            }
        };

        let Some(line) = line else {
            debug!("Console input closed");
            break;
        };

        let text = line.trim();
        if text.eq_ignore_ascii_case("exit") {
            output.write_all(b"Goodbye!\n").await?;
            break;
        }
        if text.is_empty() {
            continue;
        }

        let history = store.history(CONSOLE_CONVERSATION_ID).await;
        let reply = match agent.respond(text, &history).await {
            Ok(answer) => {
                store.record(CONSOLE_CONVERSATION_ID, text, &answer).await;
                format!("Agent: {}\n", answer)
            }
            Err(e) => {
                error!("Agent failed: {}", e);
                format!("An error occurred: {}\n", e)
            }
        };
        output.write_all(reply.as_bytes()).await?;
    }

    output.flush().await
}
