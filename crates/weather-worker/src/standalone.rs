//! Console chat with a single weather agent.
//!
//! Unlike server sessions, the console conversation keeps its history
//! across turns.

use std::future::Future;
use std::io::BufRead;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use agent_core::{Agent, Conversation, Message, Result};

pub struct StandaloneChat {
    agent: Agent,
    conversation: Conversation,
}

impl StandaloneChat {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            conversation: Conversation::new(),
        }
    }

    /// Answer one line. A failed turn leaves no trace in the history.
    pub async fn respond(&mut self, input: &str) -> Result<String> {
        let mark = self.conversation.len();
        self.conversation.push(Message::user(input));

        let result = self.agent.run(&mut self.conversation).await;
        if result.is_err() {
            self.conversation.messages_mut().truncate(mark);
        }
        result
    }

    #[cfg(test)]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit")
}

/// Lines of stdin, read on a plain thread.
///
/// A pending tokio stdin read cannot be cancelled and holds the runtime open
/// after Ctrl-C. This thread is left behind when the loop ends.
pub fn stdin_lines() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Read-answer loop. Returns on `quit`/`exit`, end of input or `shutdown`.
pub async fn run_loop<W>(
    chat: &mut StandaloneChat,
    mut input: mpsc::Receiver<std::io::Result<String>>,
    mut output: W,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    tokio::pin!(shutdown);

    output
        .write_all(b"Weather agent ready. Ask about US weather alerts or forecasts; type 'quit' to exit.\n")
        .await?;

    loop {
        output.write_all(b"\nYou: ").await?;
        output.flush().await?;

        let line = tokio::select! {
            biased;
            () = &mut shutdown => break,
            line = input.recv() => line,
        };
        let Some(line) = line.transpose()? else { break };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit(query) {
            break;
        }

        let reply = tokio::select! {
            biased;
            () = &mut shutdown => break,
            reply = chat.respond(query) => reply,
        };
        let text = match reply {
            Ok(answer) => format!("Agent: {answer}\n"),
            Err(e) => {
                tracing::warn!(error = %e, "Console turn failed");
                format!("Error: {e}\n")
            }
        };
        output.write_all(text.as_bytes()).await?;
    }

    output.write_all(b"\nGoodbye!\n").await?;
    output.flush().await
}
