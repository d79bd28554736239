//! Operator approval of commands before they run.

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::AiError;

/// Decides whether a command requested by the model may run.
#[async_trait]
pub trait Approver: Send + Sync {
    async fn approve(&self, command: &str) -> Result<bool, AiError>;
}

/// Prompts on a terminal and reads one answer line per command.
///
/// Only an answer starting with `y` or `Y` approves. The whole line is
/// consumed, so the newline after an answer never leaks into the next prompt.
pub struct StdinApprover<R = BufReader<Stdin>, W = Stdout> {
    terminal: Arc<Mutex<Terminal<R, W>>>,
}

struct Terminal<R, W> {
    input: R,
    output: W,
}

impl StdinApprover {
    /// Approver bound to the process's stdin and stdout.
    pub fn terminal() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R, W> StdinApprover<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            terminal: Arc::new(Mutex::new(Terminal { input, output })),
        }
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    fn ask(&mut self, command: &str) -> Result<bool, AiError> {
        write!(
            self.output,
            "approval is required for the execution of the following script:\n\n{command}\n\nenter 'y' to approve the execution. enter any other value to deny: "
        )
        .and_then(|_| self.output.flush())
        .map_err(|e| AiError::local_io("prompting for approval", "<stdout>", e))?;

        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .map_err(|e| AiError::local_io("reading approval", "<stdin>", e))?;

        Ok(is_approval(answer.as_bytes()))
    }
}

#[async_trait]
impl<R, W> Approver for StdinApprover<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    async fn approve(&self, command: &str) -> Result<bool, AiError> {
        let command = command.to_string();
        let terminal = Arc::clone(&self.terminal);

        tokio::task::spawn_blocking(move || {
            let mut terminal = terminal
                .lock()
                .map_err(|_| AiError::InvalidRequest("approval terminal is unavailable".into()))?;
            terminal.ask(&command)
        })
        .await
        .map_err(|e| AiError::InvalidRequest(format!("approval prompt failed: {e}")))?
    }
}

fn is_approval(answer: &[u8]) -> bool {
    matches!(answer.first(), Some(b'y' | b'Y'))
}
