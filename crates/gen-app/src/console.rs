//! Terminal output for interactive invocations.

use std::io::{self, Write};
use std::sync::Mutex;

use gen_ai::TurnObserver;
use gen_common::{FunctionRequest, FunctionResult};

/// Prints model commentary and dispatch progress as a prompt is answered.
pub struct ConsoleObserver<W: Write + Send> {
    out: Mutex<W>,
    echo_commands: bool,
}

impl ConsoleObserver<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            echo_commands: true,
        }
    }

    /// Leave command text to the approval prompt, which already shows it.
    pub fn with_approval(mut self, approval: bool) -> Self {
        self.echo_commands = !approval;
        self
    }

    fn line(&self, text: &str) {
        // Progress output is best effort.
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{text}");
            let _ = out.flush();
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> TurnObserver for ConsoleObserver<W> {
    fn on_commentary(&self, text: &str) {
        self.line(text.trim_end());
    }

    fn on_function(&self, request: &FunctionRequest) {
        match request {
            FunctionRequest::Execute(r) => {
                if self.echo_commands {
                    self.line(&format!("{}\n", r.text));
                }
            }
            FunctionRequest::Read(r) => {
                for path in &r.file_paths {
                    self.line(&format!("reading file '{path}'..."));
                }
            }
            FunctionRequest::Write(r) => {
                for file in &r.files {
                    self.line(&format!(
                        "writing {} bytes to file '{}'...",
                        file.data.len(),
                        file.name
                    ));
                }
            }
        }
    }

    fn on_result(&self, result: &FunctionResult) {
        if let FunctionResult::Execute(r) = result {
            if r.code != 0 {
                self.line(&format!("exit code {}", r.code));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gen_common::{ExecuteRequest, ExecuteResult, FileWrite, ReadRequest, WriteRequest};

    fn printed(observer: ConsoleObserver<Vec<u8>>) -> String {
        String::from_utf8(observer.into_inner()).unwrap()
    }

    #[test]
    fn commentary_is_printed_trimmed() {
        let observer = ConsoleObserver::new(Vec::new());
        observer.on_commentary("checking the directory\n\n");
        assert_eq!(printed(observer), "checking the directory\n");
    }

    #[test]
    fn command_text_is_left_to_the_approval_prompt() {
        let observer = ConsoleObserver::new(Vec::new()).with_approval(true);
        observer.on_function(&FunctionRequest::Execute(ExecuteRequest {
            text: "rm temp.txt".into(),
        }));
        observer.on_result(&FunctionResult::Execute(ExecuteResult::declined()));

        let out = printed(observer);
        assert!(!out.contains("rm temp.txt"));
        assert!(out.contains("exit code 125"));
    }

    #[test]
    fn read_and_write_progress() {
        let observer = ConsoleObserver::new(Vec::new());
        observer.on_function(&FunctionRequest::Read(ReadRequest {
            file_paths: vec!["a.txt".into(), "b.txt".into()],
        }));
        observer.on_function(&FunctionRequest::Write(WriteRequest {
            files: vec![FileWrite {
                name: "out.txt".into(),
                data: "hello".into(),
            }],
        }));

        let out = printed(observer);
        assert!(out.contains("reading file 'a.txt'..."));
        assert!(out.contains("reading file 'b.txt'..."));
        assert!(out.contains("writing 5 bytes to file 'out.txt'..."));
    }

    #[test]
    fn command_text_and_failures_are_shown() {
        let observer = ConsoleObserver::new(Vec::new());
        observer.on_function(&FunctionRequest::Execute(ExecuteRequest {
            text: "ls -la".into(),
        }));
        observer.on_result(&FunctionResult::Execute(ExecuteResult {
            executed: true,
            code: 0,
            ..ExecuteResult::default()
        }));
        observer.on_result(&FunctionResult::Execute(ExecuteResult::declined()));

        let out = printed(observer);
        assert!(out.contains("ls -la"));
        assert!(!out.contains("exit code 0"));
        assert!(out.contains("exit code 125"));
    }
}
