//! Session management commands: list, restore, delete, delete-all.

use std::io::Write;

use gen_common::SessionStoreError;
use gen_store::{SessionRecord, SessionStore};

use crate::cli::Args;

/// A session command that runs instead of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    List,
    Restore(usize),
    Delete(usize),
    DeleteAll,
}

impl SessionCommand {
    pub fn from_args(args: &Args) -> Option<Self> {
        if let Some(id) = args.restore_session {
            Some(Self::Restore(id))
        } else if let Some(id) = args.delete_session {
            Some(Self::Delete(id))
        } else if args.delete_all_sessions {
            Some(Self::DeleteAll)
        } else if args.list_sessions {
            Some(Self::List)
        } else {
            None
        }
    }

    pub fn run(self, store: &SessionStore, out: &mut impl Write) -> Result<(), SessionStoreError> {
        match self {
            Self::List => {
                for record in store.list()? {
                    let _ = writeln!(out, "{}", format_record(&record));
                }
                Ok(())
            }
            Self::Restore(id) => store.restore(id),
            Self::Delete(id) => store.delete(id),
            Self::DeleteAll => store.delete_all(),
        }
    }
}

/// One listing line: `#2 (active) 2026-01-05 09:14:33: summary`.
fn format_record(record: &SessionRecord) -> String {
    let marker = if record.active { " (active)" } else { "" };
    format!(
        "#{}{} {}: {}",
        record.id,
        marker,
        record.modified.format("%Y-%m-%d %H:%M:%S"),
        record.summary
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gen_common::{Input, LogHandle, Output, Transaction};

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("gen").chain(argv.iter().copied())).unwrap()
    }

    fn write_session(store: &SessionStore, prompt: &str) {
        let transaction = Transaction {
            tokens: 0,
            input: Input::user(prompt, Vec::new()),
            output: Output::text("ok"),
        };
        store.write(&[transaction]).unwrap();
    }

    #[test]
    fn command_selection() {
        assert_eq!(SessionCommand::from_args(&args(&["hello"])), None);
        assert_eq!(
            SessionCommand::from_args(&args(&["-l"])),
            Some(SessionCommand::List)
        );
        assert_eq!(
            SessionCommand::from_args(&args(&["-r", "2"])),
            Some(SessionCommand::Restore(2))
        );
        assert_eq!(
            SessionCommand::from_args(&args(&["-d", "1"])),
            Some(SessionCommand::Delete(1))
        );
        assert_eq!(
            SessionCommand::from_args(&args(&["--delete-all"])),
            Some(SessionCommand::DeleteAll)
        );
        assert_eq!(SessionCommand::from_args(&args(&["-n"])), None);
    }

    #[test]
    fn list_prints_one_line_per_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), &LogHandle::disabled());
        write_session(&store, "first question");
        store.stash().unwrap();
        write_session(&store, "second question");

        let mut out = Vec::new();
        SessionCommand::List.run(&store, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("#1 "));
        assert!(lines[0].ends_with(": first question"));
        assert!(lines[1].starts_with("#2 (active) "));
        assert!(lines[1].ends_with(": second question"));
    }

    #[test]
    fn restore_and_delete_reach_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), &LogHandle::disabled());
        write_session(&store, "first");
        store.stash().unwrap();
        write_session(&store, "second");

        let mut out = Vec::new();
        SessionCommand::Restore(1).run(&store, &mut out).unwrap();
        assert_eq!(store.read().unwrap()[0].input.text, "first");

        SessionCommand::Delete(2).run(&store, &mut out).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);

        let err = SessionCommand::Delete(5).run(&store, &mut out).unwrap_err();
        assert!(matches!(err, SessionStoreError::InvalidId { id: 5, count: 1 }));

        SessionCommand::DeleteAll.run(&store, &mut out).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(out.is_empty());
    }
}
