use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("invalid option combination: {0}")]
    InvalidCombination(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store io error while {context} '{}': {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt session file '{}': {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid session id {id}. {count} session(s) exist")]
    InvalidId { id: usize, count: usize },

    #[error("invalid session history: {0}")]
    InvalidHistory(String),
}

impl SessionStoreError {
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionStoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("gemini error: {0}")]
    Ai(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::InvalidCombination("schema and execution".into());
        assert_eq!(
            err.to_string(),
            "invalid option combination: schema and execution"
        );
    }

    #[test]
    fn session_store_error_display() {
        let err = SessionStoreError::InvalidId { id: 4, count: 2 };
        assert_eq!(err.to_string(), "invalid session id 4. 2 session(s) exist");

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SessionStoreError::io("renaming", "/tmp/s.json", io_err);
        assert!(err.to_string().contains("renaming '/tmp/s.json'"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn gen_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let gen_err: GenError = config_err.into();
        assert!(matches!(gen_err, GenError::Config(_)));
        assert!(gen_err.to_string().contains("bad toml"));
    }

    #[test]
    fn gen_error_from_session_store() {
        let store_err = SessionStoreError::InvalidHistory("orphaned result".into());
        let gen_err: GenError = store_err.into();
        assert!(matches!(gen_err, GenError::Session(_)));
        assert!(gen_err.to_string().contains("orphaned result"));
    }

    #[test]
    fn gen_error_other_variants() {
        let err = GenError::Ai("model unavailable".into());
        assert_eq!(err.to_string(), "gemini error: model unavailable");

        let err = GenError::Other("a single prompt is required".into());
        assert_eq!(err.to_string(), "a single prompt is required");
    }
}
