pub mod errors;
pub mod logging;
pub mod transaction;

pub use errors::{ConfigError, GenError, SessionStoreError};
pub use logging::{LogHandle, LogLevel};
pub use transaction::{
    validate_history, ExecuteRequest, ExecuteResult, FileReference, FileWrite, FunctionKind,
    FunctionRequest, FunctionResult, Input, InputKind, Output, ReadRequest, ReadResult,
    Transaction, WriteRequest, WriteResult,
};

pub type Result<T> = std::result::Result<T, GenError>;
