//! Local functions the model can call: declarations, wire mapping and
//! dispatch.

mod approver;
pub mod definitions;
mod dispatcher;
pub mod wire;


pub use approver::{Approver, StdinApprover};
pub use definitions::{builtin_tools, to_gemini_tool, ToolDefinition};
pub use dispatcher::{Dispatched, FunctionDispatcher};
