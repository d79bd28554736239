//! Session persistence for gen.
//!
//! Each conversation is a JSON array of transactions in its own file under
//! `<app_dir>/sessions/`. Exactly one file carries the `.active` suffix;
//! prompts append to it, and `stash`/`restore` move the marker.

mod record;
mod store;


pub use record::SessionRecord;
pub use store::SessionStore;
