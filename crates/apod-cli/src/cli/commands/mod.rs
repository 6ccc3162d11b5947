//! CLI command handlers, one per file.

mod catalog;
mod checksum;
mod completions;
mod fetch;
mod ingest;
mod list;
mod man;
mod verify;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use fetch::{run_fetch, FetchArgs};
pub use ingest::run_ingest;
pub use list::run_list;
pub use man::run_man;
pub use verify::run_verify;
