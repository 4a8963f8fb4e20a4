//! Command implementations for the CLI.

mod list;
mod read;

pub use list::cmd_list;
pub use read::cmd_read;
