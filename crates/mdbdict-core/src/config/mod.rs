pub mod table;

pub use table::{readers_for_process_limit, MdbConfig, SyncMode};
