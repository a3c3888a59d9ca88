// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    format_metadata,
    format_suggestions,
    mapping_from_args,
    resolve_database_path,
};
