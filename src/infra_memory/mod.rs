mod catalog_repo_memory;
mod refresh_token_store_memory;

pub use catalog_repo_memory::*;
pub use refresh_token_store_memory::*;
