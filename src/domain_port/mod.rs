// store

mod refresh_token_store;

pub use refresh_token_store::*;

// repo

mod catalog_repo;

pub use catalog_repo::*;
