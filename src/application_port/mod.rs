mod auth_service;
mod catalog_service;
mod identity_provider;

pub use auth_service::*;
pub use catalog_service::*;
pub use identity_provider::*;
