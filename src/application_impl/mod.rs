mod auth_service_impl;
mod catalog_service_impl;
mod identity_provider_fake;
mod token_codec_jwt;
mod token_issuer;
mod token_sweeper;

pub use auth_service_impl::*;
pub use catalog_service_impl::*;
pub use identity_provider_fake::*;
pub use token_codec_jwt::*;
pub use token_issuer::*;
pub use token_sweeper::*;
