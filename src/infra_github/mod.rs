mod identity_provider_github;

pub use identity_provider_github::*;
