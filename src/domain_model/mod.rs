mod catalog;
mod identity;
mod token;

pub use catalog::*;
pub use identity::*;
pub use token::*;
