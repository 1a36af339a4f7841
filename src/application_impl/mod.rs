mod auth_api_fake;
mod auth_api_impl;

pub use auth_api_fake::*;
pub use auth_api_impl::*;
