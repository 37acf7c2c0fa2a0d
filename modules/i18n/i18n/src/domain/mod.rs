pub mod error;
pub mod service;
mod validation;

pub use error::DomainError;
pub use service::Service;
