pub mod error;
pub mod gateway;
pub mod http;
pub mod session;
pub mod verification;

#[cfg(test)]
mod testing;

pub use error::ClientError;
pub use gateway::Gateway;
pub use http::HttpGateway;
pub use session::{ClientConfig, ReadBackPolicy, Session};
pub use verification::{VerificationForm, VerificationStep};
