//! Remote-endpoint access and demo data.

pub mod endpoint;
pub mod runtime;
pub mod sample;

pub use endpoint::{EndpointTarget, resolve};
pub use runtime::{EncodedRequest, RawResponse, RuntimeClient, RuntimeCredentials};
pub use sample::generate_history;
