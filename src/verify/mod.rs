// ABOUTME: Functional verification of the deployed service's HTTP API.
// ABOUTME: Health poll, then create-then-read of a product record, then cleanup.

mod client;
mod product;
mod verifier;

pub use client::{ApiClient, ApiMethod, ApiRequest, ApiResponse, HttpClient, HttpError};
pub use product::{NewProduct, ProductRecord};
pub use verifier::{FunctionalVerifier, HttpHealthProbe};
