pub mod client;

pub use client::{Credentials, HttpResponse, RateLimitConfig, RateLimitedHttpClient};
