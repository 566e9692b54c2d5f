mod client;
mod provider;

pub use client::{CircleClient, DEFAULT_API_URL};
