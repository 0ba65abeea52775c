mod client;
mod types;

pub use client::SalonClient;
pub use types::*;
