mod client;
mod factory;

pub use client::{GraphClient, UserProfile, DEFAULT_GRAPH_BASE_URL};
pub use factory::GraphClientFactory;
