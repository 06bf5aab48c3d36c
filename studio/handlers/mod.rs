pub mod classifier;
pub mod network;
pub mod network_sse;
