pub mod espn;
pub mod polymarket;

// Re-export commonly used types
pub use espn::EspnClient;
pub use polymarket::PolymarketClient;
