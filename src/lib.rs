//! Lottery keeper library: signs, submits and confirms lottery contract messages.

pub mod admin;
pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod lottery;
pub mod observability;
pub mod resilience;

pub use config::schema::KeeperConfig;
pub use lifecycle::Shutdown;
pub use lottery::LotteryService;
