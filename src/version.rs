// Package identity, reported on /version and sent upstream as the default User-Agent

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `"btc-dashboard/0.1.0"`.
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}
