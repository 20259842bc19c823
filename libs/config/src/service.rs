//! Service defaults
//!
//! Default file locations and protocol constants shared by the pool cycle
//! binary and its tests.

/// Default file locations, relative to the working directory
pub mod paths {
    /// Run settings (TOML)
    pub const SETTINGS_FILE: &str = "config/settings.toml";

    /// Network registry (JSON)
    pub const NETWORKS_FILE: &str = "config/networks.json";

    /// Token registry (JSON)
    pub const TOKENS_FILE: &str = "config/tokens.json";
}

/// Protocol-level constants
pub mod protocol {
    /// Permit validity window (seconds)
    pub const PERMIT_VALIDITY_SECS: u64 = 86_400;

    /// Withdrawal mode code: receive the reference asset unwrapped as native currency
    pub const WITHDRAW_MODE_NATIVE: u8 = 1;
}
