//! Standardized emoji logging for the pool cycle
//!
//! Keeps emoji usage consistent across the deposit, approval and withdrawal
//! legs so a run can be followed by eye.

/// Standard emoji set for pool cycle logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Operation succeeded
    pub const ERROR: &'static str = "❌"; // Operation failed
    pub const WARNING: &'static str = "⚠️"; // Warning or caution
    pub const TIMEOUT: &'static str = "⏰"; // Confirmation window elapsed

    // Module-specific
    pub const MONEY: &'static str = "💰"; // Balances
    pub const NETWORK: &'static str = "🌐"; // RPC/network
    pub const POOL: &'static str = "🏊"; // Pool resolution
    pub const GAS: &'static str = "⛽"; // Gas price/fees
    pub const SUBMIT: &'static str = "📤"; // Transaction broadcast
    pub const SIGN: &'static str = "✍️"; // Off-chain signature

    // Lifecycle legs
    pub const DEPOSIT: &'static str = "➕"; // Liquidity add
    pub const WITHDRAW: &'static str = "➖"; // Liquidity remove
    pub const APPROVE: &'static str = "🔐"; // Allowance raise
}

// Convenience macros for standardized logging
#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_balance {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::MONEY, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_network {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::NETWORK, format!($($arg)*))
    };
}
