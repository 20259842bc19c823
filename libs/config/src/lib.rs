//! # Pool Cycle Configuration
//!
//! Settings and lookup tables for the pool cycle service, validated and
//! normalised before anything touches the chain.
//!
//! ## Features
//!
//! - **Run Settings**: network, token pair, amount and key from TOML + env
//! - **Registries**: network endpoints/contracts and token addresses from JSON
//! - **Service Defaults**: file locations and protocol constants
//!
//! ## Usage
//!
//! ```rust,no_run
//! use poolcycle_config::{NetworkRegistry, ResolvedRun, RunSettings, TokenRegistry};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = RunSettings::load(Path::new("config/settings.toml"))?;
//! let networks = NetworkRegistry::from_file(Path::new("config/networks.json"))?;
//! let tokens = TokenRegistry::from_file(Path::new("config/tokens.json"))?;
//! let run = ResolvedRun::resolve(settings, &networks, &tokens)?;
//! println!("chain id {}", run.network.chain_id);
//! # Ok(())
//! # }
//! ```

pub mod registry;
pub mod service;
pub mod settings;

pub use registry::{is_hex_address, NetworkInfo, NetworkRegistry, ResolvedRun, TokenRegistry};
pub use service::{paths, protocol as constants};
pub use settings::{AuthorizationMode, ExecutionSettings, RunSettings};
