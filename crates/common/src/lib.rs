//! # Randnet Common Crate
//!
//! Shared building blocks for the randnet DKG stack:
//! - `types`: addresses, validators and validator-set snapshots
//! - `crypto`: Ed25519 sign/verify + SHA3 helpers
//! - `priv_validator`: the validator signing abstraction (and its mock)
//! - `config`: TOML config loader for node surfaces

pub mod config;
pub mod crypto;
pub mod priv_validator;
pub mod types;

pub use config::{load_from_file, ConfigError, DkgConfig};
pub use crypto::CryptoError;
pub use priv_validator::{MockPV, PrivValidator};
pub use types::{Address, AddressError, Validator, ValidatorSet};
