//! Connection parameters
//!
//! This module handles:
//! * The immutable parameter set a descriptor is built from
//! * Opt-in validation and delimiter-collision reporting
//! * Transport security settings and CA bundle preflight

mod params;
mod tls;

pub use params::{
    ConnectionParameters, ConnectionParametersBuilder, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT,
};
pub use tls::{parse_server_name, CaBundle, SecurityMode};
