//! Account signup automation for the Mnet Plus account service.
//!
//! The core is a two-call workflow (`authToken` then `save-tmp`) driven over
//! a retrying HTTP transport. The batch runner, HTTP router, and the CLI in
//! `services/api` all funnel raw fields into [`signup::SignupFields`] and let
//! the core normalize and execute them.

pub mod batch;
pub mod config;
pub mod error;
pub mod signup;
pub mod telemetry;
pub mod transport;
