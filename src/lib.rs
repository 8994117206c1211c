//! Handover is a failover configuration controller.
//!
//! It resolves, validates, and maintains an active runtime
//! configuration (credentials and service endpoints) sourced from one
//! of several redundant backing providers, and transparently fails
//! over between them when the active provider becomes unreachable. A
//! dependent service reads the current database/cache handles from the
//! controller and reports resource failures back to it as failover
//! triggers.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, check, status,
//!   init, validate).
//! - [`bootstrap`] -- Bootstrap file loading and validation: the
//!   provider roster and controller tunables.
//! - [`controller`] -- The centerpiece: candidate ordering, serialized
//!   resolution, atomic switch-over, and dependent notification.
//! - [`error`] -- Unified error types using `thiserror`, including the
//!   typed [`ResourceError`](error::ResourceError) classification.
//! - [`guard`] -- Per-request wrapper: throttled lazy health check and
//!   emergency failover with a single retry.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print
//!   output.
//! - [`monitor`] -- Background loop re-validating the active provider.
//! - [`probe`] -- Bounded-time connectivity checks against resolved
//!   database and cache endpoints.
//! - [`provider`] -- The [`ProviderConfig`](provider::ProviderConfig)
//!   entity and pluggable [`SecretSource`](provider::SecretSource)
//!   backends.
//! - [`registry`] -- Per-provider availability state and the
//!   environment-detection waterfall.
//! - [`resources`] -- Rebuildable dependent handles: database pool,
//!   cache client, session signer.
//! - [`server`] -- Axum server setup, shared state, HTTP client, and
//!   graceful shutdown.
//! - [`status`] -- `GET /status` diagnostics handler.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML bootstrap file support _(enabled by default)_ |
//! | `json` | JSON bootstrap file support |
//! | `toml` | TOML bootstrap file support |
//! | `aws` | AWS Secrets Manager secret backend |
//! | `sentry-integration` | Sentry error tracking |
//! | `file-backends` | All bootstrap file formats |
//! | `full` | All features |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod bootstrap;
pub mod cli;
pub mod cmd;
pub mod controller;
pub mod error;
pub mod guard;
pub mod logging;
pub mod monitor;
pub mod probe;
pub mod provider;
pub mod registry;
pub mod resources;
pub mod server;
pub mod status;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;
