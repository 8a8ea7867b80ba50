//! # Cloudfruit Architecture
//!
//! Cloudfruit walks through a client of a cloud record service: checking the
//! account, keeping a local list of "Fruits" records with image assets in step
//! with the service, and managing a push subscription for new records. It is a
//! library first; the `cloudfruit` binary is one client of it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, prints results, sets up logging        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - AccountFacade, FruitsFacade, SubscriptionFacade          │
//! │  - Own the state a screen would render                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Sequencing of service calls, failure policy              │
//! │  - Returns CmdResult, never prints                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Container Layer (container/)                               │
//! │  - Abstract Container trait                                 │
//! │  - FileContainer (CLI), InMemoryContainer (testing)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! Nothing here retries. A remote failure either becomes a message in the
//! facade's state (account status) or is logged through the `log` facade and
//! swallowed (saves, queries, deletes, subscriptions). Only setup problems
//! such as an unreadable config surface as `Err`.
//!
//! ## Module Overview
//!
//! - [`api`]: the three facades
//! - [`commands`]: logic behind each facade operation
//! - [`container`]: the service abstraction and its implementations
//! - [`query`]: predicates, sort descriptors, paging and result sinks
//! - [`notifications`]: local notification permission boundary
//! - [`model`]: records, assets, fruits, subscriptions, account types
//! - [`config`]: configuration management
//! - [`error`]: error types

pub mod api;
pub mod commands;
pub mod config;
pub mod container;
pub mod error;
pub mod model;
pub mod notifications;
pub mod query;
