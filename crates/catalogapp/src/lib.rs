//! # Catalog Architecture
//!
//! `catalogapp` is the **UI-agnostic core** of a product catalog: products, their
//! sellable lines and images, brands, attributes, and two hierarchies (categories and
//! product types). The `catalog` binary is one thin client of it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (crates/catalog)                                       │
//! │  - Parses arguments, renders output, retries on Conflict    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, schema checked on creation    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One transaction per operation: validate, write, commit   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core rules                                                 │
//! │  - ordering.rs: ordinals within a sibling scope             │
//! │  - binding.rs: one value per attribute per carrier          │
//! │  - tree.rs: unique names, no cycles, protected parents      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Transactions over whole-catalog snapshots                │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Validate, Then Commit
//!
//! Nothing validates itself on save. Every write runs explicit checks inside its
//! transaction, and the store re-checks references and unique keys on every write.
//! A failed check drops the transaction and nothing is stored. Two writers racing on
//! the same snapshot cannot both commit: the loser gets `Conflict`, the only error a
//! caller may retry.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): unit tests against `InMemoryStore` and the store
//!    fixtures. This is where the lion's share of testing lives.
//! 2. **API** (`api.rs`): dispatch and schema checking.
//! 3. **Integration** (`tests/`): whole scenarios against a `FileStore` in a temp dir,
//!    including two threads racing for the same ordinal.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic per operation family
//! - [`ordering`]: Ordinal assignment for product lines and images
//! - [`binding`]: Attribute binding validation
//! - [`tree`]: Category and product-type trees
//! - [`validation`]: Field rules (names, slugs, skus, prices)
//! - [`schema`]: Relation registry, delete policies, order-field declarations
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Persisted records
//! - [`config`]: Configuration management
//! - [`init`]: Data directory resolution and startup
//! - [`error`]: Error types

pub mod api;
pub mod binding;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod ordering;
pub mod schema;
pub mod store;
pub mod tree;
pub mod validation;
