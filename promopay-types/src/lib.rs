//! # PromoPay Types
//!
//! Domain types and port traits for the promotion payments service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (PaymentMethod, Transaction, Profile)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for operation boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use currency_rates::{CurrencyCode, RateTable};
pub use domain::{
    CampaignId, MethodConfig, MethodId, MethodKind, PaymentMethod, Profile, Transaction,
    TransactionId, TransactionStatus, UserId,
};
pub use dto::*;
pub use error::{AppError, DomainError, GatewayError, StoreError};
pub use ports::{PaymentGateway, PaymentStore};
