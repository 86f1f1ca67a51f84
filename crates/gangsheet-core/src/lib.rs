//! # gangsheet-core: Pure Pricing & Packing Logic
//!
//! This crate is the **heart** of the gang sheet print shop. It prices
//! customer orders by billable area and lays queued items out on fixed-width
//! transfer-film sheets, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Gang Sheet Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Storefront / Admin UI (TypeScript)                 │   │
//! │  │    Order form ──► Pricing settings ──► Batch queue ──► Sheets   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ts-rs bindings                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           gangsheet-batch (service, config, CLI)                │   │
//! │  │    single-flight generate, image fetch, upload, persist         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ gangsheet-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐           │   │
//! │  │   │ pricing │  │  tiers  │  │ packer  │  │assembly │           │   │
//! │  │   │ billable│  │  ranges │  │  shelf  │  │ claims  │           │   │
//! │  │   │  quote  │  │  sync   │  │  fold   │  │ raster  │           │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └─────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (settings, tiers, queue items, placements, sheets)
//! - [`money`] - Money type and integer area-unit billing
//! - [`pricing`] - Billable dimensions, tier selection, order quotes
//! - [`tiers`] - Tier table validation and reconciliation
//! - [`packer`] - Greedy shelf packer
//! - [`assembly`] - Queue snapshot to batch plan
//! - [`raster`] - Pixel geometry for compositing
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, including packing order
//! 2. **No I/O**: storage, images and logging live in `gangsheet-batch`
//! 3. **Integer Billing**: areas are counted in increment² cells, money in cents
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use gangsheet_core::pricing::{compute_billable_dimensions, select_tier, subtotal_cents_from_area_units};
//! use gangsheet_core::{PricingSettings, PricingTier};
//!
//! let settings = PricingSettings::default();
//! let tiers = PricingTier::default_table();
//!
//! // 3" × 2" stays 3" × 2" at a 0.25" increment: 12 × 8 = 96 area units
//! let billable = compute_billable_dimensions(3.0, 2.0, &settings);
//! assert_eq!(billable.area_units, 96);
//!
//! let tier = select_tier(billable.billable_sq_in, &tiers).unwrap();
//! let subtotal = subtotal_cents_from_area_units(
//!     billable.area_units,
//!     settings.rounding_increment_in,
//!     tier.rate_per_sq_in,
//! );
//! assert_eq!(subtotal.cents(), 72);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assembly;
pub mod error;
pub mod money;
pub mod packer;
pub mod pricing;
pub mod raster;
pub mod tiers;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use gangsheet_core::Money` instead of
// `use gangsheet_core::money::Money`

pub use error::{CoreError, CoreResult, PackError, TierRangeError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
/// and bounds how many units one line can add to the packing queue.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Longest side, in inches, accepted for an order line or queue item.
///
/// Far beyond any roll length; keeps billable area units well inside i64.
pub const MAX_ITEM_DIMENSION_IN: f64 = 1000.0;
