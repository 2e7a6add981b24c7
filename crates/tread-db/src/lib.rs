//! # tread-db: Database Layer for Tread
//!
//! This crate provides database access for the Tread shop inventory.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tread Data Flow                                  │
//! │                                                                         │
//! │  CLI command (tread tires list --search 205)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     tread-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌──────────────┐   ┌────────────────┐   ┌──────────────────┐  │    │
//! │  │   │   Database   │   │  Repositories  │   │ InventoryService │  │    │
//! │  │   │   (pool.rs)  │   │                │   │ (inventory.rs)   │  │    │
//! │  │   │              │   │ PromotionRepo  │   │                  │  │    │
//! │  │   │  SqlitePool  │◄──│ TireRepo       │◄──│ stock in / out   │  │    │
//! │  │   │  Migrations  │   │ WheelRepo      │   │ guarded deletes  │  │    │
//! │  │   │              │   │ FitmentRepo    │   │ import / export  │  │    │
//! │  │   │              │   │ MovementRepo   │   │                  │  │    │
//! │  │   └──────────────┘   └────────────────┘   └──────────────────┘  │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     SQLite Database                             │    │
//! │  │   ~/.local/share/tread/tread.db  (or --db PATH)                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Repository implementations (promotion, tire, wheel, ...)
//! - [`inventory`] - Stock-changing operations and bulk import/export
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tread_db::{Database, DbConfig};
//! use tread_core::InventoryFilter;
//!
//! let db = Database::new(DbConfig::new("tread.db")).await?;
//!
//! let listings = db.tires().list(&InventoryFilter::search("205/55")).await?;
//! for listing in &listings {
//!     println!("{} {}", listing.tire.label(), listing.quote.price_for_four().is_some());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use inventory::InventoryService;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::fitment::FitmentRepository;
pub use repository::movement::{MovementRepository, DEFAULT_HISTORY_LIMIT};
pub use repository::promotion::PromotionRepository;
pub use repository::tire::TireRepository;
pub use repository::wheel::WheelRepository;
