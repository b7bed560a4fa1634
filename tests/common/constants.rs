//! Shared constants for end-to-end tests
//!
//! When seeded data changes, update only this file and `fixtures.rs`.

// ============================================================================
// Collections
// ============================================================================

pub const TRACKS: &str = "musicas";
pub const ARTISTS: &str = "artistas";
pub const GENRES: &str = "generos";
pub const LABELS: &str = "gravadora";
pub const CUSTOMERS: &str = "clientes";
pub const PLANS: &str = "planos";
pub const PAYMENTS: &str = "pagamentos";

// ============================================================================
// Seeded records
// ============================================================================

pub const GENRE_1_ID: i64 = 1;
pub const GENRE_1_DESCRIPTION: &str = "Samba";

pub const LABEL_1_ID: i64 = 1;
pub const LABEL_1_NAME: &str = "Biscoito Fino";

pub const ARTIST_1_ID: i64 = 1;
pub const ARTIST_1_NAME: &str = "Cartola";

pub const TRACK_1_ID: i64 = 1;
pub const TRACK_1_TITLE: &str = "O Mundo É Um Moinho";
pub const TRACK_1_DURATION: i64 = 238;

pub const PLAN_1_ID: i64 = 1;
pub const PLAN_1_PRICE: f64 = 19.9;

pub const CUSTOMER_1_ID: i64 = 1;
pub const CUSTOMER_1_LOGIN: &str = "ana";

pub const PAYMENT_1_ID: i64 = 1;

/// An id no seeded collection uses.
pub const MISSING_ID: i64 = 999;

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for server startup
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Default timeout for HTTP requests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
