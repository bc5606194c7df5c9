//! JSON HTTP API over the matching engine.
//!
//! The catalog is loaded once at startup and shared read-only by all handlers.
//! Matching runs on the blocking thread pool.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! medmatch serve
//!
//! # Custom port and catalog
//! MEDMATCH_PORT=3000 medmatch serve --catalog master.json
//!
//! # Bind to all interfaces
//! medmatch serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /api/normalize` - Normalize `{names: [...]}`
//! - `POST /api/fuzzy-match` - Match `{drugs: [...], algorithm?, display_name?, candidates?}`
//! - `POST /api/segments` - Match drug segments of `{lines: [...]}`
//! - `GET /api/catalog` - Entry and category counts
//!
//! Invalid requests get `400` with `{error, error_type}`.

pub mod server;
