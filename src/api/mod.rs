//! API Module
//!
//! HTTP handlers and routing for the clinical notes REST API.
//!
//! # Endpoints
//! - `GET /health`, `GET /cache/stats` - Service status and listing cache statistics
//! - `POST /sanitize`, `POST /doses/cycle`, `POST /rut/validate` - Stateless tools
//! - `/templates`, `/records/*` - Open record, templates, validation and import
//! - `/medications/*` - Medication list import, dose cycling and printable chart
//! - `/draft`, `/history`, `/favorites`, `/recent`, `/settings/*` - Local store
//! - `/auth/session`, `/drive/*` - Drive session, listings, save, open and search
//! - `POST /ai/complete` - Writing assistant

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
