//! REST API module
//!
//! Provides HTTP REST API for programmatic access to the wallet.
//!
//! # Endpoints
//!
//! ## Wallet
//! - `GET /api/wallet` - Status summary
//! - `GET /api/principals` - Principals and quorum
//! - `GET /api/events` - Recorded audit stream
//! - `POST /api/deposit` - Receive value
//! - `POST /api/quorum` - Propose a quorum change
//!
//! ## Proposals
//! - `GET /api/proposals` - List proposals
//! - `POST /api/proposals` - Submit a proposal
//! - `GET /api/proposals/:id` - Proposal detail
//! - `GET /api/proposals/:id/confirmations` - Confirmation status
//! - `POST /api/proposals/:id/confirm` - Confirm
//! - `POST /api/proposals/:id/revoke` - Revoke a confirmation
//! - `POST /api/proposals/:id/execute` - Execute
//!
//! ## WebSocket
//! - `GET /ws` - Real-time stream of committed audit events

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::create_router;
pub use websocket::{BroadcastSink, WsBroadcaster};
