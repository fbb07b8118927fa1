//! HTTP surface for document upload, question answering and structured
//! extraction.
//!
//! Four routes: `POST /upload`, `POST /ask`, `POST /extract` and
//! `GET /health`. Domain errors translate to statuses uniformly: not-found is
//! 404, validation is 400, upstream generation failures that do reach the
//! surface are 502, everything else 500, always with a JSON `error` body.

pub mod handlers;
pub mod server;

pub use server::{AppState, GatewayServer};
