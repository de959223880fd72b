// crmdesk-api: Async Rust client for the CRM console reporting backend

pub mod client;
pub mod error;
pub mod models;
pub mod reports;
pub mod session;
pub mod transport;

pub use client::ReportsClient;
pub use error::Error;
pub use models::Envelope;
pub use reports::FunnelQuery;
pub use transport::{TlsMode, TransportConfig};
