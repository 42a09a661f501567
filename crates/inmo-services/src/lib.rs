//! Outward-facing adapters: the back-office REST API, the chat gateway
//! transport, and the static message templates.

pub mod rest;
pub mod templates;
pub mod transport;

pub use rest::BackOffice;
pub use templates::StaticTemplates;
pub use transport::HttpTransport;
