use crate::{
    error::InmoError,
    message::{InboundText, SendReceipt},
    model::{
        Client, ClientChanges, NewClient, NewProperty, NewStaffUser, Property, PropertyChanges,
        ResourceStatus, StaffUser,
    },
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;

/// Monotonic clock, injected so idle timeouts are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Chat transport, implemented over an external messaging gateway
/// (WhatsApp-style); the core only consumes it.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// Start receiving. Returns a receiver that yields inbound texts.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundText>, InmoError>;

    /// Deliver one text to one recipient.
    async fn send_text(&self, recipient: &str, text: &str) -> Result<SendReceipt, InmoError>;

    /// Whether the sender identity has an authenticated session.
    async fn session_ready(&self) -> bool;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), InmoError>;
}

/// Renders a message template. Template id and data pass through the core
/// opaquely inside `CommandResult`.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template_id: &str, data: &Value) -> Result<String, InmoError>;
}

/// CRUD + search over clients. Default lookups see active records only;
/// `*_any_status` variants see everything.
#[async_trait]
pub trait ClientService: Send + Sync {
    async fn get(&self, id: &str) -> Result<Client, InmoError>;
    async fn get_any_status(&self, id: &str) -> Result<Client, InmoError>;
    async fn list(&self) -> Result<Vec<Client>, InmoError>;
    async fn search(&self, query: &str) -> Result<Vec<Client>, InmoError>;
    async fn create(&self, data: NewClient) -> Result<Client, InmoError>;
    async fn update(&self, id: &str, changes: ClientChanges) -> Result<Client, InmoError>;
    async fn set_status(&self, id: &str, status: ResourceStatus) -> Result<Client, InmoError>;
}

/// CRUD + search over properties, plus media attachment.
#[async_trait]
pub trait PropertyService: Send + Sync {
    async fn get(&self, id: &str) -> Result<Property, InmoError>;
    async fn get_any_status(&self, id: &str) -> Result<Property, InmoError>;
    async fn list(&self) -> Result<Vec<Property>, InmoError>;
    async fn search(&self, query: &str) -> Result<Vec<Property>, InmoError>;
    async fn create(&self, data: NewProperty) -> Result<Property, InmoError>;
    async fn update(&self, id: &str, changes: PropertyChanges) -> Result<Property, InmoError>;
    async fn add_files(&self, id: &str, files: &[String]) -> Result<Property, InmoError>;
    async fn set_status(&self, id: &str, status: ResourceStatus) -> Result<Property, InmoError>;
}

/// CRUD over staff accounts, including the phone → account lookup the
/// gateway uses to resolve the caller's role.
#[async_trait]
pub trait StaffService: Send + Sync {
    async fn get(&self, id: &str) -> Result<StaffUser, InmoError>;
    async fn get_any_status(&self, id: &str) -> Result<StaffUser, InmoError>;
    async fn find_by_phone(&self, telefono: &str) -> Result<Option<StaffUser>, InmoError>;
    async fn list(&self) -> Result<Vec<StaffUser>, InmoError>;
    async fn create(&self, data: NewStaffUser) -> Result<StaffUser, InmoError>;
    async fn set_status(&self, id: &str, status: ResourceStatus) -> Result<StaffUser, InmoError>;
}
