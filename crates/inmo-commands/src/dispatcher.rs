//! Role-gated command dispatcher.
//!
//! Order of checks: catalog lookup, required parameters, authorization, then
//! the handler. Counters record unrecognized commands, authorization
//! rejections, and handler outcomes; requests rejected for missing
//! parameters never reach the counters.

use crate::handlers;
use crate::registry;
use crate::stats::{UsageSnapshot, UsageStats};
use inmo_core::command::{CommandKind, CommandRequest, CommandResult};
use inmo_core::error::InmoError;
use inmo_core::model::ResourceStatus;
use inmo_core::traits::{ClientService, PropertyService, StaffService, TransportConnector};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Dispatcher {
    clients: Arc<dyn ClientService>,
    properties: Arc<dyn PropertyService>,
    staff: Arc<dyn StaffService>,
    transport: Arc<dyn TransportConnector>,
    stats: UsageStats,
}

impl Dispatcher {
    pub fn new(
        clients: Arc<dyn ClientService>,
        properties: Arc<dyn PropertyService>,
        staff: Arc<dyn StaffService>,
        transport: Arc<dyn TransportConnector>,
    ) -> Self {
        Self {
            clients,
            properties,
            staff,
            transport,
            stats: UsageStats::new(),
        }
    }

    /// Execute one command on behalf of one caller. The result (or error) is
    /// returned to the caller for delivery; nothing is sent from here.
    pub async fn dispatch(&self, request: &CommandRequest) -> Result<CommandResult, InmoError> {
        let kind = request.command.kind;
        let user = &request.user;

        let Some(info) = registry::info(kind) else {
            self.stats.record_unrecognized();
            return Err(InmoError::MalformedRequest(format!(
                "comando no reconocido: {kind}"
            )));
        };

        for key in info.required_params {
            if !request.command.params.contains_key(*key) {
                return Err(InmoError::MalformedRequest(format!(
                    "falta el parámetro '{key}' para {kind}"
                )));
            }
        }

        if !info.allows(user.role) {
            self.stats.record(kind, &user.id, false);
            return Err(InmoError::Authorization(format!(
                "el rol {} no puede ejecutar {}",
                user.role, kind
            )));
        }

        debug!("dispatching {kind} for user {}", user.id);
        let outcome = self.run(kind, request).await;
        self.stats.record(kind, &user.id, outcome.is_ok());
        if let Err(e) = &outcome {
            warn!("{kind} for user {} failed: {e}", user.id);
        }
        outcome
    }

    /// Count a command attempt whose type never resolved to a catalog entry.
    /// The slash parser reports unknown verbs here so they land in the same
    /// totals as an in-catalog failure.
    pub fn note_unrecognized(&self) {
        self.stats.record_unrecognized();
    }

    /// Counter snapshot for the status surface.
    pub fn usage(&self) -> UsageSnapshot {
        self.stats.snapshot()
    }

    async fn run(
        &self,
        kind: CommandKind,
        request: &CommandRequest,
    ) -> Result<CommandResult, InmoError> {
        let params = &request.command.params;
        match kind {
            CommandKind::CreateClient => handlers::clients::create(&*self.clients, params).await,
            CommandKind::UpdateClient => handlers::clients::update(&*self.clients, params).await,
            CommandKind::ListClients => handlers::clients::list(&*self.clients).await,
            CommandKind::CreateProperty => {
                handlers::properties::create(&*self.properties, params).await
            }
            CommandKind::UpdateProperty => {
                handlers::properties::update(&*self.properties, params).await
            }
            CommandKind::ListProperties => handlers::properties::list(&*self.properties).await,
            CommandKind::AddPropertyFiles => {
                handlers::properties::add_files(&*self.properties, params).await
            }
            CommandKind::CreateUser => {
                handlers::users::create(&*self.staff, &*self.transport, params).await
            }
            CommandKind::GetUser => handlers::users::get(&*self.staff, params).await,
            CommandKind::ListUsers => handlers::users::list(&*self.staff).await,
            CommandKind::ActivateUser => {
                handlers::users::set_status(&*self.staff, params, ResourceStatus::Activo).await
            }
            CommandKind::DeactivateUser => {
                handlers::users::set_status(&*self.staff, params, ResourceStatus::Inactivo).await
            }
            // Bulk sends are paced by the broadcast scheduler, which the
            // gateway drives directly; they never reach a CRUD handler.
            CommandKind::SendBroadcast => Err(InmoError::Validation(
                "la difusión se ejecuta desde el planificador de envíos".to_string(),
            )),
        }
    }
}
