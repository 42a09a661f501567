//! Gateway: the event loop connecting the transport, the session engine,
//! the dispatcher and the broadcast scheduler.
//!
//! Inbound texts are routed through one buffered worker per sender, so a
//! user's messages are always processed in order while different users run
//! concurrently.

use crate::commands::{self, SlashCommand};
use inmo_broadcast::{Audience, BroadcastJob, BroadcastScheduler};
use inmo_commands::{registry, Dispatcher};
use inmo_core::command::{CallingUser, CommandKind, CommandRequest, CommandSpec};
use inmo_core::config::Config;
use inmo_core::error::InmoError;
use inmo_core::message::InboundText;
use inmo_core::traits::{ClientService, StaffService, TemplateRenderer, TransportConnector};
use inmo_engine::Engine;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Buffered inbound messages per sender before new ones are dropped.
const SENDER_QUEUE: usize = 32;

/// A sender worker with nothing queued for this long exits; the next message
/// from that sender spawns a fresh one.
const WORKER_IDLE: Duration = Duration::from_secs(60);

pub struct Gateway {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    engine: Engine,
    dispatcher: Dispatcher,
    scheduler: BroadcastScheduler,
    transport: Arc<dyn TransportConnector>,
    staff: Arc<dyn StaffService>,
    clients: Arc<dyn ClientService>,
    templates: Arc<dyn TemplateRenderer>,
    /// One live worker queue per sender currently in conversation.
    active_senders: Mutex<HashMap<String, mpsc::Sender<InboundText>>>,
}

impl Gateway {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        engine: Engine,
        dispatcher: Dispatcher,
        scheduler: BroadcastScheduler,
        transport: Arc<dyn TransportConnector>,
        staff: Arc<dyn StaffService>,
        clients: Arc<dyn ClientService>,
        templates: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                engine,
                dispatcher,
                scheduler,
                transport,
                staff,
                clients,
                templates,
                active_senders: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Run until shutdown.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!(
            "inmo gateway running | office: {} | session timeout: {}min",
            self.inner.config.inmo.name, self.inner.config.session.idle_timeout_mins
        );

        let mut rx = self
            .inner
            .transport
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start transport: {e}"))?;

        // Background sweep: evict idle sessions and drop map entries whose
        // worker already timed out.
        let sweep_inner = self.inner.clone();
        let sweep_secs = self.inner.config.session.sweep_interval_secs.max(1);
        let sweep_handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(sweep_secs)).await;
                let evicted = sweep_inner.engine.sessions().evict_idle().await;
                let pruned = sweep_inner.prune_workers().await;
                if evicted > 0 || pruned > 0 {
                    debug!("evicted {evicted} idle sessions, pruned {pruned} worker entries");
                }
            }
        });

        loop {
            tokio::select! {
                Some(inbound) = rx.recv() => {
                    self.route(inbound).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("received shutdown signal");
                    break;
                }
            }
        }

        // Graceful shutdown: cancel in-flight broadcasts, stop polling.
        sweep_handle.abort();
        self.inner.scheduler.cancel_flag().cancel();
        if let Err(e) = self.inner.transport.stop().await {
            warn!("failed to stop transport: {e}");
        }
        info!("shutdown complete");
        Ok(())
    }

    /// Hand one inbound text to its sender's worker, spawning it on first
    /// contact. A full queue drops the message rather than blocking the
    /// main loop.
    async fn route(&self, inbound: InboundText) {
        let mut senders = self.inner.active_senders.lock().await;

        let mut inbound = inbound;
        if let Some(tx) = senders.get(&inbound.sender_id) {
            match tx.try_send(inbound) {
                Ok(()) => return,
                Err(TrySendError::Full(msg)) => {
                    warn!("dropping message from {}: queue full", msg.sender_id);
                    return;
                }
                Err(TrySendError::Closed(msg)) => inbound = msg,
            }
        }

        let (tx, mut worker_rx) = mpsc::channel::<InboundText>(SENDER_QUEUE);
        let worker_inner = self.inner.clone();
        tokio::spawn(async move {
            while let Ok(Some(msg)) = tokio::time::timeout(WORKER_IDLE, worker_rx.recv()).await {
                worker_inner.handle_inbound(msg).await;
            }
        });

        let sender_id = inbound.sender_id.clone();
        if tx.try_send(inbound).is_err() {
            error!("fresh worker queue for {sender_id} rejected its first message");
        }
        senders.insert(sender_id, tx);
    }
}

impl Inner {
    /// Remove entries whose worker has exited. Returns how many were dropped.
    async fn prune_workers(&self) -> usize {
        let mut senders = self.active_senders.lock().await;
        let before = senders.len();
        senders.retain(|_, tx| !tx.is_closed());
        before - senders.len()
    }

    /// Full pipeline for one inbound text: caller resolution, slash commands,
    /// then the menu engine.
    async fn handle_inbound(self: &Arc<Self>, inbound: InboundText) {
        let phone = inbound.sender_id.clone();
        debug!("inbound text from {phone}");

        let staff_user = match self.staff.find_by_phone(&phone).await {
            Ok(Some(u)) if u.status.is_active() => u,
            Ok(_) => {
                info!("denied sender {phone}: no active staff account");
                self.send(&phone, &self.config.inmo.deny_message).await;
                return;
            }
            Err(e) => {
                error!("caller lookup for {phone} failed: {e}");
                self.send(&phone, "El sistema no está disponible en este momento. Intenta más tarde.")
                    .await;
                return;
            }
        };

        let caller = CallingUser {
            id: staff_user.id.clone(),
            role: staff_user.rol,
            name: Some(staff_user.nombre.clone()),
        };

        match commands::parse(&inbound.text) {
            Some(SlashCommand::Ayuda) => {
                self.send(&phone, &registry::help_for(caller.role)).await;
            }
            Some(SlashCommand::Invalid(reply)) => {
                self.send(&phone, &reply).await;
            }
            Some(SlashCommand::Unknown(reply)) => {
                self.dispatcher.note_unrecognized();
                self.send(&phone, &reply).await;
            }
            Some(SlashCommand::Run(spec)) => {
                self.execute(spec, &caller, &phone).await;
            }
            None => {
                let reply = self.engine.handle_inbound_text(&caller, &inbound.text).await;
                self.send(&phone, &reply.text).await;
                if let Some(spec) = reply.execute {
                    self.execute(spec, &caller, &phone).await;
                }
            }
        }
    }

    /// Execute one command spec and deliver its outcome to the requester.
    async fn execute(self: &Arc<Self>, spec: CommandSpec, caller: &CallingUser, reply_to: &str) {
        if spec.kind == CommandKind::SendBroadcast {
            self.launch_broadcast(spec, caller, reply_to).await;
            return;
        }

        let request = CommandRequest {
            command: spec,
            user: caller.clone(),
        };
        match self.dispatcher.dispatch(&request).await {
            Ok(result) => {
                let text = match (&result.template_id, &result.template_data) {
                    (Some(id), Some(data)) => match self.templates.render(id, data) {
                        Ok(rendered) => rendered,
                        Err(e) => {
                            warn!("template {id} failed to render: {e}");
                            result.message.clone()
                        }
                    },
                    _ => result.message.clone(),
                };
                self.send(reply_to, &text).await;
            }
            Err(e) => {
                self.send(reply_to, &e.to_string()).await;
            }
        }
    }

    /// Resolve the audience and run the job in the background; the requester
    /// gets an immediate acknowledgement and the report when the job ends.
    async fn launch_broadcast(
        self: &Arc<Self>,
        spec: CommandSpec,
        caller: &CallingUser,
        reply_to: &str,
    ) {
        let allowed = registry::info(CommandKind::SendBroadcast)
            .map(|info| info.allows(caller.role))
            .unwrap_or(false);
        if !allowed {
            self.send(
                reply_to,
                &InmoError::Authorization(format!(
                    "el rol {} no puede ejecutar send_broadcast",
                    caller.role
                ))
                .to_string(),
            )
            .await;
            return;
        }

        let job = match self.resolve_broadcast(&spec, caller).await {
            Ok(job) => job,
            Err(e) => {
                self.send(reply_to, &e.to_string()).await;
                return;
            }
        };

        self.send(
            reply_to,
            &format!("Iniciando difusión a {} destinatarios...", job.recipients.len()),
        )
        .await;

        let inner = self.clone();
        let reply_to = reply_to.to_string();
        tokio::spawn(async move {
            match inner.scheduler.run(job).await {
                Ok(report) => inner.send(&reply_to, &report.summary()).await,
                Err(e) => inner.send(&reply_to, &e.to_string()).await,
            }
        });
    }

    /// Turn a `send_broadcast` spec into a resolved job.
    async fn resolve_broadcast(
        &self,
        spec: &CommandSpec,
        caller: &CallingUser,
    ) -> Result<BroadcastJob, InmoError> {
        let audience_str = required_str(spec, "audience")?;
        let audience = Audience::parse(audience_str)
            .ok_or_else(|| InmoError::Validation(format!("audiencia inválida: {audience_str}")))?;
        let mensaje = required_str(spec, "mensaje")?.to_string();

        let recipients = match audience {
            Audience::Equipo => self
                .staff
                .list()
                .await?
                .into_iter()
                .filter(|u| u.status.is_active() && u.id != caller.id)
                .map(|u| u.telefono)
                .collect(),
            Audience::Clientes => self
                .clients
                .list()
                .await?
                .into_iter()
                .map(|c| c.telefono)
                .collect(),
            Audience::Filtrados => {
                let filtro = required_str(spec, "filtro")?;
                self.clients
                    .search(filtro)
                    .await?
                    .into_iter()
                    .map(|c| c.telefono)
                    .collect()
            }
            Audience::Personalizado => spec
                .params
                .get("destinatarios")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    InmoError::MalformedRequest("falta el parámetro 'destinatarios'".to_string())
                })?
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
        };

        Ok(BroadcastJob {
            audience,
            recipients,
            mensaje,
            managerial: audience == Audience::Equipo && caller.role.is_managerial(),
        })
    }

    async fn send(&self, recipient: &str, text: &str) {
        if let Err(e) = self.transport.send_text(recipient, text).await {
            error!("failed to send to {recipient}: {e}");
        }
    }
}

fn required_str<'a>(spec: &'a CommandSpec, key: &str) -> Result<&'a str, InmoError> {
    spec.params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| InmoError::MalformedRequest(format!("falta el parámetro '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inmo_core::config::{BroadcastConfig, SessionConfig};
    use inmo_core::error::InmoError;
    use inmo_core::message::{InboundText, SendReceipt};
    use inmo_core::model::{
        Client, ClientChanges, NewClient, NewProperty, NewStaffUser, Property, PropertyChanges,
        ResourceStatus, StaffUser,
    };
    use inmo_core::role::Role;
    use inmo_core::traits::{PropertyService, SystemClock};
    use inmo_services::StaticTemplates;

    #[derive(Default)]
    struct FakeTransport {
        sent: std::sync::Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl TransportConnector for FakeTransport {
        async fn start(&self) -> Result<mpsc::Receiver<InboundText>, InmoError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }

        async fn send_text(&self, recipient: &str, text: &str) -> Result<SendReceipt, InmoError> {
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), text.to_string()));
            Ok(SendReceipt {
                message_id: "m-1".to_string(),
            })
        }

        async fn session_ready(&self) -> bool {
            true
        }

        async fn stop(&self) -> Result<(), InmoError> {
            Ok(())
        }
    }

    struct FakeStaff;

    #[async_trait]
    impl StaffService for FakeStaff {
        async fn get(&self, id: &str) -> Result<StaffUser, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn get_any_status(&self, id: &str) -> Result<StaffUser, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn find_by_phone(&self, telefono: &str) -> Result<Option<StaffUser>, InmoError> {
            Ok(Some(StaffUser {
                id: format!("U-{telefono}"),
                nombre: "Marco".to_string(),
                telefono: telefono.to_string(),
                rol: Role::Gerente,
                status: ResourceStatus::Activo,
            }))
        }

        async fn list(&self) -> Result<Vec<StaffUser>, InmoError> {
            Ok(Vec::new())
        }

        async fn create(&self, _data: NewStaffUser) -> Result<StaffUser, InmoError> {
            Err(InmoError::Validation("no disponible".to_string()))
        }

        async fn set_status(
            &self,
            id: &str,
            _status: ResourceStatus,
        ) -> Result<StaffUser, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }
    }

    struct FakeClients;

    #[async_trait]
    impl ClientService for FakeClients {
        async fn get(&self, id: &str) -> Result<Client, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn get_any_status(&self, id: &str) -> Result<Client, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn list(&self) -> Result<Vec<Client>, InmoError> {
            Ok(Vec::new())
        }

        async fn search(&self, _query: &str) -> Result<Vec<Client>, InmoError> {
            Ok(Vec::new())
        }

        async fn create(&self, _data: NewClient) -> Result<Client, InmoError> {
            Err(InmoError::Validation("no disponible".to_string()))
        }

        async fn update(&self, id: &str, _changes: ClientChanges) -> Result<Client, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn set_status(
            &self,
            id: &str,
            _status: ResourceStatus,
        ) -> Result<Client, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }
    }

    struct FakeProperties;

    #[async_trait]
    impl PropertyService for FakeProperties {
        async fn get(&self, id: &str) -> Result<Property, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn get_any_status(&self, id: &str) -> Result<Property, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn list(&self) -> Result<Vec<Property>, InmoError> {
            Ok(Vec::new())
        }

        async fn search(&self, _query: &str) -> Result<Vec<Property>, InmoError> {
            Ok(Vec::new())
        }

        async fn create(&self, _data: NewProperty) -> Result<Property, InmoError> {
            Err(InmoError::Validation("no disponible".to_string()))
        }

        async fn update(
            &self,
            id: &str,
            _changes: PropertyChanges,
        ) -> Result<Property, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn add_files(&self, id: &str, _files: &[String]) -> Result<Property, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }

        async fn set_status(
            &self,
            id: &str,
            _status: ResourceStatus,
        ) -> Result<Property, InmoError> {
            Err(InmoError::NotFound(id.to_string()))
        }
    }

    fn gateway() -> (Gateway, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::default());
        let staff: Arc<dyn StaffService> = Arc::new(FakeStaff);
        let clients: Arc<dyn ClientService> = Arc::new(FakeClients);
        let dispatcher = Dispatcher::new(
            clients.clone(),
            Arc::new(FakeProperties),
            staff.clone(),
            transport.clone(),
        );
        let scheduler = BroadcastScheduler::new(transport.clone(), BroadcastConfig::default());
        let engine = Engine::new(&SessionConfig::default(), Arc::new(SystemClock));
        let gw = Gateway::new(
            Config::default(),
            engine,
            dispatcher,
            scheduler,
            transport.clone(),
            staff,
            clients,
            Arc::new(StaticTemplates),
        );
        (gw, transport)
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_worker_exits_and_is_pruned() {
        let (gw, transport) = gateway();

        gw.route(InboundText::new("59170000001", "menu")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(transport.sent.lock().unwrap().len(), 1);
        {
            let senders = gw.inner.active_senders.lock().await;
            assert_eq!(senders.len(), 1);
            assert!(!senders.values().next().unwrap().is_closed());
        }

        tokio::time::sleep(WORKER_IDLE + Duration::from_secs(1)).await;
        {
            let senders = gw.inner.active_senders.lock().await;
            assert!(senders.values().next().unwrap().is_closed());
        }

        assert_eq!(gw.inner.prune_workers().await, 1);
        assert!(gw.inner.active_senders.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sender_gets_a_fresh_worker_after_idle_exit() {
        let (gw, transport) = gateway();

        gw.route(InboundText::new("59170000001", "menu")).await;
        tokio::time::sleep(WORKER_IDLE + Duration::from_secs(1)).await;
        gw.inner.prune_workers().await;

        gw.route(InboundText::new("59170000001", "menu")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(transport.sent.lock().unwrap().len(), 2);
        let senders = gw.inner.active_senders.lock().await;
        assert!(!senders["59170000001"].is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_keeps_live_workers() {
        let (gw, _transport) = gateway();

        gw.route(InboundText::new("59170000001", "menu")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(gw.inner.prune_workers().await, 0);
        assert_eq!(gw.inner.active_senders.lock().await.len(), 1);
    }
}
