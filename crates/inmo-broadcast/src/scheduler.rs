//! Runs one bulk-send job: cap check, shuffle, batched paced delivery.

use crate::pacing;
use inmo_core::config::BroadcastConfig;
use inmo_core::error::InmoError;
use inmo_core::traits::TransportConnector;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const ERROR_DETAIL_CAP: usize = 5;

/// Shared cancellation flag, checked between sends. Set once at shutdown;
/// a cancelled job returns its partial report instead of blocking exit.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Who a job goes to. Each audience has its own recipient ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Equipo,
    Clientes,
    Filtrados,
    Personalizado,
}

impl Audience {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "equipo" => Some(Self::Equipo),
            "clientes" => Some(Self::Clientes),
            "filtrados" => Some(Self::Filtrados),
            "personalizado" => Some(Self::Personalizado),
            _ => None,
        }
    }

    pub fn cap(&self, config: &BroadcastConfig) -> usize {
        match self {
            Self::Equipo => config.staff_cap,
            Self::Clientes => config.client_cap,
            Self::Filtrados | Self::Personalizado => config.filtered_cap,
        }
    }
}

/// One resolved bulk send, ready to run.
#[derive(Debug, Clone)]
pub struct BroadcastJob {
    pub audience: Audience,
    pub recipients: Vec<String>,
    pub mensaje: String,
    /// Gerente-initiated staff jobs use the slower managerial pacing.
    pub managerial: bool,
}

/// What happened, returned to the requester.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub sent: usize,
    pub errors: usize,
    pub elapsed_seconds: u64,
    /// First few per-recipient failure details.
    pub details: Vec<String>,
    pub cancelled: bool,
}

impl BroadcastReport {
    /// One-line summary for the chat reply.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Difusión terminada: {} enviados, {} errores en {}s.",
            self.sent, self.errors, self.elapsed_seconds
        );
        if self.cancelled {
            out.push_str(" (cancelada antes de completar)");
        }
        for d in &self.details {
            out.push('\n');
            out.push_str(d);
        }
        out
    }
}

pub struct BroadcastScheduler {
    transport: Arc<dyn TransportConnector>,
    config: BroadcastConfig,
    cancel: CancelFlag,
}

impl BroadcastScheduler {
    pub fn new(transport: Arc<dyn TransportConnector>, config: BroadcastConfig) -> Self {
        Self {
            transport,
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Handle for shutdown to cancel in-flight jobs.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run one job to completion (or cancellation). Per-recipient failures
    /// are recorded, never propagated; only an oversized or empty recipient
    /// list rejects the job up front.
    pub async fn run(&self, job: BroadcastJob) -> Result<BroadcastReport, InmoError> {
        let cap = job.audience.cap(&self.config);
        if job.recipients.is_empty() {
            return Err(InmoError::Validation(
                "la difusión no tiene destinatarios".to_string(),
            ));
        }
        if job.recipients.len() > cap {
            return Err(InmoError::Validation(format!(
                "demasiados destinatarios: {} (máximo {cap})",
                job.recipients.len()
            )));
        }

        let total = job.recipients.len();
        let mut recipients = job.recipients;
        {
            let mut rng = rand::thread_rng();
            recipients.shuffle(&mut rng);
        }

        info!(
            "starting broadcast to {total} recipients ({:?}, managerial={})",
            job.audience, job.managerial
        );

        let started = Instant::now();
        let mut report = BroadcastReport {
            sent: 0,
            errors: 0,
            elapsed_seconds: 0,
            details: Vec::new(),
            cancelled: false,
        };

        let batches: Vec<&[String]> = recipients.chunks(self.config.batch_size).collect();
        let last_batch = batches.len().saturating_sub(1);
        'job: for (b, batch) in batches.iter().enumerate() {
            let last_in_batch = batch.len() - 1;
            for (i, recipient) in batch.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    report.cancelled = true;
                    warn!("broadcast cancelled after {} sends", report.sent);
                    break 'job;
                }

                match self.transport.send_text(recipient, &job.mensaje).await {
                    Ok(_) => report.sent += 1,
                    Err(e) => {
                        report.errors += 1;
                        if report.details.len() < ERROR_DETAIL_CAP {
                            report.details.push(format!("{recipient}: {e}"));
                        }
                        warn!("broadcast send to {recipient} failed: {e}");
                    }
                }

                if i < last_in_batch {
                    let delay = {
                        let mut rng = rand::thread_rng();
                        pacing::send_delay(&self.config, total, job.managerial, &mut rng)
                    };
                    tokio::time::sleep(delay).await;
                }
            }

            if b < last_batch {
                let pause = {
                    let mut rng = rand::thread_rng();
                    pacing::batch_pause(&self.config, &mut rng)
                };
                tokio::time::sleep(pause).await;
            }
        }

        report.elapsed_seconds = started.elapsed().as_secs();
        info!(
            "broadcast finished: {} sent, {} errors, {}s",
            report.sent, report.errors, report.elapsed_seconds
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inmo_core::message::{InboundText, SendReceipt};
    use std::sync::Mutex;

    /// Transport fake: records recipients, fails the ones on the blocklist.
    #[derive(Default)]
    struct FakeTransport {
        sent: Mutex<Vec<String>>,
        fail: Vec<String>,
    }

    #[async_trait]
    impl TransportConnector for FakeTransport {
        async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundText>, InmoError> {
            let (_tx, rx) = tokio::sync::mpsc::channel(1);
            Ok(rx)
        }

        async fn send_text(&self, recipient: &str, _text: &str) -> Result<SendReceipt, InmoError> {
            if self.fail.iter().any(|f| f == recipient) {
                return Err(InmoError::upstream("send_text", "número inválido"));
            }
            self.sent.lock().unwrap().push(recipient.to_string());
            Ok(SendReceipt {
                message_id: "m".to_string(),
            })
        }

        async fn session_ready(&self) -> bool {
            true
        }

        async fn stop(&self) -> Result<(), InmoError> {
            Ok(())
        }
    }

    fn phones(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("5917000{i:04}")).collect()
    }

    fn job(audience: Audience, recipients: Vec<String>) -> BroadcastJob {
        BroadcastJob {
            audience,
            recipients,
            mensaje: "hola".to_string(),
            managerial: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_recipient_reached_once() {
        let transport = Arc::new(FakeTransport::default());
        let scheduler = BroadcastScheduler::new(transport.clone(), BroadcastConfig::default());

        let recipients = phones(12);
        let report = scheduler
            .run(job(Audience::Clientes, recipients.clone()))
            .await
            .unwrap();

        assert_eq!(report.sent, 12);
        assert_eq!(report.errors, 0);
        assert!(!report.cancelled);

        // Shuffled order, same set.
        let mut sent = transport.sent.lock().unwrap().clone();
        sent.sort();
        let mut expected = recipients;
        expected.sort();
        assert_eq!(sent, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_recorded_and_details_capped() {
        let recipients = phones(10);
        let transport = Arc::new(FakeTransport {
            sent: Mutex::new(Vec::new()),
            fail: recipients[..8].to_vec(),
        });
        let scheduler = BroadcastScheduler::new(transport, BroadcastConfig::default());

        let report = scheduler
            .run(job(Audience::Clientes, recipients))
            .await
            .unwrap();

        assert_eq!(report.sent, 2);
        assert_eq!(report.errors, 8);
        assert_eq!(report.details.len(), ERROR_DETAIL_CAP);
    }

    /// Transport fake that stamps each send with the (paused) tokio clock.
    #[derive(Default)]
    struct TimingTransport {
        sends: Mutex<Vec<tokio::time::Instant>>,
    }

    #[async_trait]
    impl TransportConnector for TimingTransport {
        async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundText>, InmoError> {
            let (_tx, rx) = tokio::sync::mpsc::channel(1);
            Ok(rx)
        }

        async fn send_text(&self, _recipient: &str, _text: &str) -> Result<SendReceipt, InmoError> {
            self.sends.lock().unwrap().push(tokio::time::Instant::now());
            Ok(SendReceipt {
                message_id: "m".to_string(),
            })
        }

        async fn session_ready(&self) -> bool {
            true
        }

        async fn stop(&self) -> Result<(), InmoError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_47_clients_run_in_ten_batches() {
        let config = BroadcastConfig {
            send_jitter_ms: 0,
            batch_jitter_ms: 0,
            ..BroadcastConfig::default()
        };
        let transport = Arc::new(TimingTransport::default());
        let scheduler = BroadcastScheduler::new(transport.clone(), config.clone());

        let report = scheduler
            .run(job(Audience::Clientes, phones(47)))
            .await
            .unwrap();
        assert_eq!(report.sent, 47);

        // With jitter zeroed, intra-batch gaps are the 6s base delay and
        // batch boundaries are exactly the 10s pause. 47 recipients in
        // batches of 5 means 10 batches, so 9 pauses.
        let sends = transport.sends.lock().unwrap();
        let pause = std::time::Duration::from_millis(config.batch_pause_ms);
        let boundaries = sends
            .windows(2)
            .filter(|w| w[1] - w[0] >= pause)
            .count();
        assert_eq!(boundaries, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_51_clients_rejected_before_any_send() {
        let transport = Arc::new(FakeTransport::default());
        let scheduler = BroadcastScheduler::new(transport.clone(), BroadcastConfig::default());

        let err = scheduler
            .run(job(Audience::Clientes, phones(51)))
            .await
            .unwrap_err();
        assert!(matches!(err, InmoError::Validation(_)));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_order_departs_from_input_order() {
        let transport = Arc::new(FakeTransport::default());
        let scheduler = BroadcastScheduler::new(transport.clone(), BroadcastConfig::default());

        let recipients = phones(20);
        scheduler
            .run(job(Audience::Clientes, recipients.clone()))
            .await
            .unwrap();

        // A 20-element identity shuffle has probability 1/20!.
        let sent = transport.sent.lock().unwrap().clone();
        assert_ne!(sent, recipients);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_job_rejected() {
        let scheduler = BroadcastScheduler::new(
            Arc::new(FakeTransport::default()),
            BroadcastConfig::default(),
        );

        let err = scheduler
            .run(job(Audience::Equipo, phones(21)))
            .await
            .unwrap_err();
        assert!(matches!(err, InmoError::Validation(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_job_rejected() {
        let scheduler = BroadcastScheduler::new(
            Arc::new(FakeTransport::default()),
            BroadcastConfig::default(),
        );

        let err = scheduler
            .run(job(Audience::Personalizado, Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, InmoError::Validation(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_job_reports_partial_progress() {
        let transport = Arc::new(FakeTransport::default());
        let scheduler = BroadcastScheduler::new(transport, BroadcastConfig::default());

        scheduler.cancel_flag().cancel();
        let report = scheduler
            .run(job(Audience::Clientes, phones(10)))
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.sent, 0);
    }

    #[test]
    fn test_audience_parse_and_caps() {
        let config = BroadcastConfig::default();
        assert_eq!(Audience::parse("Equipo"), Some(Audience::Equipo));
        assert_eq!(Audience::parse("personalizado"), Some(Audience::Personalizado));
        assert_eq!(Audience::parse("todos"), None);
        assert_eq!(Audience::Equipo.cap(&config), 20);
        assert_eq!(Audience::Filtrados.cap(&config), 30);
        assert_eq!(Audience::Personalizado.cap(&config), 30);
        assert_eq!(Audience::Clientes.cap(&config), 50);
    }

    #[test]
    fn test_report_summary_mentions_cancellation() {
        let report = BroadcastReport {
            sent: 3,
            errors: 1,
            elapsed_seconds: 42,
            details: vec!["59170000001: error externo en send_text: x".to_string()],
            cancelled: true,
        };
        let summary = report.summary();
        assert!(summary.contains("3 enviados"));
        assert!(summary.contains("cancelada"));
        assert!(summary.contains("59170000001"));
    }
}
