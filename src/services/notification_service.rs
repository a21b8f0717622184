// ============================================================================
// NOTIFICATIONS - FILE D'ATTENTE EN ARRIÈRE-PLAN
// ============================================================================
//
// Description:
//   À chaque création d'offre (pas à la mise à jour), la route appelle
//   explicitement `notify_job_created`. Le message part dans une file tokio
//   consommée par un worker : la requête HTTP n'attend jamais l'envoi.
//
// Workflow:
//   1. POST /api/jobs crée l'offre
//   2. notify_job_created() pousse {job_id, title, company} dans la file
//   3. Le worker attend NOTIFICATION_DELAY_SECONDS puis appelle le sender
//   4. En cas d'échec : 3 tentatives max avec backoff exponentiel, puis log
//
// Points d'attention:
//   - Livraison "au moins une fois", pas de clé d'idempotence
//   - Un échec d'enqueue est loggé, jamais renvoyé au client
//
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::AppError;

pub const COMPANY_PLACEHOLDER: &str = "N/A";
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct JobNotification {
    pub job_id: i32,
    pub title: String,
    pub company: String,
}

impl JobNotification {
    pub fn new(job_id: i32, title: &str, company_name: Option<&str>) -> Self {
        Self {
            job_id,
            title: title.to_string(),
            company: company_name.unwrap_or(COMPANY_PLACEHOLDER).to_string(),
        }
    }
}

//trait = canal d'envoi (email, webhook...)
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &JobNotification) -> Result<(), String>;
}

/// Sender par défaut : trace structurée à la place d'un vrai email
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(&self, notification: &JobNotification) -> Result<(), String> {
        tracing::info!(
            job_id = notification.job_id,
            title = %notification.title,
            company = %notification.company,
            "Notification envoyée pour offre #{}: {} @ {}",
            notification.job_id,
            notification.title,
            notification.company
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::UnboundedSender<JobNotification>,
}

impl NotificationQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JobNotification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Non bloquant : échoue seulement si le worker est arrêté
    pub fn enqueue(&self, notification: JobNotification) -> Result<(), AppError> {
        self.sender
            .send(notification)
            .map_err(|e| AppError::Internal(format!("notification queue closed: {}", e)))
    }
}

/// Appelé à la fin de la création d'une offre. N'échoue jamais.
pub fn notify_job_created(queue: &NotificationQueue, job_id: i32, title: &str, company_name: Option<&str>) {
    let notification = JobNotification::new(job_id, title, company_name);

    match queue.enqueue(notification) {
        Ok(()) => tracing::debug!(job_id, "job notification enqueued"),
        Err(e) => tracing::warn!(job_id, error = %e, "failed to enqueue job notification"),
    }
}

/// Lance le worker qui consomme la file. Chaque notification est traitée dans
/// sa propre tâche pour que le délai d'envoi ne bloque pas les suivantes.
pub fn spawn_notification_worker(
    mut receiver: mpsc::UnboundedReceiver<JobNotification>,
    sender: Arc<dyn NotificationSender>,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = receiver.recv().await {
            let sender = Arc::clone(&sender);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                deliver_with_retry(sender.as_ref(), &notification, delay).await;
            });
        }
        tracing::info!("notification worker stopped");
    })
}

async fn deliver_with_retry(sender: &dyn NotificationSender, notification: &JobNotification, base_backoff: Duration) {
    let base_backoff = base_backoff.max(Duration::from_millis(100));

    for attempt in 1..=MAX_ATTEMPTS {
        match sender.send(notification).await {
            Ok(()) => return,
            Err(e) if attempt < MAX_ATTEMPTS => {
                let backoff = base_backoff * 2u32.pow(attempt - 1);
                tracing::warn!(
                    job_id = notification.job_id,
                    attempt,
                    error = %e,
                    "notification delivery failed, retrying in {:?}",
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                tracing::error!(
                    job_id = notification.job_id,
                    attempts = MAX_ATTEMPTS,
                    error = %e,
                    "notification delivery abandoned"
                );
            }
        }
    }
}
