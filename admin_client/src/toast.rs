use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::TOAST_DURATION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub title: Option<String>,
    pub message: String,
}

/// Transient notifications. Each toast removes itself after the
/// configured lifetime unless it was hidden earlier.
#[derive(Debug, Clone)]
pub struct Toaster {
    toasts: Arc<Mutex<Vec<Toast>>>,
    lifetime: Duration,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(TOAST_DURATION)
    }
}

impl Toaster {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: Arc::new(Mutex::new(Vec::new())),
            lifetime,
        }
    }

    pub async fn show(&self, kind: ToastKind, message: impl Into<String>, title: Option<String>) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            kind,
            title,
            message: message.into(),
        };
        let id = toast.id;
        tracing::debug!(%id, ?kind, message = %toast.message, "toast shown");
        self.toasts.lock().await.push(toast);

        let toasts = self.toasts.clone();
        let lifetime = self.lifetime;
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            toasts.lock().await.retain(|toast| toast.id != id);
        });

        id
    }

    pub async fn success(&self, message: impl Into<String>) -> Uuid {
        self.show(ToastKind::Success, message, None).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Uuid {
        self.show(ToastKind::Error, message, None).await
    }

    /// Returns `false` when the toast was already gone.
    pub async fn hide(&self, id: Uuid) -> bool {
        let mut toasts = self.toasts.lock().await;
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    /// The toast currently on screen: the oldest one still alive.
    pub async fn active(&self) -> Option<Toast> {
        self.toasts.lock().await.first().cloned()
    }

    pub async fn all(&self) -> Vec<Toast> {
        self.toasts.lock().await.clone()
    }
}
