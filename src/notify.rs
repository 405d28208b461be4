//! User-visible notifications (toasts).

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), variant: ToastVariant::Default }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), variant: ToastVariant::Destructive }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Ordered toast buffer drained by the view layer.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self { Self::default() }

    pub fn snapshot(&self) -> Vec<Toast> { self.toasts.lock().clone() }

    pub fn drain(&self) -> Vec<Toast> { std::mem::take(&mut *self.toasts.lock()) }

    pub fn len(&self) -> usize { self.toasts.lock().len() }

    pub fn is_empty(&self) -> bool { self.toasts.lock().is_empty() }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Destructive => warn!(title = %toast.title, description = %toast.description, "toast"),
            ToastVariant::Default => info!(title = %toast.title, description = %toast.description, "toast"),
        }
        self.toasts.lock().push(toast);
    }
}
