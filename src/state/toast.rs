use std::time::Duration;

/// How long a toast stays visible
pub const TOAST_DURATION: Duration = Duration::from_secs(2);

/// A short-lived notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// Holds at most one toast. A new toast replaces the current one and
/// restarts the timer; expiries for replaced toasts are ignored.
#[derive(Debug, Clone, Default)]
pub struct ToastSignal {
    current: Option<Toast>,
    next_id: u64,
}

impl ToastSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `message`, returning the id the expiry timer must carry
    pub fn raise(&mut self, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.current = Some(Toast {
            id,
            message: message.into(),
        });
        id
    }

    /// Clear the toast if `id` is still the one showing
    pub fn expire(&mut self, id: u64) -> bool {
        match &self.current {
            Some(toast) if toast.id == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }
}
