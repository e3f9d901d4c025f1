//! Bookkeeping for the one outstanding image edit request
//!
//! The session decides when a request starts or is cancelled; this keeps
//! the matching task handle so the shell can abort the right one.

use tracing::debug;

use crate::state::editor::SessionId;

/// Something that can stop a running background task
pub trait Abort {
    fn abort(&self);
}

impl Abort for iced::task::Handle {
    fn abort(&self) {
        iced::task::Handle::abort(self);
    }
}

/// The in-flight edit request, tagged with its editor session
#[derive(Debug)]
pub struct PendingEdit<H = iced::task::Handle> {
    current: Option<(SessionId, H)>,
}

impl<H> Default for PendingEdit<H> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<H: Abort> PendingEdit<H> {
    /// Track a new request, aborting any earlier one still running
    pub fn start(&mut self, session: SessionId, handle: H) {
        if let Some((previous, stale)) = self.current.replace((session, handle)) {
            debug!(session = previous, "replacing outstanding edit request");
            stale.abort();
        }
    }

    /// Abort the request of `session`. Returns false when it is not the tracked one.
    pub fn cancel(&mut self, session: SessionId) -> bool {
        match self.current.take() {
            Some((pending, handle)) if pending == session => {
                debug!(session, "aborting edit request");
                handle.abort();
                true
            }
            other => {
                self.current = other;
                false
            }
        }
    }

    /// Forget the request of `session` once its result arrived
    pub fn finish(&mut self, session: SessionId) -> bool {
        if self.session() == Some(session) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn session(&self) -> Option<SessionId> {
        self.current.as_ref().map(|(session, _)| *session)
    }
}
