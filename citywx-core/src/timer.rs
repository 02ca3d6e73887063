//! Cancellable one-shot timers.
//!
//! A [`Timer`] owns at most one scheduled action. Restarting it aborts the
//! previous action, and dropping it aborts whatever is still pending.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct Timer {
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` after `delay`, cancelling anything scheduled before.
    pub fn restart<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.restart_async(delay, async move { action() });
    }

    /// Like [`Timer::restart`] with an async action.
    pub fn restart_async<Fut>(&mut self, delay: Duration, action: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// True while an action is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}
