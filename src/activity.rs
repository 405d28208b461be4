//! In-flight request counters backing the global loading indicator.
//!
//! One `Activity` is created per application and shared by reference (`Arc`) with
//! every request site. `begin` hands out an `InFlight` guard; the counters move on
//! guard creation and drop, and the derived `is_loading` flag is published on a
//! watch channel for the view layer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Query,
    Mutation,
}

#[derive(Debug)]
pub struct Activity {
    fetching: AtomicUsize,
    mutating: AtomicUsize,
    loading_tx: watch::Sender<bool>,
}

impl Default for Activity {
    fn default() -> Self {
        let (loading_tx, _rx) = watch::channel(false);
        Self { fetching: AtomicUsize::new(0), mutating: AtomicUsize::new(0), loading_tx }
    }
}

impl Activity {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn begin(self: &Arc<Self>, kind: RequestKind) -> InFlight {
        self.counter(kind).fetch_add(1, Ordering::SeqCst);
        self.publish();
        InFlight { activity: Arc::clone(self), kind }
    }

    pub fn fetching(&self) -> usize { self.fetching.load(Ordering::SeqCst) }

    pub fn mutating(&self) -> usize { self.mutating.load(Ordering::SeqCst) }

    pub fn is_loading(&self) -> bool { self.fetching() > 0 || self.mutating() > 0 }

    pub fn subscribe(&self) -> watch::Receiver<bool> { self.loading_tx.subscribe() }

    fn counter(&self, kind: RequestKind) -> &AtomicUsize {
        match kind {
            RequestKind::Query => &self.fetching,
            RequestKind::Mutation => &self.mutating,
        }
    }

    fn publish(&self) {
        let loading = self.is_loading();
        self.loading_tx.send_if_modified(|cur| {
            if *cur == loading { return false; }
            *cur = loading;
            true
        });
    }
}

/// Guard for one in-flight request.
#[derive(Debug)]
pub struct InFlight {
    activity: Arc<Activity>,
    kind: RequestKind,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.activity.counter(self.kind).fetch_sub(1, Ordering::SeqCst);
        self.activity.publish();
    }
}
