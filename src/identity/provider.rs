//! Scoped access to the session context.
//!
//! `SessionProvider::mount` installs a context for the current thread and runs the
//! mount-time check; `use_session` hands it to consumers. Calling `use_session`
//! with no provider installed is a programming error and panics.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use super::session::SessionContext;

thread_local! {
    static CURRENT: RefCell<Vec<Arc<SessionContext>>> = const { RefCell::new(Vec::new()) };
}

pub struct SessionProvider;

impl SessionProvider {
    /// Install `ctx` until the returned guard is dropped. Scopes nest.
    pub fn mount(ctx: Arc<SessionContext>) -> ProviderGuard {
        let depth = CURRENT.with(|c| {
            let mut stack = c.borrow_mut();
            stack.push(Arc::clone(&ctx));
            stack.len() - 1
        });
        ctx.mount();
        ProviderGuard { depth, _not_send: PhantomData }
    }

    /// Run `f` with `ctx` installed.
    pub fn scope<R>(ctx: Arc<SessionContext>, f: impl FnOnce() -> R) -> R {
        let _guard = Self::mount(ctx);
        f()
    }
}

/// Uninstalls the provider, and anything mounted inside it, on drop.
/// Bound to the thread that created it.
#[must_use = "the provider is uninstalled when the guard is dropped"]
pub struct ProviderGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ProviderGuard {
    fn drop(&mut self) {
        CURRENT.with(|c| c.borrow_mut().truncate(self.depth));
    }
}

/// The innermost installed session context, if any.
pub fn try_use_session() -> Option<Arc<SessionContext>> {
    CURRENT.with(|c| c.borrow().last().cloned())
}

/// The innermost installed session context.
///
/// # Panics
/// When called outside a `SessionProvider` scope.
pub fn use_session() -> Arc<SessionContext> {
    match try_use_session() {
        Some(ctx) => ctx,
        None => panic!("use_session must be used within a SessionProvider"),
    }
}
