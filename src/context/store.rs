//! Task-local storage for the per-request context.
//!
//! One inbound request spawns one logical chain of possibly-nested async
//! steps (authentication, then one or more downstream calls). All of them
//! observe the same [`RequestContext`] through [`current`] without the
//! context being passed as a parameter. The context set before a suspension
//! point is the one observed after resumption, even while other chains run
//! concurrently with their own contexts.
//!
//! [`scope`] covers every future awaited inside it, but not tasks handed to
//! `tokio::spawn`; a spawner that needs the context in a detached task wraps
//! it again with `scope(current(), ...)`.

use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use crate::context::Principal;

tokio::task_local! {
    static CURRENT: RefCell<RequestContext>;
}

/// Identity carried by one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    pub tenant_id: Option<String>,
    pub principal: Option<Arc<Principal>>,
}

impl RequestContext {
    /// Start a context for a new request.
    ///
    /// A supplied trace id is reused verbatim; an absent or empty one is
    /// replaced with a freshly generated identifier.
    pub fn new(trace_id: Option<String>, tenant_id: Option<String>) -> Self {
        Self {
            trace_id: trace_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(generate_trace_id),
            tenant_id,
            principal: None,
        }
    }
}

/// Generate a collision-resistant trace identifier (UUID v4).
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Run `fut` with `ctx` current for its whole logical chain.
///
/// The context is torn down when the returned future completes or is
/// dropped; success, error and cancellation all release it.
pub async fn scope<F>(ctx: RequestContext, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT.scope(RefCell::new(ctx), fut).await
}

/// Snapshot of the context active for the calling chain.
///
/// # Panics
///
/// Panics when invoked outside any active scope. That is a programming
/// error in the caller, fatal to the request, and deliberately not a
/// [`crate::error::GatewayError`].
pub fn current() -> RequestContext {
    try_current().expect("request context accessed outside an active request scope")
}

/// Like [`current`], for call sites where the context is genuinely optional.
pub fn try_current() -> Option<RequestContext> {
    CURRENT.try_with(|cell| cell.borrow().clone()).ok()
}

/// Attach the authenticated principal to the current context.
///
/// A principal carrying a non-empty tenant id overrides the tenant seeded
/// from the inbound headers. Returns the superseding context value. Panics
/// outside an active scope, like [`current`].
pub fn attach_principal(principal: Principal) -> RequestContext {
    CURRENT.with(|cell| {
        let mut ctx = cell.borrow_mut();
        if !principal.tenant_id.is_empty() {
            ctx.tenant_id = Some(principal.tenant_id.clone());
        }
        ctx.principal = Some(Arc::new(principal));
        ctx.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn demo_principal(tenant_id: &str) -> Principal {
        Principal {
            user_id: "user-123".into(),
            username: "demo".into(),
            tenant_id: tenant_id.into(),
            roles: vec!["admin".into()],
            display_name: None,
        }
    }

    #[tokio::test]
    async fn current_reflects_the_scoped_context() {
        assert!(try_current().is_none());

        let ctx = RequestContext::new(Some("trace-1".into()), Some("tenant-1".into()));
        scope(ctx, async {
            let seen = current();
            assert_eq!(seen.trace_id, "trace-1");
            assert_eq!(seen.tenant_id.as_deref(), Some("tenant-1"));
            assert!(seen.principal.is_none());
        })
        .await;

        assert!(try_current().is_none());
    }

    #[tokio::test]
    async fn empty_trace_id_is_replaced() {
        let ctx = RequestContext::new(Some(String::new()), None);
        assert!(!ctx.trace_id.is_empty());

        let a = RequestContext::new(None, None);
        let b = RequestContext::new(None, None);
        assert_ne!(a.trace_id, b.trace_id);
    }

    #[tokio::test]
    async fn attached_principal_is_visible_after_suspension() {
        let ctx = RequestContext::new(None, Some("header-tenant".into()));
        scope(ctx, async {
            attach_principal(demo_principal("claim-tenant"));
            tokio::task::yield_now().await;

            let seen = current();
            let principal = seen.principal.expect("principal attached");
            assert_eq!(principal.user_id, "user-123");
            // The principal's tenant overrides the header-seeded one.
            assert_eq!(seen.tenant_id.as_deref(), Some("claim-tenant"));
        })
        .await;
    }

    #[tokio::test]
    async fn principal_without_tenant_keeps_the_seeded_tenant() {
        let ctx = RequestContext::new(None, Some("header-tenant".into()));
        scope(ctx, async {
            attach_principal(demo_principal(""));
            let seen = current();
            assert_eq!(seen.tenant_id.as_deref(), Some("header-tenant"));
        })
        .await;
    }

    #[tokio::test]
    async fn concurrent_chains_are_isolated() {
        let chain = |trace: &'static str| async move {
            scope(RequestContext::new(Some(trace.into()), None), async move {
                for _ in 0..10 {
                    assert_eq!(current().trace_id, trace);
                    tokio::task::yield_now().await;
                }
                attach_principal(demo_principal(trace));
                tokio::task::yield_now().await;
                assert_eq!(current().tenant_id.as_deref(), Some(trace));
            })
            .await;
        };

        let a = tokio::spawn(chain("chain-a"));
        let b = tokio::spawn(chain("chain-b"));
        a.await.unwrap();
        b.await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_scope_leaves_no_context() {
        let fut = scope(RequestContext::new(None, None), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        let cancelled = tokio::time::timeout(Duration::from_millis(10), fut).await;
        assert!(cancelled.is_err());
        assert!(try_current().is_none());
    }
}
