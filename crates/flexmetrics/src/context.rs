//! Per-request ambient context.
//!
//! Every request dispatched by [`Server::run`](crate::Server::run) carries a
//! [`RequestContext`] in its extensions. It holds the address the listener is
//! actually bound to and the scope passed to `run`.

use std::net::SocketAddr;

use http::Request;

use crate::scope::Scope;

/// Context key under which the observed listener address is published.
pub const SERVER_ADDR_KEY: &str = "serverAddr";

/// Ambient data shared by all requests served by one `run`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    server_addr: SocketAddr,
    scope: Scope,
}

impl RequestContext {
    /// Creates a context for a listener bound to `server_addr`.
    #[must_use]
    pub fn new(server_addr: SocketAddr, scope: Scope) -> Self {
        Self { server_addr, scope }
    }

    /// Returns the observed listener address.
    #[must_use]
    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Returns the scope passed to `run`.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Looks up a context value by key.
    ///
    /// Only [`SERVER_ADDR_KEY`] is defined.
    ///
    /// ```rust
    /// use flexmetrics::context::{RequestContext, SERVER_ADDR_KEY};
    /// use flexmetrics::Scope;
    ///
    /// let ctx = RequestContext::new("127.0.0.1:9090".parse().unwrap(), Scope::new());
    /// assert_eq!(ctx.value(SERVER_ADDR_KEY).as_deref(), Some("127.0.0.1:9090"));
    /// assert_eq!(ctx.value("other"), None);
    /// ```
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        (key == SERVER_ADDR_KEY).then(|| self.server_addr.to_string())
    }

    /// Returns the context attached to `req`, if any.
    pub fn from_request<B>(req: &Request<B>) -> Option<&Self> {
        req.extensions().get::<Self>()
    }

    /// Attaches this context to `req`.
    pub(crate) fn attach<B>(&self, req: &mut Request<B>) {
        req.extensions_mut().insert(self.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_read_back() {
        let addr: SocketAddr = "127.0.0.1:4242".parse().unwrap();
        let ctx = RequestContext::new(addr, Scope::new());

        let mut req = Request::new(());
        assert!(RequestContext::from_request(&req).is_none());

        ctx.attach(&mut req);
        let attached = RequestContext::from_request(&req).unwrap();
        assert_eq!(attached.server_addr(), addr);
        assert_eq!(attached.value(SERVER_ADDR_KEY).as_deref(), Some("127.0.0.1:4242"));
    }

    #[test]
    fn test_scope_is_shared() {
        let scope = Scope::new();
        let ctx = RequestContext::new("127.0.0.1:1".parse().unwrap(), scope.clone());
        scope.cancel();
        assert!(ctx.scope().is_cancelled());
    }
}
