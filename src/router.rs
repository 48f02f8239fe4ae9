//! Exact-path handler registry.
//!
//! The registry is the only state shared across connection tasks. It is a
//! plain map behind a read-write lock: [`Router::register`] takes the
//! write side, dispatch lookups take the read side, so lookups run
//! concurrently while registration serializes against everything else.
//!
//! Matching is exact by design: no patterns, no prefixes, no
//! trailing-slash normalization. `/a` and `/a/` are different paths.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::handler::Handler;

/// A cloneable handle to the shared path-to-handler mapping.
///
/// Clones share the same underlying map, so a router captured before the
/// accept loop starts observes registrations made while it runs.
#[derive(Clone, Default)]
pub struct Router {
    handlers: Arc<RwLock<HashMap<String, Arc<dyn Handler>>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the handler for `path`.
    ///
    /// Replacement is atomic with respect to concurrent lookups: a lookup
    /// racing a re-registration sees either the old handler or the new
    /// one, never a partial entry.
    pub fn register<H>(&self, path: impl Into<String>, handler: H)
    where
        H: Handler + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.insert(path.into(), Arc::new(handler));
    }

    /// Looks up the handler registered for exactly `path`.
    pub fn at(&self, path: &str) -> Option<Arc<dyn Handler>> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers.get(path).map(Arc::clone)
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("paths", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::BoxError;
    use crate::protocol::Request;

    use async_trait::async_trait;

    struct Nop;

    #[async_trait]
    impl Handler for Nop {
        async fn handle(&self, _request: Request) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let router = Router::new();
        router.register("/a", Nop);

        assert!(router.at("/a").is_some());
        assert!(router.at("/a/").is_none());
        assert!(router.at("/a/b").is_none());
        assert!(router.at("/A").is_none());
        assert!(router.at("").is_none());
    }

    #[test]
    fn register_replaces_the_previous_handler() {
        let router = Router::new();
        router.register("/a", Nop);
        let first = router.at("/a").expect("registered");

        router.register("/a", Nop);
        let second = router.at("/a").expect("still registered");

        assert_eq!(router.len(), 1);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn clones_share_the_same_registry() {
        let router = Router::new();
        let clone = router.clone();

        router.register("/a", Nop);
        assert!(clone.at("/a").is_some());
    }

    #[test]
    fn concurrent_registration_and_lookup() {
        let router = Router::new();
        router.register("/stable", Nop);

        let writer = {
            let router = router.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    router.register("/hot", Nop);
                }
            })
        };

        for _ in 0..1000 {
            assert!(router.at("/stable").is_some());
            // either the old or the new handler, never a torn entry
            let _ = router.at("/hot");
        }

        writer.join().expect("writer thread");
    }
}
