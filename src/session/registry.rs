//! Thread-safe registry of live sessions, keyed by charge point id.
//!
//! Aliases survive a charge point's reconnect (and a version change across
//! reconnects) because they're cached here rather than only living on the
//! `Session` itself, which is torn down and recreated on every connect.

use std::sync::Arc;

use dashmap::DashMap;

use super::Session;

pub enum RegisterResult {
    /// No prior session for this id existed.
    New,
    /// A prior session existed and was evicted to make room for this one.
    /// The caller is responsible for driving it to `Closed` (§4.C).
    Evicted(Arc<Session>),
}

pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
    aliases: DashMap<String, String>,
}

pub type SharedSessionRegistry = Arc<SessionRegistry>;

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            aliases: DashMap::new(),
        }
    }

    /// Register a new session, evicting and returning any prior one under
    /// the same id (a charge point reconnecting replaces its old session).
    pub fn register(&self, session: Arc<Session>) -> RegisterResult {
        let id = session.charge_point_id.clone();
        match self.sessions.insert(id, session) {
            Some(old) => RegisterResult::Evicted(old),
            None => RegisterResult::New,
        }
    }

    /// Remove `session`'s entry, but only if it is still the instance
    /// currently stored for its id. A stale session whose teardown runs
    /// after a reconnect has already replaced it must not evict the new,
    /// live session (§4.H).
    pub fn unregister(&self, session: &Arc<Session>) {
        self.sessions.remove_if(&session.charge_point_id, |_, stored| {
            Arc::ptr_eq(stored, session)
        });
    }

    pub fn get(&self, charge_point_id: &str) -> Option<Arc<Session>> {
        self.sessions.get(charge_point_id).map(|e| e.clone())
    }

    pub fn is_connected(&self, charge_point_id: &str) -> bool {
        self.sessions.contains_key(charge_point_id)
    }

    pub fn connected_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Remember an alias for a charge point id, independent of whether a
    /// session currently exists for it.
    pub fn remember_alias(&self, charge_point_id: &str, alias: String) {
        self.aliases.insert(charge_point_id.to_string(), alias);
    }

    pub fn alias_for(&self, charge_point_id: &str) -> Option<String> {
        self.aliases.get(charge_point_id).map(|e| e.clone())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use crate::domain::{ChargePointSettings, OcppVersion};
    use crate::transport::MockChannel;

    fn session(id: &str) -> Arc<Session> {
        let (channel, _in_tx, _out_rx) = MockChannel::new();
        Session::new(
            id,
            OcppVersion::V16,
            Arc::new(channel),
            ChargePointSettings::new(OcppVersion::V16),
            Arc::new(EventBus::new()),
        )
    }

    #[test]
    fn register_new_then_reconnect_evicts() {
        let registry = SessionRegistry::new();
        let first = session("CP1");
        assert!(matches!(registry.register(first.clone()), RegisterResult::New));
        match registry.register(session("CP1")) {
            RegisterResult::Evicted(e) => assert!(Arc::ptr_eq(&e, &first)),
            RegisterResult::New => panic!("expected eviction"),
        }
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn alias_survives_unregister() {
        let registry = SessionRegistry::new();
        let s = session("CP1");
        registry.register(s.clone());
        registry.remember_alias("CP1", "Lobby Charger".to_string());
        registry.unregister(&s);
        assert_eq!(registry.alias_for("CP1"), Some("Lobby Charger".to_string()));
        assert!(!registry.is_connected("CP1"));
    }

    #[test]
    fn connected_ids_reflects_registrations() {
        let registry = SessionRegistry::new();
        registry.register(session("CP1"));
        registry.register(session("CP2"));
        let mut ids = registry.connected_ids();
        ids.sort();
        assert_eq!(ids, vec!["CP1".to_string(), "CP2".to_string()]);
    }

    #[test]
    fn unregister_ignores_stale_instance() {
        let registry = SessionRegistry::new();
        let stale = session("CP1");
        registry.register(stale.clone());
        let fresh = session("CP1");
        registry.register(fresh.clone());

        // A delayed teardown of the evicted `stale` session must not evict
        // the new, live `fresh` session registered under the same id.
        registry.unregister(&stale);
        assert!(registry.is_connected("CP1"));

        registry.unregister(&fresh);
        assert!(!registry.is_connected("CP1"));
    }
}
