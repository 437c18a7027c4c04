// SPDX-License-Identifier: GPL-3.0-only

//! Reference-counted depth sensing gate
//!
//! Consumers register interest in depth; sensing stays active while at least
//! one is registered. Gating only engages after the first acquire/release so
//! sessions without governed clients keep sensing on by default.

use std::collections::HashSet;
use tracing::debug;

/// Opaque identity of a depth consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

/// Set of consumers that currently need depth sensing
#[derive(Debug, Clone, Default)]
pub struct DepthClientRegistry {
    clients: HashSet<ClientId>,
    activation_requested: bool,
    next_id: u64,
}

impl DepthClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an identity not used by any earlier call
    pub fn allocate_id(&mut self) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a client; returns false if it was already registered
    pub fn acquire(&mut self, client: ClientId) -> bool {
        self.activation_requested = true;
        let inserted = self.clients.insert(client);
        debug!(client = client.0, count = self.clients.len(), inserted, "Depth client acquired");
        inserted
    }

    /// Unregister a client; returns false if it was not registered
    pub fn release(&mut self, client: ClientId) -> bool {
        self.activation_requested = true;
        let removed = self.clients.remove(&client);
        debug!(client = client.0, count = self.clients.len(), removed, "Depth client released");
        removed
    }

    /// Whether any acquire or release has ever happened
    pub fn activation_requested(&self) -> bool {
        self.activation_requested
    }

    /// Whether sensing is needed right now
    pub fn is_active(&self) -> bool {
        !self.clients.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn contains(&self, client: ClientId) -> bool {
        self.clients.contains(&client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_twice_counts_once() {
        let mut registry = DepthClientRegistry::new();
        let client = registry.allocate_id();
        assert!(registry.acquire(client));
        assert!(!registry.acquire(client));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_release_unknown_is_noop() {
        let mut registry = DepthClientRegistry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        registry.acquire(a);
        assert!(!registry.release(b));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(a));
    }

    #[test]
    fn test_activation_flag_set_by_release_alone() {
        let mut registry = DepthClientRegistry::new();
        assert!(!registry.activation_requested());
        let client = registry.allocate_id();
        registry.release(client);
        assert!(registry.activation_requested());
        assert!(!registry.is_active());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut registry = DepthClientRegistry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert_ne!(a, b);
    }
}
