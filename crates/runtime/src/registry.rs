//! Worker inbox registry and group resolution.

use std::collections::HashMap;
use tempo_core::{Envelope, Selection, WorkerId};
use tokio::sync::mpsc;

/// Sender handles for every registered worker, plus named groups.
///
/// Owned by the clock task; selections are resolved here so the clock state
/// machine never sees group membership.
pub struct WorkerRegistry<P> {
    senders: HashMap<WorkerId, mpsc::UnboundedSender<Envelope<P>>>,
    groups: HashMap<String, Vec<WorkerId>>,
}

impl<P> Default for WorkerRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> WorkerRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            senders: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Register a worker's inbox sender.
    pub fn insert(&mut self, id: WorkerId, sender: mpsc::UnboundedSender<Envelope<P>>) {
        self.senders.insert(id, sender);
    }

    /// Add a worker to a named group. Groups accumulate; a worker may be in
    /// several.
    pub fn add_to_group(&mut self, group: &str, id: WorkerId) {
        self.groups.entry(group.to_string()).or_default().push(id);
    }

    /// Number of registered workers.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Whether no workers are registered.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Deliver an envelope to a single worker's inbox.
    ///
    /// An unknown id or a closed inbox means the worker is gone (shutdown);
    /// both are ignored, matching fire-and-forget delivery semantics.
    pub fn deliver(&self, to: WorkerId, envelope: Envelope<P>) {
        match self.senders.get(&to) {
            Some(tx) => {
                let _ = tx.send(envelope);
            }
            None => tracing::warn!(%to, "delivery to unregistered worker dropped"),
        }
    }

    /// Deliver an envelope to every worker the selection resolves to.
    pub fn deliver_selection(&self, selection: &Selection, envelope: Envelope<P>) {
        match selection {
            Selection::All => {
                for tx in self.senders.values() {
                    let _ = tx.send(envelope.clone());
                }
            }
            Selection::Group(name) => match self.groups.get(name) {
                Some(members) => {
                    for id in members {
                        self.deliver(*id, envelope.clone());
                    }
                }
                None => tracing::warn!(group = %name, "delivery to unknown group dropped"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn envelope(payload: &'static str) -> Envelope<&'static str> {
        Envelope {
            from: None,
            due: None,
            payload: Arc::new(payload),
        }
    }

    #[test]
    fn delivers_to_registered_worker() {
        let mut registry = WorkerRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.insert(WorkerId(0), tx);

        registry.deliver(WorkerId(0), envelope("hello"));
        assert_eq!(*rx.try_recv().unwrap().payload, "hello");
    }

    #[test]
    fn unknown_worker_is_dropped() {
        let registry: WorkerRegistry<&str> = WorkerRegistry::new();
        registry.deliver(WorkerId(9), envelope("lost"));
    }

    #[test]
    fn group_delivery_reaches_all_members() {
        let mut registry = WorkerRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        registry.insert(WorkerId(0), tx_a);
        registry.insert(WorkerId(1), tx_b);
        registry.insert(WorkerId(2), tx_c);
        registry.add_to_group("machines", WorkerId(0));
        registry.add_to_group("machines", WorkerId(1));

        registry.deliver_selection(&Selection::Group("machines".into()), envelope("tick"));
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_c.try_recv().is_err());

        registry.deliver_selection(&Selection::All, envelope("all"));
        assert!(rx_c.try_recv().is_ok());
    }
}
