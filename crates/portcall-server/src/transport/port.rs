//! In-process model of the host's numbered message ports.
//!
//! A `Port` is a bounded FIFO of text messages shared by any number of
//! writers and readers. Writing to a full port evicts the oldest message,
//! which is returned to the writer. Every write or consumption wakes all
//! tasks suspended in `next_change`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

/// One bounded text queue.
pub struct Port {
    id: u32,
    capacity: usize,
    queue: Mutex<VecDeque<String>>,
    changed: Notify,
}

impl Port {
    pub fn new(id: u32, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            id,
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            changed: Notify::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A panic while holding the lock cannot leave the deque half-updated.
    fn queue(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message. If the port was full, the oldest message is
    /// dropped and returned.
    pub fn write(&self, msg: impl Into<String>) -> Option<String> {
        let evicted = {
            let mut q = self.queue();
            let evicted = if q.len() >= self.capacity {
                q.pop_front()
            } else {
                None
            };
            q.push_back(msg.into());
            evicted
        };
        self.changed.notify_waiters();
        evicted
    }

    /// Pop the head message.
    pub fn read(&self) -> Option<String> {
        let msg = self.queue().pop_front();
        if msg.is_some() {
            self.changed.notify_waiters();
        }
        msg
    }

    /// Pop the head message only if `pred` accepts it (atomic peek + read).
    pub fn read_if(&self, pred: impl FnOnce(&str) -> bool) -> Option<String> {
        let msg = {
            let mut q = self.queue();
            if q.front().is_some_and(|head| pred(head)) {
                q.pop_front()
            } else {
                None
            }
        };
        if msg.is_some() {
            self.changed.notify_waiters();
        }
        msg
    }

    /// Copy of the head message, without consuming it.
    pub fn peek(&self) -> Option<String> {
        self.queue().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue().len() >= self.capacity
    }

    pub fn clear(&self) {
        self.queue().clear();
        self.changed.notify_waiters();
    }

    /// Resolves on the next write to, or consumption from, this port.
    ///
    /// The returned future observes changes from the moment it is created,
    /// so create it *before* inspecting the queue to avoid a lost wakeup.
    pub fn next_change(&self) -> Notified<'_> {
        self.changed.notified()
    }

    /// Pop the head message, suspending while the port is empty.
    pub async fn recv(&self) -> String {
        loop {
            let changed = self.next_change();
            if let Some(msg) = self.read() {
                return msg;
            }
            changed.await;
        }
    }
}

/// The host's port table: port number -> shared `Port`.
pub struct PortHub {
    ports: DashMap<u32, Arc<Port>>,
    capacity: usize,
}

impl PortHub {
    /// Every port created by this hub holds at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            ports: DashMap::new(),
            capacity,
        }
    }

    /// Handle for port `id`, created empty on first use.
    pub fn handle(&self, id: u32) -> Arc<Port> {
        self.ports
            .entry(id)
            .or_insert_with(|| Arc::new(Port::new(id, self.capacity)))
            .value()
            .clone()
    }

    /// Port numbers that currently exist.
    pub fn open_ports(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.ports.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_port_evicts_oldest() {
        let port = Port::new(1, 2);
        assert_eq!(port.write("a"), None);
        assert_eq!(port.write("b"), None);
        assert!(port.is_full());
        assert_eq!(port.write("c").as_deref(), Some("a"));
        assert_eq!(port.read().as_deref(), Some("b"));
        assert_eq!(port.read().as_deref(), Some("c"));
        assert_eq!(port.read(), None);
    }

    #[test]
    fn read_if_leaves_rejected_head() {
        let port = Port::new(1, 4);
        port.write("theirs");
        assert_eq!(port.read_if(|h| h == "mine"), None);
        assert_eq!(port.peek().as_deref(), Some("theirs"));
        assert_eq!(port.read_if(|h| h == "theirs").as_deref(), Some("theirs"));
        assert!(port.is_empty());
    }

    #[test]
    fn clear_empties_the_port() {
        let port = Port::new(1, 4);
        port.write("a");
        port.write("b");
        assert_eq!(port.len(), 2);
        port.clear();
        assert!(port.is_empty());
        assert_eq!(port.capacity(), 4);
    }

    #[test]
    fn hub_shares_handles() {
        let hub = PortHub::new(8);
        hub.handle(1001).write("x");
        assert_eq!(hub.handle(1001).peek().as_deref(), Some("x"));
        assert!(hub.handle(1002).is_empty());
        assert_eq!(hub.open_ports(), vec![1001, 1002]);
    }

    #[tokio::test]
    async fn next_change_wakes_on_consumption() {
        let port = Arc::new(Port::new(1, 4));
        port.write("theirs");
        port.write("mine");

        let waiter = {
            let port = Arc::clone(&port);
            tokio::spawn(async move {
                loop {
                    let changed = port.next_change();
                    if let Some(msg) = port.read_if(|h| h == "mine") {
                        return msg;
                    }
                    changed.await;
                }
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(port.read().as_deref(), Some("theirs"));

        let got = tokio::time::timeout(std::time::Duration::from_secs(5), waiter)
            .await
            .expect("woken by the read")
            .unwrap();
        assert_eq!(got, "mine");
    }

    #[tokio::test]
    async fn recv_wakes_on_write() {
        let port = Arc::new(Port::new(1, 4));
        let reader = {
            let port = Arc::clone(&port);
            tokio::spawn(async move { port.recv().await })
        };
        tokio::task::yield_now().await;
        port.write("hello");
        assert_eq!(reader.await.unwrap(), "hello");
    }
}
