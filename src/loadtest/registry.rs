// src/loadtest/registry.rs
use std::collections::{HashSet, VecDeque};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Orders {
    queue: VecDeque<String>,
    // Mirrors `queue` for constant-time duplicate checks.
    index: HashSet<String>,
}

/// FIFO of order ids created during a run, drained by cancels.
///
/// The lock is held only for the push/pop itself, never across a request.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: Mutex<Orders>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an id. Returns false if it is already registered.
    pub async fn push(&self, order_id: String) -> bool {
        let mut orders = self.orders.lock().await;
        if !orders.index.insert(order_id.clone()) {
            log::warn!("Ignoring duplicate order id {}", order_id);
            return false;
        }
        orders.queue.push_back(order_id);
        true
    }

    /// Take the oldest id.
    pub async fn pop(&self) -> Option<String> {
        let mut orders = self.orders.lock().await;
        let order_id = orders.queue.pop_front()?;
        orders.index.remove(&order_id);
        Some(order_id)
    }

    pub async fn len(&self) -> usize {
        self.orders.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.lock().await.queue.is_empty()
    }
}
