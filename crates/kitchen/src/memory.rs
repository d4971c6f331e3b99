//! In-memory ticket store for tests and local development.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;

use crate::model::{KitchenTicket, TicketStatus};
use crate::store::TicketStore;
use crate::Result;

/// Vec-backed [`TicketStore`]. Insertion order doubles as creation order
/// because tickets are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<Vec<KitchenTicket>>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tickets.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.read().unwrap().is_empty()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn insert(&self, ticket: &KitchenTicket) -> Result<()> {
        self.tickets.write().unwrap().push(ticket.clone());
        Ok(())
    }

    async fn get_by_order(&self, order_id: OrderId) -> Result<Option<KitchenTicket>> {
        let tickets = self.tickets.read().unwrap();
        Ok(tickets
            .iter()
            .filter(|t| t.order_id == order_id)
            .min_by_key(|t| t.created_at)
            .cloned())
    }

    async fn update(&self, ticket: &KitchenTicket) -> Result<()> {
        let mut tickets = self.tickets.write().unwrap();
        if let Some(existing) = tickets.iter_mut().find(|t| t.ticket_id == ticket.ticket_id) {
            *existing = ticket.clone();
        }
        Ok(())
    }

    async fn list_by_status(&self, statuses: &[TicketStatus]) -> Result<Vec<KitchenTicket>> {
        let tickets = self.tickets.read().unwrap();
        let mut matched: Vec<KitchenTicket> = tickets
            .iter()
            .filter(|t| statuses.contains(&t.status))
            .cloned()
            .collect();
        matched.sort_by_key(|t| t.created_at);
        Ok(matched)
    }

    async fn tickets_for_order(&self, order_id: OrderId) -> Result<Vec<KitchenTicket>> {
        let tickets = self.tickets.read().unwrap();
        let mut matched: Vec<KitchenTicket> = tickets
            .iter()
            .filter(|t| t.order_id == order_id)
            .cloned()
            .collect();
        matched.sort_by_key(|t| t.created_at);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_lookup_by_order() {
        let store = InMemoryTicketStore::new();
        let order_id = OrderId::new();
        let ticket = KitchenTicket::new(order_id, vec![]);
        store.insert(&ticket).await.unwrap();

        let loaded = store.get_by_order(order_id).await.unwrap().unwrap();
        assert_eq!(loaded.ticket_id, ticket.ticket_id);
        assert!(store.get_by_order(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oldest_ticket_wins_for_duplicated_order() {
        let store = InMemoryTicketStore::new();
        let order_id = OrderId::new();
        let first = KitchenTicket::new(order_id, vec![]);
        let mut second = KitchenTicket::new(order_id, vec![]);
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        store.insert(&second).await.unwrap();
        store.insert(&first).await.unwrap();

        let loaded = store.get_by_order(order_id).await.unwrap().unwrap();
        assert_eq!(loaded.ticket_id, first.ticket_id);
        assert_eq!(store.tickets_for_order(order_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_by_status_filters_and_orders() {
        let store = InMemoryTicketStore::new();
        let mut done = KitchenTicket::new(OrderId::new(), vec![]);
        done.complete().unwrap();
        let open = KitchenTicket::new(OrderId::new(), vec![]);
        store.insert(&done).await.unwrap();
        store.insert(&open).await.unwrap();

        let listed = store
            .list_by_status(&[TicketStatus::New, TicketStatus::InProgress])
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].ticket_id, open.ticket_id);
    }

    #[tokio::test]
    async fn update_overwrites_lifecycle_fields() {
        let store = InMemoryTicketStore::new();
        let mut ticket = KitchenTicket::new(OrderId::new(), vec![]);
        store.insert(&ticket).await.unwrap();

        ticket.start().unwrap();
        store.update(&ticket).await.unwrap();

        let loaded = store.get_by_order(ticket.order_id).await.unwrap().unwrap();
        assert_eq!(loaded.status, TicketStatus::InProgress);
        assert!(loaded.started_at.is_some());
    }
}
