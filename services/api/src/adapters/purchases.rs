//! services/api/src/adapters/purchases.rs
//!
//! Purchase history has no backing store yet; every user sees the same two
//! sample orders.

use async_trait::async_trait;
use eventify_core::domain::Purchase;
use eventify_core::ports::{PortResult, PurchaseHistoryService};
use uuid::Uuid;

pub struct StaticPurchaseHistory;

#[async_trait]
impl PurchaseHistoryService for StaticPurchaseHistory {
    async fn purchases_for(&self, _user_id: Uuid) -> PortResult<Vec<Purchase>> {
        Ok(vec![
            Purchase {
                event: "Sample Event 1".to_string(),
                date: "2024-12-01".to_string(),
                location: "Venue A".to_string(),
                ticket_type: "VIP".to_string(),
                quantity: 2,
                total_price: 3000,
            },
            Purchase {
                event: "Sample Event 2".to_string(),
                date: "2024-11-15".to_string(),
                location: "Venue B".to_string(),
                ticket_type: "General Admission".to_string(),
                quantity: 1,
                total_price: 500,
            },
        ])
    }
}
