use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{Order, OrderCreate, OrderPatch, OrderStatus};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};

/// What a pending-order write did.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOutcome {
    Recorded,
    /// An order for this reference was already there (e.g. the webhook won).
    AlreadyExists,
}

/// What a confirmed payment did to the order store.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// No order existed; a paid order was inserted with its items.
    Created(Order),
    /// A pending order was promoted to paid.
    Promoted(Order),
    /// The payment had already been recorded; nothing changed.
    AlreadyRecorded(OrderStatus),
}

/// Admin listing filter.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive match on reference, buyer email or buyer name.
    pub query: Option<String>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|status| status != order.status) {
            return false;
        }
        match self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            None => true,
            Some(query) => {
                let query = query.to_lowercase();
                [
                    order.reference.as_str(),
                    order.shipping_details.email.as_str(),
                    order.shipping_details.full_name.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
            }
        }
    }
}

/// Client for interacting with the Order actor.
///
/// Orders are keyed by the payment reference, and the actor refuses a second
/// create for a reference it already holds. The reconciliation paths below
/// lean on that refusal instead of a separate existence check.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_basic_client!(OrderClient, Order, OrderError, order);

impl OrderClient {
    /// Records the pending order written at payment initialization.
    #[instrument(skip(self, params), fields(reference = %params.reference))]
    pub async fn record_pending(&self, params: OrderCreate) -> Result<PendingOutcome, OrderError> {
        debug!("Sending request");
        let params = OrderCreate {
            status: OrderStatus::Pending,
            ..params
        };
        match self.inner.create(params).await {
            Ok(_) => {
                info!("Pending order recorded");
                Ok(PendingOutcome::Recorded)
            }
            Err(FrameworkError::AlreadyExists(_)) => {
                info!("Order already exists, skipping pending record");
                Ok(PendingOutcome::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Applies a confirmed payment.
    ///
    /// Inserts a paid order when none exists, promotes a pending one, and
    /// leaves anything further along untouched. Items are attached at most once.
    #[instrument(skip(self, params), fields(reference = %params.reference))]
    pub async fn confirm_payment(&self, params: OrderCreate) -> Result<ConfirmOutcome, OrderError> {
        debug!("Sending request");
        let reference = params.reference.clone();
        let items = params.items.clone();
        let params = OrderCreate {
            status: OrderStatus::Paid,
            ..params
        };

        match self.inner.create(params).await {
            Ok(id) => {
                info!("Paid order created from webhook");
                let order = self.fetch(id).await?;
                return Ok(ConfirmOutcome::Created(order));
            }
            Err(FrameworkError::AlreadyExists(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let result = self
            .inner
            .perform_action(reference.clone(), OrderAction::ConfirmPayment { items })
            .await?;
        match result {
            OrderActionResult::Promoted => {
                info!("Pending order promoted to paid");
                Ok(ConfirmOutcome::Promoted(self.fetch(reference).await?))
            }
            OrderActionResult::AlreadySettled(status) => {
                info!(%status, "Payment already recorded");
                Ok(ConfirmOutcome::AlreadyRecorded(status))
            }
        }
    }

    /// Orders placed by one profile, newest first.
    #[instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: String) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self
            .list_orders()
            .await?
            .into_iter()
            .filter(|order| order.user_id.as_deref() == Some(user_id.as_str()))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// All orders matching the filter, newest first.
    #[instrument(skip(self))]
    pub async fn search_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self
            .list_orders()
            .await?
            .into_iter()
            .filter(|order| filter.matches(order))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, reference: String, status: OrderStatus) -> Result<Order, OrderError> {
        debug!("Sending request");
        let patch = OrderPatch {
            status: Some(status),
            ..OrderPatch::default()
        };
        self.inner.update(reference, patch).await.map_err(OrderError::from)
    }

    #[instrument(skip(self))]
    pub async fn set_tracking(&self, reference: String, tracking_number: String) -> Result<Order, OrderError> {
        debug!("Sending request");
        let patch = OrderPatch {
            tracking_number: Some(tracking_number),
            ..OrderPatch::default()
        };
        self.inner.update(reference, patch).await.map_err(OrderError::from)
    }

    async fn fetch(&self, reference: String) -> Result<Order, OrderError> {
        match self.get_order(reference.clone()).await? {
            Some(order) => Ok(order),
            None => {
                warn!(%reference, "Order vanished after write");
                Err(OrderError::NotFound(reference))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::Entity;
    use crate::domain::{Language, OrderItemDraft, ProductSnapshot, ShippingDetails};
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_get, expect_list};
    use rust_decimal::Decimal;

    fn params(status: OrderStatus) -> OrderCreate {
        OrderCreate {
            reference: "ref_abc".to_string(),
            user_id: Some("u-1".to_string()),
            status,
            shipping_details: ShippingDetails::default(),
            language: Language::En,
            subtotal: Decimal::from(250),
            shipping_cost: Decimal::from(100),
            items: vec![OrderItemDraft {
                product_id: "prod-karoo".to_string(),
                snapshot: ProductSnapshot {
                    line_id: "prod-karoo-Sage-".to_string(),
                    title: "The Karoo".to_string(),
                    options_text: String::new(),
                    image: None,
                },
                quantity: 1,
                unit_price: Decimal::from(250),
            }],
        }
    }

    fn order(reference: &str, status: OrderStatus) -> Order {
        Order::from_create_params(
            reference.to_string(),
            OrderCreate {
                reference: reference.to_string(),
                ..params(status)
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn confirm_promotes_existing_pending_order() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move { client.confirm_payment(params(OrderStatus::Pending)).await });

        let (create, responder) = expect_create(&mut receiver).await.expect("create request");
        assert_eq!(create.status, OrderStatus::Paid);
        responder
            .send(Err(FrameworkError::AlreadyExists("ref_abc".to_string())))
            .unwrap();

        let (id, action, responder) = expect_action(&mut receiver).await.expect("action request");
        assert_eq!(id, "ref_abc");
        assert!(matches!(action, OrderAction::ConfirmPayment { ref items } if items.len() == 1));
        responder.send(Ok(OrderActionResult::Promoted)).unwrap();

        let (id, responder) = expect_get(&mut receiver).await.expect("get request");
        assert_eq!(id, "ref_abc");
        responder.send(Ok(Some(order("ref_abc", OrderStatus::Paid)))).unwrap();

        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome, ConfirmOutcome::Promoted(o) if o.status == OrderStatus::Paid));
    }

    #[tokio::test]
    async fn confirm_leaves_settled_orders_alone() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move { client.confirm_payment(params(OrderStatus::Paid)).await });

        let (_, responder) = expect_create(&mut receiver).await.expect("create request");
        responder
            .send(Err(FrameworkError::AlreadyExists("ref_abc".to_string())))
            .unwrap();
        let (_, _, responder) = expect_action(&mut receiver).await.expect("action request");
        responder
            .send(Ok(OrderActionResult::AlreadySettled(OrderStatus::Shipped)))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Ok(ConfirmOutcome::AlreadyRecorded(OrderStatus::Shipped))
        );
    }

    #[tokio::test]
    async fn pending_record_tolerates_existing_order() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move { client.record_pending(params(OrderStatus::Paid)).await });

        let (create, responder) = expect_create(&mut receiver).await.expect("create request");
        assert_eq!(create.status, OrderStatus::Pending);
        responder
            .send(Err(FrameworkError::AlreadyExists("ref_abc".to_string())))
            .unwrap();

        assert_eq!(task.await.unwrap(), Ok(PendingOutcome::AlreadyExists));
    }

    #[tokio::test]
    async fn storage_failure_surfaces() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move { client.confirm_payment(params(OrderStatus::Paid)).await });

        let (_, responder) = expect_create(&mut receiver).await.expect("create request");
        responder
            .send(Err(FrameworkError::Snapshot("disk full".to_string())))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(OrderError::StorageError("disk full".to_string()))
        );
    }

    #[tokio::test]
    async fn search_filters_and_sorts_newest_first() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move {
            client
                .search_orders(OrderFilter {
                    status: Some(OrderStatus::Paid),
                    query: Some("REF_".to_string()),
                })
                .await
        });

        let mut older = order("ref_1", OrderStatus::Paid);
        older.created_at -= chrono::Duration::minutes(5);
        let newer = order("ref_2", OrderStatus::Paid);
        let pending = order("ref_3", OrderStatus::Pending);
        let mut other = order("xyz", OrderStatus::Paid);
        other.shipping_details.full_name = "Someone Else".to_string();

        let responder = expect_list(&mut receiver).await.expect("list request");
        responder.send(Ok(vec![older, pending, other, newer])).unwrap();

        let found: Vec<String> = task
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|o| o.reference)
            .collect();
        assert_eq!(found, vec!["ref_2".to_string(), "ref_1".to_string()]);
    }
}
