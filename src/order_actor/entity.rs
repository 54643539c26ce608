use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::actions::{OrderAction, OrderActionResult};
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderItem, OrderPatch, OrderStatus};

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = OrderPatch;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;

    fn id(&self) -> &String {
        &self.reference
    }

    /// Orders are keyed by the processor reference, so a second create for the
    /// same reference is refused by the actor.
    fn natural_id(params: &OrderCreate) -> Option<String> {
        Some(params.reference.clone())
    }

    /// Creates a new Order from creation parameters.
    ///
    /// Only `pending` (payment initialized) and `paid` (webhook arrived first)
    /// are valid starting states. The total is fixed here as
    /// `subtotal + shipping_cost` and never recomputed.
    fn from_create_params(reference: String, params: OrderCreate) -> Result<Self, String> {
        if reference.trim().is_empty() {
            return Err("reference is required".to_string());
        }
        if !matches!(params.status, OrderStatus::Pending | OrderStatus::Paid) {
            return Err(format!("orders cannot start as {}", params.status));
        }
        if params.subtotal < Decimal::ZERO || params.shipping_cost < Decimal::ZERO {
            return Err("amounts must not be negative".to_string());
        }

        let total = params
            .subtotal
            .checked_add(params.shipping_cost)
            .ok_or_else(|| "amount overflow".to_string())?;

        let id = Uuid::new_v4();
        let items = params
            .items
            .into_iter()
            .map(|draft| OrderItem::from_draft(id, draft))
            .collect::<Result<Vec<_>, _>>()?;
        let now = Utc::now();
        Ok(Self {
            id,
            reference,
            user_id: params.user_id,
            status: params.status,
            shipping_details: params.shipping_details,
            language: params.language,
            subtotal: params.subtotal,
            shipping_cost: params.shipping_cost,
            total,
            tracking_number: None,
            items,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies an admin status change and/or tracking number.
    fn on_update(&mut self, patch: OrderPatch) -> Result<(), String> {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tracking) = patch.tracking_number {
            let tracking = tracking.trim();
            if tracking.is_empty() {
                return Err("tracking number must not be empty".to_string());
            }
            self.tracking_number = Some(tracking.to_string());
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, String> {
        match action {
            OrderAction::ConfirmPayment { items } => {
                if self.status != OrderStatus::Pending {
                    return Ok(OrderActionResult::AlreadySettled(self.status));
                }
                if self.items.is_empty() {
                    let order_id = self.id;
                    self.items = items
                        .into_iter()
                        .map(|draft| OrderItem::from_draft(order_id, draft))
                        .collect::<Result<Vec<_>, _>>()?;
                }
                self.status = OrderStatus::Paid;
                self.updated_at = Utc::now();
                Ok(OrderActionResult::Promoted)
            }
        }
    }
}
