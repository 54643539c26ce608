use crate::domain::{OrderItemDraft, OrderStatus};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Promotes a pending order to paid and attaches its purchased lines.
    ///
    /// Orders that already left `pending` are not touched.
    ConfirmPayment { items: Vec<OrderItemDraft> },
}

/// Results from OrderActions
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    /// The order moved from pending to paid during this action.
    Promoted,
    /// Payment was already recorded; carries the status found.
    AlreadySettled(OrderStatus),
}
