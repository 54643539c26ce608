use askama::Template;

use super::{MailError, OutgoingEmail};
use crate::domain::money::format_rand;
use crate::domain::{Language, Order};

struct EmailCopy {
    title: &'static str,
    heading: &'static str,
    reference: &'static str,
    items: &'static str,
    shipping: &'static str,
    delivery: &'static str,
    total: &'static str,
    closing: &'static str,
}

const EN: EmailCopy = EmailCopy {
    title: "Order confirmed",
    heading: "Thank you for your order",
    reference: "Reference",
    items: "Items",
    shipping: "Shipping",
    delivery: "Delivery",
    total: "Total",
    closing: "Reply to this email if you have any questions.",
};

const AF: EmailCopy = EmailCopy {
    title: "Bestelling bevestig",
    heading: "Dankie vir jou bestelling",
    reference: "Verwysing",
    items: "Items",
    shipping: "Versending",
    delivery: "Aflewering",
    total: "Totaal",
    closing: "Antwoord asseblief op hierdie e-pos as jy vrae het.",
};

struct ItemRow {
    title: String,
    options: String,
    quantity: u32,
    price: String,
}

/// Buyer-supplied fields are escaped by askama; only `logo_url` is trusted.
#[derive(Template)]
#[template(path = "emails/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    copy: &'a EmailCopy,
    logo_url: String,
    reference: &'a str,
    rows: Vec<ItemRow>,
    shipping_cost: String,
    total: String,
    name: &'a str,
    address_line1: &'a str,
    address_line2: &'a str,
    city: &'a str,
    postal_code: &'a str,
}

/// Renders the buyer's confirmation in the order's language.
pub fn order_confirmation(order: &Order, app_url: &str) -> Result<OutgoingEmail, MailError> {
    let copy = match order.language {
        Language::En => &EN,
        Language::Af => &AF,
    };
    let rows = order
        .items
        .iter()
        .map(|item| ItemRow {
            title: if item.snapshot.title.is_empty() {
                item.product_id.clone()
            } else {
                item.snapshot.title.clone()
            },
            options: item.snapshot.options_text.clone(),
            quantity: item.quantity,
            price: format_rand(item.unit_price),
        })
        .collect();

    let ship = &order.shipping_details;
    let html = OrderConfirmationHtml {
        copy,
        logo_url: format!("{}/logo_hor.png", app_url.trim_end_matches('/')),
        reference: &order.reference,
        rows,
        shipping_cost: format_rand(order.shipping_cost),
        total: format_rand(order.total),
        name: &ship.full_name,
        address_line1: &ship.address_line1,
        address_line2: ship.address_line2.as_deref().unwrap_or_default(),
        city: &ship.city,
        postal_code: &ship.postal_code,
    }
    .render()?;

    Ok(OutgoingEmail {
        to: order.buyer_email().to_string(),
        subject: format!("{}: {}", copy.title, order.reference),
        html,
    })
}
