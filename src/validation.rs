//! Checkout input validation and sanitization.
//!
//! Every check here runs before any call to the payment processor or the maps
//! provider. Failures are reported as a list of [`FieldError`]s so the client
//! can highlight each offending field.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::{sum_lines, CartItem};
use crate::domain::money::{max_charge, to_cents, MAX_CHARGE_CENTS};
use crate::domain::{Coordinates, Language, ShippingDetails, DEFAULT_COUNTRY};
use crate::payments::PaymentInitRequest;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new("<[^>]*>").expect("tag pattern"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\+27|0)\d{9}$").expect("phone pattern"));
static PLACE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("place id pattern"));

const MAX_EMAIL_LEN: usize = 255;
const MAX_CART_QUANTITY: u32 = 100;
const MAX_PLACE_ID_LEN: usize = 512;
const MAX_TRACKING_LEN: usize = 100;
pub const MIN_AUTOCOMPLETE_LEN: usize = 3;
const MAX_AUTOCOMPLETE_LEN: usize = 200;

/// One rejected field, e.g. `{"field": "shipping_details.phone", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collects field errors while a whole payload is checked.
#[derive(Debug, Default)]
struct Errors(Vec<FieldError>);

impl Errors {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self.0)
        }
    }

    /// Sanitizes `value` and checks its length in characters.
    fn text(&mut self, field: &str, value: &str, label: &str, min: usize, max: usize) -> String {
        let clean = sanitize_string(value);
        let len = clean.chars().count();
        if len < min {
            if min <= 1 {
                self.push(field, format!("{label} is required"));
            } else {
                self.push(field, format!("{label} must be at least {min} characters"));
            }
        } else if len > max {
            self.push(field, format!("{label} must be at most {max} characters"));
        }
        clean
    }
}

/// Strips HTML tags and the characters `< > " ' &`, then trims.
pub fn sanitize_string(input: &str) -> String {
    let without_tags: Cow<'_, str> = HTML_TAG_RE.replace_all(input, "");
    without_tags
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

/// Strips surrounding whitespace and inner spaces, so `082 123 4567` becomes
/// `0821234567`.
pub fn normalize_phone(raw: &str) -> String {
    raw.trim().replace(' ', "")
}

/// South African numbers: `0` or `+27` followed by nine digits.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

fn normalize_email(errors: &mut Errors, field: &str, raw: &str) -> String {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        errors.push(field, "Email is required");
    } else if email.len() > MAX_EMAIL_LEN {
        errors.push(field, "Email is too long");
    } else if !EMAIL_RE.is_match(&email) {
        errors.push(field, "Invalid email address");
    }
    email
}

fn validate_shipping_into(errors: &mut Errors, raw: &ShippingDetails) -> ShippingDetails {
    const P: &str = "shipping_details";
    let full_name = errors.text(&format!("{P}.full_name"), &raw.full_name, "Name", 2, 100);
    let email = normalize_email(errors, &format!("{P}.email"), &raw.email);

    let phone = normalize_phone(&raw.phone);
    if !is_valid_phone(&phone) {
        errors.push(
            format!("{P}.phone"),
            "Phone must be a South African number (0XXXXXXXXX or +27XXXXXXXXX)",
        );
    }

    let address_line1 = errors.text(
        &format!("{P}.address_line1"),
        &raw.address_line1,
        "Address",
        5,
        200,
    );
    let address_line2 = raw
        .address_line2
        .as_deref()
        .map(|line| errors.text(&format!("{P}.address_line2"), line, "Address line 2", 0, 200))
        .filter(|line| !line.is_empty());
    let city = errors.text(&format!("{P}.city"), &raw.city, "City", 2, 100);
    let state_province = errors.text(
        &format!("{P}.state_province"),
        &raw.state_province,
        "Province",
        2,
        100,
    );
    let postal_code = errors.text(&format!("{P}.postal_code"), &raw.postal_code, "Postal code", 4, 10);

    let country = sanitize_string(&raw.country);
    let country = if country.is_empty() {
        DEFAULT_COUNTRY.to_string()
    } else {
        country
    };

    let coordinates = raw.coordinates.as_ref().map(|c| Coordinates {
        lat: c.lat,
        lng: c.lng,
        formatted_address: sanitize_string(&c.formatted_address),
    });
    if let Some(c) = &coordinates {
        if !(-90.0..=90.0).contains(&c.lat) || !(-180.0..=180.0).contains(&c.lng) {
            errors.push(format!("{P}.coordinates"), "Coordinates are out of range");
        }
    }

    ShippingDetails {
        full_name,
        email,
        phone,
        address_line1,
        address_line2,
        city,
        state_province,
        postal_code,
        country,
        coordinates,
    }
}

/// Validates and sanitizes a delivery address.
pub fn validate_shipping_details(raw: &ShippingDetails) -> Result<ShippingDetails, Vec<FieldError>> {
    let mut errors = Errors::default();
    let details = validate_shipping_into(&mut errors, raw);
    errors.finish(details)
}

fn validate_cart_into(errors: &mut Errors, cart: &[CartItem]) -> Vec<CartItem> {
    if cart.is_empty() {
        errors.push("cart", "Cart is empty");
    }
    cart.iter()
        .enumerate()
        .map(|(i, item)| {
            let at = |name: &str| format!("cart.{i}.{name}");
            if item.id.trim().is_empty() {
                errors.push(at("id"), "Item id is required");
            }
            if item.product_id.trim().is_empty() {
                errors.push(at("productId"), "Product id is required");
            }
            let title = errors.text(&at("title"), &item.title, "Title", 1, 200);
            if item.price <= Decimal::ZERO {
                errors.push(at("price"), "Price must be positive");
            } else if item.price > max_charge() {
                errors.push(at("price"), "Price exceeds maximum");
            }
            let options_text = errors.text(&at("optionsText"), &item.options_text, "Options", 0, 500);
            if item.quantity == 0 || item.quantity > MAX_CART_QUANTITY {
                errors.push(
                    at("quantity"),
                    format!("Quantity must be between 1 and {MAX_CART_QUANTITY}"),
                );
            }
            CartItem {
                id: item.id.trim().to_string(),
                product_id: item.product_id.trim().to_string(),
                title,
                price: item.price,
                image: item.image.clone(),
                options_text,
                quantity: item.quantity,
            }
        })
        .collect()
}

/// Validates each cart line and sanitizes its free text.
pub fn validate_cart(cart: &[CartItem]) -> Result<Vec<CartItem>, Vec<FieldError>> {
    let mut errors = Errors::default();
    let items = validate_cart_into(&mut errors, cart);
    errors.finish(items)
}

/// A payment-init request that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPaymentInit {
    pub email: String,
    pub shipping_details: ShippingDetails,
    pub cart: Vec<CartItem>,
    pub language: Language,
    pub subtotal: Decimal,
    pub user_id: Option<String>,
}

/// Validates a payment-init request against the flat `shipping_cost`.
///
/// The subtotal must equal the cart total to the cent, and the amount that
/// will be charged (`subtotal + shipping_cost`) must fit under the per-charge
/// ceiling.
pub fn validate_payment_init(
    request: &PaymentInitRequest,
    shipping_cost: Decimal,
) -> Result<ValidatedPaymentInit, Vec<FieldError>> {
    let mut errors = Errors::default();

    let email = normalize_email(&mut errors, "email", &request.email);
    let shipping_details = validate_shipping_into(&mut errors, &request.shipping_details);
    let cart = validate_cart_into(&mut errors, &request.cart);

    let cart_total = sum_lines(&cart);
    if cart_total.is_none() {
        errors.push("cart", "Cart total is too large");
    }
    let subtotal = match request.subtotal {
        None => {
            errors.push("subtotal", "Subtotal is required");
            Decimal::ZERO
        }
        Some(subtotal) if subtotal <= Decimal::ZERO => {
            errors.push("subtotal", "Subtotal must be positive");
            subtotal
        }
        Some(subtotal) if subtotal > max_charge() => {
            errors.push("subtotal", "Subtotal exceeds maximum");
            subtotal
        }
        Some(subtotal) => {
            if cart_total.is_some_and(|total| subtotal.round_dp(2) != total.round_dp(2)) {
                errors.push("subtotal", "Subtotal does not match cart total");
            }
            subtotal
        }
    };

    if let Some(amount) = request.amount {
        if amount <= Decimal::ZERO {
            errors.push("amount", "Amount must be positive");
        } else if amount > Decimal::from(MAX_CHARGE_CENTS) {
            errors.push("amount", "Amount exceeds maximum");
        }
    }
    if subtotal > Decimal::ZERO && subtotal <= max_charge() {
        let charged = subtotal.checked_add(shipping_cost).and_then(to_cents);
        if charged.map_or(true, |cents| cents > MAX_CHARGE_CENTS) {
            errors.push("amount", "Amount exceeds maximum");
        }
    }

    let language = match request.language_preference.as_deref().map(str::trim) {
        None | Some("") => Language::En,
        Some(code) => code.parse().unwrap_or_else(|_| {
            errors.push("language_preference", "Language must be 'en' or 'af'");
            Language::En
        }),
    };

    let user_id = request
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    errors.finish(ValidatedPaymentInit {
        email,
        shipping_details,
        cart,
        language,
        subtotal,
        user_id,
    })
}

/// Returns `Ok(None)` when the input is too short to be worth a lookup.
pub fn validate_autocomplete_input(input: &str) -> Result<Option<String>, Vec<FieldError>> {
    let clean = sanitize_string(input);
    let len = clean.chars().count();
    if len > MAX_AUTOCOMPLETE_LEN {
        return Err(vec![FieldError::new(
            "input",
            format!("Input must be at most {MAX_AUTOCOMPLETE_LEN} characters"),
        )]);
    }
    Ok((len >= MIN_AUTOCOMPLETE_LEN).then_some(clean))
}

pub fn validate_place_id(place_id: &str) -> Result<String, Vec<FieldError>> {
    let place_id = place_id.trim();
    if place_id.is_empty() {
        return Err(vec![FieldError::new("placeId", "Place id is required")]);
    }
    if place_id.len() > MAX_PLACE_ID_LEN || !PLACE_ID_RE.is_match(place_id) {
        return Err(vec![FieldError::new("placeId", "Invalid place id")]);
    }
    Ok(place_id.to_string())
}

pub fn validate_tracking_number(raw: &str) -> Result<String, Vec<FieldError>> {
    let mut errors = Errors::default();
    let tracking = errors.text("tracking_number", raw, "Tracking number", 1, MAX_TRACKING_LEN);
    errors.finish(tracking)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingDetails {
        ShippingDetails {
            full_name: "Anke du Toit".to_string(),
            email: "Anke@Example.co.za".to_string(),
            phone: "082 123 4567".to_string(),
            address_line1: "12 Kerk Street".to_string(),
            address_line2: None,
            city: "Stellenbosch".to_string(),
            state_province: "Western Cape".to_string(),
            postal_code: "7600".to_string(),
            country: String::new(),
            coordinates: None,
        }
    }

    fn item(quantity: u32, price: Decimal) -> CartItem {
        CartItem {
            id: "prod-karoo-Sage-Skinny".to_string(),
            product_id: "prod-karoo".to_string(),
            title: "The Karoo".to_string(),
            price,
            image: None,
            options_text: "Color: Sage".to_string(),
            quantity,
        }
    }

    fn request() -> PaymentInitRequest {
        PaymentInitRequest {
            email: " Anke@Example.co.za".to_string(),
            amount: None,
            shipping_details: address(),
            cart: vec![item(2, Decimal::new(24999, 2))],
            language_preference: Some("af".to_string()),
            subtotal: Some(Decimal::new(49998, 2)),
            user_id: None,
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn sanitize_strips_tags_and_quotes() {
        assert_eq!(sanitize_string("  <script>x</script>O'Neil & \"Co\" "), "xONeil  Co");
        assert_eq!(sanitize_string("Anke <b>du Toit</b>"), "Anke du Toit");
    }

    #[test]
    fn email_and_phone_rules() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(is_valid_phone("+27821234567"));
        assert!(is_valid_phone("0821234567"));
        assert!(!is_valid_phone("082123456"));
        assert!(!is_valid_phone("+44821234567"));
    }

    #[test]
    fn valid_request_is_normalized() {
        let valid = validate_payment_init(&request(), Decimal::from(100)).unwrap();
        assert_eq!(valid.email, "anke@example.co.za");
        assert_eq!(valid.shipping_details.email, "anke@example.co.za");
        assert_eq!(valid.shipping_details.phone, "0821234567");
        assert_eq!(valid.shipping_details.country, DEFAULT_COUNTRY);
        assert_eq!(valid.language, Language::Af);
    }

    #[test]
    fn bad_contact_details_are_reported_per_field() {
        let mut req = request();
        req.email = "not-an-email".to_string();
        req.shipping_details.phone = "12345".to_string();
        req.shipping_details.postal_code = "12".to_string();

        let errors = validate_payment_init(&req, Decimal::from(100)).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["email", "shipping_details.phone", "shipping_details.postal_code"]
        );
    }

    #[test]
    fn subtotal_must_match_cart() {
        let mut req = request();
        req.subtotal = Some(Decimal::from(10));
        let errors = validate_payment_init(&req, Decimal::from(100)).unwrap_err();
        assert_eq!(fields(&errors), vec!["subtotal"]);
    }

    #[test]
    fn charge_above_ceiling_is_rejected() {
        let mut req = request();
        req.cart = vec![item(100, Decimal::from(100))];
        req.subtotal = Some(Decimal::from(10_000));
        let errors = validate_payment_init(&req, Decimal::from(100)).unwrap_err();
        assert_eq!(fields(&errors), vec!["amount"]);
    }

    #[test]
    fn oversized_subtotal_is_a_field_error() {
        let mut req = request();
        req.subtotal = Some(Decimal::from_i128_with_scale(10i128.pow(27), 0));
        let errors = validate_payment_init(&req, Decimal::from(100)).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("subtotal", "Subtotal exceeds maximum")]);
    }

    #[test]
    fn oversized_price_is_a_field_error() {
        let mut req = request();
        req.cart = vec![item(2, Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0))];
        let errors = validate_payment_init(&req, Decimal::from(100)).unwrap_err();
        assert!(fields(&errors).contains(&"cart.0.price"));

        let mut req = request();
        req.cart = vec![item(2, Decimal::MAX)];
        req.amount = Some(Decimal::MAX);
        req.subtotal = Some(Decimal::MAX);
        let errors = validate_payment_init(&req, Decimal::MAX).unwrap_err();
        assert_eq!(fields(&errors), vec!["cart.0.price", "cart", "subtotal", "amount"]);
    }

    #[test]
    fn explicit_amount_must_be_positive() {
        let mut req = request();
        req.amount = Some(Decimal::from(-5));
        let errors = validate_payment_init(&req, Decimal::from(100)).unwrap_err();
        assert_eq!(errors[0], FieldError::new("amount", "Amount must be positive"));
    }

    #[test]
    fn cart_lines_are_checked() {
        let mut bad = item(0, Decimal::ZERO);
        bad.product_id = String::new();
        let errors = validate_cart(&[bad]).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["cart.0.productId", "cart.0.price", "cart.0.quantity"]
        );
        assert_eq!(fields(&validate_cart(&[]).unwrap_err()), vec!["cart"]);
    }

    #[test]
    fn unknown_language_is_rejected() {
        let mut req = request();
        req.language_preference = Some("fr".to_string());
        let errors = validate_payment_init(&req, Decimal::from(100)).unwrap_err();
        assert_eq!(fields(&errors), vec!["language_preference"]);
    }

    #[test]
    fn autocomplete_input_bounds() {
        assert_eq!(validate_autocomplete_input(" ab ").unwrap(), None);
        assert_eq!(
            validate_autocomplete_input("12 Kerk").unwrap().as_deref(),
            Some("12 Kerk")
        );
        assert!(validate_autocomplete_input(&"a".repeat(201)).is_err());
    }

    #[test]
    fn place_ids_are_restricted() {
        assert_eq!(validate_place_id(" ChIJ_abc-123 ").unwrap(), "ChIJ_abc-123");
        assert!(validate_place_id("abc/../def").is_err());
        assert!(validate_place_id("").is_err());
        assert!(validate_place_id(&"a".repeat(513)).is_err());
    }

    #[test]
    fn tracking_numbers_are_trimmed_and_bounded() {
        assert_eq!(validate_tracking_number(" TRK-42 ").unwrap(), "TRK-42");
        assert!(validate_tracking_number("  ").is_err());
        assert!(validate_tracking_number(&"9".repeat(101)).is_err());
    }
}
