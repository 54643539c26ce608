//! In-memory stand-ins for the external providers, for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::{CatalogError, CatalogSource, Product, ProductSummary};
use crate::geo::{GeoError, GeocodedAddress, Geocoder, LatLng, PlaceDetails, Prediction};
use crate::notifications::{MailError, Mailer, OutgoingEmail};
use crate::payments::paystack::{InitializeTransaction, InitializedTransaction, PaymentGateway};
use crate::payments::PaymentError;

/// Hands out `ref_1`, `ref_2`, ... and records every request.
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<InitializeTransaction>>,
    pub fail_with_status: Option<u16>,
    counter: AtomicUsize,
}

impl FakeGateway {
    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(status) = self.fail_with_status {
            return Err(PaymentError::Provider {
                status,
                message: "Invalid key".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(InitializedTransaction {
            authorization_url: format!("https://checkout.paystack.test/ref_{n}"),
            access_code: format!("access_{n}"),
            reference: format!("ref_{n}"),
        })
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        if self.fail {
            return Err(MailError::Provider {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(())
    }
}

/// Answers every lookup with one fixed Stellenbosch address.
#[derive(Default)]
pub struct FakeGeocoder {
    pub denied: bool,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>, GeoError> {
        if self.denied {
            return Err(GeoError::Denied("bad key".to_string()));
        }
        Ok(vec![Prediction {
            place_id: "ChIJ_kerk".to_string(),
            description: format!("{input}, Stellenbosch, South Africa"),
        }])
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, GeoError> {
        if place_id != "ChIJ_kerk" {
            return Err(GeoError::NotFound);
        }
        Ok(PlaceDetails {
            formatted_address: "12 Kerk St, Stellenbosch, 7600, South Africa".to_string(),
            coordinates: LatLng { lat: -33.93, lng: 18.86 },
            address_components: Default::default(),
        })
    }

    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeoError> {
        Ok(GeocodedAddress {
            formatted_address: address.to_string(),
            coordinates: LatLng { lat: -33.93, lng: 18.86 },
        })
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub products: Vec<Product>,
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn list_products(&self) -> Result<Vec<ProductSummary>, CatalogError> {
        Ok(self
            .products
            .iter()
            .map(|p| ProductSummary {
                id: p.id.clone(),
                slug: p.slug.clone(),
                title: p.title.clone(),
                price: p.price,
                image: p.images.first().cloned(),
            })
            .collect())
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.iter().find(|p| p.slug == slug).cloned())
    }
}
