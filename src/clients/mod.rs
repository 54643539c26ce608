#[macro_use]
mod macros;
pub mod order_client;
pub mod profile_client;

pub use order_client::{ConfirmOutcome, OrderClient, OrderFilter, PendingOutcome};
pub use profile_client::ProfileClient;
