pub mod language;
pub mod money;
pub mod order;
pub mod profile;
pub mod shipping;

pub use language::*;
pub use order::*;
pub use profile::*;
pub use shipping::*;
