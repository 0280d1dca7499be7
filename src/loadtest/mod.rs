pub mod driver;
pub mod issuer;
pub mod registry;
pub mod report;

pub use driver::{RunOutcome, TestDriver, WarmupSummary};
pub use issuer::RequestIssuer;
pub use registry::OrderRegistry;
pub use report::Report;
