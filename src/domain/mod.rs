pub mod errors;
pub mod models;

// Re-export common types for convenience
pub use errors::{ApiError, ApiResult, AppError, AppResult};
pub use models::{
    align_price, tick_size_for, ApiResponse, OrderSide, PlaceOrderRequest, RequestKind,
    TestResult, TestType,
};
