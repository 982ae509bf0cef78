pub mod error; // Error handling
pub mod features; // Runtime feature switches
pub mod handlers; // Shared HTTP handlers
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod routes; // Shared routes
pub mod services; // Service abstractions

pub use routes::routes;

pub use error::{
    config_error, external_service_error, forbidden, validation_error, GhlSyncError,
    HttpStatusCode,
};

pub use http::{
    client::{create_client, DEFAULT_TIMEOUT_SECS, HTTP_CLIENT},
    IntoHttpResponse,
};

pub use logging::{init_with_level, level_from_str, log_result};

pub use features::{is_feature_enabled, is_gcal_enabled, is_ghl_enabled};
