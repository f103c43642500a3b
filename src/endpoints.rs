//! The API endpoints URIs.

/// The dashboard page.
pub const ROOT: &str = "/";

/// The route for searching sales.
pub const SALES_API: &str = "/api/sales";
/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";
