/// Root handler that returns a static welcome message.
pub async fn root() -> &'static str {
    "Product photo to eBay listing matcher is running."
}

/// Health check endpoint for monitoring.
pub async fn health_check() -> &'static str {
    "OK"
}
