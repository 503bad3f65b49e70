//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the schema registry
//! - Load every configured file, then watch it
//!
//! # Design Decisions
//! - Fail fast on schema errors: nothing can be validated without them
//! - A configured file that fails to load is logged and still watched, so
//!   fixing or creating it later brings it in without a restart

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::content::LoadOptions;
use crate::error::Result;
use crate::service::ContentService;

/// Build and initialize a service from settings, loading and watching its files.
pub async fn start(config: ServiceConfig) -> Result<Arc<ContentService>> {
    let service = Arc::new(ContentService::new(config));
    service.initialize().await?;
    load_and_watch(&service).await;
    Ok(service)
}

/// Load then watch every file listed in the service settings.
///
/// Returns how many files loaded successfully.
pub async fn load_and_watch(service: &ContentService) -> usize {
    let files = service.config().files.clone();
    let mut loaded = 0;

    for file in &files {
        let schema = file.schema.as_deref();
        match service
            .load_configuration(&file.path, schema, LoadOptions::default())
            .await
        {
            Ok(_) => loaded += 1,
            Err(e) => tracing::warn!(
                path = %file.path.display(),
                schema = ?schema,
                error = %e,
                "Initial load failed, waiting for a valid version"
            ),
        }
        service.watch_files([&file.path], schema);
    }

    tracing::info!(configured = files.len(), loaded, "Startup load complete");
    loaded
}
