use std::sync::Arc;

use tapeshelf_hierarchy::HierarchyManager;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the manager shares its store handle and the
/// config sits behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Hierarchy manager over the configured record store.
    pub manager: HierarchyManager,
    /// Server configuration (read by the status compatibility middleware).
    pub config: Arc<ServerConfig>,
}
