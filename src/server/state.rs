use crate::profile::ProfileOrchestrator;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub orchestrator: Arc<ProfileOrchestrator>,
}
