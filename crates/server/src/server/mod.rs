use std::sync::Arc;

use crate::config::AppConfig;
use crate::server::state::AppState;

pub mod apikey;
pub mod constants;
pub mod envelope;
pub mod extract;
pub mod resources;
pub mod router;
pub mod search;
pub mod state;
pub mod taxonomy;

pub async fn run_all(config: &AppConfig) -> anyhow::Result<()> {
    let app_state = Arc::new(AppState::try_init(config).await?);
    app_state.db_connection.init_schema().await?;
    router::serve(app_state.clone()).await?;
    app_state.db_connection.close().await;
    Ok(())
}
