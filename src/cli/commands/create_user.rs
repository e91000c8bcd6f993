use std::sync::Arc;

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::db::Store;
use crate::domain::NewUser;
use crate::services::UserError;
use crate::state::SharedState;

pub async fn cmd_create_user(config: Config, input: NewUser) -> anyhow::Result<()> {
    let store = Store::with_pool_options(&config.general.database_path, 1, 1).await?;
    let state = SharedState::with_parts(config, store, Arc::new(MemoryCache::new()))?;

    let result = state.user_service.create_user(input).await;
    state.shutdown().await?;

    match result {
        Ok(user) => {
            println!(
                "✓ Created user '{}' (ID: {}, role: {}, status: {})",
                user.username, user.id, user.role, user.status
            );
            Ok(())
        }
        Err(UserError::Validation(e)) => anyhow::bail!("Cannot create user: {e}"),
        Err(e) => Err(e.into()),
    }
}
