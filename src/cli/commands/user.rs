use crate::config::Config;
use crate::db::Store;
use crate::models::user::Role;

pub async fn cmd_user_add(
    config: &Config,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<()> {
    let role: Role = role.parse()?;

    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_some() {
        println!("User '{username}' already exists.");
        return Ok(());
    }

    let user = store
        .create_user(username, password, role, &config.security)
        .await?;

    println!("✓ Created {} ({})", user.username, user.role);
    println!("  API key: {}", user.api_key);
    Ok(())
}
