use std::collections::HashMap;

pub(crate) const SERVICE_NAME: &str = "tandem-sync";

fn server_attrs(server: &str) -> HashMap<&str, &str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);
    attrs
}

/// Store the account credentials in the system keyring via Secret Service.
pub async fn store_credentials(
    server: &str,
    username: &str,
    password: &str,
) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {e}"))?;

    let secret = format!("{username}:{password}");

    keyring
        .create_item(
            &format!("Tandem account ({server})"),
            &server_attrs(server),
            secret.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| format!("Failed to store credentials: {e}"))?;

    Ok(())
}

/// Load the account credentials for a server. Returns (username, password)
/// when a secret is stored.
pub async fn load_credentials(server: &str) -> Result<Option<(String, String)>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {e}"))?;

    let items = keyring
        .search_items(&server_attrs(server))
        .await
        .map_err(|e| format!("Failed to search keyring: {e}"))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {e}"))?;
        let secret = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {e}"))?;
        if let Some((username, password)) = secret.split_once(':') {
            return Ok(Some((username.to_string(), password.to_string())));
        }
    }

    Ok(None)
}

/// Remove the stored credentials for a server, if any.
pub async fn delete_credentials(server: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {e}"))?;

    let items = keyring
        .search_items(&server_attrs(server))
        .await
        .map_err(|e| format!("Failed to search keyring: {e}"))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete credentials: {e}"))?;
    }

    Ok(())
}
