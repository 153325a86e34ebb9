use std::collections::HashSet;

#[tokio::main]
async fn main() {
    systemd_journal_logger::JournalLog::new()
        .unwrap()
        .with_syslog_identifier("tandem-store-check".to_string())
        .install()
        .unwrap();
    log::set_max_level(log::LevelFilter::Info);

    // Load config
    let cosmic_cfg = cosmic::cosmic_config::Config::new("dev.tandem.app", tandem::config::CONFIG_VERSION)
        .expect("Failed to load config");
    let config = <tandem::config::TandemConfig as cosmic::cosmic_config::CosmicConfigEntry>::get_entry(&cosmic_cfg)
        .unwrap_or_else(|(_, cfg)| cfg);

    println!("=== Account vs Local Comparison ===\n");

    let local = tandem::store::StoreManager::local(&config.lists_dir());
    let local_infos = match local.list_collections().await {
        Ok(infos) => infos,
        Err(e) => {
            println!("Failed to list local collections: {}", e);
            return;
        }
    };

    println!("Local: {} lists", local_infos.len());
    for info in &local_infos {
        match local.open_collection(&info.id).await {
            Ok(open) => println!("  {} ({} items)", info.label(), open.items.len()),
            Err(e) => println!("  {} (unreadable: {})", info.label(), e),
        }
    }

    let server = config.server_url.trim();
    if server.is_empty() {
        println!("\nNo account configured.");
        return;
    }

    println!("\n--- Account: {} ---", server);

    let creds = tandem::store::keyring::load_credentials(server).await;
    let (username, password) = match creds {
        Ok(Some(creds)) => creds,
        Ok(None) => { println!("  No credentials found"); return; }
        Err(e) => { println!("  Keyring error: {}", e); return; }
    };

    let remote = match tandem::store::remote::RemoteStore::new(server, &username, &password) {
        Ok(r) => r,
        Err(e) => { println!("  Client error: {}", e); return; }
    };
    let account = tandem::store::StoreManager::linked(remote);

    match account.list_collections().await {
        Ok(remote_infos) => {
            println!("  Remote: {} lists", remote_infos.len());

            let local_ids: HashSet<&str> = local_infos.iter().map(|i| i.id.as_str()).collect();
            let remote_ids: HashSet<&str> = remote_infos.iter().map(|i| i.id.as_str()).collect();

            let local_only: Vec<_> = local_infos.iter().filter(|i| !remote_ids.contains(i.id.as_str())).collect();
            let remote_only: Vec<_> = remote_infos.iter().filter(|i| !local_ids.contains(i.id.as_str())).collect();
            let matched = local_infos.len() - local_only.len();

            println!("  Matched: {}", matched);

            if !local_only.is_empty() {
                println!("\n  LOCAL ONLY ({}):", local_only.len());
                for info in &local_only {
                    println!("    {} ({})", info.label(), info.id);
                }
            }

            if !remote_only.is_empty() {
                println!("\n  ON ACCOUNT ONLY ({}):", remote_only.len());
                for info in &remote_only {
                    println!("    {} ({})", info.label(), info.id);
                }
            }

            if local_only.is_empty() && remote_only.is_empty() {
                println!("  Everything matched!");
            }
        }
        Err(e) => println!("  Error listing account collections: {}", e),
    }

    println!("\n=== Done ===");
}
