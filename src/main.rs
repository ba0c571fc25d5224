use std::env;
use std::path::PathBuf;

use color_eyre::eyre::Result;
use tracing::{error, info};

use member_selector::prelude::*;
use member_selector::utils::tracing::init_tracing;

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let config_path = PathBuf::from(
        env::var("SELECTOR_CONFIG").unwrap_or_else(|_| "config.toml".into()),
    );
    let settings = Settings::from_path(&config_path)?;
    info!(policy = %settings.policy, "Loaded cluster settings from {}", config_path.display());

    let mut selector = settings.selector();
    log_pass(&mut selector);

    let (_watcher, updates) = Settings::watch_config(&config_path)?;

    for update in updates {
        if update.policy != *selector.strategy() {
            info!(policy = %update.policy, "Policy changed, rebuilding selector");
            selector = update.selector();
            log_pass(&mut selector);
            continue;
        }

        let leader = update.view.leader().cloned();
        match selector.reset_with(leader, update.view.members().iter()) {
            Ok(true) => log_pass(&mut selector),
            Ok(false) => info!("Topology unchanged"),
            Err(e) => error!("Rejected topology update: {}", e),
        }
    }

    Ok(())
}

fn log_pass(selector: &mut MemberSelector) {
    let order: Vec<String> = selector.candidates().map(|id| id.to_string()).collect();
    info!(
        leader = ?selector.leader(),
        "Candidate order: [{}]",
        order.join(", ")
    );
    selector.reset();
}
