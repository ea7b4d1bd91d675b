use std::env;

use api::{
    bootstrap::{build_snapshot_repo, build_tracker, Providers},
    config::AppConfig,
    services::capture_snapshot,
    telemetry,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let config = AppConfig::from_env();
    let repo = build_snapshot_repo(&config).await?;

    let mut args = env::args().skip(1);
    let cmd = args.next().unwrap_or_default();

    match cmd.as_str() {
        "list" => {
            let limit = args
                .next()
                .and_then(|raw| raw.parse::<i64>().ok())
                .unwrap_or(20);
            for s in repo.list_recent(limit).await? {
                println!(
                    "{} at={} total={:.2} sell={:.2} wallets={} tokens={}",
                    s.id,
                    s.timestamp,
                    s.total_value_usd,
                    s.sell_simulation_value_usd,
                    s.wallet_count,
                    s.token_count
                );
            }
        }
        "delete" => {
            let id = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("missing snapshot id"))?;
            let snapshot_id =
                Uuid::parse_str(&id).map_err(|_| anyhow::anyhow!("invalid snapshot id: {id}"))?;
            if repo.delete(snapshot_id).await? {
                println!("deleted snapshot {snapshot_id}");
            } else {
                println!("snapshot {snapshot_id} not found");
            }
        }
        "capture" => {
            let tracker = build_tracker(&config, Providers::from_config(&config)?);
            for mint in tracker.tracked_tokens().await {
                if let Err(err) = tracker.load_token(&mint).await {
                    eprintln!("failed to load {mint}: {err}");
                }
            }
            match capture_snapshot(&tracker, repo.as_ref()).await? {
                Some(s) => println!("saved snapshot {} total={:.2}", s.id, s.total_value_usd),
                None => println!("no token data loaded, nothing saved"),
            }
        }
        _ => {
            eprintln!(
                "Usage: cargo run -p api --bin snapshot_tools -- <command>\n\
                 Commands:\n  list [limit]\n  delete <snapshot_id>\n  capture"
            );
        }
    }

    Ok(())
}
