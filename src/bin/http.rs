#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use taskplan::{Plan, PlannerConfig, http_api, load_plan_from_json};

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = PlannerConfig::load(None)?;
    let addr = config.socket_addr()?;
    let plan = match config.plan_path.as_deref() {
        Some(path) => load_plan_from_json(path)?,
        None => Plan::default(),
    };

    log::info!("taskplan HTTP API listening on http://{addr}");
    http_api::serve(addr, plan, config.registration).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
