use motor_bridge_lib::config::BridgeSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = BridgeSettings::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(settings.log_level.as_str()))
        .init();

    motor_bridge_lib::run(settings).await
}
