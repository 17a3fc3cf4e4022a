use std::sync::Arc;
use neon_survival::domain::city;
use neon_survival::flavor::RadioChatter;
use neon_survival::server;
use neon_survival::utils::config::Config;
use neon_survival::utils::weapondb::WeaponDb;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional JSON config path as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    setup_logging(&config)?;

    // Load immutable globals (zero contention)
    let config = Arc::new(config);
    let weapons = Arc::new(WeaponDb::load());

    let city_seed = config.seed.unwrap_or_else(rand::random);
    let city = Arc::new(city::generate(config.city_size, config.building_count, city_seed));
    log::info!(
        "Generated city {}x{} with {} buildings (seed {})",
        config.city_size,
        config.city_size,
        city.buildings().len(),
        city_seed
    );

    let udp_socket = Arc::new(
        tokio::net::UdpSocket::bind(format!("0.0.0.0:{}", config.udp_port)).await?
    );
    log::info!("UDP listening on port {}", config.udp_port);

    let state = Arc::new(server::create_session_with_tick(
        city,
        weapons.clone(),
        config.clone(),
        udp_socket.clone(),
        Arc::new(RadioChatter),
    ));

    // Start HTTP and UDP servers
    server::start_servers(state, weapons, config, udp_socket).await?;

    Ok(())
}

fn setup_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Utc::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(config.log_level_filter())
        .chain(std::io::stdout());

    if let Some(path) = &config.log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
