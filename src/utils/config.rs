use std::path::Path;
use serde::Deserialize;

/// Server and gameplay configuration - immutable after load
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http_port: u16,
    pub udp_port: u16,
    pub tick_rate_hz: u32,
    pub client_timeout_secs: u64,

    // City layout
    pub city_size: f32,
    pub building_count: usize,
    /// Fixed seed for city layout and spawn rolls; random per run when unset
    pub seed: Option<u64>,

    // Enemy cadence
    pub spawn_interval_ms: u64,
    pub max_enemies: usize,

    /// Whether an active dash ignores incoming contact damage
    pub dash_grants_immunity: bool,

    // Flavor text worker
    pub flavor_timeout_ms: u64,
    pub flavor_queue_capacity: usize,

    pub log_level: String,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            udp_port: 8081,
            tick_rate_hz: 60, // ~16ms per tick
            client_timeout_secs: 15,
            city_size: 200.0,
            building_count: 60,
            seed: None,
            spawn_interval_ms: 3000,
            max_enemies: 40,
            dash_grants_immunity: false,
            flavor_timeout_ms: 5000,
            flavor_queue_capacity: 16,
            log_level: "debug".to_string(),
            log_file: Some("survival.log".to_string()),
        }
    }
}

impl Config {
    /// Load a JSON config file; missing fields keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn tick_interval_ms(&self) -> u64 {
        1000 / self.tick_rate_hz.max(1) as u64
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.udp_port, 8081);
        assert_eq!(config.tick_rate_hz, 60);
        assert_eq!(config.city_size, 200.0);
        assert_eq!(config.building_count, 60);
        assert_eq!(config.spawn_interval_ms, 3000);
        assert!(!config.dash_grants_immunity);
    }

    #[test]
    fn test_tick_interval() {
        let config = Config::default();
        assert_eq!(config.tick_interval_ms(), 16);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "seed": 7, "dash_grants_immunity": true }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(config.dash_grants_immunity);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.max_enemies, 40);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Config::from_json("{ not json").is_err());
    }

    #[test]
    fn test_log_level_filter() {
        let mut config = Config::default();
        assert_eq!(config.log_level_filter(), log::LevelFilter::Debug);
        config.log_level = "nonsense".to_string();
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
    }
}
