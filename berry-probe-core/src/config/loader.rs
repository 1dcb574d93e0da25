use crate::config::model::ProbeConfig;

pub fn load_config() -> Result<ProbeConfig, anyhow::Error> {
    load_config_from_path("probe.toml")
}

pub fn load_config_from_path(config_path: &str) -> Result<ProbeConfig, anyhow::Error> {
    let config_str = std::fs::read_to_string(config_path)?;
    let config: ProbeConfig = toml::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}
