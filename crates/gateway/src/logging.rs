use crate::config::{Config, Environment};

pub fn setup_logging(config: &Config) {
    common::setup_logging(config.log_level.as_str(), environment_for(config));
}

fn environment_for(config: &Config) -> common::Environment {
    match config.environment {
        Environment::Development => common::Environment::Development,
        Environment::Production => common::Environment::Production,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::get_configuration;

    #[test]
    fn default_configuration_maps_to_development_logging() {
        let config = get_configuration().unwrap();
        assert_eq!(environment_for(&config), common::Environment::Development);
    }

    #[test]
    fn production_maps_to_production_logging() {
        let config = Config {
            log_level: crate::config::LogLevel::Info,
            environment: Environment::Production,
            http_addr: "0.0.0.0:8080".to_string(),
        };
        assert_eq!(environment_for(&config), common::Environment::Production);
    }
}
