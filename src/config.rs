use rocket::figment::Figment;
use serde::Deserialize;

use std::path::PathBuf;

use crate::internal_error::InternalResult;

/// Application settings, read from the same figment as rocket's own
/// (`Rocket.toml`, then `ROCKET_*` environment variables).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("taskboard.db")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> InternalResult<AppConfig> {
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::figment::providers::Serialized;

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_figment(&Figment::new()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("taskboard.db"));
        assert_eq!(config.static_dir, None);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn figment_values_override_defaults() {
        let figment = Figment::new()
            .merge(Serialized::default("database_path", "/tmp/other.db"))
            .merge(Serialized::default("static_dir", "public"));

        let config = AppConfig::from_figment(&figment).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
    }
}
