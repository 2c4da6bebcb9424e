use dotenv::var;
use serde::{Deserialize, Serialize};
use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

/// UI pacing, in milliseconds. These are deliberate human-perceptible
/// pauses, not performance tuning.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// How long an echoed key or a fresh result stays put before the
    /// program moves on.
    pub echo_delay_ms: u64,
    /// How long a result or error message is held before the display
    /// clears for the next expression.
    pub hold_delay_ms: u64,
    /// How long a column line must stay idle before a key counts as
    /// released.
    pub release_settle_ms: u64,
}

impl Config {
    pub fn try_load() -> Option<Self> {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("config.json"));
        let config_path = Path::new(config_str);
        if config_path.exists() {
            let file = std::fs::File::open(config_path).ok()?;
            let reader = std::io::BufReader::new(file);
            serde_json::from_reader(reader).ok()
        } else {
            None
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let config_str = var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string());
        let config_path = Path::new(&config_str);
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn echo_delay(&self) -> Duration {
        Duration::from_millis(self.echo_delay_ms)
    }

    pub fn hold_delay(&self) -> Duration {
        Duration::from_millis(self.hold_delay_ms)
    }

    pub fn release_settle(&self) -> Duration {
        Duration::from_millis(self.release_settle_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            echo_delay_ms: 500,
            hold_delay_ms: 2500,
            release_settle_ms: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_ui_pacing() {
        let config = Config::default();
        assert_eq!(config.echo_delay(), Duration::from_millis(500));
        assert_eq!(config.hold_delay(), Duration::from_millis(2500));
        assert_eq!(config.release_settle(), Duration::from_millis(20));
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"hold_delay_ms": 1000}"#).unwrap();
        assert_eq!(config.hold_delay_ms, 1000);
        assert_eq!(config.echo_delay_ms, 500);
        assert_eq!(config.release_settle_ms, 20);
    }
}
