use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::error::{EmitterError, EmitterResult};

/// Listener cap applied to every new emitter unless configured otherwise.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterConfig {
    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_listeners: default_max_listeners(),
        }
    }
}

impl EmitterConfig {
    pub fn validate(&self) -> EmitterResult<()> {
        validate_max_listeners(self.max_listeners)
    }
}

pub(crate) fn validate_max_listeners(n: usize) -> EmitterResult<()> {
    if n == 0 {
        return Err(EmitterError::Config(n.to_string()));
    }
    Ok(())
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> EmitterResult<T> {
    let file = File::open(path)
        .map_err(|e| EmitterError::ConfigLoad(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| EmitterError::ConfigLoad(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_json_str<T: for<'de> Deserialize<'de>>(json: &str) -> EmitterResult<T> {
    serde_json::from_str(json)
        .map_err(|e| EmitterError::ConfigLoad(format!("Failed to parse config: {}", e)))
}

fn default_max_listeners() -> usize {
    DEFAULT_MAX_LISTENERS
}
