use std::fs::File;
use std::io::Read;

use json_comments::StripComments;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data_structure::quicklist::{QuickList, DEFAULT_COMPRESS, DEFAULT_FILL};

pub const QUICKLIST_CONFIG_JSON: &str = "./quicklist_config.json";
pub const QUICKLIST_CONFIG_TOML: &str = "./quicklist_config.toml";

fn default_list_max_ziplist_size() -> i32 {
    DEFAULT_FILL
}

fn default_list_compress_depth() -> i32 {
    DEFAULT_COMPRESS
}

/// Node sizing and compression settings for lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickListConfig {
    /// Positive: max entries per node. Negative: -1..-5 picks a 4kb..64kb
    /// node size limit.
    #[serde(default = "default_list_max_ziplist_size")]
    pub list_max_ziplist_size: i32,
    /// Nodes at each end left uncompressed; 0 disables compression.
    #[serde(default = "default_list_compress_depth")]
    pub list_compress_depth: i32,
}

impl Default for QuickListConfig {
    fn default() -> Self {
        Self {
            list_max_ziplist_size: default_list_max_ziplist_size(),
            list_compress_depth: default_list_compress_depth(),
        }
    }
}

impl QuickListConfig {
    pub fn new(path: Option<&str>) -> Self {
        let config_path_show;
        let mut file = if let Some(path) = path {
            config_path_show = path;
            if let Ok(file) = File::open(path) {
                file
            } else {
                warn!("Config File: {} Read Fail, Use Default Config.", config_path_show);
                return QuickListConfig::default();
            }
        } else if let Ok(file) = File::open(QUICKLIST_CONFIG_JSON) {
            config_path_show = QUICKLIST_CONFIG_JSON;
            file
        } else if let Ok(file) = File::open(QUICKLIST_CONFIG_TOML) {
            config_path_show = QUICKLIST_CONFIG_TOML;
            file
        } else {
            warn!("Config File: {} Read Fail, Use Default Config.", QUICKLIST_CONFIG_JSON);
            return QuickListConfig::default();
        };

        let mut config_string = String::new();
        if let Err(e) = file.read_to_string(&mut config_string) {
            warn!("Config File: {} Read Fail {e}, Use Default Config.", config_path_show);
            return QuickListConfig::default();
        }
        info!("Config File: {}", config_path_show);
        Self::parse(&config_string).unwrap_or_else(|e| {
            warn!("Config File: {} Read Fail {e}, Use Default Config.", config_path_show);
            QuickListConfig::default()
        })
    }

    /// Parses TOML, falling back to JSON with comments.
    pub fn parse(config_string: &str) -> Result<Self, serde_json::Error> {
        if let Ok(config) = toml::from_str(config_string) {
            return Ok(config);
        }
        let config_string = StripComments::new(config_string.as_bytes());
        serde_json::from_reader(config_string)
    }

    pub fn build(&self) -> QuickList {
        QuickList::new(self.list_max_ziplist_size, self.list_compress_depth)
    }
}
