//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `WALKDESK__*` 覆盖（双下划线表示嵌套，
//! 如 `WALKDESK__SESSION__TTL_SECS=15`）。密钥（bot token、GPG 口令、Sheets
//! 令牌）只走普通环境变量，不进 TOML。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub roster: RosterSection,
    #[serde(default)]
    pub sheet: SheetSection,
}

/// [telegram] 段：单条消息长度上限（超出按行切分）
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSection {
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

fn default_max_message_len() -> usize {
    4000
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
        }
    }
}

/// [session] 段：待选菜单的存活秒数
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    30
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// [roster] 段：加密花名册路径
#[derive(Debug, Clone, Deserialize)]
pub struct RosterSection {
    #[serde(default = "default_encrypted_path")]
    pub encrypted_path: PathBuf,
}

fn default_encrypted_path() -> PathBuf {
    PathBuf::from("encrypted_data.json.gpg")
}

impl Default for RosterSection {
    fn default() -> Self {
        Self {
            encrypted_path: default_encrypted_path(),
        }
    }
}

/// [sheet] 段：在线表格定位与取件列名
#[derive(Debug, Clone, Deserialize)]
pub struct SheetSection {
    /// 必填，留空则启动报错
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    #[serde(default = "default_pickup_column")]
    pub pickup_column: String,
}

fn default_worksheet() -> String {
    "Sheet1".to_string()
}

fn default_pickup_column() -> String {
    "Pickup".to_string()
}

impl Default for SheetSection {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            worksheet: default_worksheet(),
            pickup_column: default_pickup_column(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramSection::default(),
            session: SessionSection::default(),
            roster: RosterSection::default(),
            sheet: SheetSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 WALKDESK__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 WALKDESK__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WALKDESK")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.telegram.max_message_len, 4000);
        assert_eq!(cfg.session.ttl_secs, 30);
        assert_eq!(cfg.sheet.worksheet, "Sheet1");
        assert_eq!(cfg.sheet.pickup_column, "Pickup");
        assert!(cfg.sheet.spreadsheet_id.is_empty());
    }

    #[test]
    fn test_extra_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        std::fs::write(&path, "[session]\nttl_secs = 7\n").unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.session.ttl_secs, 7);
        // 未覆盖的段保持默认
        assert_eq!(cfg.telegram.max_message_len, 4000);
    }
}
