use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::path::PathBuf;

/// 输入行的默认上限（字节，不含换行）
pub const DEFAULT_LINE_MAX: usize = 512;

#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub prompt: String,
    pub theme: String,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub line_max: usize,
}

impl Config {
    fn get_config_dir(home: Option<String>) -> PathBuf {
        match home {
            Some(home) => PathBuf::from(home).join(".config/cshell"),
            None => PathBuf::from("tmp"),
        }
    }

    fn defaults(home: Option<String>) -> Self {
        let config_dir = Self::get_config_dir(home);
        Config {
            name: env!("CARGO_PKG_NAME").to_string(),
            prompt: String::from("cshell$ "),
            theme: String::from("default"),
            history_file: config_dir.join(".cshell_history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
            line_max: DEFAULT_LINE_MAX,
        }
    }

    pub fn new() -> Self {
        // 优先加载 .env 文件
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 按变量名查找配置，便于测试时不改动进程环境
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::defaults(lookup("HOME"));

        if let Some(prompt) = lookup("CSHELL_PROMPT") {
            config.prompt = prompt;
        }
        if let Some(theme) = lookup("CSHELL_THEME") {
            config.theme = theme;
        }
        if let Some(editor) = lookup("CSHELL_EDITOR") {
            config.editor_mode = editor;
        }
        if let Some(history) = lookup("CSHELL_HISTORY") {
            config.history_file = PathBuf::from(history);
        }
        if let Some(level) = lookup("CSHELL_LOG_LEVEL") {
            config.logger_level = level;
        }
        if let Some(dir) = lookup("CSHELL_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }
        if let Some(max) = lookup("CSHELL_LINE_MAX") {
            match max.trim().parse::<usize>() {
                Ok(max) if max > 0 => config.line_max = max,
                _ => log::warn!("忽略无效的 CSHELL_LINE_MAX: {}", max),
            }
        }

        config
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[("HOME", "/home/zako")]);
        assert_eq!(config.name, "cshell");
        assert_eq!(config.prompt, "cshell$ ");
        assert_eq!(config.line_max, DEFAULT_LINE_MAX);
        assert_eq!(
            config.history_file,
            PathBuf::from("/home/zako/.config/cshell/.cshell_history")
        );
        assert_eq!(config.logger_dir, PathBuf::from("/home/zako/.config/cshell/logs"));
        assert_eq!(config.get_edit_mode(), EditMode::Emacs);
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("CSHELL_PROMPT", "> "),
            ("CSHELL_EDITOR", "VI"),
            ("CSHELL_LOG_LEVEL", "debug"),
            ("CSHELL_LINE_MAX", "1024"),
            ("CSHELL_HISTORY", "/tmp/history"),
        ]);
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.get_edit_mode(), EditMode::Vi);
        assert_eq!(config.logger_level, "debug");
        assert_eq!(config.line_max, 1024);
        assert_eq!(config.history_file, PathBuf::from("/tmp/history"));
    }

    #[test]
    fn test_invalid_line_max_is_ignored() {
        assert_eq!(config_with(&[("CSHELL_LINE_MAX", "0")]).line_max, DEFAULT_LINE_MAX);
        assert_eq!(config_with(&[("CSHELL_LINE_MAX", "lots")]).line_max, DEFAULT_LINE_MAX);
    }
}
