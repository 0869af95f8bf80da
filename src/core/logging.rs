//! 日志初始化
//!
//! 根据 [`LoggingConfig`] 安装 `tracing` 订阅器。
//! `RUST_LOG` 环境变量优先于配置中的日志级别。

use crate::config::{ConfigError, ConfigResult, LogLevel, LoggingConfig};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

impl LogLevel {
    /// 转换为 `EnvFilter` 指令
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()))
}

/// 初始化日志系统
///
/// 返回是否安装了新的全局订阅器；如果已经有订阅器（例如测试中重复调用），
/// 返回 `Ok(false)`。
///
/// # 错误
///
/// 启用文件输出但日志文件无法打开时返回 [`ConfigError::FileError`]。
pub fn init_logging(config: &LoggingConfig) -> ConfigResult<bool> {
    if config.log_to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file_path)
            .map_err(ConfigError::FileError)?;

        let installed = tracing_subscriber::fmt()
            .with_env_filter(build_filter(config))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .is_ok();
        return Ok(installed);
    }

    if !config.log_to_console {
        return Ok(false);
    }

    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(target: "particles", "Logging initialized at {:?}", config.level);
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
        assert_eq!(LogLevel::Trace.as_directive(), "trace");
    }

    #[test]
    fn test_disabled_logging_installs_nothing() {
        let config = LoggingConfig {
            log_to_console: false,
            log_to_file: false,
            ..LoggingConfig::default()
        };
        assert!(!init_logging(&config).unwrap());
    }

    #[test]
    fn test_unopenable_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_to_file: true,
            // 目录本身无法作为文件打开
            log_file_path: dir.path().to_string_lossy().into_owned(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(ConfigError::FileError(_))));
    }
}
