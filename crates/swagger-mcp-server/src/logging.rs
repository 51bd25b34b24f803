//! Structured logging initialization: a config struct driving a
//! `tracing_subscriber::fmt` layer, switchable between plain text and
//! JSON. `logging.file`, when set, is wired to a real `tracing-appender`
//! rolling writer rather than left as console-only.

use tracing_subscriber::EnvFilter;

use swagger_mcp_foundation::Result;

use crate::settings::{LoggingSettings, RotationPolicy};

/// A handle to the file appender's background flush thread. Must be
/// held for the process lifetime — dropping it stops log flushing.
pub struct LoggingGuard(#[allow(dead_code)] Option<tracing_appender::non_blocking::WorkerGuard>);

/// Install a global `tracing` subscriber from `settings`. Returns a
/// guard that must be kept alive for the process's lifetime when file
/// logging is enabled.
pub fn init(settings: &LoggingSettings) -> Result<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.level.as_filter_str()));

    let Some(file) = &settings.file else {
        let builder = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true);
        if settings.json_format {
            builder.json().init();
        } else {
            builder.init();
        }
        return Ok(LoggingGuard(None));
    };

    let directory = file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
    let file_name = file.file_name().and_then(|n| n.to_str()).unwrap_or("swagger-mcp-server.log");

    let rolling = match settings.rotation {
        RotationPolicy::Never => tracing_appender::rolling::never(directory, file_name),
        RotationPolicy::Daily => tracing_appender::rolling::daily(directory, file_name),
        RotationPolicy::Hourly => tracing_appender::rolling::hourly(directory, file_name),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(rolling);

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).with_writer(non_blocking);
    if settings.json_format {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(LoggingGuard(Some(guard)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_select_plain_text_console_only() {
        let settings = LoggingSettings::default();
        assert!(settings.file.is_none());
        assert!(!settings.json_format);
    }
}
