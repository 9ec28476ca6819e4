// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::ChronoUtc, writer::BoxMakeWriter},
    layer::SubscriberExt,
};

#[derive(Debug, Deserialize, Clone)]
struct LoggerConfig {
    logger: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
enum Output {
    Stdout,
    Stderr,
    File,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "lowercase")]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
enum RotationFreq {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl RotationFreq {
    fn rolling(&self) -> Rotation {
        match self {
            Self::Minutely => Rotation::MINUTELY,
            Self::Hourly => Rotation::HOURLY,
            Self::Daily => Rotation::DAILY,
            Self::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
struct LogFileConfig {
    path: String,
    #[serde(default)]
    rotation_frequency: Option<RotationFreq>,
}

impl LogFileConfig {
    /// Build the rolling appender for this file target. The configured
    /// path must name a file; its directory defaults to the working
    /// directory.
    fn appender(&self) -> Result<RollingFileAppender> {
        let path = Path::new(&self.path);
        let name = path
            .file_name()
            .with_context(|| format!("log path {:?} has no file name", self.path))?;
        let rotation = self
            .rotation_frequency
            .as_ref()
            .map_or(Rotation::NEVER, RotationFreq::rolling);

        Ok(RollingFileAppender::new(
            rotation,
            path.parent().unwrap_or_else(|| Path::new(".")),
            name,
        ))
    }
}

#[derive(Debug, Deserialize, Clone)]
struct LogConfig {
    level: String,
    output: Output,
    #[serde(default)]
    format: LogFormat,
    file: Option<LogFileConfig>,
}

/// Install the global subscriber described by a YAML logger config.
///
/// The returned guard flushes the non-blocking writer; keep it alive for
/// the lifetime of the process.
pub fn init_logger(config_path: &str) -> Result<WorkerGuard> {
    let raw = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read logger config: {config_path}"))?;
    let config: LoggerConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse logger config: {config_path}"))?;

    let (writer, guard) = make_writer(&config.logger)?;

    let env_filter = EnvFilter::try_new(&config.logger.level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .context("failed to parse log level from config or env")?;

    let fmt_layer = match config.logger.format {
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_timer(ChronoUtc::rfc_3339())
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_timer(ChronoUtc::rfc_3339())
            .json()
            .boxed(),
    };

    let subscriber = Registry::default().with(env_filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set global default subscriber")?;

    Ok(guard)
}

fn make_writer(cfg: &LogConfig) -> Result<(BoxMakeWriter, WorkerGuard)> {
    match cfg.output {
        Output::Stdout => Ok(detach(io::stdout())),
        Output::Stderr => Ok(detach(io::stderr())),
        Output::File => {
            let file = cfg
                .file
                .as_ref()
                .context("output=file needs a logger.file section")?;
            Ok(detach(file.appender()?))
        },
    }
}

/// Park any sink behind the non-blocking worker thread; the guard flushes
/// whatever is still buffered when it drops.
fn detach(sink: impl io::Write + Send + 'static) -> (BoxMakeWriter, WorkerGuard) {
    let (writer, guard) = tracing_appender::non_blocking(sink);
    (BoxMakeWriter::new(writer), guard)
}
