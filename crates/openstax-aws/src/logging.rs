//! Log output for deployment runs
//!
//! The default format prints one line per event:
//!
//! ```text
//! [2024-03-05 07:08:09.123] INFO  | Creating stack qa-customized-pages-main
//! [2024-03-05 07:08:09.456] ERROR | Stack qa-customized-pages-main ended in ROLLBACK_COMPLETE
//! ```

use chrono::{DateTime, Local, TimeZone};
use openstax_deploy_config::{LogFormat, LoggingConfig};
use std::fmt::{self, Write as _};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Timestamped, severity-aligned single-line event format
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenstaxFormat;

/// Everything before the message: `[date] LEVEL | `
pub fn line_prefix<Tz: TimeZone>(timestamp: &DateTime<Tz>, level: &Level) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "[{}] {:<5} | ",
        timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        level.as_str()
    )
}

impl<S, N> FormatEvent<S, N> for OpenstaxFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let prefix = line_prefix(&Local::now(), event.metadata().level());
        writer.write_str(&prefix)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// leave the first subscriber in place.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = match config.format {
        LogFormat::Openstax => tracing::subscriber::set_global_default(
            registry.with(
                fmt::layer()
                    .event_format(OpenstaxFormat)
                    .with_writer(std::io::stdout),
            ),
        ),
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_writer(std::io::stdout)),
        ),
        LogFormat::Json => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))
        }
    };
}
