use crate::notify::APP_NAME;
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Map `-v` occurrences to a level: none → WARN, one → INFO, more → DEBUG.
pub fn level_for_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Filter for the given verbosity. `RUST_LOG`, when set, wins.
pub fn filter_for_verbosity(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_for_verbosity(verbose).as_str().to_lowercase();
        // zbus is chatty at debug level
        EnvFilter::new(format!("{level},zbus=warn"))
    })
}

/// `tasknotify: LEVEL: message`, one line per event. Cron mail and the
/// journal show stderr without context, so the program name leads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramPrefix;

impl<S, N> FormatEvent<S, N> for ProgramPrefix
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{}: {}: ", APP_NAME, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init(verbose: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for_verbosity(verbose))
        .with_writer(std::io::stderr)
        .event_format(ProgramPrefix)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), Level::WARN);
        assert_eq!(level_for_verbosity(1), Level::INFO);
        assert_eq!(level_for_verbosity(2), Level::DEBUG);
        assert_eq!(level_for_verbosity(5), Level::DEBUG);
    }

    #[test]
    fn test_lines_carry_program_prefix() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .event_format(ProgramPrefix)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("unable to find environment variables");
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            output,
            "tasknotify: WARN: unable to find environment variables\n"
        );
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(0);
        init(2);
    }
}
