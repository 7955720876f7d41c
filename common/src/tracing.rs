use std::{
    env,
    fmt::{self, Write as _},
    fs::{self, OpenOptions},
    io::{self, IsTerminal},
    path::Path,
    process::ExitCode,
    sync::Mutex,
};

use chrono::Local;
use crossterm::style::Stylize;
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{
    fmt::{
        format::Writer, writer::MakeWriterExt, FmtContext, FormatEvent, FormatFields,
        FormattedFields, Layer,
    },
    prelude::*,
    registry::LookupSpan,
    EnvFilter,
};

use crate::{procedure::ProcedureFailure, Error};

/// Field attached to an INFO event to render it as a success line.
pub const SUCCESS_FIELD: &str = "success";

/// Log a success line, these are rendered green on a terminal.
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        ::tracing::info!(success = true, $($arg)+)
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Label {
    Debug,
    Info,
    Success,
    Warn,
    Fatal,
}

impl Label {
    fn as_str(&self) -> &'static str {
        match self {
            Label::Debug => "DEBUG",
            Label::Info => "INFO",
            Label::Success => "SUCCESS",
            Label::Warn => "WARN",
            Label::Fatal => "FATAL",
        }
    }

    fn write(&self, writer: &mut Writer<'_>, ansi: bool) -> fmt::Result {
        if !ansi {
            return write!(writer, "{}", self.as_str());
        }

        match self {
            Label::Debug => write!(writer, "{}", self.as_str().dark_grey()),
            Label::Info => write!(writer, "{}", self.as_str()),
            Label::Success => write!(writer, "{}", self.as_str().green().bold()),
            Label::Warn => write!(writer, "{}", self.as_str().yellow()),
            Label::Fatal => write!(writer, "{}", self.as_str().red().bold()),
        }
    }
}

#[derive(Default)]
struct ShimVisitor {
    message: String,
    success: bool,
    fields: String,
}

impl Visit for ShimVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == SUCCESS_FIELD {
            self.success = value;
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

/// `[2024-05-01 10:00:00] SUCCESS stage{name=update-system}: message key=value`
pub struct ShimFormat {
    ansi: bool,
}

impl ShimFormat {
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }
}

impl<S, N> FormatEvent<S, N> for ShimFormat
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
        let mut visitor = ShimVisitor::default();
        event.record(&mut visitor);

        let label = match *event.metadata().level() {
            Level::ERROR => Label::Fatal,
            Level::WARN => Label::Warn,
            Level::INFO if visitor.success => Label::Success,
            Level::INFO => Label::Info,
            _ => Label::Debug,
        };

        write!(writer, "[{}] ", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        label.write(&mut writer, self.ansi)?;
        write!(writer, " ")?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        if self.ansi && label == Label::Fatal {
            write!(writer, "{}", visitor.message.as_str().red())?;
        } else if self.ansi && label == Label::Success {
            write!(writer, "{}", visitor.message.as_str().green())?;
        } else {
            write!(writer, "{}", visitor.message)?;
        }

        writeln!(writer, "{}", visitor.fields)
    }
}

/// Initializes tracing for a bootstrap tool.
///
/// Every line goes both to the console and to `log_file`, which is opened once in append mode
/// for the lifetime of the process. Warnings and fatal lines go to stderr, everything else to stdout.
///
/// - `rust_log`: Used to set the RUST_LOG environment variable if it is not provided, e.g. `info`
///   or `info,common::command=debug`
pub fn init_tracing(rust_log: &str, log_file: &Path) -> Result<(), Error> {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", rust_log);
    }

    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| Error::LogFile {
                path: log_file.to_owned(),
                source,
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|source| Error::LogFile {
            path: log_file.to_owned(),
            source,
        })?;

    let ansi = io::stdout().is_terminal();

    let console_layer = Layer::new()
        .event_format(ShimFormat::new(ansi))
        .with_ansi(ansi)
        .with_writer(io::stderr.with_max_level(Level::WARN).or_else(io::stdout))
        .with_filter(EnvFilter::from_default_env());

    let file_layer = Layer::new()
        .event_format(ShimFormat::new(false))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| Error::TracingAlreadyInitialized)
}

/// Record the failure as a fatal line and produce the exit code to terminate with.
pub fn exit_fatal(failure: &ProcedureFailure) -> ExitCode {
    tracing::error!("{failure}");
    tracing::error!("{} aborted, {}", failure.procedure, failure.completed_summary());

    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(ansi: bool, f: impl FnOnce()) -> String {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::registry().with(
            Layer::new()
                .event_format(ShimFormat::new(ansi))
                .with_ansi(ansi)
                .with_writer(buffer.clone()),
        );

        tracing::subscriber::with_default(subscriber, f);

        buffer.contents()
    }

    #[test]
    fn lines_are_timestamped_and_labelled() {
        let output = capture(false, || {
            tracing::info!("Refreshing package index");
            success!("Packages installed");
            tracing::error!("ansible-playbook reported failure");
        });

        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);

        assert!(
            has_timestamp_prefix(lines[0]),
            "line should start with a timestamp: {}",
            lines[0]
        );

        assert!(lines[0].ends_with("] INFO Refreshing package index"));
        assert!(lines[1].ends_with("] SUCCESS Packages installed"));
        assert!(lines[2].ends_with("] FATAL ansible-playbook reported failure"));
    }

    #[test]
    fn stage_span_is_included() {
        let output = capture(false, || {
            let span = tracing::info_span!("stage", name = "run-playbook");
            let _guard = span.enter();
            tracing::info!(attempt = 1, "Running ansible");
        });

        assert!(
            output.contains("INFO stage{name=\"run-playbook\"}: Running ansible attempt=1"),
            "{output}"
        );
    }

    #[test]
    fn colour_only_when_enabled() {
        let plain = capture(false, || success!("done"));
        let coloured = capture(true, || success!("done"));

        assert!(!plain.contains('\u{1b}'));
        assert!(plain.ends_with("] SUCCESS done\n"));
        assert!(coloured.contains("done"));
    }

    #[test]
    fn fatal_exit_is_non_zero_and_logged() {
        let failure = ProcedureFailure {
            procedure: "jumpbox",
            completed: vec!["install-prerequisites".to_string()],
            failed_stage: "configure-locale".to_string(),
            cause: anyhow::anyhow!("locale-gen exited with non-zero exit code 1"),
        };

        let mut code = None;
        let output = capture(false, || code = Some(exit_fatal(&failure)));

        assert_eq!(format!("{code:?}"), format!("{:?}", Some(ExitCode::FAILURE)));
        assert!(output.contains(
            "FATAL jumpbox failed at stage 'configure-locale': locale-gen exited with non-zero exit code 1"
        ));
        assert!(output.contains("FATAL jumpbox aborted, completed stages: install-prerequisites"));
    }

    fn has_timestamp_prefix(line: &str) -> bool {
        let bytes = line.as_bytes();
        bytes.len() > 21
            && bytes[0] == b'['
            && bytes[5] == b'-'
            && bytes[8] == b'-'
            && bytes[11] == b' '
            && bytes[14] == b':'
            && bytes[17] == b':'
            && bytes[20] == b']'
    }
}
