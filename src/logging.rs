//! Logger configuration for pipeline jobs.
//!
//! A [`LogChannel`] is a named tracing target with a severity threshold and
//! a set of output sinks. [`configure_logger`] sets the threshold from a
//! verbosity count (or an explicit level) and makes sure the channel writes
//! formatted lines to stderr.

use std::fmt;
use std::io;

use tracing::level_filters::LevelFilter;
use tracing::{debug, Event, Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::error::{JobspecError, Result};

/// Severity of tracing levels on the numeric scale.
const LEVEL_SEVERITIES: [(Level, u32); 5] = [
    (Level::TRACE, 5),
    (Level::DEBUG, 10),
    (Level::INFO, 20),
    (Level::WARN, 30),
    (Level::ERROR, 40),
];

/// A numeric severity threshold.
///
/// Uses the conventional five tier scale where a higher number means a more
/// important message and `NOTSET` lets everything through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Severity(u32);

impl Severity {
    /// Most permissive threshold.
    pub const NOTSET: Self = Self(0);
    /// Debug messages and above.
    pub const DEBUG: Self = Self(10);
    /// Informational messages and above.
    pub const INFO: Self = Self(20);
    /// Warnings and above.
    pub const WARNING: Self = Self(30);
    /// Errors and above.
    pub const ERROR: Self = Self(40);
    /// Critical messages only.
    pub const CRITICAL: Self = Self(50);

    /// Amount the threshold drops per verbosity step.
    const STEP: u32 = 10;

    /// Creates a severity from its numeric value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Threshold for a verbosity: `max(WARNING - 10 * verbosity, NOTSET)`.
    ///
    /// Negative verbosity quiets the channel (-1 = ERROR, -2 = CRITICAL).
    pub fn from_verbosity(verbosity: i32) -> Self {
        let value =
            i64::from(Self::WARNING.0) - i64::from(verbosity) * i64::from(Self::STEP);
        Self(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
    }

    /// Resolves the effective threshold. An explicit level always wins.
    pub fn resolve(verbosity: i32, level: Option<Severity>) -> Self {
        level.unwrap_or_else(|| Self::from_verbosity(verbosity))
    }

    /// Returns the most verbose tracing filter admitting only events at or
    /// above this threshold.
    pub fn level_filter(self) -> LevelFilter {
        LEVEL_SEVERITIES
            .iter()
            .find(|(_, severity)| *severity >= self.0)
            .map(|(level, _)| LevelFilter::from_level(*level))
            .unwrap_or(LevelFilter::OFF)
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        LEVEL_SEVERITIES
            .iter()
            .find(|(candidate, _)| *candidate == level)
            .map(|(_, severity)| Self(*severity))
            .unwrap_or(Self::NOTSET)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "NOTSET"),
            10 => write!(f, "DEBUG"),
            20 => write!(f, "INFO"),
            30 => write!(f, "WARNING"),
            40 => write!(f, "ERROR"),
            50 => write!(f, "CRITICAL"),
            other => write!(f, "Level {other}"),
        }
    }
}

/// Where a channel writes its formatted lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    /// Standard error.
    Stderr,
    /// Standard output.
    Stdout,
}

impl Sink {
    fn layer<S>(self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    {
        let layer = tracing_subscriber::fmt::layer().event_format(PipelineFormat);
        match self {
            Sink::Stderr => layer.with_writer(io::stderr).boxed(),
            Sink::Stdout => layer.with_writer(io::stdout).boxed(),
        }
    }
}

/// Line format: `<timestamp> - <LEVEL> - <module>:<line> - <message>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineFormat;

impl<S, N> FormatEvent<S, N> for PipelineFormat
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
        let meta = event.metadata();
        SystemTime.format_time(&mut writer)?;
        write!(
            writer,
            " - {} - {}:{} - ",
            level_name(meta.level()),
            meta.module_path().unwrap_or_else(|| meta.target()),
            meta.line().unwrap_or_default()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_name(level: &Level) -> &'static str {
    if *level == Level::WARN {
        "WARNING"
    } else {
        level.as_str()
    }
}

/// A named logging channel.
///
/// The name is a tracing target prefix: events from that target and its
/// child modules are routed to the channel's sinks.
#[derive(Debug, Clone)]
pub struct LogChannel {
    target: String,
    threshold: Option<Severity>,
    sinks: Vec<Sink>,
}

impl LogChannel {
    /// Creates an unconfigured channel with no sinks and no threshold.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            threshold: None,
            sinks: Vec::new(),
        }
    }

    /// Returns the channel's target name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the explicitly configured threshold, if any.
    pub fn threshold(&self) -> Option<Severity> {
        self.threshold
    }

    /// Threshold in effect; an unset threshold behaves as `WARNING`.
    pub fn effective_threshold(&self) -> Severity {
        self.threshold.unwrap_or(Severity::WARNING)
    }

    /// Sets the threshold.
    pub fn set_threshold(&mut self, threshold: Severity) {
        self.threshold = Some(threshold);
    }

    /// Returns the attached sinks.
    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    /// Attaches one more sink, even if an identical one is already attached.
    pub fn add_sink(&mut self, sink: Sink) {
        self.sinks.push(sink);
    }

    /// Target filter admitting this channel's events at its threshold.
    pub fn filter(&self) -> Targets {
        Targets::new().with_target(
            self.target.clone(),
            self.effective_threshold().level_filter(),
        )
    }

    /// Builds a layer writing this channel's events to each of its sinks.
    pub fn layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    {
        let sinks: Vec<Box<dyn Layer<S> + Send + Sync + 'static>> =
            self.sinks.iter().map(|sink| sink.layer()).collect();
        sinks.with_filter(self.filter()).boxed()
    }

    /// Installs this channel as the global subscriber.
    ///
    /// Fails if a global subscriber has already been set.
    pub fn init(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(self.layer::<Registry>())
            .try_init()
            .map_err(|e| JobspecError::Logging(e.to_string()))
    }
}

/// Configures a channel with a threshold and a stderr sink.
///
/// The threshold is `level` when given, otherwise derived from `verbosity`
/// (-1 = ERROR, 0 = WARNING, 1 = INFO, 2 = DEBUG, 3 or more = NOTSET). Repeated calls
/// update the threshold but attach the stderr sink only once; use
/// [`LogChannel::add_sink`] to attach further sinks deliberately.
pub fn configure_logger(channel: &mut LogChannel, verbosity: i32, level: Option<Severity>) {
    let threshold = Severity::resolve(verbosity, level);
    channel.set_threshold(threshold);

    if !channel.sinks.contains(&Sink::Stderr) {
        channel.add_sink(Sink::Stderr);
    }

    debug!(
        channel = %channel.target,
        threshold = %threshold,
        sinks = channel.sinks.len(),
        "Configured log channel"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn channel() -> LogChannel {
        LogChannel::new("jobspec_tools_test")
    }

    #[test]
    fn configure_logger_with_defaults() {
        let mut channel = channel();
        assert_eq!(channel.threshold(), None);
        assert!(channel.sinks().is_empty());

        configure_logger(&mut channel, 0, None);

        assert_eq!(channel.threshold(), Some(Severity::WARNING));
        assert_eq!(channel.sinks(), &[Sink::Stderr]);
    }

    #[test]
    fn configure_logger_verbosity() {
        let cases = [
            (0, Severity::WARNING),
            (1, Severity::INFO),
            (2, Severity::DEBUG),
            (3, Severity::NOTSET),
            (8, Severity::NOTSET),
            (-1, Severity::ERROR),
            (-2, Severity::CRITICAL),
            (-3, Severity::new(60)),
        ];
        for (verbosity, expected) in cases {
            let mut channel = channel();
            configure_logger(&mut channel, verbosity, None);
            assert_eq!(channel.threshold(), Some(expected), "verbosity {verbosity}");
            assert_eq!(channel.sinks().len(), 1);
        }
    }

    #[test]
    fn configure_logger_level() {
        for level in [
            Severity::WARNING,
            Severity::INFO,
            Severity::DEBUG,
            Severity::NOTSET,
        ] {
            let mut channel = channel();
            configure_logger(&mut channel, 0, Some(level));
            assert_eq!(channel.threshold(), Some(level));
            assert_eq!(channel.sinks().len(), 1);
        }
    }

    #[test]
    fn configure_logger_level_overrides_verbosity() {
        for level in [
            Severity::WARNING,
            Severity::INFO,
            Severity::DEBUG,
            Severity::NOTSET,
        ] {
            let mut channel = channel();
            // verbosity 42 alone would mean NOTSET
            configure_logger(&mut channel, 42, Some(level));
            assert_eq!(channel.threshold(), Some(level));
        }
    }

    #[test]
    fn configure_logger_twice_keeps_one_stderr_sink() {
        let mut channel = channel();
        configure_logger(&mut channel, 0, None);
        configure_logger(&mut channel, 2, None);

        assert_eq!(channel.threshold(), Some(Severity::DEBUG));
        assert_eq!(channel.sinks(), &[Sink::Stderr]);
    }

    #[test]
    fn add_sink_always_adds_one() {
        let mut channel = channel();
        channel.add_sink(Sink::Stderr);
        channel.add_sink(Sink::Stderr);
        assert_eq!(channel.sinks().len(), 2);
    }

    #[test]
    fn layer_builds_for_every_sink() {
        let mut channel = LogChannel::new("jobspec_tools_layer_test");
        configure_logger(&mut channel, 0, None);
        channel.add_sink(Sink::Stdout);
        assert_eq!(channel.sinks(), &[Sink::Stderr, Sink::Stdout]);

        let subscriber = tracing_subscriber::registry().with(channel.layer::<Registry>());
        tracing::subscriber::with_default(subscriber, || {
            // below the WARNING threshold, so neither sink writes anything
            tracing::info!(target: "jobspec_tools_layer_test", "filtered out");
        });
    }

    #[test]
    fn unset_threshold_behaves_as_warning() {
        assert_eq!(channel().effective_threshold(), Severity::WARNING);
    }

    #[test]
    fn level_filter_mapping() {
        assert_eq!(Severity::NOTSET.level_filter(), LevelFilter::TRACE);
        assert_eq!(Severity::DEBUG.level_filter(), LevelFilter::DEBUG);
        assert_eq!(Severity::new(15).level_filter(), LevelFilter::INFO);
        assert_eq!(Severity::INFO.level_filter(), LevelFilter::INFO);
        assert_eq!(Severity::WARNING.level_filter(), LevelFilter::WARN);
        assert_eq!(Severity::ERROR.level_filter(), LevelFilter::ERROR);
        assert_eq!(Severity::CRITICAL.level_filter(), LevelFilter::OFF);
    }

    #[test]
    fn filter_is_scoped_to_channel_target() {
        let mut channel = channel();
        configure_logger(&mut channel, 1, None);
        let filter = channel.filter();

        assert!(filter.would_enable("jobspec_tools_test", &Level::INFO));
        assert!(filter.would_enable("jobspec_tools_test::inner", &Level::WARN));
        assert!(!filter.would_enable("jobspec_tools_test", &Level::DEBUG));
        assert!(!filter.would_enable("some_other_crate", &Level::ERROR));
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::WARNING.to_string(), "WARNING");
        assert_eq!(Severity::NOTSET.to_string(), "NOTSET");
        assert_eq!(Severity::new(25).to_string(), "Level 25");
        assert_eq!(Severity::from(Level::WARN), Severity::WARNING);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn pipeline_format_line_shape() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(PipelineFormat)
                .with_writer(move || writer.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("disk nearly full");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains(" - WARNING - jobspec_tools::logging::tests:"));
        assert!(output.trim_end().ends_with(" - disk nearly full"));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn verbosity_past_two_is_notset(verbosity in 3i32..10_000) {
                prop_assert_eq!(Severity::from_verbosity(verbosity), Severity::NOTSET);
            }

            #[test]
            fn explicit_level_always_wins(verbosity in any::<i32>(), level in 0u32..=50) {
                let level = Severity::new(level);
                prop_assert_eq!(Severity::resolve(verbosity, Some(level)), level);
            }

            #[test]
            fn verbosity_never_raises_threshold(verbosity in -10_000i32..10_000) {
                prop_assert!(
                    Severity::from_verbosity(verbosity + 1) <= Severity::from_verbosity(verbosity)
                );
            }
        }
    }
}
