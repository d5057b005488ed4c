//! Workspace umbrella crate for metricate.
//!
//! This crate stitches together the text conversion engine and the document
//! annotation driver so callers can configure both from one
//! [`MetricateConfig`] and run them through a single API entry point.

pub mod config;

pub use annotate::{
    AnnotateConfig, AnnotateError, AnnotationDriver, AnnotationReport, Debouncer, Document,
    DomError, MutationKind, MutationRecord, MutationWatcher, NodeRef, ProcessedSet, SkipCounts,
    TreeFilter, Verdict,
};
pub use config::{ConfigLoadError, MetricateConfig};
pub use convert::{
    Annotation, Conversion, ConversionEngine, ConvertConfig, ConvertError, MagnitudeError,
    NumberFormat, UnitFamily, UnitMatch, UnitPatternSet, convert_text,
};

use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

/// Errors that can occur while running text or documents through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Convert(ConvertError),
    Annotate(AnnotateError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Convert(err) => write!(f, "conversion failure: {err}"),
            PipelineError::Annotate(err) => write!(f, "annotation failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Convert(err) => Some(err),
            PipelineError::Annotate(err) => Some(err),
        }
    }
}

impl From<ConvertError> for PipelineError {
    fn from(value: ConvertError) -> Self {
        PipelineError::Convert(value)
    }
}

impl From<AnnotateError> for PipelineError {
    fn from(value: AnnotateError) -> Self {
        PipelineError::Annotate(value)
    }
}

/// Metrics observer for pipeline stages.
///
/// `record_convert` receives the number of measurements annotated in the
/// text; `record_annotate` receives the number of text nodes replaced.
pub trait PipelineMetrics: Send + Sync {
    fn record_convert(&self, latency: Duration, result: Result<usize, ConvertError>);
    fn record_annotate(&self, latency: Duration, result: Result<usize, PipelineError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_convert(self, result: Result<usize, ConvertError>) {
        self.recorder.record_convert(self.start.elapsed(), result);
    }

    fn record_annotate(self, result: Result<usize, PipelineError>) {
        self.recorder.record_annotate(self.start.elapsed(), result);
    }
}

/// Convert `text` with an explicit engine configuration.
///
/// Returns the annotated text; an invalid configuration produces
/// `PipelineError::Convert` and the text is not touched.
pub fn convert_text_with(text: &str, config: &ConvertConfig) -> Result<String, PipelineError> {
    let span = MetricsSpan::start();
    let engine = match ConversionEngine::new(config.clone()) {
        Ok(engine) => engine,
        Err(err) => {
            warn!(error = %err, locale = %config.locale, "convert_config_rejected");
            if let Some(span) = span {
                span.record_convert(Err(err.clone()));
            }
            return Err(err.into());
        }
    };

    let conversion = engine.convert_detailed(text);
    if let Some(span) = span {
        span.record_convert(Ok(conversion.annotations.len()));
    }
    Ok(conversion.text)
}

/// Build an annotation driver from both configuration sections.
pub fn build_driver(config: &MetricateConfig) -> Result<AnnotationDriver, PipelineError> {
    let engine = ConversionEngine::new(config.convert.clone())?;
    let driver = AnnotationDriver::new(engine, config.annotate.clone())?;
    Ok(driver)
}

/// Run a single annotation pass over `root` with a fresh driver.
///
/// The driver and its processed set are dropped on return, so a second call
/// rescans every text node and relies on the engine's existing-conversion
/// guard to leave annotated text alone. Keep a driver from [`build_driver`],
/// or use [`watch_document`], to skip already handled nodes across passes.
pub fn annotate_document(
    doc: &Document,
    root: &NodeRef,
    config: &MetricateConfig,
) -> Result<AnnotationReport, PipelineError> {
    let span = MetricsSpan::start();
    let mut driver = match build_driver(config) {
        Ok(driver) => driver,
        Err(err) => {
            warn!(error = %err, "annotate_config_rejected");
            if let Some(span) = span {
                span.record_annotate(Err(err.clone()));
            }
            return Err(err);
        }
    };

    let report = driver.annotate(doc, root);
    if let Some(span) = span {
        span.record_annotate(Ok(report.replaced));
    }
    Ok(report)
}

/// Annotate `root` and keep watching `doc` for later insertions and edits.
///
/// The returned watcher must be pumped by the caller; see
/// [`MutationWatcher::pump`].
pub fn watch_document(
    doc: &Document,
    root: NodeRef,
    config: &MetricateConfig,
) -> Result<(MutationWatcher, AnnotationReport), PipelineError> {
    let driver = build_driver(config)?;
    Ok(MutationWatcher::attach(doc, root, driver))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> (Document, NodeRef) {
        let doc = Document::new();
        let p = doc.append_element(&doc.body(), "p").unwrap();
        doc.append_text(&p, "The trail is 5 miles long.").unwrap();
        (doc, p)
    }

    #[test]
    fn convert_text_with_uses_locale() {
        let config = ConvertConfig::for_locale("de-DE");
        let out = convert_text_with("Still 1000 miles to go", &config).unwrap();
        assert_eq!(out, "Still 1000 miles (1.609,34 km) to go");
    }

    #[test]
    fn convert_text_with_rejects_invalid_config() {
        let config = ConvertConfig::for_locale("");
        let err = convert_text_with("5 miles", &config).unwrap_err();
        assert!(matches!(err, PipelineError::Convert(ConvertError::InvalidConfig(_))));
        assert!(err.to_string().starts_with("conversion failure"));
        assert!(err.source().is_some());
    }

    #[test]
    fn annotate_document_wraps_text() {
        let (doc, p) = sample_document();
        let report = annotate_document(&doc, &doc.body(), &MetricateConfig::default()).unwrap();
        assert_eq!(report.replaced, 1);
        assert_eq!(p.text_content(), "The trail is 5 miles (8.05 km) long.");
    }

    #[test]
    fn annotate_document_applies_both_sections() {
        let (doc, _) = sample_document();
        let config = MetricateConfig::from_yaml(
            r#"
convert:
  locale: "fr"
annotate:
  wrapper_tag: "mark"
  marker_class: "metric"
"#,
        )
        .unwrap();
        annotate_document(&doc, &doc.body(), &config).unwrap();
        assert_eq!(
            doc.to_html(),
            "<body><p><mark class=\"metric\">The trail is 5 miles (8,05 km) long.</mark></p></body>"
        );
    }

    #[test]
    fn kept_driver_skips_handled_nodes_across_passes() {
        let (doc, _) = sample_document();
        let config = MetricateConfig::default();

        let mut driver = build_driver(&config).unwrap();
        assert_eq!(driver.annotate(&doc, &doc.body()).replaced, 1);
        let second = driver.annotate(&doc, &doc.body());
        assert_eq!(second.candidates, 0);
        assert_eq!(second.skipped.already_processed, 1);

        // a fresh driver per call rescans, and the guard keeps the text stable
        let html = doc.to_html();
        let fresh = annotate_document(&doc, &doc.body(), &config).unwrap();
        assert_eq!(fresh.candidates, 1);
        assert_eq!(fresh.replaced, 0);
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn build_driver_rejects_invalid_annotate_section() {
        let mut config = MetricateConfig::default();
        config.annotate.marker_class = "two words".into();
        assert!(matches!(
            build_driver(&config),
            Err(PipelineError::Annotate(AnnotateError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn watch_document_runs_initial_pass() {
        let (doc, p) = sample_document();
        let (watcher, report) = watch_document(&doc, doc.body(), &MetricateConfig::default()).unwrap();
        assert_eq!(report.replaced, 1);
        assert!(doc.is_observed());
        assert!(!watcher.is_pending());
        assert_eq!(p.text_content(), "The trail is 5 miles (8.05 km) long.");
    }

    #[derive(Default)]
    struct CountingMetrics {
        events: Arc<RwLock<Vec<&'static str>>>,
    }

    impl CountingMetrics {
        fn new() -> Self {
            Self {
                events: Arc::new(RwLock::new(Vec::new())),
            }
        }

        fn snapshot(&self) -> Vec<&'static str> {
            self.events.read().unwrap().clone()
        }
    }

    impl PipelineMetrics for CountingMetrics {
        fn record_convert(&self, _latency: Duration, result: Result<usize, ConvertError>) {
            let label = match result {
                Ok(0) => "convert_unchanged",
                Ok(_) => "convert_ok",
                Err(_) => "convert_err",
            };
            self.events.write().unwrap().push(label);
        }

        fn record_annotate(&self, _latency: Duration, result: Result<usize, PipelineError>) {
            let label = if result.is_ok() {
                "annotate_ok"
            } else {
                "annotate_err"
            };
            self.events.write().unwrap().push(label);
        }
    }

    #[test]
    fn metrics_recorder_tracks_pipeline_outcome() {
        let metrics = Arc::new(CountingMetrics::new());
        set_pipeline_metrics(Some(metrics.clone()));

        convert_text_with("Walk 5 miles", &ConvertConfig::default()).unwrap();
        convert_text_with("Walk 5 miles", &ConvertConfig::for_locale("en US")).unwrap_err();
        let (doc, _) = sample_document();
        annotate_document(&doc, &doc.body(), &MetricateConfig::default()).unwrap();

        let events = metrics.snapshot();
        assert!(events.contains(&"convert_ok"));
        assert!(events.contains(&"convert_err"));
        assert!(events.contains(&"annotate_ok"));

        set_pipeline_metrics(None);
    }
}
