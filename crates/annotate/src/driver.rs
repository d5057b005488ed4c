//! One annotation pass over a document subtree.
//!
//! A pass first collects the eligible text nodes and computes their
//! converted text, then splices wrappers in. No node is replaced while the
//! subtree is still being walked.

use std::time::Instant;

use convert::ConversionEngine;
use serde::Serialize;
use tracing::{info, warn, Level};

use crate::config::AnnotateConfig;
use crate::dom::{Document, NodeRef};
use crate::error::{AnnotateError, DomError};
use crate::filter::{TreeFilter, Verdict};
use crate::processed::ProcessedSet;

/// Per-reason counts of text nodes the filter rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub too_short: usize,
    pub detached: usize,
    pub raw_text: usize,
    pub editable: usize,
    pub form_control: usize,
    pub already_processed: usize,
}

impl SkipCounts {
    fn bump(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Eligible => {}
            Verdict::TooShort => self.too_short += 1,
            Verdict::Detached => self.detached += 1,
            Verdict::RawText => self.raw_text += 1,
            Verdict::Editable => self.editable += 1,
            Verdict::FormControl => self.form_control += 1,
            Verdict::AlreadyProcessed => self.already_processed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.too_short
            + self.detached
            + self.raw_text
            + self.editable
            + self.form_control
            + self.already_processed
    }
}

/// Outcome of [`AnnotationDriver::annotate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    /// Text nodes visited.
    pub scanned: usize,
    /// Text nodes that passed the filter and went through the engine.
    pub candidates: usize,
    /// Text nodes replaced by a wrapper.
    pub replaced: usize,
    /// Text nodes already inside a wrapper whose text was rewritten in place.
    pub refreshed: usize,
    /// Splices that failed because the tree changed shape underneath.
    pub failed: usize,
    pub skipped: SkipCounts,
    pub elapsed_micros: u64,
}

/// Walks a subtree, converts eligible text and wraps what changed.
#[derive(Debug)]
pub struct AnnotationDriver {
    engine: ConversionEngine,
    config: AnnotateConfig,
    filter: TreeFilter,
    processed: ProcessedSet,
}

impl Default for AnnotationDriver {
    fn default() -> Self {
        let config = AnnotateConfig::default();
        Self {
            engine: ConversionEngine::default(),
            filter: TreeFilter::new(config.min_text_len),
            config,
            processed: ProcessedSet::new(),
        }
    }
}

impl AnnotationDriver {
    pub fn new(engine: ConversionEngine, config: AnnotateConfig) -> Result<Self, AnnotateError> {
        config.validate()?;
        Ok(Self {
            engine,
            filter: TreeFilter::new(config.min_text_len),
            config,
            processed: ProcessedSet::new(),
        })
    }

    pub fn config(&self) -> &AnnotateConfig {
        &self.config
    }

    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    /// Make `node` eligible again, e.g. after its text was edited.
    pub fn forget(&mut self, node: &NodeRef) -> bool {
        self.processed.remove(node)
    }

    /// Wrapper elements this driver's configuration produces, under `root`.
    pub fn wrappers(&self, root: &NodeRef) -> Vec<NodeRef> {
        root.descendants()
            .into_iter()
            .filter(|node| self.is_wrapper(node))
            .collect()
    }

    fn is_wrapper(&self, node: &NodeRef) -> bool {
        node.tag() == Some(self.config.wrapper_tag.as_str())
            && node.has_class(&self.config.marker_class)
    }

    /// Annotate every eligible text node under `root`.
    pub fn annotate(&mut self, doc: &Document, root: &NodeRef) -> AnnotationReport {
        let start = Instant::now();
        let span = tracing::span!(Level::INFO, "annotate.pass", root = ?root);
        let _guard = span.enter();

        let pruned = self.processed.prune();
        let mut report = AnnotationReport::default();

        let mut pending = Vec::new();
        for node in root.text_descendants() {
            report.scanned += 1;
            let verdict = self.filter.evaluate(&node, &self.processed);
            if !verdict.is_eligible() {
                report.skipped.bump(verdict);
                continue;
            }
            report.candidates += 1;

            let Some(text) = node.text() else {
                continue;
            };
            let converted = self.engine.convert(&text);
            if converted == text {
                self.processed.insert(&node);
            } else {
                pending.push((node, converted));
            }
        }

        for (node, converted) in pending {
            // an edited wrapper keeps its element; only its text changes
            if node.parent().is_some_and(|parent| self.is_wrapper(&parent)) {
                match doc.set_text(&node, &converted) {
                    Ok(()) => {
                        self.processed.insert(&node);
                        report.refreshed += 1;
                    }
                    Err(err) => {
                        warn!(error = %err, node = ?node, "annotate_refresh_failure");
                        report.failed += 1;
                    }
                }
                continue;
            }

            match self.splice(doc, &node, &converted) {
                Ok(wrapper_text) => {
                    self.processed.insert(&wrapper_text);
                    report.replaced += 1;
                }
                Err(err) => {
                    warn!(error = %err, node = ?node, "annotate_splice_failure");
                    report.failed += 1;
                }
            }
        }

        let elapsed_micros = start.elapsed().as_micros() as u64;
        report.elapsed_micros = elapsed_micros;
        info!(
            scanned = report.scanned,
            candidates = report.candidates,
            replaced = report.replaced,
            refreshed = report.refreshed,
            failed = report.failed,
            skipped = report.skipped.total(),
            pruned,
            elapsed_micros,
            "annotate_pass"
        );
        report
    }

    /// Replace `node` with `<wrapper class=marker>converted</wrapper>` and
    /// return the wrapper's text node.
    fn splice(&self, doc: &Document, node: &NodeRef, converted: &str) -> Result<NodeRef, DomError> {
        let parent = node.parent().ok_or(DomError::NotAChild)?;
        let wrapper = doc.create_element(&self.config.wrapper_tag);
        doc.set_attribute(&wrapper, "class", &self.config.marker_class)?;
        let text = doc.append_text(&wrapper, converted)?;
        doc.replace_child(&parent, &wrapper, node)?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(doc: &Document, text: &str) -> NodeRef {
        let p = doc.append_element(&doc.body(), "p").unwrap();
        doc.append_text(&p, text).unwrap();
        p
    }

    #[test]
    fn wraps_converted_text_and_skips_scripts() {
        let doc = Document::new();
        let script = doc.append_element(&doc.body(), "script").unwrap();
        doc.append_text(&script, "5 miles").unwrap();
        let p = paragraph(&doc, "Walk 5 miles.");

        let mut driver = AnnotationDriver::default();
        let report = driver.annotate(&doc, &doc.body());

        assert_eq!(report.scanned, 2);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.replaced, 1);
        assert_eq!(report.skipped.raw_text, 1);

        let wrappers = driver.wrappers(&doc.body());
        assert_eq!(wrappers.len(), 1);
        assert_eq!(wrappers[0].parent(), Some(p));
        assert_eq!(wrappers[0].text_content(), "Walk 5 miles (8.05 km).");
        assert_eq!(script.text_content(), "5 miles");
        assert_eq!(
            doc.to_html(),
            "<body><script>5 miles</script>\
             <p><span class=\"uconv\">Walk 5 miles (8.05 km).</span></p></body>"
        );
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let doc = Document::new();
        paragraph(&doc, "Walk 5 miles.");
        paragraph(&doc, "Nothing to see here.");

        let mut driver = AnnotationDriver::default();
        let first = driver.annotate(&doc, &doc.body());
        assert_eq!(first.replaced, 1);
        let html = doc.to_html();

        let second = driver.annotate(&doc, &doc.body());
        assert_eq!(second.replaced, 0);
        assert_eq!(second.candidates, 0);
        assert_eq!(second.skipped.already_processed, 2);
        assert_eq!(doc.to_html(), html);
        assert_eq!(driver.wrappers(&doc.body()).len(), 1);
    }

    #[test]
    fn each_text_node_gets_its_own_wrapper() {
        let doc = Document::new();
        let table = doc.append_element(&doc.body(), "table").unwrap();
        let row = doc.append_element(&table, "tr").unwrap();
        for text in ["5 miles", "10 pounds"] {
            let cell = doc.append_element(&row, "td").unwrap();
            doc.append_text(&cell, text).unwrap();
        }
        let ul = doc.append_element(&doc.body(), "ul").unwrap();
        for text in ["6 feet", "65 mph", "72°F"] {
            let li = doc.append_element(&ul, "li").unwrap();
            doc.append_text(&li, text).unwrap();
        }

        let mut driver = AnnotationDriver::default();
        let report = driver.annotate(&doc, &doc.body());
        assert_eq!(report.replaced, 5);
        assert_eq!(driver.wrappers(&table).len(), 2);
        assert_eq!(driver.wrappers(&ul).len(), 3);
        assert!(ul.text_content().contains("72°F (22.2 °C)"));
    }

    #[test]
    fn short_cells_are_left_alone() {
        let doc = Document::new();
        let td = doc.append_element(&doc.body(), "td").unwrap();
        doc.append_text(&td, "9\"").unwrap();
        doc.append_element(&td, "br").unwrap();
        doc.append_text(&td, "1/16").unwrap();

        let mut driver = AnnotationDriver::default();
        let report = driver.annotate(&doc, &doc.body());
        assert_eq!(report.replaced, 0);
        assert_eq!(report.skipped.too_short, 1);
        assert!(driver.wrappers(&doc.body()).is_empty());
    }

    #[test]
    fn custom_wrapper_and_class() {
        let doc = Document::new();
        paragraph(&doc, "Carry 2 lbs");
        let config = AnnotateConfig {
            wrapper_tag: "mark".into(),
            marker_class: "metric".into(),
            ..AnnotateConfig::default()
        };
        let mut driver = AnnotationDriver::new(ConversionEngine::default(), config).unwrap();
        driver.annotate(&doc, &doc.body());
        assert_eq!(
            doc.to_html(),
            "<body><p><mark class=\"metric\">Carry 2 lbs (0.91 kg)</mark></p></body>"
        );
    }

    #[test]
    fn forgotten_nodes_are_scanned_again() {
        let doc = Document::new();
        let p = paragraph(&doc, "Nothing yet");
        let mut driver = AnnotationDriver::default();
        driver.annotate(&doc, &doc.body());

        let text = p.first_child().unwrap();
        assert!(driver.processed().contains(&text));
        doc.set_text(&text, "Now 3 miles").unwrap();
        assert!(driver.forget(&text));

        let report = driver.annotate(&doc, &doc.body());
        assert_eq!(report.replaced, 1);
        assert_eq!(p.text_content(), "Now 3 miles (4.83 km)");
    }

    #[test]
    fn text_inside_a_wrapper_is_rewritten_in_place() {
        let doc = Document::new();
        let p = paragraph(&doc, "Walk 5 miles.");
        let mut driver = AnnotationDriver::default();
        driver.annotate(&doc, &doc.body());

        let wrapper = driver.wrappers(&doc.body())[0].clone();
        let text = wrapper.first_child().unwrap();
        doc.set_text(&text, "Walk 5 miles (8.05 km). Then 3 miles.").unwrap();
        driver.forget(&text);

        let report = driver.annotate(&doc, &doc.body());
        assert_eq!(report.replaced, 0);
        assert_eq!(report.refreshed, 1);
        assert_eq!(driver.wrappers(&doc.body()), vec![wrapper.clone()]);
        assert_eq!(wrapper.first_child(), Some(text.clone()));
        assert!(driver.processed().contains(&text));
        assert_eq!(
            p.outer_html(),
            "<p><span class=\"uconv\">Walk 5 miles (8.05 km). Then 3 miles (4.83 km).</span></p>"
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AnnotateConfig {
            min_text_len: 0,
            ..AnnotateConfig::default()
        };
        assert!(matches!(
            AnnotationDriver::new(ConversionEngine::default(), config),
            Err(AnnotateError::InvalidConfig(_))
        ));
    }
}
