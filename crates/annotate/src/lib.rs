//! Annotation of document trees with metric equivalents.
//!
//! `annotate` applies the [`convert`] engine to the text nodes of a document,
//! replacing every text node whose content changes with a wrapper element
//! (by default `<span class="uconv">`) that carries the annotated text.
//!
//! ```
//! use annotate::{AnnotationDriver, Document};
//!
//! let doc = Document::new();
//! let script = doc.append_element(&doc.body(), "script").unwrap();
//! doc.append_text(&script, "5 miles").unwrap();
//! let p = doc.append_element(&doc.body(), "p").unwrap();
//! doc.append_text(&p, "Walk 5 miles.").unwrap();
//!
//! let mut driver = AnnotationDriver::default();
//! let report = driver.annotate(&doc, &doc.body());
//! assert_eq!(report.replaced, 1);
//! assert_eq!(p.text_content(), "Walk 5 miles (8.05 km).");
//! ```
//!
//! # Components
//!
//! - [`Document`] / [`NodeRef`]: the mutable tree and its mutation records.
//! - [`TreeFilter`]: skips code, form controls, editable regions and short
//!   or already processed text.
//! - [`ProcessedSet`]: weak, identity-keyed memory of handled text nodes;
//!   it is what makes a second pass over the same tree a no-op.
//! - [`AnnotationDriver`]: collect, convert, then splice.
//! - [`MutationWatcher`]: debounced rescans after child-list and
//!   character-data changes.
//!
//! Everything here is `Rc`-based and single-threaded.

mod config;
mod dom;
mod driver;
mod error;
mod filter;
mod processed;
mod watcher;

pub use config::AnnotateConfig;
pub use dom::{Ancestors, Document, MutationKind, MutationRecord, NodeRef, WeakNodeRef};
pub use driver::{AnnotationDriver, AnnotationReport, SkipCounts};
pub use error::{AnnotateError, DomError};
pub use filter::{TreeFilter, Verdict, FORM_CONTROL_TAGS, RAW_TEXT_TAGS};
pub use processed::ProcessedSet;
pub use watcher::{Debouncer, MutationWatcher};
