//! Paginated document flow: a story of flowables poured into the frames of
//! named page templates, with indentation, frame backgrounds, template
//! switching and multi-pass builds for content that depends on page counts.
//!
//! Output is a recorded [`Document`] of per-page drawing [`Command`]s.

mod background;
mod canvas;
mod debug;
mod doc_context;
mod doc_template;
mod error;
mod flowable;
mod frame;
mod indent;
mod markers;
mod metrics;
mod page_template;
mod paragraph;
mod table;
mod types;

pub use background::{BackgroundFill, BackgroundRegistry, PaintState};
pub use canvas::{
    Canvas, Command, Document, META_FLOWABLE_BOUNDS_KEY, META_PAGE_TEMPLATE_KEY, Page,
};
pub use doc_context::DocContext;
pub use doc_template::{DocTemplate, DocTemplateBuilder, MultiBuildOutcome};
pub use error::{PageFlowError, Result};
pub use flowable::{Flowable, Spacer, SplitResult};
pub use frame::{AddResult, Frame};
pub use indent::IndentState;
pub use markers::{
    BackgroundMode, Deferred, DeferredFn, FrameBackground, Indenter, NextPageTemplate,
};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use page_template::{FrameSpec, OnPageCallback, PageTemplate};
pub use paragraph::{Paragraph, TextAlign, TextStyle};
pub use table::Table;
pub use types::{Color, Pt, Rect, Size};

/// Lays out `story` once over `templates`, starting on `initial_template`.
pub fn build(
    story: Vec<Flowable>,
    templates: Vec<PageTemplate>,
    initial_template: &str,
) -> Result<Document> {
    DocTemplate::builder()
        .page_templates(templates)
        .build()?
        .build(story, initial_template)
}

/// Lays out `story` repeatedly until the page count settles, at most `max_passes` times.
pub fn multi_build(
    story: Vec<Flowable>,
    templates: Vec<PageTemplate>,
    initial_template: &str,
    max_passes: usize,
) -> Result<MultiBuildOutcome> {
    DocTemplate::builder()
        .page_templates(templates)
        .build()?
        .multi_build(story, initial_template, max_passes)
}
