use crate::background::{BackgroundRegistry, fill_commands};
use crate::canvas::{Canvas, Document, META_PAGE_TEMPLATE_KEY};
use crate::debug::DebugLogger;
use crate::doc_context::DocContext;
use crate::error::{PageFlowError, Result};
use crate::flowable::Flowable;
use crate::frame::{AddResult, Frame};
use crate::indent::IndentState;
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::page_template::PageTemplate;
use crate::types::Size;
use serde_json::json;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Drives a story of flowables through a set of named page templates.
pub struct DocTemplate {
    page_templates: Vec<PageTemplate>,
    allow_splitting: bool,
    debug: Option<Arc<DebugLogger>>,
}

/// Result of a converged multi-pass build.
#[derive(Debug, Clone)]
pub struct MultiBuildOutcome {
    pub document: Document,
    pub metrics: DocumentMetrics,
    /// Number of passes run, including the one that confirmed convergence.
    pub passes: usize,
    pub page_counts: Vec<usize>,
}

impl Default for DocTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTemplate {
    pub fn new() -> Self {
        Self {
            page_templates: Vec::new(),
            allow_splitting: true,
            debug: None,
        }
    }

    pub fn builder() -> DocTemplateBuilder {
        DocTemplateBuilder::new()
    }

    pub(crate) fn with_debug(mut self, debug: Arc<DebugLogger>) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Adds templates to the registry. Nothing is registered if any of them is invalid.
    pub fn register_templates(
        &mut self,
        templates: impl IntoIterator<Item = PageTemplate>,
    ) -> Result<()> {
        let mut staged: Vec<PageTemplate> = Vec::new();
        for template in templates {
            if template.frame_specs().is_empty() {
                return Err(PageFlowError::InvalidConfiguration(format!(
                    "page template '{}' has no frames",
                    template.name
                )));
            }
            if let Some(id) = template.duplicate_frame_id() {
                return Err(PageFlowError::InvalidConfiguration(format!(
                    "page template '{}' declares frame '{}' twice",
                    template.name, id
                )));
            }
            let taken = self
                .page_templates
                .iter()
                .chain(staged.iter())
                .any(|existing| existing.name == template.name);
            if taken {
                return Err(PageFlowError::InvalidConfiguration(format!(
                    "duplicate page template name '{}'",
                    template.name
                )));
            }
            staged.push(template);
        }
        self.page_templates.extend(staged);
        Ok(())
    }

    pub fn page_templates(&self) -> &[PageTemplate] {
        &self.page_templates
    }

    pub fn allow_splitting(&self) -> bool {
        self.allow_splitting
    }

    fn resolve_template(&self, name: &str) -> Result<usize> {
        self.page_templates
            .iter()
            .position(|template| template.name == name)
            .ok_or_else(|| PageFlowError::UnknownTemplate(name.to_string()))
    }

    pub fn build(&self, story: Vec<Flowable>, initial_template: &str) -> Result<Document> {
        Ok(self.build_with_metrics(story, initial_template)?.0)
    }

    pub fn build_with_metrics(
        &self,
        story: Vec<Flowable>,
        initial_template: &str,
    ) -> Result<(Document, DocumentMetrics)> {
        let result = self.run_pass(story, initial_template, None);
        self.flush_debug("build");
        result
    }

    /// Re-runs the layout until two consecutive passes agree on the page count.
    ///
    /// Every pass starts from a fresh copy of `story` and fresh indent and
    /// background state; deferred flowables see the previous pass's count.
    pub fn multi_build(
        &self,
        story: Vec<Flowable>,
        initial_template: &str,
        max_passes: usize,
    ) -> Result<MultiBuildOutcome> {
        if max_passes < 2 {
            return Err(PageFlowError::InvalidConfiguration(format!(
                "multi_build needs at least 2 passes, got {max_passes}"
            )));
        }
        let result = self.multi_build_inner(story, initial_template, max_passes);
        self.flush_debug("multi_build");
        result
    }

    fn multi_build_inner(
        &self,
        story: Vec<Flowable>,
        initial_template: &str,
        max_passes: usize,
    ) -> Result<MultiBuildOutcome> {
        let mut page_counts = Vec::with_capacity(max_passes);
        let mut previous: Option<usize> = None;
        for pass in 1..=max_passes {
            let (document, metrics) = self.run_pass(story.clone(), initial_template, previous)?;
            let count = document.page_count();
            page_counts.push(count);
            let converged = previous == Some(count);
            log::debug!("multi-build pass {pass}/{max_passes}: {count} pages");
            if converged {
                self.log_multi_build(pass, max_passes, &page_counts, true);
                return Ok(MultiBuildOutcome {
                    document,
                    metrics,
                    passes: pass,
                    page_counts,
                });
            }
            previous = Some(count);
        }
        log::warn!(
            "multi-build did not settle after {max_passes} passes (page counts {page_counts:?})"
        );
        self.log_multi_build(max_passes, max_passes, &page_counts, false);
        Err(PageFlowError::NonConvergentMultiBuild {
            passes: max_passes,
            page_counts,
        })
    }

    fn run_pass(
        &self,
        story: Vec<Flowable>,
        initial_template: &str,
        previous_page_count: Option<usize>,
    ) -> Result<(Document, DocumentMetrics)> {
        if self.page_templates.is_empty() {
            return Err(PageFlowError::MissingPageTemplate);
        }
        let template = self.resolve_template(initial_template)?;
        LayoutPass::new(self, story, template, previous_page_count).run()
    }

    fn log_multi_build(&self, passes: usize, limit: usize, page_counts: &[usize], converged: bool) {
        let Some(logger) = self.debug.as_deref() else {
            return;
        };
        logger.log_json(&json!({
            "type": "layout.multi_build",
            "passes": passes,
            "pass_limit": limit,
            "page_counts": page_counts,
            "converged": converged,
        }));
        if !converged {
            logger.increment("layout.multi_build.no_convergence", 1);
        }
    }

    fn flush_debug(&self, context: &str) {
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary(context);
            logger.flush();
        }
    }
}

pub struct DocTemplateBuilder {
    page_templates: Vec<PageTemplate>,
    allow_splitting: bool,
    debug_log: Option<PathBuf>,
}

impl Default for DocTemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTemplateBuilder {
    pub fn new() -> Self {
        Self {
            page_templates: Vec::new(),
            allow_splitting: true,
            debug_log: None,
        }
    }

    pub fn page_template(mut self, template: PageTemplate) -> Self {
        self.page_templates.push(template);
        self
    }

    pub fn page_templates(mut self, templates: impl IntoIterator<Item = PageTemplate>) -> Self {
        self.page_templates.extend(templates);
        self
    }

    /// When off, a flowable that does not fit moves to the next frame whole.
    pub fn allow_splitting(mut self, allow: bool) -> Self {
        self.allow_splitting = allow;
        self
    }

    /// Writes a JSON-lines layout trace to `path`.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_log = Some(path.into());
        self
    }

    pub fn build(self) -> Result<DocTemplate> {
        let mut doc = DocTemplate::new();
        doc.allow_splitting = self.allow_splitting;
        doc.register_templates(self.page_templates)?;
        if let Some(path) = self.debug_log {
            doc = doc.with_debug(Arc::new(DebugLogger::new(path)?));
        }
        Ok(doc)
    }
}

/// Mutable state of one layout pass over the story.
struct LayoutPass<'a> {
    doc: &'a DocTemplate,
    canvas: Canvas,
    story: VecDeque<Flowable>,
    template: usize,
    pending_template: Option<usize>,
    frames: Vec<Frame>,
    frame_index: usize,
    visited: Vec<bool>,
    // Canvas position where the open frame visit began; its backgrounds go there.
    visit_slot: Option<usize>,
    // Canvas position just after the page decoration, for frames never entered.
    page_slot: usize,
    page_number: usize,
    indent: IndentState,
    backgrounds: BackgroundRegistry,
    previous_page_count: Option<usize>,
    metrics: DocumentMetrics,
    page_start: Instant,
    page_flowables: usize,
    page_splits: usize,
}

impl<'a> LayoutPass<'a> {
    fn new(
        doc: &'a DocTemplate,
        story: Vec<Flowable>,
        template: usize,
        previous_page_count: Option<usize>,
    ) -> Self {
        let page_size = doc.page_templates[template].page_size;
        Self {
            doc,
            canvas: Canvas::new(page_size),
            story: story.into(),
            template,
            pending_template: None,
            frames: Vec::new(),
            frame_index: 0,
            visited: Vec::new(),
            visit_slot: None,
            page_slot: 0,
            page_number: 1,
            indent: IndentState::default(),
            backgrounds: BackgroundRegistry::new(),
            previous_page_count,
            metrics: DocumentMetrics::default(),
            page_start: Instant::now(),
            page_flowables: 0,
            page_splits: 0,
        }
    }

    fn template(&self) -> &'a PageTemplate {
        &self.doc.page_templates[self.template]
    }

    fn run(mut self) -> Result<(Document, DocumentMetrics)> {
        self.start_page();
        while let Some(flowable) = self.story.pop_front() {
            match flowable {
                // State markers never force the pending page into existence.
                Flowable::Indenter(delta) => {
                    self.indent.apply(&delta);
                    log::trace!(
                        "indent now left={} right={}",
                        self.indent.left.to_f32(),
                        self.indent.right.to_f32()
                    );
                }
                Flowable::NextPageTemplate(next) => {
                    let index = self.doc.resolve_template(&next.name)?;
                    log::debug!("page {}: next template '{}'", self.page_number, next.name);
                    self.pending_template = Some(index);
                }
                Flowable::Deferred(deferred) => {
                    let resolved = deferred.resolve(&self.context());
                    if matches!(resolved, Flowable::Deferred(_)) {
                        return Err(PageFlowError::InvalidConfiguration(format!(
                            "deferred flowable '{}' resolved to another deferred flowable",
                            deferred.name()
                        )));
                    }
                    self.story.push_front(resolved);
                }
                Flowable::FrameBreak => {
                    self.ensure_frame();
                    self.advance_frame("frame_break", None);
                }
                Flowable::PageBreak => {
                    self.ensure_frame();
                    self.abandon_page();
                }
                Flowable::FrameBackground(marker) => {
                    self.ensure_frame();
                    let frame = &self.frames[self.frame_index];
                    self.backgrounds.apply(frame, &marker);
                }
                content => self.place(content)?,
            }
        }
        let page_size = self.template().page_size;
        self.finish_page(page_size);
        Ok((self.canvas.finish_without_show(), self.metrics))
    }

    /// Content is unfittable once it has been rejected by as many empty frames
    /// as the current template has, so a later, taller frame still gets a try.
    fn place(&mut self, mut flowable: Flowable) -> Result<()> {
        let mut empty_rejections = 0usize;
        loop {
            self.ensure_frame();
            let name = flowable.debug_name();
            let frame = &mut self.frames[self.frame_index];
            let was_empty = frame.is_empty();
            match frame.try_place(flowable, &self.indent, self.doc.allow_splitting, &mut self.canvas) {
                AddResult::Placed => {
                    self.page_flowables += 1;
                    return Ok(());
                }
                AddResult::Split(rest) => {
                    self.page_flowables += 1;
                    self.page_splits += 1;
                    self.story.push_front(rest);
                    self.advance_frame("flowable_split", Some(name));
                    return Ok(());
                }
                AddResult::Rejected(back) => {
                    if was_empty {
                        empty_rejections += 1;
                        if empty_rejections >= self.frames.len() {
                            return Err(PageFlowError::UnfittableContent {
                                flowable: back.describe(),
                                page: self.page_number,
                            });
                        }
                    }
                    self.advance_frame("frame_overflow", Some(name));
                    flowable = back;
                }
            }
        }
    }

    fn context(&self) -> DocContext {
        let (page_number, template) = if self.frame_index >= self.frames.len() {
            (
                self.page_number + 1,
                self.pending_template.unwrap_or(self.template),
            )
        } else {
            (self.page_number, self.template)
        };
        DocContext::new(page_number, &self.doc.page_templates[template].name)
            .with_previous_page_count(self.previous_page_count)
    }

    fn ensure_frame(&mut self) {
        if self.frame_index >= self.frames.len() {
            self.advance_page();
        }
    }

    fn advance_frame(&mut self, reason: &str, flowable: Option<&str>) {
        self.close_visit();
        self.log_event("layout.frame_advance", reason, self.page_number, flowable);
        self.frame_index += 1;
        if self.frame_index < self.frames.len() {
            self.open_frame();
        }
    }

    fn abandon_page(&mut self) {
        self.close_visit();
        self.log_event("layout.page_break", "page_break", self.page_number + 1, None);
        self.frame_index = self.frames.len();
    }

    fn advance_page(&mut self) {
        let next = self.pending_template.take().unwrap_or(self.template);
        let next_size = self.doc.page_templates[next].page_size;
        self.finish_page(next_size);
        self.log_event(
            "layout.page_break",
            "frames_exhausted",
            self.page_number + 1,
            None,
        );
        self.page_number += 1;
        if next != self.template {
            log::debug!(
                "page {}: switching template '{}' -> '{}'",
                self.page_number,
                self.template().name,
                self.doc.page_templates[next].name
            );
        }
        self.template = next;
        self.backgrounds.reset_page();
        self.start_page();
    }

    fn start_page(&mut self) {
        let template = self.template();
        self.frames = template.instantiate_frames();
        self.frame_index = 0;
        self.visited = vec![false; self.frames.len()];
        self.page_start = Instant::now();
        self.page_flowables = 0;
        self.page_splits = 0;
        self.canvas.meta(META_PAGE_TEMPLATE_KEY, template.name.clone());
        if let Some(callback) = template.on_page() {
            let context = self.context();
            let depth = self.canvas.state_depth();
            self.canvas.save_state();
            callback(&mut self.canvas, &context);
            self.canvas.restore_to_depth(depth);
        }
        self.page_slot = self.canvas.mark();
        self.open_frame();
    }

    fn open_frame(&mut self) {
        self.visited[self.frame_index] = true;
        self.visit_slot = Some(self.canvas.mark());
        let frame = &self.frames[self.frame_index];
        if frame.show_boundary() {
            frame.draw_boundary(&mut self.canvas);
        }
    }

    fn close_visit(&mut self) {
        let Some(slot) = self.visit_slot.take() else {
            return;
        };
        let Some(frame) = self.frames.get(self.frame_index) else {
            return;
        };
        let fills = self.backgrounds.close_visit(frame);
        if !fills.is_empty() {
            self.canvas.insert_commands(slot, fill_commands(&fills));
        }
    }

    fn finish_page(&mut self, next_size: Size) {
        self.close_visit();
        let unvisited: Vec<_> = self
            .frames
            .iter()
            .zip(&self.visited)
            .filter(|(_, visited)| !**visited)
            .filter_map(|(frame, _)| self.backgrounds.unvisited_fill(frame))
            .collect();
        if !unvisited.is_empty() {
            self.canvas
                .insert_commands(self.page_slot, fill_commands(&unvisited));
        }

        let elapsed = self.page_start.elapsed().as_secs_f64() * 1000.0;
        self.metrics.total_render_ms += elapsed;
        self.metrics.pages.push(PageMetrics {
            page_number: self.page_number,
            template_name: self.template().name.clone(),
            render_ms: elapsed,
            command_count: self.canvas.current_command_count(),
            flowable_count: self.page_flowables,
            split_count: self.page_splits,
        });
        self.canvas.show_page(next_size);
    }

    fn log_event(&self, kind: &str, reason: &str, to_page: usize, flowable: Option<&str>) {
        log::debug!(
            "{kind}: {reason} (page {} -> {to_page}, frame {})",
            self.page_number,
            self.frame_index
        );
        let Some(logger) = self.doc.debug.as_deref() else {
            return;
        };
        logger.log_json(&json!({
            "type": kind,
            "reason": reason,
            "from_page": self.page_number,
            "to_page": to_page,
            "frame_index": self.frame_index,
            "template": self.template().name,
            "flowable": flowable,
        }));
        logger.increment(&format!("{kind}.{reason}"), 1);
    }
}
