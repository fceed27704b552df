use crate::Canvas;
use crate::doc_context::DocContext;
use crate::frame::Frame;
use crate::types::{Rect, Size};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub id: String,
    pub rect: Rect,
    pub show_boundary: bool,
}

impl FrameSpec {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
            show_boundary: false,
        }
    }

    pub fn with_boundary(mut self, show: bool) -> Self {
        self.show_boundary = show;
        self
    }
}

pub type OnPageCallback = Arc<dyn Fn(&mut Canvas, &DocContext) + Send + Sync>;

#[derive(Clone)]
pub struct PageTemplate {
    pub name: String,
    pub page_size: Size,
    frames: Vec<FrameSpec>,
    on_page: Option<OnPageCallback>,
}

impl PageTemplate {
    pub fn new(name: impl Into<String>, page_size: Size) -> Self {
        Self {
            name: name.into(),
            page_size,
            frames: Vec::new(),
            on_page: None,
        }
    }

    pub fn with_frame(self, id: impl Into<String>, rect: Rect) -> Self {
        self.with_frame_spec(FrameSpec::new(id, rect))
    }

    pub fn with_frame_spec(mut self, spec: FrameSpec) -> Self {
        self.frames.push(spec);
        self
    }

    /// Decoration drawn once per page, before any frame is filled.
    pub fn set_on_page<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Canvas, &DocContext) + Send + Sync + 'static,
    {
        self.on_page = Some(Arc::new(callback));
        self
    }

    pub fn on_page(&self) -> Option<&OnPageCallback> {
        self.on_page.as_ref()
    }

    pub fn frame_specs(&self) -> &[FrameSpec] {
        &self.frames
    }

    /// Fresh frames for a new page: same geometry, cursors at the top.
    pub fn instantiate_frames(&self) -> Vec<Frame> {
        self.frames.iter().map(Frame::new).collect()
    }

    pub(crate) fn duplicate_frame_id(&self) -> Option<&str> {
        self.frames.iter().enumerate().find_map(|(idx, spec)| {
            self.frames[..idx]
                .iter()
                .any(|earlier| earlier.id == spec.id)
                .then_some(spec.id.as_str())
        })
    }
}

impl fmt::Debug for PageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageTemplate")
            .field("name", &self.name)
            .field("page_size", &self.page_size)
            .field("frames", &self.frames)
            .field("on_page", &self.on_page.is_some())
            .finish()
    }
}
