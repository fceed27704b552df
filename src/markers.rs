use crate::doc_context::DocContext;
use crate::flowable::Flowable;
use crate::types::{Color, Pt};
use std::fmt;
use std::sync::Arc;

/// Signed change to the document-wide left/right indentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indenter {
    pub left: Pt,
    pub right: Pt,
}

impl Indenter {
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left: Pt::from_f32(left),
            right: Pt::from_f32(right),
        }
    }
}

/// Selects the template used from the next page onwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPageTemplate {
    pub name: String,
}

impl NextPageTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    /// From the cursor down to the frame bottom, this page only.
    Tail,
    Stop,
    /// The whole frame rectangle, this page only.
    Frame,
    /// The whole frame rectangle on this and every later page until stopped.
    FramePermanent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBackground {
    pub mode: BackgroundMode,
    pub color: Option<Color>,
    pub left: Pt,
    pub right: Pt,
}

impl FrameBackground {
    pub fn start(mode: BackgroundMode, color: Color) -> Self {
        Self {
            mode,
            color: Some(color),
            left: Pt::ZERO,
            right: Pt::ZERO,
        }
    }

    pub fn stop() -> Self {
        Self {
            mode: BackgroundMode::Stop,
            color: None,
            left: Pt::ZERO,
            right: Pt::ZERO,
        }
    }

    pub fn with_insets(mut self, left: f32, right: f32) -> Self {
        self.left = Pt::from_f32(left);
        self.right = Pt::from_f32(right);
        self
    }
}

pub type DeferredFn = Arc<dyn Fn(&DocContext) -> Flowable + Send + Sync>;

/// Content decided at placement time, e.g. "page 3 of N" where N comes from the previous pass.
#[derive(Clone)]
pub struct Deferred {
    name: &'static str,
    resolve: DeferredFn,
}

impl Deferred {
    pub fn new<F>(name: &'static str, resolve: F) -> Self
    where
        F: Fn(&DocContext) -> Flowable + Send + Sync + 'static,
    {
        Self {
            name,
            resolve: Arc::new(resolve),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn resolve(&self, context: &DocContext) -> Flowable {
        (self.resolve)(context)
    }
}

// Two deferred markers are the same only when they share the resolver.
impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.resolve, &other.resolve)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").field("name", &self.name).finish()
    }
}
