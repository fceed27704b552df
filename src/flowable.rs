use crate::canvas::Canvas;
use crate::markers::{Deferred, FrameBackground, Indenter, NextPageTemplate};
use crate::paragraph::Paragraph;
use crate::table::Table;
use crate::types::{Pt, Size};

/// Every unit the story can hold. Content variants occupy frame space; the
/// control markers are zero-size and act on driver state instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Flowable {
    Paragraph(Paragraph),
    Spacer(Spacer),
    Table(Table),
    Indenter(Indenter),
    FrameBreak,
    PageBreak,
    NextPageTemplate(NextPageTemplate),
    FrameBackground(FrameBackground),
    Deferred(Deferred),
}

/// Outcome of asking a flowable to fit into a given height.
///
/// `fitted: None` means nothing fits and `remainder` is the original;
/// `remainder: None` means the fitted part is the whole flowable.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub fitted: Option<Flowable>,
    pub remainder: Option<Flowable>,
}

impl SplitResult {
    pub fn whole(flowable: Flowable) -> Self {
        Self {
            fitted: Some(flowable),
            remainder: None,
        }
    }

    pub fn nothing(flowable: Flowable) -> Self {
        Self {
            fitted: None,
            remainder: Some(flowable),
        }
    }
}

impl Flowable {
    pub fn required_space(&self, avail_width: Pt) -> Size {
        match self {
            Flowable::Paragraph(paragraph) => paragraph.required_space(avail_width),
            Flowable::Spacer(spacer) => spacer.required_space(avail_width),
            Flowable::Table(table) => table.required_space(avail_width),
            Flowable::Indenter(_)
            | Flowable::FrameBreak
            | Flowable::PageBreak
            | Flowable::NextPageTemplate(_)
            | Flowable::FrameBackground(_)
            | Flowable::Deferred(_) => Size::ZERO,
        }
    }

    pub fn is_splittable(&self) -> bool {
        matches!(self, Flowable::Paragraph(_) | Flowable::Table(_))
    }

    pub fn is_control(&self) -> bool {
        !matches!(
            self,
            Flowable::Paragraph(_) | Flowable::Spacer(_) | Flowable::Table(_)
        )
    }

    pub fn split(&self, avail_width: Pt, avail_height: Pt) -> SplitResult {
        match self {
            Flowable::Paragraph(paragraph) => paragraph.split(avail_width, avail_height),
            Flowable::Table(table) => table.split(avail_width, avail_height),
            _ => {
                if self.required_space(avail_width).height <= avail_height {
                    SplitResult::whole(self.clone())
                } else {
                    SplitResult::nothing(self.clone())
                }
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        match self {
            Flowable::Paragraph(paragraph) => paragraph.draw(canvas, x, y, avail_width),
            Flowable::Table(table) => table.draw(canvas, x, y, avail_width),
            Flowable::Spacer(_)
            | Flowable::Indenter(_)
            | Flowable::FrameBreak
            | Flowable::PageBreak
            | Flowable::NextPageTemplate(_)
            | Flowable::FrameBackground(_)
            | Flowable::Deferred(_) => {}
        }
    }

    pub fn debug_name(&self) -> &'static str {
        match self {
            Flowable::Paragraph(_) => "Paragraph",
            Flowable::Spacer(_) => "Spacer",
            Flowable::Table(_) => "Table",
            Flowable::Indenter(_) => "Indenter",
            Flowable::FrameBreak => "FrameBreak",
            Flowable::PageBreak => "PageBreak",
            Flowable::NextPageTemplate(_) => "NextPageTemplate",
            Flowable::FrameBackground(_) => "FrameBackground",
            Flowable::Deferred(deferred) => deferred.name(),
        }
    }

    /// Short human-readable identity for error reports.
    pub fn describe(&self) -> String {
        match self {
            Flowable::Paragraph(paragraph) => {
                let excerpt: String = paragraph.text().chars().take(40).collect();
                if excerpt.len() < paragraph.text().len() {
                    format!("Paragraph(\"{excerpt}...\")")
                } else {
                    format!("Paragraph(\"{excerpt}\")")
                }
            }
            Flowable::Spacer(spacer) => format!(
                "Spacer({}x{}pt)",
                spacer.width.to_f32(),
                spacer.height.to_f32()
            ),
            Flowable::Table(table) => format!("Table({} rows)", table.rows().len()),
            Flowable::NextPageTemplate(next) => format!("NextPageTemplate({})", next.name),
            other => other.debug_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacer {
    pub width: Pt,
    pub height: Pt,
}

impl Spacer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: Pt::from_f32(width),
            height: Pt::from_f32(height),
        }
    }

    pub fn vertical(height: f32) -> Self {
        Self::new(0.0, height)
    }

    pub fn required_space(&self, avail_width: Pt) -> Size {
        Size {
            width: self.width.max(Pt::ZERO).min(avail_width),
            height: self.height.max(Pt::ZERO),
        }
    }
}

impl From<Paragraph> for Flowable {
    fn from(value: Paragraph) -> Self {
        Flowable::Paragraph(value)
    }
}

impl From<Spacer> for Flowable {
    fn from(value: Spacer) -> Self {
        Flowable::Spacer(value)
    }
}

impl From<Table> for Flowable {
    fn from(value: Table) -> Self {
        Flowable::Table(value)
    }
}

impl From<Indenter> for Flowable {
    fn from(value: Indenter) -> Self {
        Flowable::Indenter(value)
    }
}

impl From<NextPageTemplate> for Flowable {
    fn from(value: NextPageTemplate) -> Self {
        Flowable::NextPageTemplate(value)
    }
}

impl From<FrameBackground> for Flowable {
    fn from(value: FrameBackground) -> Self {
        Flowable::FrameBackground(value)
    }
}

impl From<Deferred> for Flowable {
    fn from(value: Deferred) -> Self {
        Flowable::Deferred(value)
    }
}
