use crate::canvas::Canvas;
use crate::flowable::{Flowable, SplitResult};
use crate::indent::IndentState;
use crate::page_template::FrameSpec;
use crate::types::{Color, Pt, Rect, Size};

pub enum AddResult {
    Placed,
    /// The fitted part was drawn; the remainder goes back to the head of the story.
    Split(Flowable),
    /// Nothing was drawn and no space was consumed.
    Rejected(Flowable),
}

pub struct Frame {
    id: String,
    rect: Rect,
    show_boundary: bool,
    cursor_y: Pt,
    placed: usize,
}

impl Frame {
    pub fn new(spec: &FrameSpec) -> Self {
        Self {
            id: spec.id.clone(),
            rect: spec.rect,
            show_boundary: spec.show_boundary,
            cursor_y: Pt::ZERO,
            placed: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn show_boundary(&self) -> bool {
        self.show_boundary
    }

    /// Distance of the write position below the frame's top edge.
    pub fn cursor_y(&self) -> Pt {
        self.cursor_y
    }

    pub fn remaining_height(&self) -> Pt {
        (self.rect.height - self.cursor_y).max(Pt::ZERO)
    }

    /// True until the first flowable is placed on this page.
    pub fn is_empty(&self) -> bool {
        self.placed == 0
    }

    pub fn placed_count(&self) -> usize {
        self.placed
    }

    pub(crate) fn advance_cursor(&mut self, by: Pt) {
        self.cursor_y = self.cursor_y + by;
    }

    pub fn draw_boundary(&self, canvas: &mut Canvas) {
        canvas.save_state();
        canvas.set_stroke_color(Color::BLACK);
        canvas.set_line_width(Pt::from_f32(1.0));
        canvas.stroke_rect(self.rect);
        canvas.restore_state();
    }

    /// Offers `flowable` the space left below the cursor, narrowed by `indent`.
    pub fn try_place(
        &mut self,
        flowable: Flowable,
        indent: &IndentState,
        allow_split: bool,
        canvas: &mut Canvas,
    ) -> AddResult {
        let area = indent.content_box(self.rect);
        let avail_height = self.remaining_height();
        let size = flowable.required_space(area.width);

        if size.height <= avail_height {
            self.draw_at(&flowable, area, size, canvas);
            return AddResult::Placed;
        }

        if allow_split && flowable.is_splittable() {
            let SplitResult { fitted, remainder } = flowable.split(area.width, avail_height);
            if let Some(fitted) = fitted {
                let fitted_size = fitted.required_space(area.width);
                if fitted_size.height <= avail_height {
                    self.draw_at(&fitted, area, fitted_size, canvas);
                    return match remainder {
                        Some(rest) => AddResult::Split(rest),
                        None => AddResult::Placed,
                    };
                }
            }
        }

        log::trace!(
            "frame {}: rejected {} ({}pt needed, {}pt left)",
            self.id,
            flowable.debug_name(),
            size.height.to_f32(),
            avail_height.to_f32()
        );
        AddResult::Rejected(flowable)
    }

    fn draw_at(&mut self, flowable: &Flowable, area: Rect, size: Size, canvas: &mut Canvas) {
        let y = self.rect.y + self.cursor_y;
        let depth = canvas.state_depth();
        canvas.save_state();
        flowable.draw(canvas, area.x, y, area.width, self.remaining_height());
        canvas.restore_to_depth(depth);
        canvas.record_flowable_bounds(Rect {
            x: area.x,
            y,
            width: area.width,
            height: size.height,
        });
        log::trace!(
            "frame {}: placed {} at y={} ({}pt)",
            self.id,
            flowable.debug_name(),
            y.to_f32(),
            size.height.to_f32()
        );
        self.cursor_y = self.cursor_y + size.height;
        self.placed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::flowable::Spacer;
    use crate::markers::Indenter;
    use crate::paragraph::{Paragraph, TextStyle};

    fn frame(height: f32) -> Frame {
        Frame::new(&FrameSpec::new("F1", Rect::new(50.0, 100.0, 300.0, height)))
    }

    fn spam(words: usize) -> Flowable {
        Paragraph::new(vec!["spam"; words].join(" "))
            .with_style(TextStyle::sized(10.0))
            .into()
    }

    fn canvas() -> Canvas {
        Canvas::new(Size::letter())
    }

    #[test]
    fn placed_flowable_advances_cursor() {
        let mut f = frame(100.0);
        let mut c = canvas();
        let result = f.try_place(Spacer::vertical(40.0).into(), &IndentState::default(), true, &mut c);
        assert!(matches!(result, AddResult::Placed));
        assert_eq!(f.cursor_y(), Pt::from_i32(40));
        assert_eq!(f.remaining_height(), Pt::from_i32(60));
        assert!(!f.is_empty());
    }

    #[test]
    fn oversized_atomic_flowable_is_rejected_without_consuming_space() {
        let mut f = frame(100.0);
        let mut c = canvas();
        let result = f.try_place(Spacer::vertical(101.0).into(), &IndentState::default(), true, &mut c);
        assert!(matches!(result, AddResult::Rejected(Flowable::Spacer(_))));
        assert_eq!(f.cursor_y(), Pt::ZERO);
        assert!(f.is_empty());
        assert!(c.is_current_empty());
    }

    #[test]
    fn splittable_flowable_leaves_a_remainder() {
        // 300pt wide holds ten "spam" words per 12pt line: 30 words is 36pt.
        let mut f = frame(30.0);
        let mut c = canvas();
        let result = f.try_place(spam(30), &IndentState::default(), true, &mut c);
        let AddResult::Split(Flowable::Paragraph(rest)) = result else {
            panic!("expected a split");
        };
        assert_eq!(rest.text().split_whitespace().count(), 10);
        assert_eq!(f.cursor_y(), Pt::from_i32(24));
    }

    #[test]
    fn splitting_disabled_rejects_instead() {
        let mut f = frame(30.0);
        let mut c = canvas();
        let result = f.try_place(spam(30), &IndentState::default(), false, &mut c);
        assert!(matches!(result, AddResult::Rejected(_)));
        assert!(f.is_empty());
    }

    #[test]
    fn no_room_for_a_single_line_is_a_rejection() {
        let mut f = frame(11.0);
        let mut c = canvas();
        let result = f.try_place(spam(30), &IndentState::default(), true, &mut c);
        assert!(matches!(result, AddResult::Rejected(_)));
        assert_eq!(f.cursor_y(), Pt::ZERO);
    }

    #[test]
    fn indent_narrows_and_shifts_content() {
        let mut f = frame(100.0);
        let mut c = canvas();
        let mut indent = IndentState::default();
        indent.apply(&Indenter::new(36.0, 0.0));
        f.try_place(spam(1), &indent, true, &mut c);
        c.show_page(Size::letter());
        let doc = c.finish_without_show();
        let page = &doc.pages[0];
        assert!(page.commands.contains(&Command::DrawString {
            x: Pt::from_i32(86),
            y: Pt::from_i32(100),
            text: "spam".to_string(),
        }));
        assert_eq!(page.flowable_bounds()[0], Rect::new(86.0, 100.0, 264.0, 12.0));
    }

    #[test]
    fn content_draw_is_wrapped_in_save_restore() {
        let mut f = frame(100.0);
        let mut c = canvas();
        f.try_place(spam(3), &IndentState::default(), true, &mut c);
        assert_eq!(c.state_depth(), 0);
        c.show_page(Size::letter());
        let doc = c.finish_without_show();
        let commands = &doc.pages[0].commands;
        assert_eq!(commands.first(), Some(&Command::SaveState));
        let restore = commands
            .iter()
            .position(|command| *command == Command::RestoreState)
            .expect("restore");
        let draw = commands
            .iter()
            .position(|command| matches!(command, Command::DrawString { .. }))
            .expect("draw");
        assert!(draw < restore);
    }
}
