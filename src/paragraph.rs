use crate::canvas::Canvas;
use crate::flowable::{Flowable, SplitResult};
use crate::types::{Color, Pt, Size};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_name: Arc<str>,
    pub font_size: Pt,
    pub leading: Pt,
    pub color: Color,
    pub space_before: Pt,
    pub space_after: Pt,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::sized(12.0)
    }
}

impl TextStyle {
    /// Body style at `font_size` with the usual 1.2 leading.
    pub fn sized(font_size: f32) -> Self {
        let font_size = Pt::from_f32(font_size);
        Self {
            font_name: Arc::<str>::from("Helvetica"),
            font_size,
            leading: font_size.mul_ratio(6, 5),
            color: Color::BLACK,
            space_before: Pt::ZERO,
            space_after: Pt::ZERO,
        }
    }

    pub fn with_font(mut self, name: impl Into<Arc<str>>) -> Self {
        self.font_name = name.into();
        self
    }

    pub fn with_leading(mut self, leading: f32) -> Self {
        self.leading = Pt::from_f32(leading);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = Pt::from_f32(before);
        self.space_after = Pt::from_f32(after);
        self
    }

    // Shaping is a collaborator concern; without font metrics every glyph gets
    // the fixed fallback advance.
    pub fn char_width(&self) -> Pt {
        (self.font_size * 0.6).max(Pt::from_f32(1.0))
    }

    pub fn measure(&self, text: &str) -> Pt {
        self.char_width() * (text.chars().count() as i32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LineLayout {
    pub text: String,
    pub width: Pt,
}

/// Greedy word wrap. A word wider than `max_width` gets a line of its own.
pub(crate) fn wrap_text(text: &str, style: &TextStyle, max_width: Pt) -> Vec<LineLayout> {
    let space = style.measure(" ");
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = Pt::ZERO;
    for word in text.split_whitespace() {
        let word_width = style.measure(word);
        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
            continue;
        }
        let candidate = current_width + space + word_width;
        if candidate <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width = candidate;
        } else {
            lines.push(LineLayout {
                text: std::mem::take(&mut current),
                width: current_width,
            });
            current.push_str(word);
            current_width = word_width;
        }
    }
    if !current.is_empty() {
        lines.push(LineLayout {
            text: current,
            width: current_width,
        });
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    text: String,
    style: TextStyle,
    align: TextAlign,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            align: TextAlign::Left,
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn line_count(&self, avail_width: Pt) -> usize {
        wrap_text(&self.text, &self.style, avail_width).len()
    }

    fn height_for_lines(&self, lines: usize) -> Pt {
        self.style.space_before + self.style.leading * (lines as i32) + self.style.space_after
    }

    fn part(&self, lines: &[LineLayout], space_before: Pt, space_after: Pt) -> Paragraph {
        let text = lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Paragraph {
            text,
            style: TextStyle {
                space_before,
                space_after,
                ..self.style.clone()
            },
            align: self.align,
        }
    }

    pub fn required_space(&self, avail_width: Pt) -> Size {
        let lines = wrap_text(&self.text, &self.style, avail_width);
        let width = lines
            .iter()
            .fold(Pt::ZERO, |acc, line| acc.max(line.width))
            .min(avail_width);
        Size {
            width,
            height: self.height_for_lines(lines.len()),
        }
    }

    /// Cuts between lines. The fitted part keeps the space before, the
    /// remainder keeps the space after.
    pub fn split(&self, avail_width: Pt, avail_height: Pt) -> SplitResult {
        let lines = wrap_text(&self.text, &self.style, avail_width);
        if self.height_for_lines(lines.len()) <= avail_height {
            return SplitResult::whole(Flowable::Paragraph(self.clone()));
        }
        let usable = avail_height - self.style.space_before;
        let fitting = usable.whole_multiples(self.style.leading);
        if fitting == 0 {
            return SplitResult::nothing(Flowable::Paragraph(self.clone()));
        }
        let fitting = fitting.min(lines.len().saturating_sub(1));
        if fitting == 0 {
            return SplitResult::nothing(Flowable::Paragraph(self.clone()));
        }
        let (head, tail) = lines.split_at(fitting);
        let fitted = self.part(head, self.style.space_before, Pt::ZERO);
        let remainder = self.part(tail, Pt::ZERO, self.style.space_after);
        SplitResult {
            fitted: Some(Flowable::Paragraph(fitted)),
            remainder: Some(Flowable::Paragraph(remainder)),
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt) {
        let lines = wrap_text(&self.text, &self.style, avail_width);
        if lines.is_empty() {
            return;
        }
        canvas.set_fill_color(self.style.color);
        canvas.set_font_name(&self.style.font_name);
        canvas.set_font_size(self.style.font_size);

        let mut cursor_y = y + self.style.space_before;
        for line in &lines {
            let offset = match self.align {
                TextAlign::Left => Pt::ZERO,
                TextAlign::Center => (avail_width - line.width).max(Pt::ZERO).mul_ratio(1, 2),
                TextAlign::Right => (avail_width - line.width).max(Pt::ZERO),
            };
            canvas.draw_string(x + offset, cursor_y, line.text.clone());
            cursor_y = cursor_y + self.style.leading;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spam(words: usize) -> String {
        vec!["spam"; words].join(" ")
    }

    // 10pt text: 6pt per char, 12pt leading.
    fn body() -> TextStyle {
        TextStyle::sized(10.0)
    }

    #[test]
    fn wrap_fills_lines_greedily() {
        // Nine "spam" words take exactly 9*24 + 8*6 = 264pt.
        let lines = wrap_text(&spam(20), &body(), Pt::from_i32(264));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, spam(9));
        assert_eq!(lines[0].width, Pt::from_i32(264));
        assert_eq!(lines[2].text, spam(2));
    }

    #[test]
    fn overlong_word_takes_its_own_line() {
        let lines = wrap_text("a supercalifragilistic b", &body(), Pt::from_i32(30));
        let texts: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn required_space_counts_lines_and_spacing() {
        let para = Paragraph::new(spam(20)).with_style(body().with_spacing(6.0, 4.0));
        let size = para.required_space(Pt::from_i32(264));
        assert_eq!(size.height, Pt::from_i32(6 + 3 * 12 + 4));
        assert_eq!(size.width, Pt::from_i32(264));
    }

    #[test]
    fn split_that_exactly_fits_returns_everything() {
        let para = Paragraph::new(spam(20)).with_style(body());
        let result = para.split(Pt::from_i32(264), Pt::from_i32(36));
        assert!(result.remainder.is_none());
        match result.fitted {
            Some(Flowable::Paragraph(fitted)) => assert_eq!(fitted, para),
            other => panic!("expected whole paragraph, got {other:?}"),
        }
    }

    #[test]
    fn split_with_no_room_for_a_line_returns_original() {
        let para = Paragraph::new(spam(20)).with_style(body());
        let result = para.split(Pt::from_i32(264), Pt::from_i32(11));
        assert!(result.fitted.is_none());
        match result.remainder {
            Some(Flowable::Paragraph(rest)) => assert_eq!(rest, para),
            other => panic!("expected original paragraph, got {other:?}"),
        }
    }

    #[test]
    fn split_cuts_between_lines_and_keeps_all_words() {
        let para = Paragraph::new(spam(20)).with_style(body().with_spacing(6.0, 4.0));
        let result = para.split(Pt::from_i32(264), Pt::from_i32(31));
        let (Some(Flowable::Paragraph(fitted)), Some(Flowable::Paragraph(rest))) =
            (result.fitted, result.remainder)
        else {
            panic!("expected a two-part split");
        };
        // 31 - 6 before leaves room for two 12pt lines.
        assert_eq!(fitted.text(), spam(18));
        assert_eq!(rest.text(), spam(2));
        assert_eq!(fitted.style().space_after, Pt::ZERO);
        assert_eq!(rest.style().space_before, Pt::ZERO);
        assert_eq!(fitted.required_space(Pt::from_i32(264)).height, Pt::from_i32(30));
    }

    #[test]
    fn draw_offsets_lines_by_alignment() {
        let mut canvas = Canvas::new(Size::letter());
        let para = Paragraph::new("ab")
            .with_style(body())
            .with_align(TextAlign::Right);
        para.draw(&mut canvas, Pt::from_i32(10), Pt::from_i32(20), Pt::from_i32(100));
        canvas.show_page(Size::letter());
        let doc = canvas.finish_without_show();
        let strings: Vec<_> = doc.pages[0]
            .commands
            .iter()
            .filter_map(|command| match command {
                crate::canvas::Command::DrawString { x, y, text } => Some((*x, *y, text.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            strings,
            vec![(Pt::from_i32(98), Pt::from_i32(20), "ab".to_string())]
        );
    }
}
