use crate::types::{Color, Pt, Rect, Size};

/// Metadata key carrying the page template name of each page.
pub const META_PAGE_TEMPLATE_KEY: &str = "__pf_page_template";
/// Metadata key carrying the box of every placed flowable, in milli-points.
pub const META_FLOWABLE_BOUNDS_KEY: &str = "__pf_bbox";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SaveState,
    RestoreState,
    // Non-rendered metadata used for page-aware reporting.
    Meta {
        key: String,
        value: String,
    },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFontName(String),
    SetFontSize(Pt),
    MoveTo {
        x: Pt,
        y: Pt,
    },
    LineTo {
        x: Pt,
        y: Pt,
    },
    Fill,
    Stroke,
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub page_size: Size,
    pub commands: Vec<Command>,
}

impl Page {
    fn new(page_size: Size) -> Self {
        Self {
            page_size,
            commands: Vec::new(),
        }
    }

    pub fn meta_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.commands.iter().filter_map(move |command| match command {
            Command::Meta { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn template_name(&self) -> Option<&str> {
        self.meta_values(META_PAGE_TEMPLATE_KEY).next()
    }

    pub fn flowable_bounds(&self) -> Vec<Rect> {
        self.meta_values(META_FLOWABLE_BOUNDS_KEY)
            .filter_map(parse_bounds)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_template_names(&self) -> Vec<Option<String>> {
        self.pages
            .iter()
            .map(|page| page.template_name().map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    fill_color: Color,
    stroke_color: Color,
    line_width: Pt,
    font_size: Pt,
    font_name: String,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            font_size: Pt::from_f32(12.0),
            font_name: "Helvetica".to_string(),
        }
    }
}

pub struct Canvas {
    pages: Vec<Page>,
    current: Page,
    state_stack: Vec<GraphicsState>,
    current_state: GraphicsState,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            pages: Vec::new(),
            current: Page::new(page_size),
            state_stack: Vec::new(),
            current_state: GraphicsState::default(),
        }
    }

    pub fn page_size(&self) -> Size {
        self.current.page_size
    }

    /// Number of pages already completed with `show_page`.
    pub fn finished_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn save_state(&mut self) {
        self.state_stack.push(self.current_state.clone());
        self.current.commands.push(Command::SaveState);
    }

    pub fn restore_state(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.current_state = state;
            self.current.commands.push(Command::RestoreState);
        }
    }

    pub fn state_depth(&self) -> usize {
        self.state_stack.len()
    }

    /// Pops saved states until `depth` remain, closing whatever a drawer left open.
    pub fn restore_to_depth(&mut self, depth: usize) {
        while self.state_stack.len() > depth {
            self.restore_state();
        }
    }

    pub fn meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.current.commands.push(Command::Meta {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn record_flowable_bounds(&mut self, rect: Rect) {
        let value = format!(
            "{},{},{},{}",
            rect.x.to_milli_i64(),
            rect.y.to_milli_i64(),
            rect.width.to_milli_i64(),
            rect.height.to_milli_i64()
        );
        self.meta(META_FLOWABLE_BOUNDS_KEY, value);
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.current_state.fill_color == color {
            return;
        }
        self.current_state.fill_color = color;
        self.current.commands.push(Command::SetFillColor(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.current_state.stroke_color == color {
            return;
        }
        self.current_state.stroke_color = color;
        self.current.commands.push(Command::SetStrokeColor(color));
    }

    pub fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.current_state.line_width == width {
            return;
        }
        self.current_state.line_width = width;
        self.current.commands.push(Command::SetLineWidth(width));
    }

    pub fn set_font_name(&mut self, name: &str) {
        if self.current_state.font_name == name {
            return;
        }
        self.current_state.font_name = name.to_string();
        self.current
            .commands
            .push(Command::SetFontName(self.current_state.font_name.clone()));
    }

    pub fn set_font_size(&mut self, size: Pt) {
        if self.current_state.font_size == size {
            return;
        }
        self.current_state.font_size = size;
        self.current.commands.push(Command::SetFontSize(size));
    }

    pub fn move_to(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::LineTo { x, y });
    }

    pub fn fill(&mut self) {
        self.current.commands.push(Command::Fill);
    }

    pub fn stroke(&mut self) {
        self.current.commands.push(Command::Stroke);
    }

    pub fn draw_string(&mut self, x: Pt, y: Pt, text: impl Into<String>) {
        self.current.commands.push(Command::DrawString {
            x,
            y,
            text: text.into(),
        });
    }

    pub fn draw_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt) {
        self.current.commands.push(Command::DrawRect {
            x,
            y,
            width,
            height,
        });
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        self.draw_rect(rect.x, rect.y, rect.width, rect.height);
        self.fill();
    }

    pub fn stroke_rect(&mut self, rect: Rect) {
        self.draw_rect(rect.x, rect.y, rect.width, rect.height);
        self.stroke();
    }

    /// Position in the current page's command stream, for later `insert_commands`.
    pub fn mark(&self) -> usize {
        self.current.commands.len()
    }

    /// Splices self-contained commands into the current page at `mark`, so they
    /// render underneath everything recorded after that point. The block must
    /// balance its own save/restore; tracked graphics state is not touched.
    pub fn insert_commands(&mut self, mark: usize, commands: Vec<Command>) {
        let at = mark.min(self.current.commands.len());
        self.current.commands.splice(at..at, commands);
    }

    pub fn current_command_count(&self) -> usize {
        self.current.commands.len()
    }

    pub fn is_current_empty(&self) -> bool {
        self.current.commands.is_empty()
    }

    /// Completes the current page and starts a fresh one of `next_size`.
    pub fn show_page(&mut self, next_size: Size) {
        let current = std::mem::replace(&mut self.current, Page::new(next_size));
        self.pages.push(current);
        self.state_stack.clear();
        self.current_state = GraphicsState::default();
    }

    pub fn finish_without_show(self) -> Document {
        Document { pages: self.pages }
    }
}

fn parse_bounds(value: &str) -> Option<Rect> {
    let mut parts = value.split(',').map(|part| part.trim().parse::<i64>());
    let mut next = || parts.next()?.ok().map(Pt::from_milli_i64);
    Some(Rect {
        x: next()?,
        y: next()?,
        width: next()?,
        height: next()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redundant_state_changes_are_elided() {
        let mut canvas = Canvas::new(Size::letter());
        canvas.set_fill_color(Color::BLACK);
        canvas.set_fill_color(Color::LIGHT_BLUE);
        canvas.set_fill_color(Color::LIGHT_BLUE);
        assert_eq!(canvas.current_command_count(), 1);
    }

    #[test]
    fn restore_returns_to_saved_state() {
        let mut canvas = Canvas::new(Size::letter());
        canvas.save_state();
        canvas.set_fill_color(Color::LIGHT_GREEN);
        canvas.restore_state();
        assert_eq!(canvas.state_depth(), 0);
        // Black is current again, so this is elided.
        let before = canvas.current_command_count();
        canvas.set_fill_color(Color::BLACK);
        assert_eq!(canvas.current_command_count(), before);
    }

    #[test]
    fn restore_to_depth_closes_leaked_saves() {
        let mut canvas = Canvas::new(Size::letter());
        canvas.save_state();
        let depth = canvas.state_depth();
        canvas.save_state();
        canvas.save_state();
        canvas.restore_to_depth(depth);
        assert_eq!(canvas.state_depth(), 1);
    }

    #[test]
    fn unbalanced_restore_is_ignored() {
        let mut canvas = Canvas::new(Size::letter());
        canvas.restore_state();
        assert!(canvas.is_current_empty());
    }

    #[test]
    fn insert_commands_lands_before_later_content() {
        let mut canvas = Canvas::new(Size::letter());
        canvas.meta("k", "v");
        let mark = canvas.mark();
        canvas.draw_string(Pt::ZERO, Pt::ZERO, "hello");
        canvas.insert_commands(mark, vec![Command::SaveState, Command::RestoreState]);
        canvas.show_page(Size::letter());
        let doc = canvas.finish_without_show();
        let commands = &doc.pages[0].commands;
        assert!(matches!(commands[0], Command::Meta { .. }));
        assert_eq!(commands[1], Command::SaveState);
        assert_eq!(commands[2], Command::RestoreState);
        assert!(matches!(commands[3], Command::DrawString { .. }));
    }

    #[test]
    fn flowable_bounds_round_trip_through_meta() {
        let mut canvas = Canvas::new(Size::letter());
        let rect = Rect::new(86.0, 200.5, 264.0, 24.0);
        canvas.record_flowable_bounds(rect);
        canvas.meta(META_PAGE_TEMPLATE_KEY, "normal");
        canvas.show_page(Size::a4());
        let doc = canvas.finish_without_show();
        assert_eq!(doc.pages[0].flowable_bounds(), vec![rect]);
        assert_eq!(doc.page_template_names(), vec![Some("normal".to_string())]);
    }
}
