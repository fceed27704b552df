use crate::canvas::Canvas;
use crate::flowable::{Flowable, SplitResult};
use crate::paragraph::{TextStyle, wrap_text};
use crate::types::{Color, Pt, Rect, Size};

/// Grid of text cells that splits between rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Vec<String>>,
    col_widths: Option<Vec<Pt>>,
    style: TextStyle,
    padding: Pt,
    repeat_rows: usize,
    grid: Option<Color>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            col_widths: None,
            style: TextStyle::default(),
            padding: Pt::from_f32(3.0),
            repeat_rows: 0,
            grid: None,
        }
    }

    pub fn with_col_widths(mut self, widths: &[f32]) -> Self {
        self.col_widths = Some(widths.iter().map(|w| Pt::from_f32(*w)).collect());
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = Pt::from_f32(padding);
        self
    }

    /// Leading rows repeated at the top of every continuation.
    pub fn with_repeat_rows(mut self, rows: usize) -> Self {
        self.repeat_rows = rows;
        self
    }

    pub fn with_grid(mut self, color: Color) -> Self {
        self.grid = Some(color);
        self
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn column_count(&self) -> usize {
        let from_rows = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        match &self.col_widths {
            Some(widths) => widths.len().max(from_rows),
            None => from_rows,
        }
    }

    fn column_widths(&self, avail_width: Pt) -> Vec<Pt> {
        let columns = self.column_count();
        if columns == 0 {
            return Vec::new();
        }
        match &self.col_widths {
            Some(widths) if widths.len() >= columns => widths.clone(),
            Some(widths) => {
                // Columns without an explicit width share what is left.
                let fixed: Pt = widths.iter().sum();
                let open = (columns - widths.len()) as i32;
                let share = (avail_width - fixed).max(Pt::ZERO).mul_ratio(1, open);
                let mut out = widths.clone();
                out.resize(columns, share);
                out
            }
            None => vec![avail_width.mul_ratio(1, columns as i32); columns],
        }
    }

    fn cell_lines(&self, text: &str, col_width: Pt) -> usize {
        let inner = (col_width - self.padding * 2).max(Pt::ZERO);
        wrap_text(text, &self.style, inner).len().max(1)
    }

    fn row_heights(&self, col_widths: &[Pt]) -> Vec<Pt> {
        self.rows
            .iter()
            .map(|row| {
                let lines = row
                    .iter()
                    .zip(col_widths)
                    .map(|(cell, width)| self.cell_lines(cell, *width))
                    .max()
                    .unwrap_or(1);
                self.style.leading * (lines as i32) + self.padding * 2
            })
            .collect()
    }

    fn with_rows(&self, rows: Vec<Vec<String>>) -> Table {
        Table {
            rows,
            ..self.clone()
        }
    }

    pub fn required_space(&self, avail_width: Pt) -> Size {
        let widths = self.column_widths(avail_width);
        Size {
            width: widths.iter().sum(),
            height: self.row_heights(&widths).iter().sum(),
        }
    }

    pub fn split(&self, avail_width: Pt, avail_height: Pt) -> SplitResult {
        let widths = self.column_widths(avail_width);
        let heights = self.row_heights(&widths);
        let mut used = Pt::ZERO;
        let mut fitting = 0usize;
        for height in &heights {
            if used + *height > avail_height {
                break;
            }
            used = used + *height;
            fitting += 1;
        }
        if fitting == self.rows.len() {
            return SplitResult::whole(Flowable::Table(self.clone()));
        }
        // A part made only of repeated header rows would never make progress.
        let header = self.repeat_rows.min(self.rows.len());
        if fitting <= header {
            return SplitResult::nothing(Flowable::Table(self.clone()));
        }
        let fitted = self.with_rows(self.rows[..fitting].to_vec());
        let mut rest = self.rows[..header].to_vec();
        rest.extend_from_slice(&self.rows[fitting..]);
        let remainder = self.with_rows(rest);
        SplitResult {
            fitted: Some(Flowable::Table(fitted)),
            remainder: Some(Flowable::Table(remainder)),
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt) {
        let widths = self.column_widths(avail_width);
        let heights = self.row_heights(&widths);
        canvas.set_fill_color(self.style.color);
        canvas.set_font_name(&self.style.font_name);
        canvas.set_font_size(self.style.font_size);
        if let Some(color) = self.grid {
            canvas.set_stroke_color(color);
        }

        let mut row_y = y;
        for (row, row_height) in self.rows.iter().zip(&heights) {
            let mut cell_x = x;
            for (col, width) in widths.iter().enumerate() {
                if let Some(text) = row.get(col) {
                    let inner = (*width - self.padding * 2).max(Pt::ZERO);
                    let mut line_y = row_y + self.padding;
                    for line in wrap_text(text, &self.style, inner) {
                        canvas.draw_string(cell_x + self.padding, line_y, line.text);
                        line_y = line_y + self.style.leading;
                    }
                }
                if self.grid.is_some() {
                    canvas.stroke_rect(Rect {
                        x: cell_x,
                        y: row_y,
                        width: *width,
                        height: *row_height,
                    });
                }
                cell_x = cell_x + *width;
            }
            row_y = row_y + *row_height;
        }
    }
}
