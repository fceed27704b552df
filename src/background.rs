use crate::canvas::Command;
use crate::frame::Frame;
use crate::markers::{BackgroundMode, FrameBackground};
use crate::types::{Color, Pt, Rect};
use std::collections::HashMap;

/// Background paint descriptor of one frame id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintState {
    Off,
    /// Running from `from_y` (frame-relative) to the frame bottom.
    TailActive {
        color: Color,
        from_y: Pt,
        left: Pt,
        right: Pt,
    },
    FullActive {
        color: Color,
        left: Pt,
        right: Pt,
    },
    /// Survives page turnover until an explicit stop.
    PermanentActive {
        color: Color,
        left: Pt,
        right: Pt,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundFill {
    pub rect: Rect,
    pub color: Color,
}

/// Per-frame-id paint state owned by the driver, outliving per-page frame resets.
///
/// Fills are resolved when a frame visit closes and slotted in underneath the
/// visit's content, so the state in force at that moment decides what a page
/// shows. A tail segment interrupted by another marker is committed up to the
/// cursor where it was interrupted.
///
/// Permanent paint is kept apart from page-only paint. A page-only start
/// overrides it for the rest of the current page; the next page shows the
/// permanent paint again. Only a stop clears it.
#[derive(Debug, Default)]
pub struct BackgroundRegistry {
    page: HashMap<String, PaintState>,
    permanent: HashMap<String, PaintState>,
    committed: Vec<BackgroundFill>,
}

impl BackgroundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint currently in force for `frame_id` on this page.
    pub fn state(&self, frame_id: &str) -> PaintState {
        self.page
            .get(frame_id)
            .or_else(|| self.permanent.get(frame_id))
            .copied()
            .unwrap_or(PaintState::Off)
    }

    /// Applies a marker to the frame it was met in. Last writer wins on the page.
    pub fn apply(&mut self, frame: &Frame, marker: &FrameBackground) {
        let cursor = frame.cursor_y();
        let previous = self.state(frame.id());
        if let PaintState::TailActive {
            color,
            from_y,
            left,
            right,
        } = previous
        {
            if cursor > from_y {
                let band = Rect {
                    height: cursor - from_y,
                    ..frame.rect().below(from_y)
                };
                self.committed.push(BackgroundFill {
                    rect: band.inset_horizontal(left, right),
                    color,
                });
            }
        }

        let color = marker.color.unwrap_or(Color::WHITE);
        let (left, right) = (marker.left, marker.right);
        let id = frame.id().to_string();
        match marker.mode {
            BackgroundMode::Stop => {
                self.page.remove(&id);
                self.permanent.remove(&id);
            }
            BackgroundMode::Tail => {
                let state = PaintState::TailActive {
                    color,
                    from_y: cursor,
                    left,
                    right,
                };
                self.page.insert(id, state);
            }
            BackgroundMode::Frame => {
                self.page
                    .insert(id, PaintState::FullActive { color, left, right });
            }
            BackgroundMode::FramePermanent => {
                self.page.remove(&id);
                self.permanent
                    .insert(id, PaintState::PermanentActive { color, left, right });
            }
        }
        log::debug!(
            "frame {}: background {:?} -> {:?}",
            frame.id(),
            previous,
            self.state(frame.id())
        );
    }

    /// Fills owed by the frame visit that is ending.
    pub fn close_visit(&mut self, frame: &Frame) -> Vec<BackgroundFill> {
        let mut fills = std::mem::take(&mut self.committed);
        fills.extend(state_fill(self.state(frame.id()), frame.rect()));
        fills
    }

    /// Fill for a frame the page never entered. Only permanent paint applies there.
    pub fn unvisited_fill(&self, frame: &Frame) -> Option<BackgroundFill> {
        let state = self.permanent.get(frame.id()).copied()?;
        state_fill(state, frame.rect())
    }

    /// Page turnover: page-only paint ends, permanent paint shows again.
    pub fn reset_page(&mut self) {
        self.committed.clear();
        self.page.clear();
    }
}

fn state_fill(state: PaintState, frame_rect: Rect) -> Option<BackgroundFill> {
    match state {
        PaintState::Off => None,
        PaintState::TailActive {
            color,
            from_y,
            left,
            right,
        } => Some(BackgroundFill {
            rect: frame_rect.below(from_y).inset_horizontal(left, right),
            color,
        }),
        PaintState::FullActive { color, left, right }
        | PaintState::PermanentActive { color, left, right } => Some(BackgroundFill {
            rect: frame_rect.inset_horizontal(left, right),
            color,
        }),
    }
}

/// Self-contained command block painting `fills`, each inside its own save/restore.
pub fn fill_commands(fills: &[BackgroundFill]) -> Vec<Command> {
    let mut commands = Vec::with_capacity(fills.len() * 5);
    for fill in fills {
        if fill.rect.width <= Pt::ZERO || fill.rect.height <= Pt::ZERO {
            continue;
        }
        commands.push(Command::SaveState);
        commands.push(Command::SetFillColor(fill.color));
        commands.push(Command::DrawRect {
            x: fill.rect.x,
            y: fill.rect.y,
            width: fill.rect.width,
            height: fill.rect.height,
        });
        commands.push(Command::Fill);
        commands.push(Command::RestoreState);
    }
    commands
}
