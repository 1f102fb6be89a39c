//! View — painting an editor into a [`ScreenBuffer`].
//!
//! An editor owns a rectangle of the screen: its [`Viewport`]. The top
//! `text_height` rows show the document; open prompts take the rows below,
//! the most recently opened one on top:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ if (x) {                     │ ← text area (scroll region)
//! │   y();                       │
//! │ }                            │
//! ├──────────────────────────────┤
//! │ Replace: bar                 │ ← innermost prompt
//! │ [re] Find: fo+               │
//! └──────────────────────────────┘
//! ```
//!
//! Painting walks every visible character through the lexer, the same way
//! the cursor would, so each cell's style is exactly the lexical state at
//! that character. One cell is one character: rows are not wrapped, and
//! characters that don't occupy exactly one terminal column are replaced by
//! the screen buffer.

use quill_term::cell::Style;
use quill_term::screen::{ScreenBuffer, ScrollDirection};

use crate::editor::Editor;
use crate::position::{Position, Span};
use crate::theme::StyleTag;

/// The part of the document on screen, and the size of the editor's area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// First visible row.
    pub top: usize,
    /// First visible column.
    pub left: usize,
    pub width: u16,
    /// Rows for the text area plus open prompts.
    pub height: u16,
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

impl Editor {
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Give the editor a `width × height` area.
    pub const fn set_size(&mut self, width: u16, height: u16) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    /// Rows left for the document once prompts have taken theirs.
    #[must_use]
    pub fn text_height(&self) -> usize {
        usize::from(self.viewport.height).saturating_sub(self.prompts.len())
    }

    /// Scroll so the cursor is visible. Returns the direction the text moved
    /// when the viewport moved by exactly one row or one column.
    pub fn scroll_to_cursor(&mut self) -> Option<ScrollDirection> {
        let pos = self.cursor.position();
        let height = self.text_height();
        let width = usize::from(self.viewport.width);
        let old = self.viewport;

        if height > 0 {
            if pos.row < self.viewport.top {
                self.viewport.top = pos.row;
            } else if pos.row >= self.viewport.top + height {
                self.viewport.top = pos.row + 1 - height;
            }
        }
        if width > 0 {
            if pos.col < self.viewport.left {
                self.viewport.left = pos.col;
            } else if pos.col >= self.viewport.left + width {
                self.viewport.left = pos.col + 1 - width;
            }
        }

        let new = self.viewport;
        let direction = if new.left == old.left && new.top == old.top + 1 {
            Some(ScrollDirection::Up)
        } else if new.left == old.left && new.top + 1 == old.top {
            Some(ScrollDirection::Down)
        } else if new.top == old.top && new.left == old.left + 1 {
            Some(ScrollDirection::Left)
        } else if new.top == old.top && new.left + 1 == old.left {
            Some(ScrollDirection::Right)
        } else {
            None
        };
        if let Some(direction) = direction {
            tracing::trace!("viewport scrolled {direction:?} to {},{}", new.top, new.left);
        }
        direction
    }

    /// Paint the editor into the top-left of `screen`, with the text area as
    /// the scroll region. Returns the direction to pass to
    /// [`ScreenBuffer::draw`].
    pub fn paint(&mut self, screen: &mut ScreenBuffer) -> Option<ScrollDirection> {
        let scroll = self.paint_at(screen, 0, 0);
        screen.set_scroll_region(0, to_u16(self.text_height()));
        scroll
    }

    /// Paint the editor with its top-left corner at `(x0, y0)`.
    fn paint_at(&mut self, screen: &mut ScreenBuffer, x0: u16, y0: u16) -> Option<ScrollDirection> {
        let scroll = self.scroll_to_cursor();
        let saved = self.cursor.position();
        let height = self.text_height();
        let width = usize::from(self.viewport.width);
        let Viewport { top, left, .. } = self.viewport;
        let selection = self.cursor.selection();

        for y in 0..height {
            let row = top + y;
            let screen_row = y0 + to_u16(y);
            let painted = if row < self.doc.row_count() {
                self.paint_row(screen, row, selection, (x0, screen_row))
            } else {
                0
            };
            for x in painted..width {
                screen.set(x0 + to_u16(x), screen_row, ' ', Style::PLAIN);
            }
        }
        self.move_to(saved);

        screen.set_cursor(
            x0 + to_u16(saved.col.saturating_sub(left)),
            y0 + to_u16(saved.row.saturating_sub(top)),
        );
        self.paint_prompts(screen, x0, y0 + to_u16(height));
        scroll
    }

    /// Paint the visible part of `row`. Returns the number of cells written.
    fn paint_row(
        &mut self,
        screen: &mut ScreenBuffer,
        row: usize,
        selection: Option<Span>,
        (x0, y): (u16, u16),
    ) -> usize {
        let Viewport { left, width, .. } = self.viewport;
        let end = self.doc.row_len(row).min(left + usize::from(width));
        let engine = self.engine();

        self.move_to(Position::new(row, 0));
        for col in 0..end {
            let ch = self.peek();
            let before = engine.style(self.state());
            self.forward();
            if col < left {
                continue;
            }
            let tag = if selection.is_some_and(|span| span.contains(Position::new(row, col))) {
                Some(StyleTag::Selected)
            } else {
                engine.style_of_prior_char(self.state()).or(before)
            };
            screen.set(x0 + to_u16(col - left), y, ch, self.theme.style(tag));
        }
        end.saturating_sub(left)
    }

    /// Paint prompts from `y` down, the innermost on top. The innermost is
    /// painted last so it gets the cursor.
    fn paint_prompts(&mut self, screen: &mut ScreenBuffer, x0: u16, y: u16) {
        let count = self.prompts.len();
        let width = self.viewport.width;
        let label_style = self.theme.style(Some(StyleTag::Prompt));
        for (i, prompt) in self.prompts.iter_mut().enumerate() {
            let row = y + to_u16(count - 1 - i);
            let label = prompt.label();
            let x = screen.put_str(x0, row, &label, label_style).min(x0 + width);
            prompt.field.set_size(width - (x - x0), 1);
            prompt.field.paint_at(screen, x, row);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
