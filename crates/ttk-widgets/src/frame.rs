#![forbid(unsafe_code)]

//! Bordered container with an optional title in the top edge.

use ttk_core::{Result, Sides};
use ttk_render::{Canvas, Draw};
use ttk_style::theme::GridStyle;
use ttk_text::{Alignment, StyledString};

use crate::widget::{PaintCx, Widget};

#[derive(Debug, Clone, Default)]
pub struct Frame {
    title: Option<StyledString>,
    alignment: Alignment,
    grid: GridStyle,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<StyledString>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, grid: GridStyle) -> Self {
        self.grid = grid;
        self
    }

    pub fn title(&self) -> Option<&StyledString> {
        self.title.as_ref()
    }

    pub fn set_title(&mut self, title: Option<StyledString>) {
        self.title = title;
    }
}

impl Widget for Frame {
    fn class_name(&self) -> &'static str {
        "Frame"
    }

    fn padding(&self) -> Sides {
        Sides::all(1)
    }

    fn paint(&self, canvas: &mut Canvas, cx: &PaintCx<'_>) -> Result<()> {
        let border = cx.style.color("borderColor");
        let grid = cx.theme.grid(self.grid);
        canvas.draw_box((0, 0), cx.size, &border, grid);
        if let Some(title) = &self.title {
            canvas.draw_box_title((0, 0), cx.size.width, title, self.alignment, &border, grid);
        }
        Ok(())
    }
}
