#![forbid(unsafe_code)]

//! Single-line styled text.

use ttk_core::{Result, Size};
use ttk_layout::Hints;
use ttk_render::{Canvas, Draw};
use ttk_text::{Alignment, StyledString};

use crate::widget::{PaintCx, Widget};

#[derive(Debug, Clone, Default)]
pub struct Label {
    text: StyledString,
    alignment: Alignment,
}

impl Label {
    pub fn new(text: impl Into<StyledString>) -> Self {
        Self {
            text: text.into(),
            alignment: Alignment::default(),
        }
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn text(&self) -> &StyledString {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<StyledString>) {
        self.text = text.into();
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }
}

impl Widget for Label {
    fn class_name(&self) -> &'static str {
        "Label"
    }

    fn size_hint(&self) -> Hints {
        let width = u16::try_from(self.text.width()).unwrap_or(u16::MAX);
        Hints {
            min: Size::new(width, 1),
            max: Size::new(u16::MAX, 1),
        }
    }

    fn paint(&self, canvas: &mut Canvas, cx: &PaintCx<'_>) -> Result<()> {
        let color = cx.style.color("color");
        canvas.draw_text_aligned(
            (0, 0),
            &self.text,
            usize::from(cx.size.width),
            self.alignment,
            &color,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ttk_style::Theme;

    use super::*;
    use crate::WidgetTree;

    #[test]
    fn centered_label_paints_in_its_rectangle() {
        let mut tree = WidgetTree::new();
        let label = tree.add(Label::new("hi").with_alignment(Alignment::Center));
        tree.set_root(label).unwrap();
        tree.set_geometry(label, 0, 0, 6, 1).unwrap();
        let mut frame = Canvas::new(6, 1);
        tree.render(&Theme::utf8(), &mut frame);
        assert_eq!(frame.row_text(0).unwrap(), "  hi  ");
    }

    #[test]
    fn hint_is_one_line_at_text_width() {
        let label = Label::new("hello");
        assert_eq!(label.size_hint().min, Size::new(5, 1));
        assert_eq!(label.size_hint().max.height, 1);
    }
}
