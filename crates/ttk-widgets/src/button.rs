#![forbid(unsafe_code)]

//! Push button, optionally checkable.

use ttk_core::event::{KeyCode, KeyEvent, MouseButton, MouseEvent};
use ttk_core::signal::Signal;
use ttk_core::{Result, Size};
use ttk_layout::Hints;
use ttk_render::{Canvas, Draw};
use ttk_text::{Alignment, StyledString};

use crate::widget::{EventCx, FocusPolicy, PaintCx, Widget};

/// Emits `clicked` when released over itself after a press, or on
/// Enter/Space. A checkable button flips its state first and emits
/// `toggled(checked)`.
///
/// With three or more rows it draws the theme's button box around the text.
#[derive(Debug)]
pub struct Button {
    text: StyledString,
    checkable: bool,
    checked: bool,
    pub clicked: Signal<()>,
    pub toggled: Signal<bool>,
}

impl Button {
    pub fn new(text: impl Into<StyledString>) -> Self {
        Self {
            text: text.into(),
            checkable: false,
            checked: false,
            clicked: Signal::new("clicked"),
            toggled: Signal::new("toggled"),
        }
    }

    #[must_use]
    pub fn checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    pub fn text(&self) -> &StyledString {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<StyledString>) {
        self.text = text.into();
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Emits `toggled` when the state changes.
    pub fn set_checked(&mut self, checked: bool) -> Result<()> {
        if self.checkable && self.checked != checked {
            self.checked = checked;
            self.toggled.emit(&checked)?;
        }
        Ok(())
    }

    fn activate(&mut self, cx: &mut EventCx) -> Result<()> {
        if self.checkable {
            self.set_checked(!self.checked)?;
        }
        cx.update();
        self.clicked.emit(&())?;
        Ok(())
    }
}

impl Widget for Button {
    fn class_name(&self) -> &'static str {
        "Button"
    }

    fn size_hint(&self) -> Hints {
        let width = u16::try_from(self.text.width()).unwrap_or(u16::MAX - 2) + 2;
        Hints {
            min: Size::new(width, 1),
            max: Size::MAX,
        }
    }

    fn focus_policy(&self) -> FocusPolicy {
        FocusPolicy::STRONG
    }

    fn checked(&self) -> Option<bool> {
        self.checkable.then_some(self.checked)
    }

    fn paint(&self, canvas: &mut Canvas, cx: &PaintCx<'_>) -> Result<()> {
        let Size { width, height } = cx.size;
        let text_color = cx.style.color("color");
        let (row, left, inner) = if height >= 3 {
            let border = cx.style.color("borderColor");
            canvas.draw_button_box((0, 0), (width, height), &border, &cx.theme.button_box);
            (height / 2, 1, width.saturating_sub(2))
        } else {
            (0, 0, width)
        };
        canvas.draw_text_aligned(
            (i32::from(left), i32::from(row)),
            &self.text,
            usize::from(inner),
            Alignment::Center,
            &text_color,
        );
        Ok(())
    }

    fn mouse_press(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        if ev.button != MouseButton::Left {
            return Ok(false);
        }
        cx.update();
        Ok(true)
    }

    fn mouse_drag(&mut self, _ev: &MouseEvent, _cx: &mut EventCx) -> Result<bool> {
        Ok(true)
    }

    fn mouse_release(&mut self, ev: &MouseEvent, cx: &mut EventCx) -> Result<bool> {
        cx.update();
        if cx.contains(ev.x, ev.y) {
            self.activate(cx)?;
        }
        Ok(true)
    }

    fn key(&mut self, ev: &KeyEvent, cx: &mut EventCx) -> Result<bool> {
        match ev.code {
            KeyCode::Enter | KeyCode::Char(' ') if ev.modifiers.is_empty() => {
                self.activate(cx)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
