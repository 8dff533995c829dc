#![forbid(unsafe_code)]

//! The single-threaded compositor loop.
//!
//! One [`Compositor`] owns the widget tree, the dispatcher, the frame canvas
//! and the output. Each turn of [`Compositor::run`]:
//!
//! 1. fires due timers (animations ride on an internal frame timer);
//! 2. renders a frame if anything is dirty and the frame interval elapsed:
//!    paint dirty widgets, compose into the frame, overlay the drag preview,
//!    write the buffered ANSI diff, then emit `frameRendered`;
//! 3. waits for input until the next timer, the next allowed frame or the
//!    poll timeout, whichever is first, and dispatches everything queued.
//!
//! The loop ends when a quit was requested or the event source closed. For a
//! fixed sequence of events and timers the written bytes are identical.

use std::collections::HashMap;
use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, info, trace};
use ttk_core::event::{Event, MouseEvent};
use ttk_core::gesture::ClickTracker;
use ttk_core::keybinding::KeyCombo;
use ttk_core::signal::Signal;
use ttk_core::{Point, Result};
use ttk_render::{Canvas, Draw, ansi};
use ttk_style::{Color, ColorProfile, Theme};
use ttk_widgets::{Dispatcher, WidgetTree};

use crate::animation::Animation;
use crate::config::{AppConfig, ScreenMode};
use crate::context::{Context, QuitHandle};
use crate::event_source::EventSource;
use crate::timer::{TimerId, TimerQueue};

struct Running {
    animation: Box<dyn Animation>,
    last_tick: Instant,
}

pub struct Compositor<S: EventSource, W: Write> {
    tree: WidgetTree,
    dispatcher: Dispatcher,
    context: Context,
    timers: TimerQueue,
    timer_signals: HashMap<TimerId, Signal<()>>,
    animations: Vec<Running>,
    animation_timer: Option<TimerId>,
    clicks: ClickTracker,
    frame: Canvas,
    /// Terminal row of the frame's first line; non-zero in inline mode.
    top: u16,
    profile: ColorProfile,
    config: AppConfig,
    source: S,
    out: W,
    last_frame: Option<Instant>,
    frames: u64,
    force_frame: bool,
    preview_at: Option<Point>,
    /// Fired after each frame is written, with the frame number.
    pub frame_rendered: Signal<u64>,
}

impl<S: EventSource, W: Write> std::fmt::Debug for Compositor<S, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("frame", &self.frame.size())
            .field("top", &self.top)
            .field("profile", &self.profile)
            .field("frames", &self.frames)
            .field("timers", &self.timers.len())
            .field("animations", &self.animations.len())
            .finish_non_exhaustive()
    }
}

/// Frame size and top row for a terminal of `width` x `height`.
fn frame_geometry(mode: ScreenMode, width: u16, height: u16) -> (u16, u16, u16) {
    match mode {
        ScreenMode::AltScreen => (width, height, 0),
        ScreenMode::Inline { height: rows } => {
            let rows = rows.min(height);
            (width, rows, height - rows)
        }
    }
}

impl<S: EventSource, W: Write> Compositor<S, W> {
    /// Build a compositor for `tree`, sizing the root widget to the screen.
    ///
    /// `Auto` color profiles are detected from the process environment.
    pub fn new(tree: WidgetTree, source: S, out: W, config: AppConfig) -> Result<Self> {
        let profile = config.resolve_color_profile(|key| std::env::var(key).ok());
        Self::with_profile(tree, source, out, config, profile)
    }

    /// Like [`new`](Self::new) with an explicit color profile.
    pub fn with_profile(
        tree: WidgetTree,
        source: S,
        out: W,
        config: AppConfig,
        profile: ColorProfile,
    ) -> Result<Self> {
        let (width, height) = source.size()?;
        let (fw, fh, top) = frame_geometry(config.screen_mode, width, height);
        let mut compositor = Self {
            tree,
            dispatcher: Dispatcher::new(),
            context: Context::default(),
            timers: TimerQueue::new(),
            timer_signals: HashMap::new(),
            animations: Vec::new(),
            animation_timer: None,
            clicks: ClickTracker::new(config.double_click_interval),
            frame: Canvas::new(fw, fh),
            top,
            profile,
            config,
            source,
            out,
            last_frame: None,
            frames: 0,
            force_frame: true,
            preview_at: None,
            frame_rendered: Signal::new("frameRendered"),
        };
        compositor.fit_root()?;
        debug!(width = fw, height = fh, top, ?profile, "compositor ready");
        Ok(compositor)
    }

    // ── accessors ──

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The last composed frame.
    pub fn frame(&self) -> &Canvas {
        &self.frame
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn profile(&self) -> ColorProfile {
        self.profile
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    // ── application hooks ──

    /// Replace the theme, broadcast `themeChanged` and repaint everything.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.context.set_theme(theme)?;
        self.tree.update_all();
        Ok(())
    }

    /// Signal fired when `combo` is pressed, before any widget sees the key.
    pub fn shortcut(&mut self, combo: KeyCombo) -> Signal<()> {
        self.dispatcher.shortcut(combo)
    }

    pub fn quit(&mut self) {
        self.context.quit();
    }

    /// A handle receivers can capture to stop the loop.
    pub fn quit_handle(&self) -> QuitHandle {
        self.context.quit_handle()
    }

    pub fn quit_requested(&self) -> bool {
        self.context.quit_requested() || self.dispatcher.quit_requested()
    }

    /// Start a timer; its signal fires from the loop after `delay`, and
    /// again every `delay` when `repeat` is set.
    pub fn timer(&mut self, delay: Duration, repeat: bool) -> (TimerId, Signal<()>) {
        self.timer_at(Instant::now(), delay, repeat)
    }

    /// [`timer`](Self::timer) measured from `now`.
    pub fn timer_at(&mut self, now: Instant, delay: Duration, repeat: bool) -> (TimerId, Signal<()>) {
        let id = self.timers.start(now, delay, repeat);
        let signal = Signal::new("timeout");
        self.timer_signals.insert(id, signal.clone());
        trace!(timer = id.get(), ?delay, repeat, "timer started");
        (id, signal)
    }

    pub fn stop_timer(&mut self, id: TimerId) -> bool {
        self.timer_signals.remove(&id);
        self.timers.stop(id)
    }

    /// Drive `animation` from the frame timer until it completes.
    ///
    /// It is ticked once right away with zero elapsed time, so the start
    /// value is reported before the first frame.
    pub fn animate(&mut self, animation: impl Animation + 'static) -> Result<()> {
        self.animate_at(Instant::now(), animation)
    }

    pub fn animate_at(&mut self, now: Instant, mut animation: impl Animation + 'static) -> Result<()> {
        animation.tick(Duration::ZERO)?;
        if animation.is_complete() {
            return Ok(());
        }
        self.animations.push(Running {
            animation: Box::new(animation),
            last_tick: now,
        });
        if self.animation_timer.is_none() {
            let interval = self.config.frame_interval.max(Duration::from_millis(1));
            self.animation_timer = Some(self.timers.start(now, interval, true));
        }
        Ok(())
    }

    pub fn running_animations(&self) -> usize {
        self.animations.len()
    }

    // ── events ──

    /// Route one event. Resizes are handled here; mouse events go through
    /// click recognition first. Returns whether something consumed it.
    pub fn handle_event(&mut self, event: Event, now: Instant) -> Result<bool> {
        match event {
            Event::Resize { width, height } => {
                self.resize(width, height)?;
                Ok(true)
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Focus(gained) => {
                if !gained {
                    self.clicks.reset();
                }
                self.dispatcher.dispatch(&mut self.tree, &Event::Focus(gained))
            }
            other => self.dispatcher.dispatch(&mut self.tree, &other),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> Result<bool> {
        let mut handled = false;
        for ev in self.clicks.process(mouse, now) {
            handled |= self.dispatcher.dispatch_mouse(&mut self.tree, &ev)?;
        }
        Ok(handled)
    }

    /// Adopt a new terminal size: resize the frame and the root, repaint
    /// every cell on the next frame.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        let (fw, fh, top) = frame_geometry(self.config.screen_mode, width, height);
        info!(width, height, "terminal resized");
        self.frame.resize(fw, fh);
        self.frame.full_repaint();
        self.top = top;
        self.clicks.reset();
        self.fit_root()?;
        self.tree.update_all();
        self.force_frame = true;
        Ok(())
    }

    fn fit_root(&mut self) -> Result<()> {
        let (w, h) = (self.frame.width(), self.frame.height());
        match self.tree.root() {
            Some(root) if w > 0 && h > 0 => {
                self.tree
                    .set_geometry(root, 0, 0, i32::from(w), i32::from(h))
            }
            _ => Ok(()),
        }
    }

    // ── timers ──

    /// Fire every timer due at `now`, then advance animations if the frame
    /// timer was among them.
    pub fn fire_timers(&mut self, now: Instant) -> Result<()> {
        for id in self.timers.fire_due(now) {
            if Some(id) == self.animation_timer {
                self.tick_animations(now)?;
                continue;
            }
            let signal = self.timer_signals.get(&id).cloned();
            if !self.timers.is_active(id) {
                self.timer_signals.remove(&id);
            }
            if let Some(signal) = signal {
                signal.emit(&())?;
            }
        }
        Ok(())
    }

    fn tick_animations(&mut self, now: Instant) -> Result<()> {
        for running in &mut self.animations {
            let dt = now.saturating_duration_since(running.last_tick);
            running.last_tick = now;
            running.animation.tick(dt)?;
        }
        self.animations.retain(|r| !r.animation.is_complete());
        if self.animations.is_empty() {
            if let Some(id) = self.animation_timer.take() {
                self.timers.stop(id);
            }
        }
        Ok(())
    }

    // ── rendering ──

    fn frame_wanted(&self) -> bool {
        let preview = self.dispatcher.drag().map(|d| d.preview_origin());
        self.force_frame || self.tree.needs_repaint() || preview != self.preview_at
    }

    /// Render now if anything changed, ignoring the frame interval. Returns
    /// whether a frame was written.
    pub fn render(&mut self) -> Result<bool> {
        self.render_at(Instant::now())
    }

    fn render_at(&mut self, now: Instant) -> Result<bool> {
        if !self.frame_wanted() {
            return Ok(false);
        }
        let _span = debug_span!("ttk.compositor.frame", frame = self.frames).entered();
        self.frame.clear_all();
        let painted = self.tree.render(self.context.theme(), &mut self.frame);
        self.preview_at = self.draw_drag_preview();

        let diff = self.frame.to_ansi_buffered_at(self.top, self.profile);
        if !diff.is_empty() {
            self.out.write_all(ansi::SYNC_BEGIN.as_bytes())?;
            self.out.write_all(diff.as_bytes())?;
            self.out.write_all(ansi::SYNC_END.as_bytes())?;
            self.out.flush()?;
        }
        trace!(painted, bytes = diff.len(), "frame written");

        self.force_frame = false;
        self.last_frame = Some(now);
        let number = self.frames;
        self.frames += 1;
        self.frame_rendered.emit(&number)?;
        Ok(true)
    }

    fn draw_drag_preview(&mut self) -> Option<Point> {
        let drag = self.dispatcher.drag()?;
        let at = drag.preview_origin();
        match (&drag.preview, &drag.payload.display_text) {
            (Some(preview), _) => {
                let clip = self.frame.area();
                self.frame.blit(preview, preview.area(), at, clip);
            }
            (None, Some(text)) => self.frame.draw_str(at, text, &Color::REVERSED),
            (None, None) => {}
        }
        Some(at)
    }

    /// Render if a frame is wanted and the frame interval allows it.
    fn render_if_due(&mut self, now: Instant) -> Result<bool> {
        match self.last_frame {
            Some(last) if now.saturating_duration_since(last) < self.config.frame_interval => Ok(false),
            _ => self.render_at(now),
        }
    }

    /// How long the loop may block before something is due.
    fn wait_timeout(&mut self, now: Instant) -> Duration {
        let mut timeout = self.config.poll_timeout;
        if let Some(deadline) = self.timers.next_deadline() {
            timeout = timeout.min(deadline.saturating_duration_since(now));
        }
        if self.frame_wanted() {
            if let Some(last) = self.last_frame {
                let next = last + self.config.frame_interval;
                timeout = timeout.min(next.saturating_duration_since(now));
            }
        }
        timeout
    }

    // ── loop ──

    /// Write the start-of-session bytes: title, screen clear or the inline
    /// area reservation.
    pub fn start(&mut self) -> Result<()> {
        let mut pre = String::new();
        if let Some(title) = &self.config.title {
            ansi::set_title(&mut pre, title);
        }
        match self.config.screen_mode {
            ScreenMode::AltScreen => pre.push_str(ansi::CLEAR_SCREEN),
            ScreenMode::Inline { .. } => {
                for _ in 0..self.frame.height() {
                    pre.push('\n');
                }
            }
        }
        self.out.write_all(pre.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Reset attributes and, inline, leave the cursor under the UI.
    pub fn finish(&mut self) -> Result<()> {
        let mut post = String::from(ansi::SGR_RESET);
        if matches!(self.config.screen_mode, ScreenMode::Inline { .. }) {
            let last = usize::from(self.top) + usize::from(self.frame.height().saturating_sub(1));
            ansi::cup(&mut post, 0, last);
            post.push_str("\r\n");
        }
        self.out.write_all(post.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Run until quit or until the event source closes.
    ///
    /// A receiver error stops the loop and is returned; the closing bytes
    /// are written either way.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        info!("compositor loop started");
        let result = self.run_loop();
        let finished = self.finish();
        info!(frames = self.frames, ok = result.is_ok(), "compositor loop stopped");
        result.and(finished)
    }

    fn run_loop(&mut self) -> Result<()> {
        loop {
            self.fire_timers(Instant::now())?;
            if self.quit_requested() {
                return Ok(());
            }
            if self.source.is_closed() {
                self.render_at(Instant::now())?;
                return Ok(());
            }
            self.render_if_due(Instant::now())?;

            let timeout = self.wait_timeout(Instant::now());
            let mut next = self.source.poll(timeout)?;
            while let Some(event) = next {
                self.handle_event(event, Instant::now())?;
                if self.quit_requested() {
                    return Ok(());
                }
                next = self.source.poll(Duration::ZERO)?;
            }
        }
    }
}
