//! The animation loop.
//!
//! An [`Animator`] is driven by a [`FrameHost`], which supplies the clock and the "call me on
//! the next frame" primitive. Every scheduled callback lands in [`Animator::tick`], which
//! reschedules first, drops frames that arrive before the speed-derived delay has passed, and
//! otherwise draws the active style into an offscreen buffer and copies it to the visible
//! surface. A failing frame stops the animation.

use raqote::Source;
use serde::{Deserialize, Serialize};

use crate::art::Studio;
use crate::config::Settings;
use crate::error::RenderResult;
use crate::layers::Frame;
use crate::styles::ArtStyle;
use crate::surface::Surface;

/// Hard ceiling on accepted frames per second.
pub const FPS_CEILING: f64 = 60.0;
/// Minimum spacing of accepted pointer updates, in milliseconds.
pub const POINTER_THROTTLE_MS: f64 = 16.0;
/// Alpha of the background wash laid over the previous frame, leaving motion trails.
pub const TRAIL_ALPHA: u8 = 0x40;
pub const DEFAULT_SPEED: f64 = 50.0;

pub type FrameId = u64;

/// The host's frame-callback facility.
pub trait FrameHost {
    /// Monotonic milliseconds.
    fn now(&self) -> f64;
    /// Schedules one callback for the next frame.
    fn request_frame(&mut self) -> FrameId;
    /// Cancels a scheduled callback that has not fired yet.
    fn cancel_frame(&mut self, id: FrameId);
}

/// A host with a manual clock, for headless animation.
#[derive(Debug, Default)]
pub struct VirtualHost {
    now: f64,
    next_id: FrameId,
    pending: Option<FrameId>,
    requests: u64,
}

impl VirtualHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: f64) {
        self.now += ms;
    }

    /// Hands out the scheduled callback, if any, as the host would when the frame fires.
    pub fn take_pending(&mut self) -> Option<FrameId> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Total frames requested so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl FrameHost for VirtualHost {
    fn now(&self) -> f64 {
        self.now
    }

    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        self.requests += 1;
        self.pending = Some(self.next_id);
        self.next_id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }
}

/// Where the visible surface sits on screen, for mapping pointer events into logical canvas
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Top-left corner of the surface in client (CSS) pixels.
    pub left: f64,
    pub top: f64,
    /// Displayed size in CSS pixels.
    pub css_width: f64,
    pub css_height: f64,
    /// Backing-store size in device pixels.
    pub backing_width: f64,
    pub backing_height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// A viewport whose backing store is `width` by `height` device pixels at ratio `dpr`,
    /// displayed at its natural CSS size from the client origin.
    pub fn fitted(width: f64, height: f64, dpr: f64) -> Self {
        let dpr = if dpr > 0.0 { dpr } else { 1.0 };
        Viewport {
            left: 0.0,
            top: 0.0,
            css_width: width / dpr,
            css_height: height / dpr,
            backing_width: width,
            backing_height: height,
            device_pixel_ratio: dpr,
        }
    }

    fn dpr(&self) -> f64 {
        if self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    /// Client coordinates to logical canvas coordinates.
    pub fn to_logical(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        let ratio = |backing: f64, css: f64| if css > 0.0 { backing / css } else { 1.0 };
        (
            (client_x - self.left) * ratio(self.backing_width, self.css_width) / self.dpr(),
            (client_y - self.top) * ratio(self.backing_height, self.css_height) / self.dpr(),
        )
    }

    /// Logical canvas size.
    pub fn logical_size(&self) -> (f64, f64) {
        (
            self.backing_width / self.dpr(),
            self.backing_height / self.dpr(),
        )
    }
}

/// Animation controls, with the same JSON shape as the studio settings they come from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSettings {
    pub animation_speed: f64,
    pub is_interactive: bool,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        AnimationSettings {
            animation_speed: DEFAULT_SPEED,
            is_interactive: false,
        }
    }
}

impl From<&Settings> for AnimationSettings {
    fn from(settings: &Settings) -> Self {
        AnimationSettings {
            animation_speed: settings.animation_speed,
            is_interactive: settings.is_interactive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// What one frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The animator is not running.
    Idle,
    /// The callback was not the one currently scheduled, e.g. it was cancelled.
    Stale,
    /// Too soon after the last accepted frame; nothing drawn.
    Dropped,
    Drawn,
    /// Drawing failed and the animation stopped.
    Failed,
}

/// Clamps a speed setting to 1–100.
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return DEFAULT_SPEED;
    }
    speed.clamp(1.0, 100.0)
}

/// Minimum milliseconds between accepted frames at `speed`.
pub fn frame_delay(speed: f64) -> f64 {
    (1000.0 / FPS_CEILING).max(1000.0 / (clamp_speed(speed) * 0.6))
}

#[derive(Debug)]
pub struct Animator {
    state: RunState,
    pending: Option<FrameId>,
    frame_count: u64,
    last_frame: f64,
    speed: f64,
    interactive: bool,
    pointer: (f64, f64),
    last_pointer_update: Option<f64>,
    viewport: Viewport,
    style: ArtStyle,
    settings: Settings,
    buffer: Option<Surface>,
}

impl Default for Animator {
    fn default() -> Self {
        Animator {
            state: RunState::Idle,
            pending: None,
            frame_count: 0,
            last_frame: 0.0,
            speed: DEFAULT_SPEED,
            interactive: false,
            pointer: (0.0, 0.0),
            last_pointer_update: None,
            viewport: Viewport::fitted(1.0, 1.0, 1.0),
            style: ArtStyle::Default,
            settings: Settings::default(),
            buffer: None,
        }
    }
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_speed(speed);
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    /// Begins animating `style`. A no-op when already running.
    pub fn start(&mut self, host: &mut dyn FrameHost, style: ArtStyle, settings: &Settings) {
        if self.is_running() {
            return;
        }
        let controls = AnimationSettings::from(settings);
        self.state = RunState::Running;
        self.style = style;
        self.settings = settings.clone();
        self.speed = clamp_speed(controls.animation_speed);
        self.interactive = controls.is_interactive;
        self.frame_count = 0;
        self.last_frame = host.now();
        self.pending = Some(host.request_frame());
        tracing::debug!(%style, speed = self.speed, "animation started");
    }

    /// Stops animating and cancels the scheduled callback. A no-op when idle.
    pub fn stop(&mut self, host: &mut dyn FrameHost) {
        if !self.is_running() {
            return;
        }
        self.state = RunState::Idle;
        if let Some(id) = self.pending.take() {
            host.cancel_frame(id);
        }
        tracing::debug!(frames = self.frame_count, "animation stopped");
    }

    /// Starts when idle, stops when running. Returns whether the animator is now running.
    pub fn toggle(&mut self, host: &mut dyn FrameHost, style: ArtStyle, settings: &Settings) -> bool {
        if self.is_running() {
            self.stop(host);
        } else {
            self.start(host, style, settings);
        }
        self.is_running()
    }

    /// Records a pointer move in client coordinates. Updates closer than
    /// [`POINTER_THROTTLE_MS`] to the last accepted one are ignored. Returns whether the
    /// position changed. Never draws.
    pub fn pointer_moved(&mut self, now: f64, client_x: f64, client_y: f64) -> bool {
        if let Some(last) = self.last_pointer_update {
            if now - last < POINTER_THROTTLE_MS {
                return false;
            }
        }
        self.last_pointer_update = Some(now);
        self.pointer = self.viewport.to_logical(client_x, client_y);
        true
    }

    /// Handles the frame callback `id`.
    pub fn tick(
        &mut self,
        host: &mut dyn FrameHost,
        id: FrameId,
        studio: &mut Studio,
        visible: &mut Surface,
    ) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }
        if self.pending != Some(id) {
            return TickOutcome::Stale;
        }
        self.pending = Some(host.request_frame());

        let now = host.now();
        if now - self.last_frame < frame_delay(self.speed) {
            return TickOutcome::Dropped;
        }
        self.frame_count += 1;
        self.last_frame = now;

        match self.draw(studio, visible, now) {
            Ok(()) => TickOutcome::Drawn,
            Err(err) => {
                tracing::error!(%err, frame = self.frame_count, "animation frame failed");
                self.stop(host);
                TickOutcome::Failed
            }
        }
    }

    fn draw(&mut self, studio: &mut Studio, visible: &mut Surface, now: f64) -> RenderResult<()> {
        let (w, h) = (visible.width(), visible.height());
        let background = self.settings.background();
        let buffer = match self.buffer.take() {
            Some(mut buffer) => {
                if buffer.width() != w || buffer.height() != h {
                    buffer.resize(w, h)?;
                    buffer.clear(background);
                }
                self.buffer.insert(buffer)
            }
            None => {
                let mut fresh = Surface::new(w, h)?;
                fresh.clear(background);
                self.buffer.insert(fresh)
            }
        };

        let dpr = self.viewport.dpr();
        let (lw, lh) = (f64::from(w) / dpr, f64::from(h) / dpr);
        buffer.save();
        buffer.scale(dpr, dpr);
        buffer.fill_rect(
            0.0,
            0.0,
            lw,
            lh,
            &Source::Solid(background.solid(f64::from(TRAIL_ALPHA) / 255.0)),
        );

        let mut params = self.settings.params_for(lw, lh);
        params
            .set("frameCount", self.frame_count as f64)
            .set("mouseX", self.pointer.0)
            .set("mouseY", self.pointer.1)
            .set("isInteractive", self.interactive);
        let frame = Frame::animated(now, self.frame_count);
        let result = studio.paint(buffer, self.style, &self.settings, &frame, &params);
        buffer.restore();
        result?;

        visible.clear_rect(0.0, 0.0, f64::from(w), f64::from(h));
        visible.draw_surface(buffer, 0.0, 0.0);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn settings(speed: f64) -> Settings {
        let mut settings = Settings {
            animation_speed: speed,
            seed: Some("loop".to_string()),
            ..Settings::default()
        };
        settings.params.set("dotMatrixOpacity", 1.0);
        settings
    }

    #[test]
    fn speed_is_clamped() {
        assert_eq!(clamp_speed(0.0), 1.0);
        assert_eq!(clamp_speed(250.0), 100.0);
        assert_eq!(clamp_speed(f64::NAN), DEFAULT_SPEED);
        let mut animator = Animator::new();
        animator.set_speed(-4.0);
        assert_eq!(animator.speed(), 1.0);
    }

    #[test]
    fn delay_respects_the_fps_ceiling() {
        assert_eq!(frame_delay(100.0), 1000.0 / 60.0);
        assert_eq!(frame_delay(50.0), 1000.0 / 30.0);
        assert_eq!(frame_delay(1.0), 1000.0 / 0.6);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut host = VirtualHost::new();
        let mut animator = Animator::new();
        animator.start(&mut host, ArtStyle::DotMatrix, &settings(50.0));
        animator.start(&mut host, ArtStyle::DotMatrix, &settings(50.0));
        assert_eq!(host.requests(), 1);
        assert!(animator.is_running());

        animator.stop(&mut host);
        assert_eq!(host.pending(), None);
        animator.stop(&mut host);
        assert_eq!(animator.state(), RunState::Idle);
    }

    #[test]
    fn early_frames_are_dropped() {
        let mut host = VirtualHost::new();
        let mut studio = Studio::new();
        let mut visible = Surface::new(32, 24).unwrap();
        let mut animator = Animator::new();
        animator.start(&mut host, ArtStyle::DotMatrix, &settings(50.0));

        host.advance(10.0);
        let id = host.take_pending().unwrap();
        assert_eq!(
            animator.tick(&mut host, id, &mut studio, &mut visible),
            TickOutcome::Dropped
        );
        // Rescheduled even though nothing was drawn.
        assert!(host.pending().is_some());

        host.advance(30.0);
        let id = host.take_pending().unwrap();
        assert_eq!(
            animator.tick(&mut host, id, &mut studio, &mut visible),
            TickOutcome::Drawn
        );
        assert_eq!(animator.frame_count(), 1);
    }

    #[test]
    fn cancelled_callbacks_are_stale() {
        let mut host = VirtualHost::new();
        let mut studio = Studio::new();
        let mut visible = Surface::new(8, 8).unwrap();
        let mut animator = Animator::new();
        animator.start(&mut host, ArtStyle::DotMatrix, &settings(50.0));
        let id = host.pending().unwrap();
        assert_eq!(
            animator.tick(&mut host, id + 7, &mut studio, &mut visible),
            TickOutcome::Stale
        );
        animator.stop(&mut host);
        assert_eq!(
            animator.tick(&mut host, id, &mut studio, &mut visible),
            TickOutcome::Idle
        );
    }

    #[test]
    fn pointer_updates_are_throttled_and_scaled() {
        let mut animator = Animator::new();
        animator.set_viewport(Viewport {
            left: 10.0,
            top: 20.0,
            css_width: 100.0,
            css_height: 50.0,
            backing_width: 400.0,
            backing_height: 200.0,
            device_pixel_ratio: 2.0,
        });
        assert!(animator.pointer_moved(0.0, 60.0, 45.0));
        assert_eq!(animator.pointer(), (100.0, 50.0));
        assert!(!animator.pointer_moved(10.0, 110.0, 70.0));
        assert_eq!(animator.pointer(), (100.0, 50.0));
        assert!(animator.pointer_moved(16.0, 110.0, 70.0));
        assert_eq!(animator.pointer(), (200.0, 100.0));
    }

    #[test]
    fn toggling_flips_the_state() {
        let mut host = VirtualHost::new();
        let mut animator = Animator::new();
        assert!(animator.toggle(&mut host, ArtStyle::NeonWaves, &settings(20.0)));
        assert_eq!(animator.speed(), 20.0);
        assert!(!animator.toggle(&mut host, ArtStyle::NeonWaves, &settings(20.0)));
    }
}
