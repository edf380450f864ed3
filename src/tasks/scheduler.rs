//! Auto-advance timer and action dispatch around the render core.
//!
//! Rendering runs on the blocking pool behind a [`RenderGate`]. A
//! navigation request that finds the gate closed is dropped, never queued.
//! The single-shot timer is armed as soon as a slide is shown, before its
//! neighbours are prefetched. A tick that fires while a job is still busy
//! is dropped and the timer is armed again once that job completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::CanvasSize;
use crate::error::CacheError;
use crate::events::{Action, Direction, Notification};
use crate::platform::display::{DisplaySink, ImageSurface};
use crate::processing::caption::CaptionPlacement;
use crate::processing::geometry::Rect;
use crate::slideshow::{SlideView, Slideshow};
use crate::state::PlaybackState;

/// The part of the render core the scheduler drives.
pub trait SlideRenderer: Send + 'static {
    fn advance(&mut self, direction: Direction) -> Result<Option<SlideView>, CacheError>;

    fn prefetch(&mut self) -> Result<(), CacheError>;

    fn close(self) -> Result<(), CacheError>
    where
        Self: Sized;
}

impl SlideRenderer for Slideshow {
    fn advance(&mut self, direction: Direction) -> Result<Option<SlideView>, CacheError> {
        Slideshow::advance(self, direction)
    }

    fn prefetch(&mut self) -> Result<(), CacheError> {
        Slideshow::prefetch(self)
    }

    fn close(self) -> Result<(), CacheError> {
        Slideshow::close(self)
    }
}

/// Non-blocking single-holder gate.
#[derive(Debug, Clone, Default)]
pub struct RenderGate(Arc<AtomicBool>);

impl RenderGate {
    pub fn try_acquire(&self) -> Option<RenderPermit> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RenderPermit(Arc::clone(&self.0)))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Held for the duration of one render job; reopens the gate on drop.
#[derive(Debug)]
pub struct RenderPermit(Arc<AtomicBool>);

impl Drop for RenderPermit {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
enum RenderEvent {
    Shown(SlideView),
    Failed(CacheError),
    Finished,
}

struct Scheduler<R, S> {
    renderer: Arc<Mutex<R>>,
    sink: S,
    state: PlaybackState,
    canvas: CanvasSize,
    gate: RenderGate,
    events: Sender<RenderEvent>,
    deadline: Option<Instant>,
    in_flight: Option<JoinHandle<()>>,
    current: Option<SlideView>,
}

/// Drive the slideshow until `Exit`, the end of `actions`, or `cancel`.
///
/// The first playlist entry is shown immediately. On the way out any
/// in-flight render is awaited and the renderer's storage is released.
pub async fn run<R, S>(
    renderer: R,
    sink: S,
    state: PlaybackState,
    canvas: CanvasSize,
    mut actions: Receiver<Action>,
    cancel: CancellationToken,
) -> Result<()>
where
    R: SlideRenderer,
    S: DisplaySink,
{
    let (events_tx, mut events_rx) = mpsc::channel::<RenderEvent>(16);
    let mut scheduler = Scheduler {
        renderer: Arc::new(Mutex::new(renderer)),
        sink,
        state,
        canvas,
        gate: RenderGate::default(),
        events: events_tx,
        deadline: None,
        in_flight: None,
        current: None,
    };

    info!(
        autoplay = scheduler.state.autoplay(),
        interval = ?scheduler.state.interval(),
        "slideshow started"
    );
    if scheduler.state.autoplay() {
        scheduler.sink.inhibit_screensaver(true);
    }
    scheduler.try_render(Direction::Forward);

    loop {
        select! {
            _ = cancel.cancelled() => break,

            _ = sleep_until(scheduler.deadline.unwrap_or_else(Instant::now)), if scheduler.deadline.is_some() => {
                scheduler.deadline = None;
                if !scheduler.try_render(Direction::Forward) {
                    debug!("render in flight, auto-advance dropped");
                }
            }

            maybe_action = actions.recv() => {
                match maybe_action {
                    Some(Action::Exit) | None => {
                        info!("exit requested");
                        cancel.cancel();
                        break;
                    }
                    Some(action) => scheduler.handle_action(action),
                }
            }

            Some(event) = events_rx.recv() => scheduler.handle_event(event),
        }
    }

    scheduler.shutdown().await
}

impl<R, S> Scheduler<R, S>
where
    R: SlideRenderer,
    S: DisplaySink,
{
    /// Start a render job unless one is already running.
    fn try_render(&mut self, direction: Direction) -> bool {
        let Some(permit) = self.gate.try_acquire() else {
            return false;
        };
        let renderer = Arc::clone(&self.renderer);
        let events = self.events.clone();
        self.in_flight = Some(tokio::task::spawn_blocking(move || {
            let mut renderer = renderer.lock().unwrap_or_else(PoisonError::into_inner);
            match renderer.advance(direction) {
                Ok(Some(view)) => {
                    let _ = events.blocking_send(RenderEvent::Shown(view));
                }
                Ok(None) => {}
                Err(err) => {
                    let _ = events.blocking_send(RenderEvent::Failed(err));
                }
            }
            if let Err(err) = renderer.prefetch() {
                let _ = events.blocking_send(RenderEvent::Failed(err));
            }
            drop(renderer);
            drop(permit);
            let _ = events.blocking_send(RenderEvent::Finished);
        }));
        true
    }

    fn rearm(&mut self) {
        self.deadline = Some(Instant::now() + self.state.interval());
        debug!(interval = ?self.state.interval(), "auto-advance armed");
    }

    fn handle_event(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::Shown(view) => {
                self.sink.show_image(&ImageSurface {
                    path: view.image.clone(),
                    visible: true,
                    rect: Rect::new(0, 0, self.canvas.width, self.canvas.height),
                });
                let caption = self.caption_for(&view);
                self.sink.show_caption(&caption);
                for note in &view.notifications {
                    self.sink.notify(note);
                }
                self.current = Some(view);
                if self.state.autoplay() {
                    self.rearm();
                }
            }
            RenderEvent::Failed(err) => {
                error!("render cycle failed: {err}");
                self.sink
                    .notify(&Notification::error("Slideshow", err.to_string()));
            }
            RenderEvent::Finished => {
                // the tick was dropped mid-job, or nothing was shown
                if self.state.autoplay() && self.deadline.is_none() {
                    self.rearm();
                }
            }
        }
    }

    fn handle_action(&mut self, action: Action) {
        debug!(?action, "action");
        match action {
            Action::Next | Action::Previous => {
                let direction = if action == Action::Next {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                self.deadline = None;
                if self.state.set_autoplay(false) {
                    self.sink.notify(&self.state.autoplay_notification());
                    self.sink.inhibit_screensaver(false);
                }
                if !self.try_render(direction) {
                    debug!(?action, "render in flight, request dropped");
                }
            }
            Action::TogglePause => {
                let playing = self.state.toggle_pause();
                self.sink.notify(&self.state.autoplay_notification());
                self.sink.inhibit_screensaver(playing);
                if playing {
                    self.rearm();
                } else {
                    self.deadline = None;
                }
            }
            Action::SpeedUp | Action::SpeedDown => {
                let direction = if action == Action::SpeedUp {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                if let Some(interval) = self.state.adjust_speed(direction) {
                    info!(?interval, "slide interval changed");
                    self.sink.notify(&self.state.interval_notification());
                }
            }
            Action::ToggleCaption => {
                self.state.toggle_caption();
                self.sink.notify(&self.state.caption_notification());
                let placement = match &self.current {
                    Some(view) => self.caption_for(view),
                    None => CaptionPlacement::Hidden,
                };
                self.sink.show_caption(&placement);
            }
            Action::Exit => {}
        }
    }

    fn caption_for(&self, view: &SlideView) -> CaptionPlacement {
        if self.state.show_caption() {
            view.caption_layout.clone()
        } else {
            CaptionPlacement::Hidden
        }
    }

    async fn shutdown(mut self) -> Result<()> {
        self.deadline = None;
        if let Some(job) = self.in_flight.take() {
            if let Err(err) = job.await {
                warn!("render job did not finish cleanly: {err}");
            }
        }
        if self.state.autoplay() {
            self.sink.inhibit_screensaver(false);
        }
        match Arc::try_unwrap(self.renderer) {
            Ok(renderer) => renderer
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)
                .close()?,
            Err(_) => warn!("renderer still shared at exit, storage left to drop"),
        }
        info!("slideshow stopped");
        Ok(())
    }
}
