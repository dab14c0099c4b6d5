//! The scheduler loop

use std::rc::Rc;
use std::time::Duration;

use crate::platform::Clock;
use crate::renderer::Surface;

/// One independently steppable, stoppable piece of presentation or simulation
pub trait FrameUnit {
    fn do_one_frame(&mut self, frame: &mut Frame<'_>);

    /// Polled before every frame
    fn should_stop(&self) -> bool;
}

pub struct FrameScheduler {
    fps: u32,
    surface: Box<dyn Surface>,
    clock: Rc<dyn Clock>,
    frames: u64,
}

impl FrameScheduler {
    pub fn new(fps: u32, surface: Box<dyn Surface>, clock: Rc<dyn Clock>) -> Self {
        Self {
            fps: fps.max(1),
            surface,
            clock,
            frames: 0,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Simulated seconds per frame
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.fps)
    }

    /// Wall-clock budget per frame, in whole milliseconds
    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps))
    }

    /// Frames presented so far, nested runs included
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    pub fn surface_mut(&mut self) -> &mut dyn Surface {
        self.surface.as_mut()
    }

    /// Run `unit` until it reports it should stop.
    ///
    /// After each frame the surface is presented and the rest of the frame
    /// budget is slept away. A frame that overruns is not made up for: no
    /// sleep, no skipped frames.
    pub fn run(&mut self, unit: &mut dyn FrameUnit) {
        let dt = self.dt();
        let budget = self.frame_budget();
        while !unit.should_stop() {
            let started = self.clock.now();
            unit.do_one_frame(&mut Frame {
                scheduler: &mut *self,
                dt,
            });
            self.surface.present();
            self.frames += 1;

            let used = self.clock.now().saturating_sub(started);
            let left = budget.saturating_sub(used);
            if !left.is_zero() {
                self.clock.sleep(left);
            }
        }
    }
}

/// Handed to a unit for the duration of one frame
pub struct Frame<'s> {
    scheduler: &'s mut FrameScheduler,
    dt: f64,
}

impl Frame<'_> {
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn surface(&mut self) -> &mut dyn Surface {
        self.scheduler.surface_mut()
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        self.scheduler.clock()
    }

    pub fn now_millis(&self) -> u64 {
        self.scheduler.clock.now_millis()
    }

    /// Run a nested unit to completion before this frame continues
    pub fn run(&mut self, unit: &mut dyn FrameUnit) {
        self.scheduler.run(unit);
    }
}
