use std::rc::Rc;

use gloo_timers::callback::Interval;
use shared::Scheduler;

/// Browser interval scheduler. Every firing calls `on_tick`, which is expected
/// to route back into the thread-local game.
pub struct IntervalScheduler {
    on_tick: Rc<dyn Fn()>,
}

impl IntervalScheduler {
    pub fn new(on_tick: impl Fn() + 'static) -> Self {
        Self {
            on_tick: Rc::new(on_tick),
        }
    }
}

impl Scheduler for IntervalScheduler {
    type Handle = Interval;

    fn schedule_every(&mut self, period_ms: u64) -> Interval {
        let on_tick = Rc::clone(&self.on_tick);
        Interval::new(period_ms.min(u32::MAX as u64) as u32, move || on_tick())
    }

    fn cancel(&mut self, handle: Interval) {
        // Dropping an Interval clears it.
        drop(handle);
    }

    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}
