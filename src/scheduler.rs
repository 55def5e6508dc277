use std::cell::RefCell;
use std::rc::Rc;

use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;

/// Quiet period before a scheduled render actually runs.
pub(crate) const RENDER_QUANTUM_MS: u32 = 60;

/// Coalesces bursts of state mutations into a single render. Arming the
/// scheduler starts a short timer; re-arming before it fires drops the
/// pending timer, so only the request following the last mutation runs. The
/// render callback itself executes on the next animation frame.
///
/// Each render target owns its own scheduler; arming one never disturbs
/// another's pending timer.
pub(crate) struct RenderScheduler {
    render: Rc<dyn Fn()>,
    quantum_ms: u32,
    timer: Rc<RefCell<Option<Timeout>>>,
    frame: Rc<RefCell<Option<AnimationFrame>>>,
}

impl RenderScheduler {
    pub(crate) fn new(render: Rc<dyn Fn()>) -> Self {
        Self::with_quantum(render, RENDER_QUANTUM_MS)
    }

    pub(crate) fn with_quantum(render: Rc<dyn Fn()>, quantum_ms: u32) -> Self {
        Self {
            render,
            quantum_ms,
            timer: Rc::new(RefCell::new(None)),
            frame: Rc::new(RefCell::new(None)),
        }
    }

    pub(crate) fn schedule(&self) {
        let render = self.render.clone();
        let timer = self.timer.clone();
        let frame = self.frame.clone();
        let timeout = Timeout::new(self.quantum_ms, move || {
            timer.borrow_mut().take();
            let render = render.clone();
            *frame.borrow_mut() = Some(request_animation_frame(move |_| {
                render();
            }));
        });
        // dropping the previous handle cancels any pending timer
        *self.timer.borrow_mut() = Some(timeout);
    }

    #[allow(dead_code)]
    pub(crate) fn cancel(&self) {
        self.timer.borrow_mut().take();
        self.frame.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloo::timers::future::TimeoutFuture;
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn counting_scheduler(quantum_ms: u32) -> (RenderScheduler, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0u32));
        let scheduler = {
            let count = count.clone();
            RenderScheduler::with_quantum(
                Rc::new(move || count.set(count.get() + 1)),
                quantum_ms,
            )
        };
        (scheduler, count)
    }

    #[wasm_bindgen_test(async)]
    async fn burst_renders_exactly_once() {
        let (scheduler, count) = counting_scheduler(20);
        for _ in 0..8 {
            scheduler.schedule();
        }
        TimeoutFuture::new(250).await;
        assert_eq!(count.get(), 1);
    }

    #[wasm_bindgen_test(async)]
    async fn reschedule_after_fire_runs_again() {
        let (scheduler, count) = counting_scheduler(20);
        scheduler.schedule();
        TimeoutFuture::new(250).await;
        scheduler.schedule();
        TimeoutFuture::new(250).await;
        assert_eq!(count.get(), 2);
    }

    #[wasm_bindgen_test(async)]
    async fn targets_are_independent() {
        let (first, first_count) = counting_scheduler(20);
        let (second, second_count) = counting_scheduler(20);
        first.schedule();
        second.schedule();
        first.schedule();
        TimeoutFuture::new(250).await;
        assert_eq!(first_count.get(), 1);
        assert_eq!(second_count.get(), 1);
    }

    #[wasm_bindgen_test(async)]
    async fn cancel_drops_pending_render() {
        let (scheduler, count) = counting_scheduler(20);
        scheduler.schedule();
        scheduler.cancel();
        TimeoutFuture::new(250).await;
        assert_eq!(count.get(), 0);
    }
}
