//! Latest-wins stream pacing.

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait adding pacing to any stream.
pub trait PaceExt: Stream {
    /// Emit at most one item per interval.
    ///
    /// Latest-wins: when several items arrive within one interval, only the
    /// most recent is emitted. When an interval passes with no new item,
    /// nothing is emitted and the stream stays pending; it only ends when
    /// the underlying stream does.
    fn paced(self, interval: Duration) -> Paced<Self>
    where
        Self: Sized,
    {
        Paced::new(self, interval)
    }
}

impl<T: Stream> PaceExt for T {}

pin_project! {
    /// Stream combinator that limits emission rate, keeping the latest item.
    pub struct Paced<S: Stream> {
        #[pin]
        stream: S,
        interval: Interval,
        pending: Option<S::Item>,
    }
}

impl<S: Stream> Paced<S> {
    pub fn new(stream: S, period: Duration) -> Self {
        let mut interval = interval(period);
        // A consumer that stalls should resume on the next grid tick, not
        // be flooded with catch-up ticks.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { stream, interval, pending: None }
    }
}

impl<S: Stream> Stream for Paced<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Emission is gated on the pacing tick.
        ready!(this.interval.poll_tick(cx));

        // Drain whatever has arrived, keeping only the most recent item.
        loop {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    *this.pending = Some(item);
                }
                Poll::Ready(None) => {
                    // Source ended: flush the held item, then end.
                    return Poll::Ready(this.pending.take());
                }
                Poll::Pending => {
                    return match this.pending.take() {
                        Some(item) => Poll::Ready(Some(item)),
                        // Tick with nothing new: wait for the source. The
                        // source's pending registration wakes us, and the
                        // next tick gates the actual emission.
                        None => Poll::Pending,
                    };
                }
            }
        }
    }
}
