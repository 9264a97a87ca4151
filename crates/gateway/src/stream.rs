use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{
    Stream,
    stream::{BoxStream, FusedStream},
};
use llm::FragmentStream;

use crate::{journal::Journal, request::RequestContext};

/// Stream of reply fragments handed to the caller.
pub type ReplyStream = BoxStream<'static, String>;

/// Fragment stream with the journal attached as a passive observer.
///
/// There is one producer and one consumption path: every fragment the caller
/// polls out is reported to the journal in the same `poll_next` call, before
/// it is returned. Nothing is buffered, so both sides see every fragment
/// exactly once and in production order.
///
/// An `Err` from the producer is reported and ends the stream; fragments
/// already delivered stay delivered. Dropping the stream before it ended,
/// as happens when the caller disconnects, is reported as a cancellation.
pub struct ObservedStream {
    inner: FragmentStream,
    journal: Arc<dyn Journal>,
    context: RequestContext,
    finished: bool,
}

impl ObservedStream {
    pub fn new(inner: FragmentStream, journal: Arc<dyn Journal>, context: RequestContext) -> Self {
        Self {
            inner,
            journal,
            context,
            finished: false,
        }
    }
}

impl Stream for ObservedStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if this.finished {
            return Poll::Ready(None);
        }

        match futures::ready!(this.inner.as_mut().poll_next(cx)) {
            Some(Ok(fragment)) => {
                this.journal.fragment(&this.context, &fragment);
                Poll::Ready(Some(fragment))
            }
            Some(Err(error)) => {
                this.finished = true;
                this.journal.failed(&this.context, &error);
                Poll::Ready(None)
            }
            None => {
                this.finished = true;
                this.journal.completed(&this.context);
                Poll::Ready(None)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, self.inner.size_hint().1)
        }
    }
}

impl FusedStream for ObservedStream {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl Drop for ObservedStream {
    fn drop(&mut self) {
        if !self.finished {
            self.journal.cancelled(&self.context);
        }
    }
}
