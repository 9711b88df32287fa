use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::FusedStream;
use futures::Stream;
use log::debug;

use super::claude::types::StreamEvent;
use crate::core::LLMError;

type Inner = Pin<Box<dyn Stream<Item = Result<StreamEvent, LLMError>> + Send>>;
type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Single-pass stream of provider events backed by an open connection.
///
/// The connection is released exactly once, on whichever comes first:
/// `message_stop`, end of body, a transport or decode error, a provider
/// `error` event, [`EventStream::cancel`], or drop. Once released the stream
/// yields `None` forever.
pub struct EventStream {
    inner: Option<Inner>,
    on_release: Option<ReleaseHook>,
}

impl EventStream {
    pub fn new<S>(inner: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, LLMError>> + Send + 'static,
    {
        Self {
            inner: Some(Box::pin(inner)),
            on_release: None,
        }
    }

    /// Registers a callback that runs when the connection is released.
    pub fn on_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    /// Stops consuming and closes the underlying connection.
    pub fn cancel(&mut self) {
        self.release();
    }

    pub const fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn release(&mut self) {
        if let Some(inner) = self.inner.take() {
            drop(inner);
            debug!("[EventStream] connection released");
            if let Some(hook) = self.on_release.take() {
                hook();
            }
        }
    }
}

impl Stream for EventStream {
    type Item = Result<StreamEvent, LLMError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = match self.inner.as_mut() {
            Some(inner) => inner.as_mut().poll_next(cx),
            None => return Poll::Ready(None),
        };

        match polled {
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => {
                self.release();
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(err))) => {
                self.release();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(Some(Ok(StreamEvent::Error { error }))) => {
                self.release();
                Poll::Ready(Some(Err(LLMError::StreamError(format!(
                    "{}: {}",
                    error.error_type, error.message
                )))))
            }
            Poll::Ready(Some(Ok(StreamEvent::MessageStop))) => {
                self.release();
                Poll::Ready(Some(Ok(StreamEvent::MessageStop)))
            }
            Poll::Ready(Some(Ok(event))) => Poll::Ready(Some(Ok(event))),
        }
    }
}

impl FusedStream for EventStream {
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("open", &self.is_open())
            .finish()
    }
}
