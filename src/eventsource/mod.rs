use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::{
    fmt::{self, Display, Formatter},
    time::Duration,
};

/// A single Server-Sent Event.
///
/// Line splitting, UTF-8 decoding across chunk boundaries and field parsing
/// are done by `eventsource-stream`; this is the shape the providers consume.
/// The Messages API sets `event` to the same name as the JSON `type`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Event {
    pub id: Option<String>,
    pub event_type: Option<String>,
    pub data: String,
    pub retry: Option<Duration>,
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event {{ id: {:?}, event_type: {:?}, data: {}, retry: {:?} }}",
            self.id, self.event_type, self.data, self.retry
        )
    }
}

impl From<eventsource_stream::Event> for Event {
    fn from(event: eventsource_stream::Event) -> Self {
        Self {
            id: (!event.id.is_empty()).then_some(event.id),
            event_type: (!event.event.is_empty()).then_some(event.event),
            data: event.data,
            retry: event.retry,
        }
    }
}

pub type SseStream<E> = Pin<Box<dyn Stream<Item = Result<Event, EventStreamError<E>>> + Send>>;

/// Extension trait for turning a byte stream into a stream of SSE events.
pub trait EventSourceExt {
    type Error;

    fn events(self) -> SseStream<Self::Error>;
}

impl<S, B, E> EventSourceExt for S
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Send + 'static,
{
    type Error = E;

    fn events(self) -> SseStream<E> {
        Box::pin(self.eventsource().map(|event| event.map(Event::from)))
    }
}
