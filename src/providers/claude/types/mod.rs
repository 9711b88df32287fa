pub mod message;
pub mod request;
pub mod stream;

pub use message::{ContentBlock, Message, MessageResponse, StopReason, Usage};

pub use request::{MessagesRequest, Tool};

pub use stream::{DeltaEvent, MessageDeltaEvent, StreamError, StreamEvent};
