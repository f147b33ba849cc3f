//! Public types for the Herald API.

mod envelope;
mod options;
mod requester;

pub use envelope::Envelope;
pub use options::PollOptions;
pub use requester::Requester;
