/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request failed at the transport level, including non-success
    /// response statuses.
    Transport,
    /// The response could not be consumed as a streamed text body.
    Protocol,
    /// Any other errors.
    Other,
}
