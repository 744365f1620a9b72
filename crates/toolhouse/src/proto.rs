use retrochat_backend::TurnRequest;
use serde::Serialize;

/// Response header that carries the session token granted by the
/// session-initiating call.
pub const RUN_ID_HEADER: &str = "X-Toolhouse-Run-ID";

/// The JSON body of both session-initiating and continuation calls.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TurnBody {
    message: String,
}

#[inline]
pub fn create_body(turn: &TurnRequest) -> TurnBody {
    TurnBody {
        message: turn.text.clone(),
    }
}
