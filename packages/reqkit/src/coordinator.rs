//! Races a transport call against the timeout and the caller's token.
//!
//! Each attempt gets its own cancellation token, a child of the caller's
//! token when one is supplied. The transport sees only that child. When the
//! timer or the caller's token wins, the child is cancelled and the
//! transport future is dropped, so a late transport result is discarded.
//!
//! When several branches are ready on the same poll, the timer is checked
//! first, then the caller's token, then the transport.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{AbortError, Error, TimeoutError};
use crate::request::Request;
use crate::response::Response;
use crate::transport::Transport;

enum Outcome {
    Settled(Result<Response, Error>),
    TimedOut(Duration),
    Aborted,
}

pub(crate) async fn race(
    transport: &dyn Transport,
    request: Request,
    timeout: Option<Duration>,
    signal: Option<&CancellationToken>,
) -> Result<Response, Error> {
    let attempt_token = signal
        .map(CancellationToken::child_token)
        .unwrap_or_default();

    let deadline = async {
        match timeout {
            Some(duration) => {
                tokio::time::sleep(duration).await;
                duration
            }
            None => std::future::pending().await,
        }
    };

    let aborted = async {
        match signal {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };

    let outcome = tokio::select! {
        biased;
        duration = deadline => Outcome::TimedOut(duration),
        _ = aborted => Outcome::Aborted,
        result = transport.send(request, attempt_token.clone()) => Outcome::Settled(result),
    };

    match outcome {
        Outcome::Settled(result) => result,
        Outcome::TimedOut(duration) => {
            attempt_token.cancel();
            log::debug!("request timed out after {:?}", duration);
            Err(TimeoutError::new(duration).into())
        }
        Outcome::Aborted => {
            attempt_token.cancel();
            log::debug!("request aborted by caller");
            Err(AbortError.into())
        }
    }
}
