//! One attempt of a request, end to end.
//!
//! resolve URL -> dynamic options -> build request -> race transport
//! against timeout/cancellation -> classify status -> failure hook.
//!
//! A failure hook that retries calls back into [`execute`], so the retried
//! attempt goes through every step again. There is no depth limit.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::coordinator;
use crate::error::{Error, ResponseError};
use crate::hooks::FailedAttempt;
use crate::options::Options;
use crate::request::{self, Request};
use crate::resolve;
use crate::response::Response;
use crate::transport::Transport;

pub(crate) fn execute(
    transport: Arc<dyn Transport>,
    input: String,
    options: Options,
) -> BoxFuture<'static, Result<Response, Error>> {
    async move {
        // Without a prefix yet, the provider may still supply one
        let target = request::resolve_url(&input, &options)
            .map_or_else(|_| input.clone(), String::from);
        let options = resolve::resolve(&target, options).await?;
        let request = Request::build(&input, &options)?;

        log::debug!("{} {}", request.method, request.url);

        let outcome = coordinator::race(
            transport.as_ref(),
            request,
            options.timeout,
            options.signal.as_ref(),
        )
        .await
        .and_then(check_status);

        let error = match outcome {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };

        match options.on_failure.clone() {
            Some(hook) => {
                log::debug!("request to {} failed ({}), running failure hook", input, error);
                hook.on_failure(error, FailedAttempt::new(input, options, transport))
                    .await
            }
            None => Err(error),
        }
    }
    .boxed()
}

fn check_status(response: Response) -> Result<Response, Error> {
    if response.ok() {
        Ok(response)
    } else {
        log::debug!("{} responded with {}", response.url(), response.status());
        Err(ResponseError::new(response).into())
    }
}
