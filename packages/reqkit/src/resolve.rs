//! Dynamic option resolution (`get_options`).

use crate::error::Error;
use crate::options::Options;

/// Run the options provider, if any, and merge its result on top.
///
/// The provider sees the target URL and the options accumulated so far.
/// Its errors are returned unchanged.
pub(crate) async fn resolve(url: &str, options: Options) -> Result<Options, Error> {
    let Some(provider) = options.get_options.clone() else {
        return Ok(options);
    };

    log::trace!("resolving dynamic options for {}", url);
    let partial = provider.options(url, &options).await?;
    Ok(options.merge(&partial))
}
