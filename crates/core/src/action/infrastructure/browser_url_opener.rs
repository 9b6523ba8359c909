use crate::action::domain::dispatch_error::DispatchError;
use crate::action::domain::media_executor::UrlOpener;

/// Opens URLs with the platform's default handler via the `open` crate.
///
/// The launcher process is detached, so a slow browser start never holds
/// up the caller.
pub struct BrowserUrlOpener;

impl UrlOpener for BrowserUrlOpener {
    fn open_url(&mut self, url: &str) -> Result<(), DispatchError> {
        log::info!("Opening {url}");
        open::that_detached(url).map_err(|source| DispatchError::BrowserLaunch {
            url: url.to_string(),
            source,
        })
    }
}
