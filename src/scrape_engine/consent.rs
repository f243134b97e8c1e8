//! Cookie-consent dismissal

use tracing::{debug, info};

use super::scrape_types::{ScrapeError, ScrapeResult};
use crate::driver::{BrowserDriver, DriverError, Locator};

/// Find the consent control in the focused tab and click it once.
///
/// Waits up to the driver's implicit wait for the control to appear.
pub async fn dismiss_consent<D: BrowserDriver>(
    driver: &mut D,
    locator: &Locator,
) -> ScrapeResult<()> {
    debug!("Looking for consent control {}", locator);

    if !driver.find(locator).await? {
        return Err(ScrapeError::ConsentControlMissing {
            locator: locator.clone(),
        });
    }

    match driver.click(locator).await {
        Ok(()) => {
            info!("Dismissed consent banner");
            Ok(())
        }
        // The banner can detach between lookup and click
        Err(DriverError::NotFound { .. }) => Err(ScrapeError::ConsentControlMissing {
            locator: locator.clone(),
        }),
        Err(e) => Err(e.into()),
    }
}
