use std::sync::Arc;

use crate::config::Config;
use crate::outreach::channel::OutreachChannel;
use crate::search::fallback::CompanyDataset;
use crate::search::provider::JobSearchProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Live job search backend. Default: TheirStackClient.
    pub search: Arc<dyn JobSearchProvider>,
    /// Outreach send channel. Default: SendGridClient.
    pub channel: Arc<dyn OutreachChannel>,
    /// Company CSV used when every live search stage is empty.
    pub dataset: CompanyDataset,
}
