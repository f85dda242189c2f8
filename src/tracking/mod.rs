//! Fire-and-forget analytics beacons.
//!
//! Beacons run on their own task and never report failure to the caller.

use crate::api::ApiClient;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Tracker {
    api: ApiClient,
}

impl Tracker {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Record a page visit. The handle may be dropped.
    pub fn track_visitor(&self, page_path: &str) -> JoinHandle<()> {
        let api = self.api.clone();
        let page_path = page_path.to_string();
        tokio::spawn(async move {
            if let Err(e) = api.track_visitor(&page_path).await {
                debug!("Visitor tracking failed: {}", e);
            }
        })
    }

    /// Record a tour detail view, attributed to `user_id` when signed in.
    pub fn track_tour_view(&self, tour_id: &str, user_id: Option<&str>) -> JoinHandle<()> {
        let api = self.api.clone();
        let tour_id = tour_id.to_string();
        let user_id = user_id.map(str::to_string);
        tokio::spawn(async move {
            if let Err(e) = api.track_tour_view(&tour_id, user_id.as_deref()).await {
                debug!("Tour view tracking failed: {}", e);
            }
        })
    }
}
