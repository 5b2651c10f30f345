use std::collections::HashMap;
use std::sync::Arc;

use crate::models::TrackableBrand;

use super::TrackableConnector;

pub struct TrackableConnectorRegistry {
    connectors: HashMap<TrackableBrand, Arc<dyn TrackableConnector>>,
}

impl TrackableConnectorRegistry {
    pub fn new() -> Self {
        Self {
            connectors: HashMap::new(),
        }
    }

    pub fn register(&mut self, connector: Arc<dyn TrackableConnector>) {
        self.connectors.insert(connector.brand(), connector);
    }

    pub fn get(&self, brand: TrackableBrand) -> Option<&Arc<dyn TrackableConnector>> {
        self.connectors.get(&brand)
    }

    /// Connectors whose trackables are logged separately from the cache log.
    pub fn loggable_generic(&self) -> Vec<&Arc<dyn TrackableConnector>> {
        let mut generic: Vec<_> = self
            .connectors
            .values()
            .filter(|c| c.is_generic_loggable())
            .collect();
        generic.sort_by_key(|c| c.brand().label());
        generic
    }
}

impl Default for TrackableConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
