use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Per-employee revenue targets, held for the lifetime of the process.
#[derive(Debug)]
pub struct TargetStore {
    default_target: f64,
    targets: RwLock<HashMap<Uuid, f64>>,
}

impl TargetStore {
    pub fn new(default_target: f64) -> Self {
        Self {
            default_target,
            targets: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_target(&self) -> f64 {
        self.default_target
    }

    pub async fn get(&self, employee_id: Uuid) -> f64 {
        self.targets
            .read()
            .await
            .get(&employee_id)
            .copied()
            .unwrap_or(self.default_target)
    }

    /// Returns the target that was replaced, if one had been set.
    pub async fn set(&self, employee_id: Uuid, target: f64) -> Option<f64> {
        let previous = self.targets.write().await.insert(employee_id, target);
        info!("Revenue target for {} set to {} (was {:?})", employee_id, target, previous);
        previous
    }

    pub async fn snapshot(&self) -> HashMap<Uuid, f64> {
        self.targets.read().await.clone()
    }
}
