//! Networks API Example - An in-memory network backend behind gridway
//!
//! This example binds a "networks" resource to a plugin backed by a mutex'd
//! map. It demonstrates:
//!
//! - Implementing [`ResourcePlugin`] for a backend
//! - Schema-driven body preparation (`name` mandatory, `admin_state_up`
//!   defaulted)
//! - View projection hiding internal attributes
//! - Domain errors surfacing as protocol faults (404 on unknown id, 409 on
//!   delete of an in-use network)
//!
//! Try it:
//!
//! ```text
//! curl -s localhost:9696/networks
//! curl -s -X POST localhost:9696/networks \
//!     -H 'content-type: application/json' \
//!     -d '{"network": {"name": "net1"}}'
//! curl -s 'localhost:9696/networks?show=id&show=name'
//! ```

use gridway::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Mutex'd map standing in for a real network backend
struct MemoryNetworks {
    networks: Mutex<HashMap<String, Value>>,
}

impl MemoryNetworks {
    fn new() -> Self {
        Self {
            networks: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.networks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ResourcePlugin for MemoryNetworks {
    async fn list(
        &self,
        _ctx: &RequestContext,
        _query: &RequestQuery,
    ) -> std::result::Result<Vec<Value>, DomainError> {
        Ok(self.lock().values().cloned().collect())
    }

    async fn get(
        &self,
        _ctx: &RequestContext,
        id: &str,
        _query: &RequestQuery,
    ) -> std::result::Result<Value, DomainError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::network_not_found(id))
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        body: Value,
    ) -> std::result::Result<Value, DomainError> {
        let id = Uuid::new_v4().to_string();
        let mut network = body.get("network").cloned().unwrap_or_else(|| json!({}));
        network["id"] = json!(id);
        network["tenant_id"] = json!(ctx.tenant_id.clone().unwrap_or_default());
        network["status"] = json!("ACTIVE");
        self.lock().insert(id, network.clone());
        Ok(network)
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        body: Value,
    ) -> std::result::Result<Value, DomainError> {
        let submitted = body["network"].clone();
        let id = submitted["id"].as_str().unwrap_or_default().to_string();
        let mut networks = self.lock();
        match networks.get_mut(&id) {
            Some(network) => {
                if let (Some(target), Some(changes)) =
                    (network.as_object_mut(), submitted.as_object())
                {
                    for (attr, value) in changes {
                        target.insert(attr.clone(), value.clone());
                    }
                }
                Ok(network.clone())
            }
            None => Err(DomainError::network_not_found(&id)),
        }
    }

    async fn delete(
        &self,
        _ctx: &RequestContext,
        id: &str,
    ) -> std::result::Result<(), DomainError> {
        let mut networks = self.lock();
        let in_use = networks
            .get(id)
            .and_then(|n| n["ports_in_use"].as_u64())
            .unwrap_or(0)
            > 0;
        if in_use {
            return Err(DomainError::network_in_use(id));
        }
        networks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::network_not_found(id))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    init_tracing(&config)?;

    info!("Starting networks API");

    let schema = ResourceSchema::new()
        .with_required("name")
        .with_default("admin_state_up", json!(true));

    let app = ResourceBuilder::new("networks", "network")
        .with_schema(schema)
        .with_views(ViewRegistry::new().with_view(
            "network",
            project_fields(&["id", "name", "admin_state_up", "status", "tenant_id"]),
        ))
        .with_faults(FaultMap::default())
        .build(Arc::new(MemoryNetworks::new()))?;

    Server::new(config).serve(app).await?;

    Ok(())
}
