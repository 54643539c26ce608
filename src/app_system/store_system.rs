use std::path::Path;

use ::tracing::{error, info};
use uuid::Uuid;

use super::SystemError;
use crate::actor_framework::{ResourceActor, SnapshotFile};
use crate::clients::{OrderClient, ProfileClient};
use crate::domain::{Order, Profile};

pub const ORDERS_SNAPSHOT: &str = "orders.json";
pub const PROFILES_SNAPSHOT: &str = "profiles.json";

const ACTOR_BUFFER: usize = 64;

/// Owns the order and profile actors.
///
/// Responsible for starting them, restoring their snapshots, and handling shutdown.
pub struct StoreSystem {
    pub order_client: OrderClient,
    pub profile_client: ProfileClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl StoreSystem {
    /// Starts both stores in memory only.
    pub fn in_memory() -> Self {
        let (order_actor, orders) = ResourceActor::<Order>::new(ACTOR_BUFFER, || Uuid::new_v4().to_string());
        let (profile_actor, profiles) =
            ResourceActor::<Profile>::new(ACTOR_BUFFER, || Uuid::new_v4().to_string());

        Self {
            order_client: OrderClient::new(orders),
            profile_client: ProfileClient::new(profiles),
            handles: vec![tokio::spawn(order_actor.run()), tokio::spawn(profile_actor.run())],
        }
    }

    /// Starts both stores backed by snapshots in `data_dir`.
    pub async fn with_data_dir(data_dir: &Path) -> Result<Self, SystemError> {
        let (order_actor, orders) = ResourceActor::<Order>::new(ACTOR_BUFFER, || Uuid::new_v4().to_string());
        let order_actor = order_actor
            .with_snapshot(SnapshotFile::new(data_dir.join(ORDERS_SNAPSHOT)))
            .await
            .map_err(|source| SystemError::Restore { store: "orders", source })?;

        let (profile_actor, profiles) =
            ResourceActor::<Profile>::new(ACTOR_BUFFER, || Uuid::new_v4().to_string());
        let profile_actor = profile_actor
            .with_snapshot(SnapshotFile::new(data_dir.join(PROFILES_SNAPSHOT)))
            .await
            .map_err(|source| SystemError::Restore { store: "profiles", source })?;

        info!(data_dir = %data_dir.display(), "Stores restored");

        Ok(Self {
            order_client: OrderClient::new(orders),
            profile_client: ProfileClient::new(profiles),
            handles: vec![tokio::spawn(order_actor.run()), tokio::spawn(profile_actor.run())],
        })
    }

    /// Drops the clients held here and waits for the actors to drain.
    ///
    /// Actors stop once every client clone is gone, so callers must drop
    /// their own clones (e.g. the HTTP state) first.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        drop(self.order_client);
        drop(self.profile_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::TaskFailed(format!("{e:?}")));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
