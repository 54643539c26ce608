use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Profile, ProfileCreate, ProfilePatch};
use crate::profile_actor::ProfileError;

/// Client for interacting with the Profile actor.
#[derive(Clone)]
pub struct ProfileClient {
    inner: ResourceClient<Profile>,
}

impl_basic_client!(ProfileClient, Profile, ProfileError, profile);

impl ProfileClient {
    #[instrument(skip(self, params))]
    pub async fn create_profile(&self, params: ProfileCreate) -> Result<String, ProfileError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(ProfileError::from)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_profile(&self, id: String, patch: ProfilePatch) -> Result<Profile, ProfileError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(ProfileError::from)
    }

    /// Returns whether a profile with this id exists.
    pub async fn profile_exists(&self, id: &str) -> Result<bool, ProfileError> {
        Ok(self.get_profile(id.to_string()).await?.is_some())
    }
}
