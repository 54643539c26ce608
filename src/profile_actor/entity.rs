use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Profile, ProfileCreate, ProfilePatch};
use crate::validation::{is_valid_email, is_valid_phone, normalize_phone, sanitize_string};

impl Entity for Profile {
    type Id = String;
    type CreateParams = ProfileCreate;
    type Patch = ProfilePatch;
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Profile from creation parameters.
    ///
    /// The email is normalized to lowercase; name and phone are optional.
    fn from_create_params(id: String, params: ProfileCreate) -> Result<Self, String> {
        let now = Utc::now();
        let mut profile = Self {
            id,
            email: String::new(),
            full_name: None,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        profile.on_update(ProfilePatch {
            email: Some(params.email),
            full_name: params.full_name,
            phone: params.phone,
        })?;
        Ok(profile)
    }

    /// Updates the profile's contact information.
    fn on_update(&mut self, patch: ProfilePatch) -> Result<(), String> {
        if let Some(email) = patch.email {
            let email = email.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(format!("invalid email: {email}"));
            }
            self.email = email;
        }
        if let Some(name) = patch.full_name {
            let name = sanitize_string(&name);
            self.full_name = (!name.is_empty()).then_some(name);
        }
        if let Some(phone) = patch.phone {
            let phone = normalize_phone(&phone);
            if phone.is_empty() {
                self.phone = None;
            } else if is_valid_phone(&phone) {
                self.phone = Some(phone);
            } else {
                return Err(format!("invalid phone: {phone}"));
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Handles profile-specific actions.
    ///
    /// Currently, no custom actions are defined for profiles.
    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
