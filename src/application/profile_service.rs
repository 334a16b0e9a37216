use crate::domain::errors::DomainError;
use crate::domain::ports::ProfileRepository;
use crate::domain::profile::{Address, Identity, UserProfile};

use super::require_identity;

pub struct ProfileService<R> {
    repo: R,
}

impl<R: ProfileRepository> ProfileService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The saved profile, or a fresh one seeded from the identity.
    pub fn get_profile(&self, identity: Option<&Identity>) -> Result<UserProfile, DomainError> {
        let identity = require_identity(identity)?;
        Ok(self
            .repo
            .find_profile(&identity.user_id)?
            .unwrap_or_else(|| UserProfile::from_identity(identity)))
    }

    pub fn update_contact(
        &self,
        identity: Option<&Identity>,
        name: &str,
        phone: &str,
    ) -> Result<UserProfile, DomainError> {
        self.update(identity, |profile| profile.update_contact(name, phone))
    }

    pub fn add_address(
        &self,
        identity: Option<&Identity>,
        address: Address,
    ) -> Result<UserProfile, DomainError> {
        self.update(identity, |profile| profile.add_address(address))
    }

    pub fn remove_address(
        &self,
        identity: Option<&Identity>,
        index: usize,
    ) -> Result<UserProfile, DomainError> {
        self.update(identity, |profile| profile.remove_address(index).map(|_| ()))
    }

    fn update<F>(&self, identity: Option<&Identity>, edit: F) -> Result<UserProfile, DomainError>
    where
        F: FnOnce(&mut UserProfile) -> Result<(), DomainError>,
    {
        let mut profile = self.get_profile(identity)?;
        edit(&mut profile)?;
        self.repo.save_profile(&profile)?;
        Ok(profile)
    }
}
