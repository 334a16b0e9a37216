use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProfileRepository;
use crate::domain::profile::UserProfile;
use crate::schema::profiles;

use super::diesel_store::DieselStore;
use super::models::ProfileRow;

impl ProfileRepository for DieselStore {
    fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DomainError> {
        let mut conn = self.conn()?;
        profiles::table
            .filter(profiles::user_id.eq(user_id))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(UserProfile::try_from)
            .transpose()
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), DomainError> {
        let row = ProfileRow::from_profile(profile)?;
        let mut conn = self.conn()?;
        diesel::insert_into(profiles::table)
            .values(&row)
            .on_conflict(profiles::user_id)
            .do_update()
            .set((
                profiles::name.eq(excluded(profiles::name)),
                profiles::email.eq(excluded(profiles::email)),
                profiles::phone.eq(excluded(profiles::phone)),
                profiles::addresses.eq(excluded(profiles::addresses)),
                profiles::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        Ok(())
    }
}
