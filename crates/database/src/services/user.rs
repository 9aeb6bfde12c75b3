use crate::entities::users;
use crate::error::{ServiceError, ServiceResult};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Partial update; None leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub struct UserService;

impl UserService {
    pub async fn get_all(db: &DatabaseConnection) -> ServiceResult<Vec<users::Model>> {
        Ok(users::Entity::find().all(db).await?)
    }

    pub async fn get_by_id(db: &DatabaseConnection, user_id: Uuid) -> ServiceResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                log::warn!("user {user_id} not found");
                ServiceError::NotFound(format!("user {user_id} not found"))
            })
    }

    pub async fn create(db: &DatabaseConnection, new: NewUser) -> ServiceResult<users::Model> {
        Self::ensure_email_free(db, &new.email, None).await?;

        let user = users::Model {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
        };

        users::Entity::insert(users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
        })
        .exec_without_returning(db)
        .await?;

        log::info!("user {} created", user.id);
        Ok(user)
    }

    pub async fn update(
        db: &DatabaseConnection,
        user_id: Uuid,
        patch: UpdateUser,
    ) -> ServiceResult<users::Model> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found")))?;

        if let Some(email) = patch.email.as_deref()
            && email != user.email
        {
            Self::ensure_email_free(db, email, Some(user_id)).await?;
        }

        // An empty patch has nothing to write
        if patch.name.is_none() && patch.email.is_none() {
            return Ok(user);
        }

        let mut active = user.into_active_model();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }

        let updated = users::Entity::update(active).exec(db).await?;
        log::info!("user {user_id} updated");
        Ok(updated)
    }

    /// Deleting an unknown user is a no-op
    pub async fn delete(db: &DatabaseConnection, user_id: Uuid) -> ServiceResult<()> {
        users::Entity::delete_by_id(user_id).exec(db).await?;
        log::info!("user {user_id} deleted");
        Ok(())
    }

    /// The unique index on email backs this check at the database level
    async fn ensure_email_free(
        db: &DatabaseConnection,
        email: &str,
        exclude: Option<Uuid>,
    ) -> ServiceResult<()> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(user_id) = exclude {
            query = query.filter(users::Column::Id.ne(user_id));
        }

        match query.one(db).await? {
            Some(_) => Err(ServiceError::Conflict("email already in use".to_string())),
            None => Ok(()),
        }
    }
}
