use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult, INCORRECT_EMAIL, INCORRECT_PASSWORD};
use crate::users::{
    dto::{ChangePassword, CreateUser, UpdateUser},
    password::{hash_password, verify_password},
    repo::UserStore,
    repo_types::{NewUser, ProfileChanges, PublicUser},
};

pub const PASSWORD_CHANGED: &str = "Password changed successfully";

pub async fn create(store: &dyn UserStore, input: CreateUser) -> AppResult<Uuid> {
    let password_hash = hash_password(&input.password)?;
    let user = store
        .insert(NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash,
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(user.id)
}

pub async fn list(store: &dyn UserStore) -> AppResult<Vec<PublicUser>> {
    let users = store.list().await?;
    Ok(users.into_iter().map(PublicUser::from).collect())
}

pub async fn get(store: &dyn UserStore, id: Uuid) -> AppResult<PublicUser> {
    store
        .find_by_id(id)
        .await?
        .map(PublicUser::from)
        .ok_or_else(AppError::invalid_user_id)
}

pub async fn update(store: &dyn UserStore, id: Uuid, input: UpdateUser) -> AppResult<Uuid> {
    let matched = store
        .update_profile(
            id,
            ProfileChanges {
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
            },
        )
        .await?;
    if matched {
        info!(user_id = %id, "user updated");
    } else {
        debug!(user_id = %id, "update matched no user");
    }
    Ok(id)
}

pub async fn delete(store: &dyn UserStore, id: Uuid) -> AppResult<()> {
    if store.delete(id).await? {
        info!(user_id = %id, "user deleted");
    } else {
        debug!(user_id = %id, "delete matched no user");
    }
    Ok(())
}

pub async fn change_password(
    store: &dyn UserStore,
    input: ChangePassword,
) -> AppResult<(Uuid, String)> {
    let Some(user) = store.find_by_email(&input.email).await? else {
        warn!(email = %input.email, "password change for unknown email");
        return Err(AppError::Auth(INCORRECT_EMAIL.into()));
    };

    if !verify_password(&input.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "password change with wrong current password");
        return Err(AppError::Auth(INCORRECT_PASSWORD.into()));
    }

    let new_hash = hash_password(&input.new_password)?;
    // Lost a race against another change: the verified hash is gone.
    if !store
        .update_password(user.id, &user.password_hash, &new_hash)
        .await?
    {
        warn!(user_id = %user.id, "password changed concurrently");
        return Err(AppError::Auth(INCORRECT_PASSWORD.into()));
    }

    info!(user_id = %user.id, "password changed");
    Ok((user.id, user.email))
}
