use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ReturnDocument,
    Collection, Database,
};
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::user::{NewUser, UpdateProfileRequest, User};
use crate::utils::Claims;

pub struct UserService {
    collection: Collection<User>,
}

impl UserService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    /// Resolves the caller of an authenticated request, creating their
    /// account on the first request a verified token is seen with.
    pub async fn require_active(&self, claims: &Claims) -> Result<User, AppError> {
        let user = match self.collection.find_one(doc! { "_id": &claims.sub }).await? {
            Some(user) => user,
            None => {
                let user = self.upsert_user(NewUser::from_claims(claims)).await?;
                info!(user_id = %user.id, "user provisioned from token");
                user
            }
        };

        if !user.is_active {
            return Err(AppError::Forbidden("User account is disabled".to_string()));
        }
        Ok(user)
    }

    pub async fn require_admin(&self, claims: &Claims) -> Result<User, AppError> {
        let user = self.require_active(claims).await?;
        if !user.is_admin {
            return Err(AppError::Forbidden("Admin privileges required".to_string()));
        }
        Ok(user)
    }

    pub async fn users_by_ids(&self, user_ids: &[String]) -> Result<HashMap<String, User>, AppError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users: Vec<User> = self
            .collection
            .find(doc! { "_id": { "$in": user_ids } })
            .await?
            .try_collect()
            .await?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }

    /// Creates the user on first login, refreshes profile data afterwards.
    pub async fn upsert_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let now = bson::to_bson(&Utc::now())?;
        let user = self
            .collection
            .find_one_and_update(
                doc! { "_id": &new_user.id },
                doc! {
                    "$set": {
                        "email": &new_user.email,
                        "name": &new_user.name,
                        "profile_picture": new_user.profile_picture.clone(),
                        "last_login_at": now.clone(),
                    },
                    "$setOnInsert": {
                        "created_at": now,
                        "is_active": true,
                        "is_admin": false,
                    },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", new_user.id)))?;

        debug!(user_id = %user.id, "user upserted");
        Ok(user)
    }

    pub async fn update_profile(&self, user_id: &str, req: UpdateProfileRequest) -> Result<User, AppError> {
        let mut update = Document::new();
        if let Some(name) = req.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::BadRequest("name cannot be empty".to_string()));
            }
            update.insert("name", name);
        }
        if let Some(picture) = req.profile_picture {
            update.insert("profile_picture", picture);
        }
        if update.is_empty() {
            return Err(AppError::BadRequest("Provide at least one field to update".to_string()));
        }

        let user = self
            .collection
            .find_one_and_update(doc! { "_id": user_id }, doc! { "$set": update })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        debug!(user_id, "profile updated");
        Ok(user)
    }
}
