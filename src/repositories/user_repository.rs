use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{RefreshTokenRecord, User},
};

/// Storage for user identities and their active refresh-token digests.
///
/// The token-list operations are atomic per user: concurrent rotations of
/// the same token settle to exactly one winner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateEmail` when the email is
    /// already taken.
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>>;
    /// Append a token digest unless an identical digest is already present.
    async fn append_refresh_token(
        &self,
        user_id: &str,
        record: RefreshTokenRecord,
    ) -> AppResult<()>;
    /// Remove a token digest. Succeeds whether or not it was present.
    async fn remove_refresh_token(&self, user_id: &str, token_hash: &str) -> AppResult<()>;
    async fn has_refresh_token(&self, user_id: &str, token_hash: &str) -> AppResult<bool>;
    /// Replace `old_token_hash` with `replacement` in one compare-and-swap.
    /// Returns false when the old digest was no longer in the list, which is
    /// how a second use of a rotated token loses the race.
    async fn rotate_refresh_token(
        &self,
        user_id: &str,
        old_token_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> AppResult<bool>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self { collection }
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match *error.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => write_error.code == 11000,
        _ => false,
    }
}

fn parse_object_id(user_id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(user_id).ok()
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(AppError::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>> {
        let oid = match parse_object_id(user_id) {
            Some(oid) => oid,
            None => return Ok(None),
        };

        let user = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(user)
    }

    async fn append_refresh_token(
        &self,
        user_id: &str,
        record: RefreshTokenRecord,
    ) -> AppResult<()> {
        let oid = match parse_object_id(user_id) {
            Some(oid) => oid,
            None => return Err(AppError::NotFound("User not found".to_string())),
        };

        // The $ne guard makes the append idempotent for an already-stored
        // digest instead of growing the list with duplicates.
        let filter = doc! {
            "_id": oid,
            "refresh_tokens.token_hash": { "$ne": &record.token_hash },
        };
        let update = doc! {
            "$push": { "refresh_tokens": to_bson(&record)? },
            "$set": { "modified_at": to_bson(&Utc::now())? },
        };

        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    async fn remove_refresh_token(&self, user_id: &str, token_hash: &str) -> AppResult<()> {
        let oid = match parse_object_id(user_id) {
            Some(oid) => oid,
            None => return Ok(()),
        };

        let update = doc! {
            "$pull": { "refresh_tokens": { "token_hash": token_hash } },
            "$set": { "modified_at": to_bson(&Utc::now())? },
        };

        self.collection.update_one(doc! { "_id": oid }, update).await?;
        Ok(())
    }

    async fn has_refresh_token(&self, user_id: &str, token_hash: &str) -> AppResult<bool> {
        let oid = match parse_object_id(user_id) {
            Some(oid) => oid,
            None => return Ok(false),
        };

        let filter = doc! {
            "_id": oid,
            "refresh_tokens.token_hash": token_hash,
        };

        let found = self.collection.find_one(filter).await?;
        Ok(found.is_some())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: &str,
        old_token_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> AppResult<bool> {
        let oid = match parse_object_id(user_id) {
            Some(oid) => oid,
            None => return Ok(false),
        };

        // Single-document compare-and-swap: the filter only matches while
        // the old digest is still in the list, and the positional update
        // swaps exactly that element.
        let filter = doc! {
            "_id": oid,
            "refresh_tokens": { "$elemMatch": { "token_hash": old_token_hash } },
        };
        let update = doc! {
            "$set": {
                "refresh_tokens.$": to_bson(&replacement)?,
                "modified_at": to_bson(&Utc::now())?,
            },
        };

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder().unique(true).build();
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;
        println!("✓ Created unique index on email field");

        Ok(())
    }
}
