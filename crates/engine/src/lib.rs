pub use error::EngineError;
pub use fails::{DEFAULT_AUTHOR, Fail, FailChanges, FailDraft};
pub use users::User;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

mod error;
mod fails;
mod users;

type ResultEngine<T> = Result<T, EngineError>;

/// The data-access layer over the chosen persistence backend.
///
/// Holds the only database handle of the process; it is constructed once at
/// startup and passed down to whoever needs it.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// List every user, oldest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    /// Look a user up by email. Used by the login flow.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?;
        Ok(model.map(User::from))
    }

    /// Create a user. The email must not be taken yet.
    pub async fn new_user(&self, name: &str, email: &str) -> ResultEngine<User> {
        if self.user_by_email(email).await?.is_some() {
            return Err(EngineError::ExistingKey(email.to_string()));
        }

        let model = users::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            email: ActiveValue::Set(email.to_string()),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        Ok(model.into())
    }

    /// List posts, oldest first, enriched with the creator's name.
    ///
    /// With `created_by` set, only that user's posts are returned.
    pub async fn list_fails(&self, created_by: Option<i32>) -> ResultEngine<Vec<Fail>> {
        let mut query = fails::Entity::find().order_by_asc(fails::Column::Id);
        if let Some(user_id) = created_by {
            query = query.filter(fails::Column::CreatedBy.eq(user_id));
        }

        let rows = query
            .find_also_related(users::Entity)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(model, creator)| Fail::from_model(model, creator.map(|user| user.name)))
            .collect())
    }

    /// Return a single post, enriched with the creator's name.
    pub async fn fail(&self, id: i32) -> ResultEngine<Fail> {
        let (model, creator) = fails::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("fail not exists".to_string()))?;

        Ok(Fail::from_model(model, creator.map(|user| user.name)))
    }

    /// Create a post.
    ///
    /// `created_by` must resolve to an existing user; the check runs here so
    /// the failure is typed instead of depending on driver FK error text.
    pub async fn new_fail(&self, draft: FailDraft) -> ResultEngine<Fail> {
        let creator = users::Entity::find_by_id(draft.created_by)
            .one(&self.database)
            .await?;
        if creator.is_none() {
            return Err(EngineError::InvalidReference(format!(
                "created_by {} does not match any user",
                draft.created_by
            )));
        }

        let author = draft
            .author
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        let model = fails::ActiveModel {
            name: ActiveValue::Set(draft.name),
            description: ActiveValue::Set(draft.description),
            author: ActiveValue::Set(author),
            created_by: ActiveValue::Set(draft.created_by),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        Ok(self.enriched_or_bare(model).await)
    }

    /// Update a post. Only supplied fields change; supplying none is an
    /// error.
    pub async fn update_fail(&self, id: i32, changes: FailChanges) -> ResultEngine<Fail> {
        if changes.is_empty() {
            return Err(EngineError::EmptyUpdate(
                "at least one field must be supplied".to_string(),
            ));
        }

        let model = fails::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("fail not exists".to_string()))?;

        let mut active: fails::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(description) = changes.description {
            active.description = ActiveValue::Set(description);
        }
        if let Some(author) = changes.author {
            active.author = ActiveValue::Set(author);
        }

        let model = active.update(&self.database).await?;
        Ok(self.enriched_or_bare(model).await)
    }

    /// Delete a post by id.
    pub async fn delete_fail(&self, id: i32) -> ResultEngine<()> {
        let result = fails::Entity::delete_by_id(id).exec(&self.database).await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("fail not exists".to_string()));
        }
        Ok(())
    }

    /// Enrich a freshly written row with the creator's name.
    ///
    /// The write has already committed at this point, so a failed read must
    /// not turn the operation into an error; the row is returned without the
    /// creator name instead.
    async fn enriched_or_bare(&self, model: fails::Model) -> Fail {
        match users::Entity::find_by_id(model.created_by)
            .one(&self.database)
            .await
        {
            Ok(creator) => Fail::from_model(model, creator.map(|user| user.name)),
            Err(err) => {
                tracing::warn!("enrichment read failed after write: {err}");
                Fail::from_model(model, None)
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
