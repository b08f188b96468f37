//! Quote service.

use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_db::{entities::quote, repositories::QuoteRepository};
use rand::Rng;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuoteInput {
    #[validate(length(min = 1, max = 256))]
    pub author: String,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQuoteInput {
    #[validate(length(min = 1, max = 256))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub text: Option<String>,
}

/// Quote service for business logic.
#[derive(Clone)]
pub struct QuoteService {
    quote_repo: QuoteRepository,
    id_gen: IdGenerator,
}

impl QuoteService {
    /// Create a new quote service.
    #[must_use]
    pub const fn new(quote_repo: QuoteRepository) -> Self {
        Self {
            quote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// A uniformly chosen quote.
    pub async fn random(&self) -> AppResult<quote::Model> {
        let total = self.quote_repo.count().await?;
        if total == 0 {
            return Err(AppError::NotFound("No quotes available".to_string()));
        }

        let offset = rand::thread_rng().gen_range(0..total);

        // a quote deleted between the two queries leaves the offset dangling
        self.quote_repo
            .find_nth(offset)
            .await?
            .ok_or_else(|| AppError::NotFound("No quotes available".to_string()))
    }

    pub async fn list(&self) -> AppResult<Vec<quote::Model>> {
        self.quote_repo.find_all().await
    }

    pub async fn create(&self, input: CreateQuoteInput) -> AppResult<quote::Model> {
        input.validate()?;

        let model = quote::ActiveModel {
            id: Set(self.id_gen.generate()),
            author: Set(input.author),
            text: Set(input.text),
        };

        self.quote_repo.create(model).await
    }

    pub async fn update(&self, id: &str, input: UpdateQuoteInput) -> AppResult<quote::Model> {
        input.validate()?;

        let quote = self.quote_repo.get_by_id(id).await?;
        let mut active: quote::ActiveModel = quote.into();

        if let Some(author) = input.author {
            active.author = Set(author);
        }
        if let Some(text) = input.text {
            active.text = Set(text);
        }

        self.quote_repo.update(active).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.quote_repo.get_by_id(id).await?;
        self.quote_repo.delete(id).await
    }
}
