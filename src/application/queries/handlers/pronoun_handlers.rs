//! Pronoun Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::PronounRepositoryPort;
use crate::application::queries::{GetPronoun, GetPronounsByIds, ListPronouns, PronounView};
use crate::domain::character::{errors, PronounId};

/// GetPronoun Handler
pub struct GetPronounHandler {
    pronoun_repo: Arc<dyn PronounRepositoryPort>,
}

impl GetPronounHandler {
    pub fn new(pronoun_repo: Arc<dyn PronounRepositoryPort>) -> Self {
        Self { pronoun_repo }
    }

    pub async fn handle(&self, query: GetPronoun) -> Result<PronounView, ApplicationError> {
        let pronoun = self
            .pronoun_repo
            .find_by_id(query.pronoun_id)
            .await?
            .ok_or_else(|| errors::pronoun::not_found(query.pronoun_id))?;

        Ok(PronounView::from(&pronoun))
    }
}

/// ListPronouns Handler
pub struct ListPronounsHandler {
    pronoun_repo: Arc<dyn PronounRepositoryPort>,
}

impl ListPronounsHandler {
    pub fn new(pronoun_repo: Arc<dyn PronounRepositoryPort>) -> Self {
        Self { pronoun_repo }
    }

    pub async fn handle(&self, _query: ListPronouns) -> Result<Vec<PronounView>, ApplicationError> {
        let pronouns = self.pronoun_repo.find_all().await?;
        Ok(pronouns.iter().map(PronounView::from).collect())
    }
}

/// GetPronounsByIds Handler
pub struct GetPronounsByIdsHandler {
    pronoun_repo: Arc<dyn PronounRepositoryPort>,
}

impl GetPronounsByIdsHandler {
    pub fn new(pronoun_repo: Arc<dyn PronounRepositoryPort>) -> Self {
        Self { pronoun_repo }
    }

    pub async fn handle(&self, query: GetPronounsByIds) -> Result<Vec<PronounView>, ApplicationError> {
        if query.pronoun_ids.is_empty() {
            return Ok(Vec::new());
        }

        let pronouns = self.pronoun_repo.find_by_ids(&query.pronoun_ids).await?;
        let mut missing: Vec<PronounId> = Vec::new();
        for id in &query.pronoun_ids {
            if !pronouns.iter().any(|p| p.id() == *id) && !missing.contains(id) {
                missing.push(*id);
            }
        }
        if !missing.is_empty() {
            return Err(errors::pronoun::not_found_many(&missing).into());
        }

        Ok(pronouns.iter().map(PronounView::from).collect())
    }
}
