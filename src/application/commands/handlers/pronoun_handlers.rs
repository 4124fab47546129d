//! Pronoun Command Handlers

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::commands::CreatePronoun;
use crate::application::error::ApplicationError;
use crate::application::ports::PronounRepositoryPort;
use crate::application::queries::PronounView;
use crate::application::unit_of_work::UnitOfWorkFactory;
use crate::domain::character::{errors, Pronoun};

/// CreatePronoun Handler - 代词目录新增
pub struct CreatePronounHandler {
    pronoun_repo: Arc<dyn PronounRepositoryPort>,
    uow: UnitOfWorkFactory,
}

impl CreatePronounHandler {
    pub fn new(pronoun_repo: Arc<dyn PronounRepositoryPort>, uow: UnitOfWorkFactory) -> Self {
        Self { pronoun_repo, uow }
    }

    pub async fn handle(
        &self,
        command: CreatePronoun,
        cancel: &CancellationToken,
    ) -> Result<PronounView, ApplicationError> {
        let pronoun = Pronoun::create(command.subject, command.object, command.possessive)?;

        if self
            .pronoun_repo
            .exists(pronoun.subject(), pronoun.object(), pronoun.possessive())
            .await?
        {
            return Err(errors::pronoun::already_exists().into());
        }

        let view = PronounView::from(&pronoun);
        let mut uow = self.uow.begin();
        uow.add_pronoun(pronoun);
        uow.commit(cancel).await?;

        tracing::info!(
            pronoun_id = %view.id,
            requested_by = %command.requested_by,
            "Pronoun created"
        );

        Ok(view)
    }
}
