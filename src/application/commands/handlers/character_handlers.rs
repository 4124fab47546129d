//! Character Command Handlers

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::commands::{
    AddCharacterPronoun, CreateCharacter, DeleteCharacter, PronounInput, RemoveCharacterPronoun,
    UpdateCharacter,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{CharacterRepositoryPort, PronounRepositoryPort};
use crate::application::queries::{CharacterView, PronounView};
use crate::application::unit_of_work::UnitOfWorkFactory;
use crate::domain::character::{errors, Character, CharacterId, Pronoun, PronounId, UserId};

/// 按 ID 关联目录中的代词组；缺失的 ID 一次性全部报告
async fn resolve_pronouns(
    pronoun_repo: &dyn PronounRepositoryPort,
    ids: &[PronounId],
) -> Result<Vec<Pronoun>, ApplicationError> {
    let mut unique: Vec<PronounId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    if unique.is_empty() {
        return Ok(Vec::new());
    }

    let mut found = pronoun_repo.find_by_ids(&unique).await?;
    let missing: Vec<PronounId> = unique
        .iter()
        .filter(|id| !found.iter().any(|p| p.id() == **id))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(errors::pronoun::not_found_many(&missing).into());
    }

    // 保持请求顺序
    found.sort_by_key(|p| unique.iter().position(|id| *id == p.id()));
    Ok(found)
}

/// 添加代词组：目录中已存在则复用，否则新建（提交时写入目录）
async fn add_or_attach_pronoun(
    pronoun_repo: &dyn PronounRepositoryPort,
    character: &mut Character,
    input: &PronounInput,
    by: UserId,
) -> Result<(), ApplicationError> {
    match pronoun_repo
        .find_by_value(&input.subject, &input.object, &input.possessive)
        .await?
    {
        Some(existing) => character.attach_pronoun(existing, by)?,
        None => {
            character.add_pronoun(&input.subject, &input.object, &input.possessive, by)?;
        }
    }
    Ok(())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}

// ============================================================================
// CreateCharacter
// ============================================================================

/// CreateCharacter Handler
pub struct CreateCharacterHandler {
    pronoun_repo: Arc<dyn PronounRepositoryPort>,
    uow: UnitOfWorkFactory,
}

impl CreateCharacterHandler {
    pub fn new(pronoun_repo: Arc<dyn PronounRepositoryPort>, uow: UnitOfWorkFactory) -> Self {
        Self { pronoun_repo, uow }
    }

    pub async fn handle(
        &self,
        command: CreateCharacter,
        cancel: &CancellationToken,
    ) -> Result<CharacterView, ApplicationError> {
        let mut character = Character::create(
            CharacterId::new(),
            command.name,
            normalize_description(command.description),
            command.requested_by,
        )?;

        let pronouns = resolve_pronouns(self.pronoun_repo.as_ref(), &command.pronoun_ids).await?;
        for pronoun in pronouns {
            character.attach_pronoun(pronoun, command.requested_by)?;
        }

        let view = CharacterView::from(&character);
        let mut uow = self.uow.begin();
        uow.add_character(character);
        uow.commit(cancel).await?;

        tracing::info!(
            character_id = %view.id,
            created_by = %view.created_by,
            pronouns = view.pronouns.len(),
            "Character created"
        );

        Ok(view)
    }
}

// ============================================================================
// UpdateCharacter
// ============================================================================

/// UpdateCharacter Handler - 名称、描述与代词组整体替换
pub struct UpdateCharacterHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    pronoun_repo: Arc<dyn PronounRepositoryPort>,
    uow: UnitOfWorkFactory,
}

impl UpdateCharacterHandler {
    pub fn new(
        character_repo: Arc<dyn CharacterRepositoryPort>,
        pronoun_repo: Arc<dyn PronounRepositoryPort>,
        uow: UnitOfWorkFactory,
    ) -> Self {
        Self {
            character_repo,
            pronoun_repo,
            uow,
        }
    }

    pub async fn handle(
        &self,
        command: UpdateCharacter,
        cancel: &CancellationToken,
    ) -> Result<CharacterView, ApplicationError> {
        let by = command.requested_by;
        let mut character = self
            .character_repo
            .find_by_id(command.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(command.character_id))?;

        character.change_name(command.name, by)?;
        character.change_description(normalize_description(command.description), by)?;

        // 先移除不再需要的，再添加新增的
        let stale: Vec<PronounView> = character
            .pronouns()
            .iter()
            .filter(|p| {
                !command
                    .pronouns
                    .iter()
                    .any(|input| p.matches(&input.subject, &input.object, &input.possessive))
            })
            .map(PronounView::from)
            .collect();
        for pronoun in &stale {
            character.remove_pronoun(&pronoun.subject, &pronoun.object, &pronoun.possessive, by)?;
        }

        for input in &command.pronouns {
            let present = character
                .pronouns()
                .iter()
                .any(|p| p.matches(&input.subject, &input.object, &input.possessive));
            if !present {
                add_or_attach_pronoun(self.pronoun_repo.as_ref(), &mut character, input, by)
                    .await?;
            }
        }

        let view = CharacterView::from(&character);
        let mut uow = self.uow.begin();
        uow.update_character(character);
        uow.commit(cancel).await?;

        tracing::info!(character_id = %view.id, "Character updated");

        Ok(view)
    }
}

// ============================================================================
// DeleteCharacter
// ============================================================================

/// DeleteCharacter Handler
///
/// 删除前逐个移除图片，使存储清理处理器收到 ImageRemoved 事件。
pub struct DeleteCharacterHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    uow: UnitOfWorkFactory,
}

impl DeleteCharacterHandler {
    pub fn new(character_repo: Arc<dyn CharacterRepositoryPort>, uow: UnitOfWorkFactory) -> Self {
        Self {
            character_repo,
            uow,
        }
    }

    pub async fn handle(
        &self,
        command: DeleteCharacter,
        cancel: &CancellationToken,
    ) -> Result<(), ApplicationError> {
        let mut character = self
            .character_repo
            .find_by_id(command.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(command.character_id))?;

        let image_ids: Vec<_> = character.images().iter().map(|i| i.id()).collect();
        for image_id in &image_ids {
            character.remove_image(*image_id, command.requested_by)?;
        }

        let mut uow = self.uow.begin();
        uow.delete_character(character);
        let outcome = uow.commit(cancel).await?;

        tracing::info!(
            character_id = %command.character_id,
            images = image_ids.len(),
            events_published = outcome.published,
            "Character deleted"
        );

        Ok(())
    }
}

// ============================================================================
// AddCharacterPronoun / RemoveCharacterPronoun
// ============================================================================

/// AddCharacterPronoun Handler
pub struct AddCharacterPronounHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    pronoun_repo: Arc<dyn PronounRepositoryPort>,
    uow: UnitOfWorkFactory,
}

impl AddCharacterPronounHandler {
    pub fn new(
        character_repo: Arc<dyn CharacterRepositoryPort>,
        pronoun_repo: Arc<dyn PronounRepositoryPort>,
        uow: UnitOfWorkFactory,
    ) -> Self {
        Self {
            character_repo,
            pronoun_repo,
            uow,
        }
    }

    pub async fn handle(
        &self,
        command: AddCharacterPronoun,
        cancel: &CancellationToken,
    ) -> Result<CharacterView, ApplicationError> {
        let mut character = self
            .character_repo
            .find_by_id(command.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(command.character_id))?;

        add_or_attach_pronoun(
            self.pronoun_repo.as_ref(),
            &mut character,
            &command.pronoun,
            command.requested_by,
        )
        .await?;

        let view = CharacterView::from(&character);
        let mut uow = self.uow.begin();
        uow.update_character(character);
        uow.commit(cancel).await?;

        tracing::info!(
            character_id = %view.id,
            subject = %command.pronoun.subject,
            "Pronoun added to character"
        );

        Ok(view)
    }
}

/// RemoveCharacterPronoun Handler
pub struct RemoveCharacterPronounHandler {
    character_repo: Arc<dyn CharacterRepositoryPort>,
    uow: UnitOfWorkFactory,
}

impl RemoveCharacterPronounHandler {
    pub fn new(character_repo: Arc<dyn CharacterRepositoryPort>, uow: UnitOfWorkFactory) -> Self {
        Self {
            character_repo,
            uow,
        }
    }

    pub async fn handle(
        &self,
        command: RemoveCharacterPronoun,
        cancel: &CancellationToken,
    ) -> Result<CharacterView, ApplicationError> {
        let mut character = self
            .character_repo
            .find_by_id(command.character_id)
            .await?
            .ok_or_else(|| errors::character::not_found(command.character_id))?;

        let input = &command.pronoun;
        let removed = character.remove_pronoun(
            &input.subject,
            &input.object,
            &input.possessive,
            command.requested_by,
        )?;

        let view = CharacterView::from(&character);
        let mut uow = self.uow.begin();
        uow.update_character(character);
        uow.commit(cancel).await?;

        tracing::info!(
            character_id = %view.id,
            pronoun_id = %removed.id(),
            "Pronoun removed from character"
        );

        Ok(view)
    }
}
