//! Character Context - Errors
//!
//! 稳定错误码构造函数，按实体分组

use crate::domain::primitives::DomainError;

pub mod character {
    use super::DomainError;
    use crate::domain::character::{CharacterId, ImageId};

    pub fn name_invalid() -> DomainError {
        DomainError::new("Character.Name.Invalid", "Character name cannot be empty.")
    }

    pub fn name_too_long(max: usize) -> DomainError {
        DomainError::new(
            "Character.Name.TooLong",
            format!("Character name cannot exceed {max} characters."),
        )
    }

    pub fn description_too_long(max: usize) -> DomainError {
        DomainError::new(
            "Character.Description.TooLong",
            format!("Character description cannot exceed {max} characters."),
        )
    }

    pub fn created_by_invalid() -> DomainError {
        DomainError::new("Character.CreatedBy.Invalid", "CreatedBy must be a valid user ID.")
    }

    pub fn pronoun_duplicate() -> DomainError {
        DomainError::new(
            "Character.Pronoun.Duplicate",
            "This pronoun already exists for the character.",
        )
    }

    pub fn pronoun_not_found() -> DomainError {
        DomainError::new(
            "Character.Pronoun.NotFound",
            "The specified pronoun does not exist for the character.",
        )
    }

    pub fn image_not_found(image_id: ImageId) -> DomainError {
        DomainError::new(
            "Character.Image.NotFound",
            format!("The specified image does not exist for the character: {image_id}"),
        )
    }

    pub fn not_found(id: CharacterId) -> DomainError {
        DomainError::new(
            "Character.NotFound",
            format!("Character with ID {id} was not found."),
        )
    }
}

pub mod pronoun {
    use super::DomainError;
    use crate::domain::character::PronounId;

    pub fn subject_empty() -> DomainError {
        DomainError::new("Pronoun.Subject.Empty", "Subject pronoun cannot be empty.")
    }

    pub fn object_empty() -> DomainError {
        DomainError::new("Pronoun.Object.Empty", "Object pronoun cannot be empty.")
    }

    pub fn possessive_empty() -> DomainError {
        DomainError::new("Pronoun.Possessive.Empty", "Possessive pronoun cannot be empty.")
    }

    pub fn subject_too_long(max: usize) -> DomainError {
        DomainError::new(
            "Pronoun.Subject.TooLong",
            format!("Subject pronoun cannot exceed {max} characters."),
        )
    }

    pub fn object_too_long(max: usize) -> DomainError {
        DomainError::new(
            "Pronoun.Object.TooLong",
            format!("Object pronoun cannot exceed {max} characters."),
        )
    }

    pub fn possessive_too_long(max: usize) -> DomainError {
        DomainError::new(
            "Pronoun.Possessive.TooLong",
            format!("Possessive pronoun cannot exceed {max} characters."),
        )
    }

    pub fn already_exists() -> DomainError {
        DomainError::new("Pronoun.AlreadyExists", "This pronoun set already exists.")
    }

    pub fn not_found(id: PronounId) -> DomainError {
        DomainError::new("Pronoun.NotFound", format!("Pronoun with ID {id} was not found."))
    }

    pub fn not_found_many(ids: &[PronounId]) -> DomainError {
        DomainError::new(
            "Pronoun.NotFound",
            format!("The following pronoun IDs were not found: {}", join_ids(ids)),
        )
    }

    fn join_ids(ids: &[PronounId]) -> String {
        ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

pub mod image {
    use super::DomainError;
    use crate::domain::character::ImageId;

    pub fn name_invalid() -> DomainError {
        DomainError::new("Image.Name.Invalid", "Image name cannot be empty.")
    }

    pub fn name_too_long(max: usize) -> DomainError {
        DomainError::new(
            "Image.Name.TooLong",
            format!("Image name cannot exceed {max} characters."),
        )
    }

    pub fn set_processing_invalid_status() -> DomainError {
        DomainError::new(
            "Image.SetProcessing.InvalidStatus",
            "Can only set image to processing from pending status.",
        )
    }

    pub fn set_completed_invalid_status() -> DomainError {
        DomainError::new(
            "Image.SetCompleted.InvalidStatus",
            "Can only set image to completed from processing status.",
        )
    }

    pub fn set_failed_invalid_status() -> DomainError {
        DomainError::new(
            "Image.SetFailed.InvalidStatus",
            "Cannot set image to failed from completed status.",
        )
    }

    pub fn status_invalid(value: &str) -> DomainError {
        DomainError::new("Image.Status.Invalid", format!("Unknown upload status: {value}"))
    }

    pub fn not_found_many(ids: &[ImageId]) -> DomainError {
        DomainError::new(
            "Image.NotFound",
            format!(
                "The following image IDs were not found: {}",
                ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            ),
        )
    }
}
