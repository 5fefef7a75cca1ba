use crate::errors::ValidationError;

/// Outcome of resolving one free-text name against the persisted records.
///
/// The resolver never guesses: zero matches and multiple matches are
/// reported distinctly, and a multiple-match is surfaced to the user as a
/// data-integrity anomaly rather than silently picking a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Found(T),
    NotFound,
    Ambiguous,
}

impl<T> Resolution<T> {
    /// Collapse the full set of case-insensitive matches for a name into a
    /// resolution.
    pub fn from_matches(mut matches: Vec<T>) -> Self {
        match matches.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Found(matches.swap_remove(0)),
            _ => Resolution::Ambiguous,
        }
    }

    /// Map the resolution to the entity, or to the validation error to hang
    /// on the originating field.
    pub fn into_field_result(self, entity: &'static str, name: &str) -> Result<T, ValidationError> {
        match self {
            Resolution::Found(value) => Ok(value),
            Resolution::NotFound => Err(ValidationError::NotFound {
                entity,
                name: name.trim().to_string(),
            }),
            Resolution::Ambiguous => Err(ValidationError::Ambiguous {
                entity,
                name: name.trim().to_string(),
            }),
        }
    }
}

/// Empty-input check shared by every required free-text field. Runs before
/// any lookup; a blank field never reaches the database.
pub fn require(input: &str) -> Result<&str, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required)
    } else {
        Ok(trimmed)
    }
}

/// Split a comma-separated list field into its trimmed, non-empty tokens.
pub fn split_name_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_match_resolves_to_the_entity() {
        let resolution = Resolution::from_matches(vec!["Sala 1"]);
        assert_eq!(resolution, Resolution::Found("Sala 1"));
        assert_eq!(resolution.into_field_result("place", "sala 1").unwrap(), "Sala 1");
    }

    #[test]
    fn zero_matches_resolve_to_not_found() {
        let resolution: Resolution<&str> = Resolution::from_matches(vec![]);
        assert_eq!(resolution, Resolution::NotFound);

        let err = resolution.into_field_result("place", " Sala 9 ").unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotFound {
                entity: "place",
                name: "Sala 9".to_string()
            }
        );
    }

    #[test]
    fn multiple_matches_resolve_to_ambiguous() {
        let resolution = Resolution::from_matches(vec!["Sala 1", "sala 1"]);
        assert_eq!(resolution, Resolution::Ambiguous);

        let err = resolution.into_field_result("place", "sala 1").unwrap_err();
        assert_eq!(err.code(), "ambiguous");
    }

    #[test]
    fn require_rejects_blank_input_without_lookup() {
        assert_eq!(require("   "), Err(ValidationError::Required));
        assert_eq!(require(""), Err(ValidationError::Required));
        assert_eq!(require("  Juan "), Ok("Juan"));
    }

    #[test]
    fn split_name_list_trims_and_drops_empty_tokens() {
        assert_eq!(
            split_name_list("Modulo A, , Modulo B ,,  Modulo C"),
            vec!["Modulo A", "Modulo B", "Modulo C"]
        );
        assert!(split_name_list("  ,  , ").is_empty());
    }
}
