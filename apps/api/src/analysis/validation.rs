use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{field} cannot be empty.")]
    Empty { field: &'static str },

    #[error("{field} exceeds maximum length of {max} characters.")]
    TooLong { field: &'static str, max: usize },
}

/// Bounds applied to every user-supplied text field.
#[derive(Debug, Clone, Copy)]
pub struct InputLimits {
    pub max_length: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self { max_length: 500 }
    }
}

/// Trims `text` and checks it is non-empty and within `limits.max_length`
/// characters. Returns the trimmed text.
pub fn validate_input<'a>(
    text: &'a str,
    field: &'static str,
    limits: InputLimits,
) -> Result<&'a str, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty { field });
    }
    if trimmed.chars().count() > limits.max_length {
        return Err(InputError::TooLong {
            field,
            max: limits.max_length,
        });
    }
    Ok(trimmed)
}

/// Splits a comma-separated skill list, trimming pieces and dropping blanks.
pub fn split_skills(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
