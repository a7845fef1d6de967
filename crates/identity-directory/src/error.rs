use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The account already exists. The message is the user-facing localized
    /// string the admin screens display verbatim.
    #[error("El correo electrónico ya está registrado")]
    EmailTaken { email: String },

    #[error("directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("directory returned an unusable response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::DirectoryError;

    #[test]
    fn email_conflict_surfaces_the_localized_message() {
        let err = DirectoryError::EmailTaken {
            email: "ana@example.com".to_string(),
        };

        assert_eq!(err.to_string(), "El correo electrónico ya está registrado");
    }
}
