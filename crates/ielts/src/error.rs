use ielts_core::llm::FormatError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum Error {
    /// A required credential or setting is absent.
    #[error("{0}")]
    Configuration(String),

    /// The document cannot be read or decoded.
    #[error("Failed to decode PDF: {0}")]
    Decode(String),

    /// The inference call failed, timed out or returned a non-2xx status.
    #[error("{0}")]
    Network(String),

    /// The model output could not be turned into a result.
    #[error("Failed to parse model output: {0}")]
    Format(String),

    #[error("Generic {0}")]
    Generic(String),
}

impl From<pdf::PdfError> for Error {
    fn from(err: pdf::PdfError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::Format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_errors_are_decode_errors() {
        let err: Error = pdf::PdfError::Encrypted.into();
        assert_eq!(err, Error::Decode("Document is encrypted".into()));
    }

    #[test]
    fn test_network_message_is_verbatim() {
        let err = Error::Network("OpenRouter API error 429".into());
        assert_eq!(err.to_string(), "OpenRouter API error 429");
    }
}
