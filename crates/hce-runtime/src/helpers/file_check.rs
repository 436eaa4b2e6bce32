use std::path::Path;

use hce_core::{AssistantConfig, AssistantError};

/// A file picked by the user. Only its metadata is ever inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// Size is checked before type.
pub fn validate_file(config: &AssistantConfig, file: &FileCandidate) -> Result<(), AssistantError> {
    if file.size > config.max_file_bytes {
        return Err(AssistantError::new(
            "FILE_TOO_LARGE",
            format!(
                "\"{}\" is {} bytes; the limit is {} MB.",
                file.name,
                file.size,
                config.max_file_bytes / (1024 * 1024)
            ),
        ));
    }

    if !config
        .allowed_mime_types
        .iter()
        .any(|allowed| allowed == &file.mime_type)
    {
        return Err(AssistantError::new(
            "FILE_TYPE_UNSUPPORTED",
            format!(
                "\"{}\" has type \"{}\"; accepted types: {}.",
                file.name,
                file.mime_type,
                config.allowed_mime_types.join(", ")
            ),
        ));
    }

    Ok(())
}

/// Guesses a MIME type from the file extension the way a browser file picker reports it.
pub fn mime_from_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "gif" => "image/gif",
        "txt" => "text/plain",
        "exe" => "application/x-msdownload",
        _ => "application/octet-stream",
    }
}
