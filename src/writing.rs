//! Writing practice: read Spanish text off a photo of handwriting and
//! translate it.

use crate::model::{ImageInput, LanguageModel};
use crate::questions::prompts::IMAGE_PROMPT;
use crate::{PracticeError, Result};
use log::info;
use std::fs;
use std::path::Path;

/// Accepted image extensions and the MIME type sent for each
const IMAGE_TYPES: [(&str, &str); 3] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

/// MIME type for an image path, if the extension is supported
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

impl ImageInput {
    /// Read an image from disk, rejecting unsupported formats
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime_type = mime_type_for(path).ok_or_else(|| {
            PracticeError::InvalidInput(format!(
                "Unsupported image type {:?}, expected png, jpg or jpeg",
                path
            ))
        })?;
        let bytes = fs::read(path)?;
        if bytes.is_empty() {
            return Err(PracticeError::InvalidInput(format!(
                "Image file {:?} is empty",
                path
            )));
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

pub struct WritingAssistant<M> {
    model: M,
}

impl<M: LanguageModel> WritingAssistant<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Extract and translate the Spanish text in `image`
    pub fn process_image(&mut self, image: &ImageInput) -> Result<String> {
        info!(
            "Sending {} image ({} bytes) for text extraction",
            image.mime_type,
            image.bytes.len()
        );
        self.model.generate_with_image(IMAGE_PROMPT, image)
    }

    pub fn process_file(&mut self, path: &Path) -> Result<String> {
        let image = ImageInput::from_path(path)?;
        self.process_image(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScriptedModel;
    use std::path::PathBuf;

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for(&PathBuf::from("a.png")), Some("image/png"));
        assert_eq!(mime_type_for(&PathBuf::from("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_type_for(&PathBuf::from("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_type_for(&PathBuf::from("a.gif")), None);
        assert_eq!(mime_type_for(&PathBuf::from("noext")), None);
    }

    #[test]
    fn test_unsupported_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.gif");
        fs::write(&path, b"GIF89a").unwrap();
        assert!(matches!(
            ImageInput::from_path(&path),
            Err(PracticeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_image_sent_with_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let model = ScriptedModel::new().reply("Spanish: Hola\nEnglish: Hello");
        let mut assistant = WritingAssistant::new(model);
        let reply = assistant.process_file(&path).unwrap();

        assert!(reply.contains("Hello"));
        assert_eq!(assistant.model.images().len(), 1);
        assert_eq!(assistant.model.images()[0].mime_type, "image/png");
        assert_eq!(assistant.model.prompts()[0], IMAGE_PROMPT);
    }
}
