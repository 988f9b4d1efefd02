//! Document loading
//!
//! A [`DocumentLoader`] turns the bytes of an uploaded file into block
//! markup; the markup is then split into the blocks of a [`Document`].
//! A rejected file type or a failed conversion leaves no document behind.

#[cfg(feature = "docx")]
mod docx;
mod html;

#[cfg(feature = "docx")]
pub use docx::DocxLoader;
pub use html::MarkupLoader;

use crate::types::*;
use std::future::Future;
use std::path::Path;

pub trait DocumentLoader {
    /// Accepted file extensions, lowercase and without the dot
    fn extensions(&self) -> &[&'static str];

    /// Convert file contents into block markup
    fn convert(&self, bytes: Vec<u8>) -> impl Future<Output = Result<String>> + Send;

    fn accepts(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions().iter().any(|accepted| *accepted == ext)
            })
            .unwrap_or(false)
    }
}

fn check_file_type<L: DocumentLoader + ?Sized>(name: &str, loader: &L) -> Result<()> {
    if loader.accepts(name) {
        Ok(())
    } else {
        Err(ComposeError::Input(format!(
            "{} is not a supported file (expected .{})",
            name,
            loader.extensions().join(", .")
        )))
    }
}

/// Load a document from disk
pub async fn load_document<L: DocumentLoader>(path: impl AsRef<Path>, loader: &L) -> Result<Document> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    check_file_type(&name, loader)?;
    let bytes = tokio::fs::read(path).await?;
    load_document_bytes(name, bytes, loader).await
}

/// Load a document from the contents of a file named `name`
pub async fn load_document_bytes<L: DocumentLoader>(
    name: impl Into<String>,
    bytes: Vec<u8>,
    loader: &L,
) -> Result<Document> {
    let name = name.into();
    check_file_type(&name, loader)?;

    let markup = loader.convert(bytes).await.map_err(|e| match e {
        ComposeError::Conversion(_) => e,
        other => ComposeError::Conversion(other.to_string()),
    })?;

    let document = Document::from_markup(name, &markup);
    log::info!(
        "Loaded {} with {} blocks",
        document.name,
        document.blocks.len()
    );
    Ok(document)
}
