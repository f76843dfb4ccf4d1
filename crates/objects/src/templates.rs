//! Editor template lookup.
//!
//! Templates live at `{templates_dir}/{edit_js_filename}.js` and
//! `{templates_dir}/{edit_html_filename}.html`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::ObjectType;
use crate::errors::ObjectError;

impl ObjectType {
    pub fn has_editor_js_template(&self) -> bool {
        self.edit_js_filename.is_some()
    }

    pub fn has_editor_html_template(&self) -> bool {
        self.edit_html_filename.is_some()
    }

    pub async fn get_editor_js_template(&self, templates_dir: impl AsRef<Path>) -> Result<String, ObjectError> {
        let file = self.edit_js_filename.ok_or_else(|| self.not_configured())?;
        read_template(templates_dir.as_ref().join(format!("{file}.js"))).await
    }

    pub async fn get_editor_html_template(&self, templates_dir: impl AsRef<Path>) -> Result<String, ObjectError> {
        let file = self.edit_html_filename.ok_or_else(|| self.not_configured())?;
        read_template(templates_dir.as_ref().join(format!("{file}.html"))).await
    }

    fn not_configured(&self) -> ObjectError {
        ObjectError::TemplateNotConfigured { type_name: self.name.to_string() }
    }
}

async fn read_template(path: PathBuf) -> Result<String, ObjectError> {
    debug!(path = %path.display(), "loading editor template");
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ObjectError::TemplateIo { path, source })
}
