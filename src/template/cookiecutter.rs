//! Cookiecutter-compatible template expansion rendered with handlebars.
//!
//! A template directory holds `cookiecutter.json` (variable defaults) and
//! exactly one top-level directory whose name contains `{{`. Path names and
//! UTF-8 file contents below that directory are rendered with the variables
//! exposed under the `cookiecutter` namespace, e.g.
//! `{{ cookiecutter.formal_name }}`. Non-UTF-8 files are copied verbatim.

use super::{
    ExpandError, ExpandRequest, TEMPLATE_MANIFEST, TemplateContext, TemplateExpander, cache_path,
    is_repo_url,
};
use crate::bundler::{Error, ErrorExt};
use crate::git::{CloneError, VersionControl};
use async_trait::async_trait;
use handlebars::Handlebars;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Expands cookiecutter-style templates, cloning remote ones first.
pub struct CookiecutterExpander {
    vcs: Arc<dyn VersionControl>,
    cache_root: PathBuf,
}

impl std::fmt::Debug for CookiecutterExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookiecutterExpander")
            .field("cache_root", &self.cache_root)
            .finish_non_exhaustive()
    }
}

impl CookiecutterExpander {
    /// Create an expander that clones remote templates into `cache_root`.
    pub fn new(vcs: Arc<dyn VersionControl>, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            cache_root: cache_root.into(),
        }
    }

    async fn clone_template(&self, url: &str, checkout: Option<&str>) -> Result<PathBuf, ExpandError> {
        let dest = cache_path(&self.cache_root, url);
        // A fresh clone replaces whatever was cached.
        crate::bundler::utils::fs::remove_dir_all(&dest).await?;
        crate::bundler::utils::fs::create_dir_all(&self.cache_root, false).await?;

        self.vcs
            .clone_repo(url, &dest, checkout)
            .await
            .map_err(|e| match e {
                CloneError::Transport(reason) => ExpandError::Transport(reason),
                CloneError::RepositoryNotFound(_) => ExpandError::InvalidTemplate(url.to_string()),
                CloneError::BranchNotFound(branch) => ExpandError::RefNotFound(branch),
            })?;
        Ok(dest)
    }
}

#[async_trait]
impl TemplateExpander for CookiecutterExpander {
    async fn expand(&self, request: ExpandRequest<'_>) -> Result<PathBuf, ExpandError> {
        if !request.no_input {
            log::debug!("Interactive template prompts are not supported; using defaults");
        }

        let template_dir = if is_repo_url(request.source) {
            self.clone_template(request.source, request.checkout).await?
        } else {
            PathBuf::from(request.source)
        };

        let context = request.context.clone();
        let output_dir = request.output_dir.to_path_buf();
        let source = request.source.to_string();
        tokio::task::spawn_blocking(move || render_template(&template_dir, &output_dir, &context, &source))
            .await
            .map_err(|e| {
                ExpandError::Render(Error::GenericError(format!(
                    "Template rendering task failed: {}",
                    e
                )))
            })?
    }
}

/// Combine `cookiecutter.json` defaults with the caller's context.
///
/// Defaults are rendered in declaration order so later defaults may refer
/// to earlier variables. A list default means "first choice". Keys starting
/// with `_` are passed through unrendered.
fn resolve_variables(
    hb: &Handlebars<'_>,
    defaults: &TemplateContext,
    overrides: &TemplateContext,
) -> Result<TemplateContext, Error> {
    let mut vars = TemplateContext::new();
    for (key, default) in defaults {
        let raw = overrides.get(key).unwrap_or(default);
        let value = match raw {
            Value::String(text) if !key.starts_with('_') && text.contains("{{") => {
                Value::String(hb.render_template(text, &json!({ "cookiecutter": &vars }))?)
            }
            Value::Array(choices) if !key.starts_with('_') => {
                choices.first().cloned().unwrap_or(Value::Null)
            }
            other => other.clone(),
        };
        vars.insert(key.clone(), value);
    }
    for (key, value) in overrides {
        if !vars.contains_key(key) {
            vars.insert(key.clone(), value.clone());
        }
    }
    Ok(vars)
}

fn find_project_dir(template_dir: &Path) -> Result<Option<PathBuf>, Error> {
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(template_dir).fs_context("reading template", template_dir)? {
        let entry = entry.fs_context("reading template", template_dir)?;
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.path().is_dir() && name.contains("{{") {
            candidates.push(entry.path());
        }
    }
    Ok((candidates.len() == 1).then(|| candidates.remove(0)))
}

fn render_template(
    template_dir: &Path,
    output_dir: &Path,
    overrides: &TemplateContext,
    source: &str,
) -> Result<PathBuf, ExpandError> {
    let manifest = template_dir.join(TEMPLATE_MANIFEST);
    if !template_dir.is_dir() || !manifest.is_file() {
        return Err(ExpandError::InvalidTemplate(source.to_string()));
    }

    let mut hb = Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);

    let raw = std::fs::read_to_string(&manifest).fs_context("reading template manifest", &manifest)?;
    let defaults: TemplateContext = serde_json::from_str(&raw).map_err(Error::from)?;
    let vars = resolve_variables(&hb, &defaults, overrides)?;
    let data = json!({ "cookiecutter": vars });

    let project_dir =
        find_project_dir(template_dir)?.ok_or_else(|| ExpandError::InvalidTemplate(source.to_string()))?;
    let project_name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let rendered_root = output_dir.join(hb.render_template(&project_name, &data).map_err(Error::from)?);

    for entry in walkdir::WalkDir::new(&project_dir) {
        let entry = entry.map_err(Error::from)?;
        let rel_path = entry.path().strip_prefix(&project_dir).map_err(Error::from)?;

        let mut dest = rendered_root.clone();
        for component in rel_path.components() {
            let name = component.as_os_str().to_string_lossy();
            dest.push(hb.render_template(&name, &data).map_err(Error::from)?);
        }

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).fs_context("creating directory", &dest)?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }
        let bytes = std::fs::read(entry.path()).fs_context("reading template file", entry.path())?;
        match String::from_utf8(bytes) {
            Ok(text) => {
                let rendered = hb.render_template(&text, &data).map_err(Error::from)?;
                std::fs::write(&dest, rendered).fs_context("writing rendered file", &dest)?;
            }
            Err(binary) => {
                std::fs::write(&dest, binary.into_bytes()).fs_context("copying template file", &dest)?;
            }
        }
        let permissions = entry
            .metadata()
            .map_err(Error::from)?
            .permissions();
        std::fs::set_permissions(&dest, permissions).fs_context("setting permissions", &dest)?;
    }

    log::debug!("Expanded {} into {}", source, rendered_root.display());
    Ok(rendered_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_template(root: &Path) {
        std::fs::create_dir_all(root.join("{{ cookiecutter.formal_name }}/src")).expect("mkdir");
        std::fs::write(
            root.join("cookiecutter.json"),
            r#"{"formal_name": "App", "app_name": "app", "class_name": "{{ cookiecutter.formal_name }}Main", "flavor": ["vanilla", "chocolate"]}"#,
        )
        .expect("write");
        std::fs::write(
            root.join("{{ cookiecutter.formal_name }}/briefcase.toml"),
            "[paths]\napp_path = \"src/{{ cookiecutter.app_name }}\"\n",
        )
        .expect("write");
        std::fs::write(
            root.join("{{ cookiecutter.formal_name }}/src/{{ cookiecutter.app_name }}.txt"),
            "{{ cookiecutter.class_name }} {{ cookiecutter.flavor }}",
        )
        .expect("write");
    }

    #[test]
    fn test_render_template_applies_context_and_defaults() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let template = tmp.path().join("template");
        sample_template(&template);

        let mut context = TemplateContext::new();
        context.insert("formal_name".into(), json!("Hello World"));
        context.insert("app_name".into(), json!("hello"));

        let out = tmp.path().join("macOS");
        let root = render_template(&template, &out, &context, "template").expect("render");

        assert_eq!(root, out.join("Hello World"));
        assert_eq!(
            std::fs::read_to_string(root.join("briefcase.toml")).expect("read"),
            "[paths]\napp_path = \"src/hello\"\n"
        );
        assert_eq!(
            std::fs::read_to_string(root.join("src/hello.txt")).expect("read"),
            "Hello WorldMain vanilla"
        );
    }

    #[test]
    fn test_directory_without_manifest_is_invalid() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = render_template(tmp.path(), tmp.path(), &TemplateContext::new(), "nowhere")
            .expect_err("should fail");
        assert!(matches!(err, ExpandError::InvalidTemplate(s) if s == "nowhere"));
    }

    #[test]
    fn test_missing_directory_is_invalid() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let missing = tmp.path().join("missing");
        let err = render_template(&missing, tmp.path(), &TemplateContext::new(), "missing")
            .expect_err("should fail");
        assert!(matches!(err, ExpandError::InvalidTemplate(_)));
    }
}
