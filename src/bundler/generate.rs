//! Template resolution and expansion.

use crate::bundler::Bundler;
use crate::config::AppDescriptor;
use crate::error::{BriefcaseError, Result, TemplateError};
use crate::git::OpenOutcome;
use crate::template::{ExpandError, ExpandRequest, TemplateContext, cache_path, is_repo_url};
use chrono::{Datelike, Local};
use serde_json::Value;

/// Remote used to refresh cached template clones.
pub const TEMPLATE_REMOTE: &str = "origin";

/// Ways of turning a configured template into something the expander can
/// use, tried in order until one produces a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStrategy {
    /// Anything that is not a repository URL is a local directory
    LocalDirectory,
    /// Refresh and check out an existing clone in the template cache
    CachedCheckout,
    /// Hand the repository URL to the expander as-is
    RemoteUrl,
}

impl TemplateStrategy {
    /// Every strategy, in the order they are tried
    pub const ORDER: [TemplateStrategy; 3] = [
        TemplateStrategy::LocalDirectory,
        TemplateStrategy::CachedCheckout,
        TemplateStrategy::RemoteUrl,
    ];
}

impl Bundler {
    /// Default template repository for the session's platform and format.
    pub fn app_template_url(&self) -> String {
        format!(
            "https://github.com/beeware/briefcase-{}-{}-template.git",
            self.settings.platform, self.settings.output_format
        )
    }

    /// Extra template context required by the output format. Empty unless a
    /// format needs more than the app configuration provides.
    pub fn output_format_template_context(&self, _app: &AppDescriptor) -> TemplateContext {
        TemplateContext::new()
    }

    /// Full expansion context for `app` using `template` as its template.
    pub fn template_context(&self, app: &AppDescriptor, template: &str) -> TemplateContext {
        let today = Local::now().date_naive();
        let mut context = app.template_context();
        context.insert("template".to_string(), Value::String(template.to_string()));
        context.insert("year".to_string(), Value::String(format!("{:04}", today.year())));
        context.insert(
            "month".to_string(),
            Value::String(today.format("%B").to_string()),
        );
        context.extend(self.output_format_template_context(app));
        context
    }

    async fn apply_strategy(&self, strategy: TemplateStrategy, template: &str) -> Result<Option<String>> {
        match strategy {
            TemplateStrategy::LocalDirectory => Ok((!is_repo_url(template)).then(|| {
                self.settings
                    .base_path
                    .join(template)
                    .to_string_lossy()
                    .to_string()
            })),
            TemplateStrategy::CachedCheckout => self.update_cached_template(template).await,
            TemplateStrategy::RemoteUrl => Ok(Some(template.to_string())),
        }
    }

    /// Bring a cached clone of `template` up to date and check out the
    /// branch for the session's runtime version.
    ///
    /// Defers (returns `None`) when there is no usable clone. A failed fetch
    /// only warns; a missing version branch is an error.
    async fn update_cached_template(&self, template: &str) -> Result<Option<String>> {
        let cache_dir = cache_path(&self.settings.template_cache, template);
        let repo = match self.collaborators.vcs.open(&cache_dir).await {
            OpenOutcome::Repository(repo) => repo,
            outcome => {
                log::debug!("No usable template cache at {}: {:?}", cache_dir.display(), outcome);
                return Ok(None);
            }
        };

        if let Err(e) = repo.fetch(TEMPLATE_REMOTE).await {
            log::debug!("Template fetch failed: {}", e);
            let rule = "*".repeat(75);
            self.runtime.println(&rule);
            self.runtime.warning_println(
                "WARNING: Unable to update application template (is your computer offline?)",
            );
            self.runtime
                .warning_println("WARNING: Briefcase will use existing template without updating.");
            self.runtime.println(&rule);
        }

        let tag = &self.settings.python_version_tag;
        let head = repo.resolve_ref(TEMPLATE_REMOTE, tag).await?.ok_or_else(|| {
            BriefcaseError::from(TemplateError::UnsupportedPythonVersion {
                version_tag: tag.clone(),
            })
        })?;

        let updated = head
            .timestamp
            .map(|ts| ts.with_timezone(&Local).format("%c").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        self.runtime.println(&format!(
            "Using existing template (sha {}, updated {})",
            head.hash, updated
        ));
        repo.checkout(&head).await?;

        Ok(Some(repo.path().to_string_lossy().to_string()))
    }

    /// Pick the template source for `template` using [`TemplateStrategy::ORDER`].
    pub async fn resolve_template_source(&self, template: &str) -> Result<String> {
        for strategy in TemplateStrategy::ORDER {
            if let Some(source) = self.apply_strategy(strategy, template).await? {
                log::debug!("Template source from {:?}: {}", strategy, source);
                return Ok(source);
            }
        }
        Ok(template.to_string())
    }

    /// Expand the app's template into `<base>/<platform>`.
    pub async fn generate_app_template(&self, app: &AppDescriptor) -> Result<()> {
        let template = app.template.clone().unwrap_or_else(|| self.app_template_url());
        self.runtime
            .println(&format!("Using app template: {}", template));

        let source = self.resolve_template_source(&template).await?;
        let context = self.template_context(app, &template);

        let output_dir = self.settings.platform_path();
        crate::bundler::utils::fs::create_dir_all(&output_dir, false).await?;

        let tag = &self.settings.python_version_tag;
        let request = ExpandRequest {
            source: &source,
            output_dir: &output_dir,
            checkout: Some(tag.as_str()),
            no_input: true,
            context: &context,
        };

        self.collaborators
            .expander
            .expand(request)
            .await
            .map_err(|e| match e {
                ExpandError::Transport(reason) => {
                    log::debug!("Template clone failed: {}", reason);
                    BriefcaseError::network("clone template repository")
                }
                ExpandError::InvalidTemplate(_) => TemplateError::InvalidRepository {
                    template: template.clone(),
                }
                .into(),
                ExpandError::RefNotFound(_) => TemplateError::UnsupportedPythonVersion {
                    version_tag: tag.clone(),
                }
                .into(),
                ExpandError::Render(e) => e.into(),
            })?;

        Ok(())
    }
}

