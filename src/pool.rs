//! The template pool: registration, layout composition and rendering.
//!
//! Registration runs during startup and takes `&mut self`; once every template
//! is registered the pool can be shared (`Arc<Pool>`) and rendered from any
//! number of threads. With auto-reload on, every render first probes the
//! template's artifacts and reparses it if they changed.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tera::Context;

use crate::artifact::{ArtifactSet, ArtifactStore, FsStore};
use crate::compiled::{CompiledTemplate, EngineOptions, TemplateSource};
use crate::config::PoolConfig;
use crate::delimiters::Delimiters;
use crate::error::{PoolError, PoolResult};
use crate::layout::LayoutBinding;

#[derive(Debug)]
pub struct Pool {
    config: PoolConfig,
    store: Arc<dyn ArtifactStore>,
    templates: HashMap<String, CompiledTemplate>,
    layouts: HashMap<String, LayoutBinding>,
}

impl Pool {
    /// Pool over `content_root` on the local filesystem, other settings default.
    pub fn new(content_root: impl Into<PathBuf>, auto_reload: bool) -> Self {
        Self::with_config(
            PoolConfig::builder()
                .content_root(content_root)
                .auto_reload(auto_reload)
                .build(),
        )
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self::with_store(config, Arc::new(FsStore))
    }

    /// Pool reading its artifacts through `store`.
    pub fn with_store(config: PoolConfig, store: Arc<dyn ArtifactStore>) -> Self {
        tracing::debug!(
            root = %config.content_root.display(),
            auto_reload = config.auto_reload,
            "Created template pool"
        );
        Self {
            config,
            store,
            templates: HashMap::new(),
            layouts: HashMap::new(),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn auto_reload(&self) -> bool {
        self.config.auto_reload
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register `<content_root>/<name>.<extension>` under `name`.
    pub fn register(&mut self, name: &str, delimiters: &Delimiters) -> PoolResult<()> {
        let template = self.compile_files(name, [name], delimiters)?;
        self.insert(template);
        Ok(())
    }

    /// Register `header` and `footer` as templates and bind them as layout `name`.
    ///
    /// Nothing is recorded unless both parse.
    pub fn register_layout(
        &mut self,
        name: &str,
        header: &str,
        footer: &str,
        delimiters: &Delimiters,
    ) -> PoolResult<()> {
        let header_template = self.compile_files(header, [header], delimiters)?;
        let footer_template = self.compile_files(footer, [footer], delimiters)?;
        self.insert(header_template);
        self.insert(footer_template);
        self.layouts
            .insert(name.to_string(), LayoutBinding::new(header, footer));
        tracing::debug!(layout = %name, %header, %footer, "Registered layout");
        Ok(())
    }

    /// Register in-memory `content` under `name`. It is never reloaded.
    pub fn register_from_text(
        &mut self,
        name: &str,
        content: &str,
        delimiters: &Delimiters,
    ) -> PoolResult<()> {
        let template = CompiledTemplate::compile(
            name,
            TemplateSource::Inline(content.to_string()),
            delimiters.clone(),
            self.engine_options(),
            Arc::clone(&self.store),
        )?;
        self.insert(template);
        Ok(())
    }

    /// Register several sources as one executable under `name`.
    ///
    /// The first source is the root; the others can be included from it or
    /// rendered on their own with [`Pool::render_fragment`].
    pub fn register_multi_source<I, S>(
        &mut self,
        name: &str,
        sources: I,
        delimiters: &Delimiters,
    ) -> PoolResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let template = self.compile_files(name, sources, delimiters)?;
        self.insert(template);
        Ok(())
    }

    /// Reparse `name` now, whatever the reload policy and artifact state.
    pub fn reload_template(&self, name: &str) -> PoolResult<()> {
        self.lookup(name)?.parse()
    }

    fn compile_files<I, S>(
        &self,
        name: &str,
        sources: I,
        delimiters: &Delimiters,
    ) -> PoolResult<CompiledTemplate>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = sources
            .into_iter()
            .map(|source| self.config.source_path(source.as_ref()));
        CompiledTemplate::compile(
            name,
            TemplateSource::Artifacts(ArtifactSet::from_paths(paths)),
            delimiters.clone(),
            self.engine_options(),
            Arc::clone(&self.store),
        )
    }

    fn insert(&mut self, template: CompiledTemplate) {
        let name = template.name().to_string();
        if self.templates.insert(name.clone(), template).is_some() {
            tracing::debug!(template = %name, "Replaced previously registered template");
        }
    }

    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            autoescape: self.config.autoescape,
            extension: self.config.extension.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render header, `name`, then footer of `layout` into `out`.
    ///
    /// Output already written is not retracted when a later step fails.
    pub fn render<D, W>(&self, layout: &str, name: &str, data: &D, out: &mut W) -> PoolResult<()>
    where
        D: Serialize + ?Sized,
        W: Write + ?Sized,
    {
        let binding = self.binding(layout)?;
        let context = context_for(name, data)?;
        self.run(binding.header(), &context, out)?;
        self.run(name, &context, out)?;
        self.run(binding.footer(), &context, out)
    }

    /// Like [`Pool::render`], but the body is the `fragment` source of `name`.
    pub fn render_fragment<D, W>(
        &self,
        layout: &str,
        name: &str,
        fragment: &str,
        data: &D,
        out: &mut W,
    ) -> PoolResult<()>
    where
        D: Serialize + ?Sized,
        W: Write + ?Sized,
    {
        let binding = self.binding(layout)?;
        let context = context_for(name, data)?;
        self.run(binding.header(), &context, out)?;
        self.prepare(name)?
            .execute_fragment(fragment, &context, out)?;
        self.run(binding.footer(), &context, out)
    }

    /// Render `name` on its own.
    pub fn render_no_layout<D, W>(&self, name: &str, data: &D, out: &mut W) -> PoolResult<()>
    where
        D: Serialize + ?Sized,
        W: Write + ?Sized,
    {
        let context = context_for(name, data)?;
        self.run(name, &context, out)
    }

    pub fn render_to_string<D>(&self, layout: &str, name: &str, data: &D) -> PoolResult<String>
    where
        D: Serialize + ?Sized,
    {
        let mut buf = Vec::new();
        self.render(layout, name, data, &mut buf)?;
        into_string(name, buf)
    }

    pub fn render_fragment_to_string<D>(
        &self,
        layout: &str,
        name: &str,
        fragment: &str,
        data: &D,
    ) -> PoolResult<String>
    where
        D: Serialize + ?Sized,
    {
        let mut buf = Vec::new();
        self.render_fragment(layout, name, fragment, data, &mut buf)?;
        into_string(name, buf)
    }

    pub fn render_no_layout_to_string<D>(&self, name: &str, data: &D) -> PoolResult<String>
    where
        D: Serialize + ?Sized,
    {
        let mut buf = Vec::new();
        self.render_no_layout(name, data, &mut buf)?;
        into_string(name, buf)
    }

    fn run<W>(&self, name: &str, context: &Context, out: &mut W) -> PoolResult<()>
    where
        W: Write + ?Sized,
    {
        self.prepare(name)?.execute(context, out)
    }

    /// Resolve `name`, probing for changes first when auto-reload is on.
    fn prepare(&self, name: &str) -> PoolResult<&CompiledTemplate> {
        let template = self.lookup(name)?;
        if self.config.auto_reload {
            template.maybe_reload(self.config.reload_verbosity);
        }
        Ok(template)
    }

    fn lookup(&self, name: &str) -> PoolResult<&CompiledTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| PoolError::template_not_found(name))
    }

    fn binding(&self, layout: &str) -> PoolResult<&LayoutBinding> {
        self.layouts
            .get(layout)
            .ok_or_else(|| PoolError::LayoutNotFound {
                name: layout.to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of registered templates, layout headers and footers included.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn template(&self, name: &str) -> Option<&CompiledTemplate> {
        self.templates.get(name)
    }

    pub fn layout(&self, name: &str) -> Option<&LayoutBinding> {
        self.layouts.get(name)
    }

    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn layout_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.layouts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Convert render data into a Tera context. `null` renders against an empty one.
fn context_for<D>(name: &str, data: &D) -> PoolResult<Context>
where
    D: Serialize + ?Sized,
{
    let value = serde_json::to_value(data).map_err(|e| {
        PoolError::execution(name, tera::Error::chain("render data could not be serialized", e))
    })?;
    if value.is_null() {
        return Ok(Context::new());
    }
    Context::from_value(value).map_err(|e| PoolError::execution(name, e))
}

fn into_string(name: &str, buf: Vec<u8>) -> PoolResult<String> {
    String::from_utf8(buf).map_err(|e| {
        PoolError::execution(name, tera::Error::chain("rendered output is not UTF-8", e))
    })
}
