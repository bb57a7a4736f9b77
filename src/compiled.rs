//! A parsed template together with the artifacts it was built from.
//!
//! The executable, its parse time and the artifact set observed at that parse
//! are published as one immutable [`Snapshot`]. A reparse builds a complete new
//! snapshot and swaps it in with a single write, so a concurrent render sees
//! either the old template or the new one, never a mix.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::SystemTime;

use tera::{Context, Tera};

use crate::artifact::{ArtifactSet, ArtifactStore};
use crate::config::ReloadVerbosity;
use crate::delimiters::Delimiters;
use crate::error::{PoolError, PoolResult};
use crate::helpers;

/// Where a template's text comes from.
#[derive(Debug, Clone)]
pub(crate) enum TemplateSource {
    /// Read from the artifact set on every parse.
    Artifacts(ArtifactSet),
    /// Registered from text; there is nothing to probe.
    Inline(String),
}

/// Engine options shared by every template in a pool.
#[derive(Debug, Clone)]
pub(crate) struct EngineOptions {
    pub autoescape: bool,
    /// Source suffix, used to resolve a fragment given by logical name.
    pub extension: String,
}

#[derive(Debug)]
struct Snapshot {
    executable: Tera,
    /// Name of the root source inside `executable`.
    root: String,
    parsed_at: SystemTime,
    artifacts: ArtifactSet,
}

#[derive(Debug)]
pub struct CompiledTemplate {
    name: String,
    source: TemplateSource,
    delimiters: Delimiters,
    options: EngineOptions,
    store: Arc<dyn ArtifactStore>,
    current: RwLock<Arc<Snapshot>>,
    /// Held for the whole of a reparse.
    reparse: Mutex<()>,
}

impl CompiledTemplate {
    /// Parse `source` for the first time. Fails without producing a template.
    pub(crate) fn compile(
        name: impl Into<String>,
        source: TemplateSource,
        delimiters: Delimiters,
        options: EngineOptions,
        store: Arc<dyn ArtifactStore>,
    ) -> PoolResult<Self> {
        let name = name.into();
        let snapshot = build_snapshot(&name, &source, &delimiters, &options, store.as_ref())?;
        tracing::debug!(
            template = %name,
            artifacts = snapshot.artifacts.len(),
            "Compiled template"
        );
        Ok(Self {
            name,
            source,
            delimiters,
            options,
            store,
            current: RwLock::new(Arc::new(snapshot)),
            reparse: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wall-clock time of the most recent successful parse.
    pub fn parsed_at(&self) -> SystemTime {
        self.snapshot().parsed_at
    }

    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        self.snapshot()
            .artifacts
            .paths()
            .into_iter()
            .map(|p| p.to_path_buf())
            .collect()
    }

    /// Modification times recorded at the last successful parse, in artifact order.
    pub fn last_observed_mod_times(&self) -> Vec<Option<SystemTime>> {
        self.snapshot()
            .artifacts
            .iter()
            .map(|a| a.last_observed_mod_time)
            .collect()
    }

    /// Names of the sources inside the executable, root first.
    pub fn fragment_names(&self) -> Vec<String> {
        let snapshot = self.snapshot();
        let mut names: Vec<String> = snapshot
            .executable
            .get_template_names()
            .filter(|n| *n != snapshot.root)
            .map(str::to_string)
            .collect();
        names.sort();
        names.insert(0, snapshot.root.clone());
        names
    }

    /// Unconditionally reparse. On failure the previous executable keeps serving.
    pub fn parse(&self) -> PoolResult<()> {
        let _guard = self.lock_reparse();
        self.parse_locked()
    }

    /// Reparse if any artifact changed since the last parse.
    ///
    /// Failures are reported through `tracing` only; the last good executable
    /// stays in place.
    pub fn maybe_reload(&self, verbosity: ReloadVerbosity) {
        if !self.is_stale(verbosity) {
            return;
        }

        let _guard = self.lock_reparse();
        // Another render may have reparsed while we waited.
        if !self.is_stale(ReloadVerbosity::Quiet) {
            return;
        }
        if verbosity.reports_changes() {
            tracing::info!(template = %self.name, "Template changed, reparsing");
        }
        if let Err(e) = self.parse_locked() {
            if verbosity.reports_failures() {
                tracing::warn!(template = %self.name, error = %e, "Reload failed, serving previous version");
            }
        }
    }

    /// Run the root source against `context`.
    pub(crate) fn execute<W>(&self, context: &Context, out: &mut W) -> PoolResult<()>
    where
        W: Write + ?Sized,
    {
        let snapshot = self.snapshot();
        snapshot
            .executable
            .render_to(&snapshot.root, context, out)
            .map_err(|e| PoolError::execution(&self.name, e))
    }

    /// Run one named source of the executable against `context`.
    ///
    /// `fragment` is either a source's full name or its logical name, the
    /// full name without the `.<extension>` suffix.
    pub(crate) fn execute_fragment<W>(
        &self,
        fragment: &str,
        context: &Context,
        out: &mut W,
    ) -> PoolResult<()>
    where
        W: Write + ?Sized,
    {
        let snapshot = self.snapshot();
        let resolved = self
            .resolve_fragment(&snapshot, fragment)
            .ok_or_else(|| PoolError::template_not_found(format!("{}::{}", self.name, fragment)))?;
        snapshot
            .executable
            .render_to(&resolved, context, out)
            .map_err(|e| PoolError::execution(format!("{}::{}", self.name, fragment), e))
    }

    fn resolve_fragment(&self, snapshot: &Snapshot, fragment: &str) -> Option<String> {
        if snapshot.executable.get_template_names().any(|n| n == fragment) {
            return Some(fragment.to_string());
        }
        let file_name = format!("{fragment}.{}", self.options.extension);
        snapshot
            .executable
            .get_template_names()
            .any(|n| n == file_name)
            .then_some(file_name)
    }

    fn is_stale(&self, verbosity: ReloadVerbosity) -> bool {
        let snapshot = self.snapshot();
        if snapshot.artifacts.is_empty() {
            if verbosity.reports_changes() {
                tracing::debug!(template = %self.name, "No artifacts to probe");
            }
            return false;
        }
        snapshot
            .artifacts
            .changed_since(snapshot.parsed_at, self.store.as_ref())
    }

    fn parse_locked(&self) -> PoolResult<()> {
        let snapshot = build_snapshot(
            &self.name,
            &self.source,
            &self.delimiters,
            &self.options,
            self.store.as_ref(),
        )?;
        tracing::debug!(template = %self.name, artifacts = snapshot.artifacts.len(), "Reparsed template");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        Ok(())
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn lock_reparse(&self) -> MutexGuard<'_, ()> {
        self.reparse.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_snapshot(
    name: &str,
    source: &TemplateSource,
    delimiters: &Delimiters,
    options: &EngineOptions,
    store: &dyn ArtifactStore,
) -> PoolResult<Snapshot> {
    // Taken before reading so an edit landing mid-parse still reads as newer.
    let parsed_at = SystemTime::now();

    let (root, sources, mut artifacts) = match source {
        TemplateSource::Inline(text) => (
            name.to_string(),
            vec![(name.to_string(), text.clone())],
            ArtifactSet::empty(),
        ),
        TemplateSource::Artifacts(set) => {
            if set.is_empty() {
                return Err(PoolError::compile(
                    name,
                    tera::Error::msg(format!("no sources given for template '{name}'")),
                ));
            }
            let mut sources = Vec::with_capacity(set.len());
            for artifact in set.iter() {
                let text = store
                    .read(&artifact.path)
                    .map_err(|e| PoolError::unavailable(&artifact.path, e))?;
                sources.push((artifact.file_name(), text));
            }
            (set.primary_name(), sources, set.clone())
        }
    };

    let mut translated = Vec::with_capacity(sources.len());
    for (source_name, text) in &sources {
        let text = delimiters
            .translate(text)
            .map_err(|e| PoolError::compile(name, e))?;
        translated.push((source_name.as_str(), text));
    }

    let mut executable = Tera::default();
    if options.autoescape {
        // Every name ends with "", so this escapes regardless of file suffix.
        executable.autoescape_on(vec![""]);
    } else {
        executable.autoescape_on(vec![]);
    }
    helpers::install(&mut executable);
    executable
        .add_raw_templates(translated)
        .map_err(|e| PoolError::compile(name, e))?;

    artifacts.refresh_mod_times(store)?;

    Ok(Snapshot {
        executable,
        root,
        parsed_at,
        artifacts,
    })
}
