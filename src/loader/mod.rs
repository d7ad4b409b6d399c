//! # Folder Loader
//!
//! Discovers handler manifests in a directory tree and registers them.
//! One bad file never aborts a scan: every file-level failure is recorded
//! with its path and the walk continues. Only an unusable root directory is
//! a hard failure.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod catalog;
pub mod manifest;

use log::info;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;

pub use catalog::HandlerCatalog;
pub use manifest::{ActionManifest, EventManifest, FromManifest};

use crate::errors::{ContextLogger, CoreError, ErrorCode};
use crate::registry::Registry;

/// File extensions recognized as handler manifests
pub const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// A file that could not be loaded
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub error: CoreError,
    pub path: PathBuf,
}

type DirFuture<'a> = Pin<Box<dyn Future<Output = Vec<LoadFailure>> + Send + 'a>>;

/// Loads manifests into one registry, resolving callbacks through a catalog
pub struct FolderLoader<R: FromManifest> {
    registry: Arc<Registry<R>>,
    catalog: Arc<HandlerCatalog<R::Callback>>,
}

impl<R: FromManifest> FolderLoader<R> {
    pub fn new(registry: Arc<Registry<R>>, catalog: Arc<HandlerCatalog<R::Callback>>) -> Self {
        Self { registry, catalog }
    }

    /// Load every manifest under `root`, depth first
    ///
    /// Returns the per-file failures. A missing root fails with
    /// `FolderNotFound`, a root that is not a directory with
    /// `InvalidFolderType`.
    pub async fn load_folder(
        &self,
        root: &Path,
        recursive: bool,
        force: bool,
    ) -> Result<Vec<LoadFailure>, CoreError> {
        let mut logger = ContextLogger::new("folder-loader");
        logger.set_path(root);

        let metadata = match fs::metadata(root).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(logger.error(ErrorCode::FolderNotFound));
            }
            Err(e) => {
                return Err(logger
                    .error(ErrorCode::FolderNotFound)
                    .with_detail(e.to_string()));
            }
        };
        if !metadata.is_dir() {
            return Err(logger.error(ErrorCode::InvalidFolderType));
        }

        let before = self.registry.len();
        let failures = self
            .load_dir(root.to_path_buf(), recursive, force, &logger)
            .await;

        info!(
            "[{}] Loaded {} {}(s) from {} ({} failed)",
            logger.request_id(),
            self.registry.len().saturating_sub(before),
            R::NOUN,
            root.display(),
            failures.len()
        );
        Ok(failures)
    }

    fn load_dir<'a>(
        &'a self,
        dir: PathBuf,
        recursive: bool,
        force: bool,
        logger: &'a ContextLogger,
    ) -> DirFuture<'a> {
        Box::pin(async move {
            let mut failures = Vec::new();

            let entries = match list_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    let error = logger
                        .error(ErrorCode::FolderNotFound)
                        .with_path(&dir)
                        .with_detail(e.to_string());
                    logger.report(&error);
                    failures.push(LoadFailure { error, path: dir });
                    return failures;
                }
            };

            for path in entries {
                // Follows symlinks; dangling links and special files are skipped
                let Ok(metadata) = fs::metadata(&path).await else {
                    continue;
                };

                if metadata.is_dir() {
                    if recursive {
                        failures.extend(self.load_dir(path, recursive, force, logger).await);
                    }
                } else if metadata.is_file() {
                    if let Err(error) = self.load_file(&path, force).await {
                        logger.report(&error);
                        failures.push(LoadFailure { error, path });
                    }
                }
            }

            failures
        })
    }

    /// Load one manifest and register the handler it defines
    ///
    /// Checks, in order: the file exists, is a regular file, has a manifest
    /// extension, parses to a manifest, is not disabled, resolves its
    /// callback, and does not collide with a registered key. Returns the
    /// registry key on success.
    pub async fn load_file(&self, path: &Path, force: bool) -> Result<String, CoreError> {
        let mut logger = ContextLogger::new("folder-loader");
        logger.set_path(path);

        let metadata = fs::metadata(path).await.map_err(|e| {
            let error = logger.error(ErrorCode::FileNotFound);
            if e.kind() == ErrorKind::NotFound {
                error
            } else {
                error.with_detail(e.to_string())
            }
        })?;
        if !metadata.is_file() {
            return Err(logger.error(ErrorCode::InvalidFileType));
        }
        if !has_manifest_extension(path) {
            return Err(logger
                .error(ErrorCode::InvalidFileType)
                .with_detail(format!("expected one of {MANIFEST_EXTENSIONS:?}")));
        }

        let contents = fs::read_to_string(path).await.map_err(|e| {
            logger
                .error(ErrorCode::NoDefaultExport)
                .with_detail(e.to_string())
        })?;
        let manifest: R::Manifest = parse_manifest(&contents)
            .map_err(|detail| logger.error(ErrorCode::NoDefaultExport).with_detail(detail))?;

        if R::manifest_disabled(&manifest) {
            return Err(logger.error(R::DISABLED));
        }

        let record = R::from_manifest(manifest, &self.catalog).map_err(|e| logger.enrich(e))?;
        logger.set_identifier(record.identifier());
        logger.set_category(record.category().to_string());

        let key = record.key();
        self.registry
            .register(record, force)
            .map_err(|e| logger.enrich(e))?;

        logger.debug(format_args!("registered {} {key}", R::NOUN));
        Ok(key)
    }
}

/// Directory entries sorted by name, so scans are reproducible
async fn list_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

fn has_manifest_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MANIFEST_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Parse the file's top-level mapping into a manifest
fn parse_manifest<M: serde::de::DeserializeOwned>(contents: &str) -> Result<M, String> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(contents).map_err(|e| format!("not valid YAML: {e}"))?;

    match value {
        serde_yaml::Value::Null => Err("file defines nothing".to_string()),
        serde_yaml::Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|e| format!("not a handler manifest: {e}"))
        }
        _ => Err("top-level value is not a mapping".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::action::testing::Noop;
    use crate::registry::event::testing::Counter;
    use crate::registry::{
        ActionCallback, ActionCategory, ActionRegistry, EventCallback, EventKind, EventRegistry,
    };
    use crate::registry::{Action, Event};
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn action_loader() -> (FolderLoader<Action>, Arc<ActionRegistry>) {
        let registry = Arc::new(ActionRegistry::new());
        let catalog = HandlerCatalog::<dyn ActionCallback>::new()
            .with("ping", Arc::new(Noop))
            .with("noop", Arc::new(Noop));
        let loader = FolderLoader::new(registry.clone(), Arc::new(catalog));
        (loader, registry)
    }

    fn write(dir: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            stdfs::create_dir_all(parent).unwrap();
        }
        stdfs::write(&path, contents).unwrap();
        path
    }

    fn button(id: &str) -> String {
        format!("identifier: {id}\ncategory: button\nhandler: noop\n")
    }

    fn codes(failures: &[LoadFailure]) -> Vec<ErrorCode> {
        failures.iter().map(|f| f.error.code).collect()
    }

    #[tokio::test]
    async fn test_load_valid_tree() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "utility/ping.yaml",
            "category: command\nhandler: ping\ndata:\n  name: ping\n  description: Pong\n",
        );
        write(dir.path(), "buttons/ok.yml", &button("ok"));
        write(dir.path(), "buttons/deep/er/cancel.json", r#"{"identifier": "cancel", "category": "button"}"#);

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();

        assert!(failures.is_empty(), "unexpected failures: {failures:?}");
        assert_eq!(
            registry.keys(),
            vec!["button-cancel", "button-ok", "command-ping"]
        );
    }

    #[tokio::test]
    async fn test_counts_valid_and_invalid_regardless_of_position() {
        let dir = TempDir::new().unwrap();
        // 4 valid
        write(dir.path(), "a.yaml", &button("a"));
        write(dir.path(), "x/b.yaml", &button("b"));
        write(dir.path(), "x/y/c.yaml", &button("c"));
        write(dir.path(), "x/y/z/d.yaml", &button("d"));
        // 5 invalid
        write(dir.path(), "0-empty.yaml", "");
        write(dir.path(), "x/notes.txt", "hello");
        write(dir.path(), "x/y/broken.yaml", "category: [unterminated");
        write(dir.path(), "x/y/z/list.yaml", "- just\n- a list\n");
        write(dir.path(), "x/y/z/zz-off.yaml", "identifier: offline\ncategory: button\ndisabled: true\n");

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(failures.len(), 5);
        let mut found = codes(&failures);
        found.sort_by_key(|c| c.as_str());
        assert_eq!(
            found,
            vec![
                ErrorCode::ActionDisabled,
                ErrorCode::InvalidFileType,
                ErrorCode::NoDefaultExport,
                ErrorCode::NoDefaultExport,
                ErrorCode::NoDefaultExport,
            ]
        );
    }

    #[tokio::test]
    async fn test_file_without_default_export() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "nothing.yaml", "# only a comment\n");

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].error.code, ErrorCode::NoDefaultExport);
        assert_eq!(failures[0].path, path);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_hard_failure() {
        let dir = TempDir::new().unwrap();
        let (loader, _) = action_loader();
        let err = loader
            .load_folder(&dir.path().join("missing"), true, false)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FolderNotFound);
    }

    #[tokio::test]
    async fn test_file_root_is_hard_failure() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "ping.yaml", &button("ping"));
        let (loader, _) = action_loader();
        let err = loader.load_folder(&file, true, false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFolderType);
    }

    #[tokio::test]
    async fn test_non_recursive_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "top.yaml", &button("top"));
        write(dir.path(), "sub/nested.yaml", &button("nested"));
        write(dir.path(), "sub/broken.yaml", "");

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), false, false).await.unwrap();

        assert!(failures.is_empty());
        assert_eq!(registry.keys(), vec!["button-top"]);
    }

    #[tokio::test]
    async fn test_collision_surfaces_as_load_failure() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.yaml", &button("same"));
        write(dir.path(), "b.yaml", &button("same"));

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();

        assert_eq!(codes(&failures), vec![ErrorCode::ActionIdentifierAlreadyExists]);
        assert_eq!(failures[0].path, dir.path().join("b.yaml"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_force_overwrites_collisions() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.yaml", &button("same"));
        write(dir.path(), "b.yaml", "identifier: same\ncategory: button\ntags: [second]\n");

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, true).await.unwrap();

        assert!(failures.is_empty());
        let stored = registry.get(ActionCategory::Button, "same").unwrap();
        assert!(stored.tags.contains("second"));
    }

    #[tokio::test]
    async fn test_command_renamed_from_data_name_fails_load() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "pinger.yaml",
            "identifier: pinger\ncategory: command\nhandler: ping\ndata:\n  name: ping\n  description: Pong\n",
        );
        write(
            dir.path(),
            "other.yaml",
            "identifier: other\ncategory: command\nhandler: ping\ndata:\n  name: ping\n  description: Pong\n",
        );

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();

        assert_eq!(
            codes(&failures),
            vec![ErrorCode::NoDefaultExport, ErrorCode::NoDefaultExport]
        );
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_handler_name_fails_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.yaml", "identifier: a\ncategory: button\nhandler: missing\n");

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();

        assert_eq!(codes(&failures), vec![ErrorCode::ActionWithoutCallback]);
        assert_eq!(
            failures[0].error.context.path.as_deref(),
            Some(dir.path().join("a.yaml").as_path())
        );
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_category_loads_under_unknown_prefix() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "odd.yaml", "identifier: odd\ncategory: telepathy\n");

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();

        assert!(failures.is_empty());
        assert_eq!(registry.keys(), vec!["unknown-odd"]);
    }

    #[tokio::test]
    async fn test_load_file_checks() {
        let dir = TempDir::new().unwrap();
        let (loader, _) = action_loader();

        let missing = loader
            .load_file(&dir.path().join("missing.yaml"), false)
            .await
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::FileNotFound);

        stdfs::create_dir(dir.path().join("folder.yaml")).unwrap();
        let folder = loader
            .load_file(&dir.path().join("folder.yaml"), false)
            .await
            .unwrap_err();
        assert_eq!(folder.code, ErrorCode::InvalidFileType);

        let text = write(dir.path(), "ping.txt", &button("ping"));
        let wrong_ext = loader.load_file(&text, false).await.unwrap_err();
        assert_eq!(wrong_ext.code, ErrorCode::InvalidFileType);

        let upper = write(dir.path(), "PING.YAML", &button("ping"));
        assert_eq!(loader.load_file(&upper, false).await.unwrap(), "button-ping");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ok.yaml", &button("ok"));
        std::os::unix::fs::symlink(dir.path().join("gone.yaml"), dir.path().join("link.yaml"))
            .unwrap();

        let (loader, registry) = action_loader();
        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();

        assert!(failures.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_event_loader() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ready.yaml", "identifier: startup\nevent: ready\nhandler: count\n");
        write(dir.path(), "off.yaml", "identifier: quiet\nevent: resume\ndisabled: true\n");
        write(dir.path(), "zz-dup.yaml", "identifier: startup\nevent: guildCreate\n");

        let registry = Arc::new(EventRegistry::new());
        let catalog =
            HandlerCatalog::<dyn EventCallback>::new().with("count", Arc::new(Counter::default()));
        let loader: FolderLoader<Event> = FolderLoader::new(registry.clone(), Arc::new(catalog));

        let failures = loader.load_folder(dir.path(), true, false).await.unwrap();
        let mut found = codes(&failures);
        found.sort_by_key(|c| c.as_str());

        assert_eq!(
            found,
            vec![ErrorCode::EventDisabled, ErrorCode::EventIdentifierAlreadyExists]
        );
        let startup = registry.get(EventKind::Ready, "startup").unwrap();
        assert_eq!(startup.kind, EventKind::Ready);
    }

    #[tokio::test]
    async fn test_shipped_definitions_load_cleanly() {
        use crate::commands::context::HandlerContext;
        use crate::commands::publish::publishable_commands;
        use crate::commands::publish::testing::RecordingPublisher;
        use crate::dispatch::Dispatcher;
        use crate::errors::MessageTable;

        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("definitions");
        let ctx = HandlerContext::for_tests().await;

        let actions = FolderLoader::new(
            ctx.actions.clone(),
            Arc::new(crate::commands::create_action_catalog()),
        );
        let failures = actions.load_folder(&root.join("actions"), true, false).await.unwrap();
        assert!(failures.is_empty(), "{failures:?}");
        assert!(ctx.actions.has(ActionCategory::Command, "ping"));
        assert!(ctx.actions.has(ActionCategory::UserMenuCommand, "Show Profile"));
        assert!(ctx.actions.has(ActionCategory::Autocomplete, "handlers"));
        assert!(ctx
            .actions
            .has(ActionCategory::Button, crate::commands::handlers::profile::REFRESH_BUTTON_ID));
        assert_eq!(publishable_commands(&ctx.actions).len(), 4);

        let dispatcher = Arc::new(Dispatcher::new(ctx.clone(), Arc::new(MessageTable::builtin())));
        let catalog = crate::events::create_event_catalog(
            dispatcher,
            Arc::new(RecordingPublisher::default()),
        );
        let events = FolderLoader::new(ctx.events.clone(), Arc::new(catalog));
        let failures = events.load_folder(&root.join("events"), true, false).await.unwrap();
        assert!(failures.is_empty(), "{failures:?}");
        assert!(ctx.events.list_all().iter().all(|e| e.callback.is_some()));
    }
}
