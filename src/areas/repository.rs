use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::diff::tool::{DiffTool, diff_tool};
use crate::config::Config;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Name of the control directory at the repository root
pub const CONTROL_DIR: &str = ".sprig";

/// Explicit repository context threaded through every command
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    diff_tool: Box<dyn DiffTool>,
    config: Config,
}

impl Repository {
    /// Bind to a root directory, creating it when missing; the control directory may
    /// not exist yet (see `init`)
    pub fn new(
        path: impl AsRef<Path>,
        writer: Box<dyn std::io::Write>,
        config: Config,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Unable to create {}", path.display()))?;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", path.display()))?;
        let control_path = path.join(CONTROL_DIR);

        let index = Index::new(control_path.join("index").into_boxed_path());
        let database = Database::new(control_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(control_path.into_boxed_path());
        let diff_tool = diff_tool(config.diff_tool);

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
            diff_tool,
            config,
        })
    }

    /// Bind to an initialized repository
    pub fn open(
        path: impl AsRef<Path>,
        writer: Box<dyn std::io::Write>,
        config: Config,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.join(CONTROL_DIR).is_dir() {
            return Err(RepositoryError::NotARepository(path.to_path_buf()).into());
        }

        Self::new(path, writer, config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn control_path(&self) -> Box<Path> {
        self.path.join(CONTROL_DIR).into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn diff_tool(&self) -> &dyn DiffTool {
        self.diff_tool.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
