//! Name → grader mapping.
//!
//! Registration is expected at startup; invocation is read-mostly and takes
//! the read lock only long enough to clone the function handle.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use super::{fulltext, noip_style, Grader, GraderFn, GraderVerdict, FULL_TEXT, NOIP_STYLE};
use crate::error::CompareError;

static SHARED: OnceLock<Arc<GraderRegistry>> = OnceLock::new();

/// Registry of named graders.
pub struct GraderRegistry {
    graders: RwLock<HashMap<String, GraderFn>>,
}

impl Default for GraderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for GraderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraderRegistry")
            .field("graders", &self.names())
            .finish()
    }
}

impl GraderRegistry {
    /// Registry with no graders at all.
    pub fn empty() -> Self {
        Self {
            graders: RwLock::new(HashMap::new()),
        }
    }

    /// Isolated registry preloaded with `FullText` and `NOIPStyle`.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        registry.register(FULL_TEXT, fulltext);
        registry.register(NOIP_STYLE, noip_style);
        registry
    }

    /// Process-wide registry, created with built-ins on first use.
    pub fn shared() -> Arc<GraderRegistry> {
        SHARED
            .get_or_init(|| Arc::new(GraderRegistry::with_builtins()))
            .clone()
    }

    /// Store `func` under `name`, replacing any previous entry.
    pub fn register<F>(&self, name: impl Into<String>, func: F)
    where
        F: Fn(&str, &str) -> GraderVerdict + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(grader = %name, "Registering grader");
        self.graders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Arc::new(func));
    }

    /// Whether a grader is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.graders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .graders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Resolve a grader selection to a callable.
    pub fn resolve(&self, grader: &Grader) -> Result<GraderFn, CompareError> {
        match grader {
            Grader::Direct(func) => Ok(func.clone()),
            Grader::Named(name) => self
                .graders
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(name)
                .cloned()
                .ok_or_else(|| CompareError::UnknownGrader { name: name.clone() }),
        }
    }

    /// Grade `content` against `std` with the selected grader.
    pub fn invoke(
        &self,
        grader: &Grader,
        content: &str,
        std: &str,
    ) -> Result<GraderVerdict, CompareError> {
        let func = self.resolve(grader)?;
        Ok(func(content, std))
    }
}
