//! Transform name lookup for the CLI.

use crate::apollo;
use crate::pipeline::{self, SourceFile, TransformError, TransformOutput};

/// A registered transform entry point.
pub type TransformFn = fn(&SourceFile) -> Result<TransformOutput, TransformError>;

/// Registered transforms, looked up by CLI name.
pub struct Registry {
    entries: Vec<(&'static str, TransformFn)>,
}

impl Registry {
    /// The built-in transforms.
    pub fn builtin() -> Self {
        Registry {
            entries: vec![
                ("emotion-to-linaria", pipeline::emotion_to_linaria as TransformFn),
                ("apollo-hooks", apollo::apollo_hooks as TransformFn),
            ],
        }
    }

    /// Look up a transform by name.
    pub fn get(&self, name: &str) -> Option<TransformFn> {
        self.entries
            .iter()
            .find(|(entry_name, _)| *entry_name == name)
            .map(|(_, transform)| *transform)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names() {
        let registry = Registry::builtin();
        assert_eq!(registry.names(), vec!["emotion-to-linaria", "apollo-hooks"]);
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(Registry::builtin().get("nope").is_none());
    }
}
