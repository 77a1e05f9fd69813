//! The apollo-hooks transform: retarget `react-apollo-hooks` imports
//! to `@apollo/react-hooks`. Bindings are unchanged; only the module
//! specifier moves.

use restyle_js::{parse, serialize, NodeKind};

use crate::matchers;
use crate::pipeline::{SourceFile, TransformError, TransformOutput};

const LEGACY_MODULE: &str = "react-apollo-hooks";
const TARGET_MODULE: &str = "@apollo/react-hooks";

pub fn apollo_hooks(file: &SourceFile) -> Result<TransformOutput, TransformError> {
    let mut tree = parse(&file.source)?;

    for import in matchers::collect_imports(&tree) {
        if import.source != LEGACY_MODULE {
            continue;
        }
        let specifiers = tree.children(import.node).to_vec();
        tree.replace(
            import.node,
            NodeKind::ImportDeclaration {
                source: TARGET_MODULE.to_string(),
            },
            specifiers,
        );
    }

    Ok(TransformOutput {
        source: serialize(&tree),
        diagnostics: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retargets_the_module() {
        let file = SourceFile::new(
            "src/hooks.js",
            "import { useQuery } from \"react-apollo-hooks\";\nuseQuery();\n",
        );
        let out = apollo_hooks(&file).unwrap();
        assert_eq!(
            out.source,
            "import { useQuery } from \"@apollo/react-hooks\";\nuseQuery();\n"
        );
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn other_modules_untouched() {
        let src = "import { useQuery } from \"@apollo/react-hooks\";\n";
        let file = SourceFile::new("src/hooks.js", src);
        let out = apollo_hooks(&file).unwrap();
        assert_eq!(out.source, src);
    }
}
