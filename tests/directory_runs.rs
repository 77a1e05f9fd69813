//! Whole-directory integration tests through the public crate surface.

use std::fs;
use std::path::{Path, PathBuf};

use restyle::{driver, Registry};

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn emotion_to_linaria_over_a_project_tree() {
    let dir = tempfile::tempdir().unwrap();
    let box_js = write(
        dir.path(),
        "src/components/Box.js",
        concat!(
            "import styled from \"react-emotion\";\n",
            "\n",
            "const Box = styled.div`\n",
            "  color: ${({ theme }) => theme.color.red};\n",
            "`;\n",
        ),
    );
    let app_js = write(
        dir.path(),
        "src/App.js",
        "import React from \"react\";\nexport const App = () => <div className=\"app\" />;\n",
    );

    let transform = Registry::builtin().get("emotion-to-linaria").unwrap();
    let summary = driver::run(transform, dir.path()).unwrap();

    assert_eq!(summary.seen, 2);
    assert_eq!(summary.changed, 1);
    assert!(summary.reports.is_empty());

    let rewritten = fs::read_to_string(&box_js).unwrap();
    assert!(rewritten.contains("import { styled } from \"linaria/react\";"));
    assert!(rewritten.contains("import { theme } from \"./Theme\";"));
    assert!(rewritten.contains("color: ${theme.color.red};"));

    let untouched = fs::read_to_string(&app_js).unwrap();
    assert!(untouched.contains("import React from \"react\";"));
}

#[test]
fn apollo_hooks_renames_the_import_source() {
    let dir = tempfile::tempdir().unwrap();
    let hooks_js = write(
        dir.path(),
        "src/useProducts.js",
        "import { useQuery } from \"react-apollo-hooks\";\nexport const n = 1;\n",
    );

    let transform = Registry::builtin().get("apollo-hooks").unwrap();
    let summary = driver::run(transform, dir.path()).unwrap();

    assert_eq!(summary.changed, 1);
    assert_eq!(
        fs::read_to_string(&hooks_js).unwrap(),
        "import { useQuery } from \"@apollo/react-hooks\";\nexport const n = 1;\n"
    );
}

#[test]
fn summary_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/components/Old.js",
        "const A = Box.withComponent(\"a\");\n",
    );

    let transform = Registry::builtin().get("emotion-to-linaria").unwrap();
    let summary = driver::run(transform, dir.path()).unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["seen"], 1);
    assert_eq!(json["changed"], 0);
    assert_eq!(json["reports"][0]["diagnostics"][0]["line"], 1);
}
