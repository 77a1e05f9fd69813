//! End-to-end pipeline tests over full-file fixtures.

use restyle_transforms::{emotion_to_linaria, SourceFile};

fn run(path: &str, source: &str) -> restyle_transforms::TransformOutput {
    emotion_to_linaria(&SourceFile::new(path, source)).expect("transform failed")
}

#[test]
fn non_matching_file_round_trips_byte_for_byte() {
    let source = "// plain module\nimport React from \"react\";\n\nexport function App() {\n  return <div className=\"app\">hi</div>;\n}\n";
    let out = run("src/App.js", source);
    assert_eq!(out.source, source);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn styled_import_is_retargeted() {
    let out = run(
        "src/components/Box.js",
        "import styled from \"react-emotion\";\n\nconst Box = styled.div`\n  color: red;\n`;\n",
    );
    assert_eq!(
        out.source,
        "import { styled } from \"linaria/react\";\n\nconst Box = styled.div`\n  color: red;\n`;\n"
    );
}

#[test]
fn combined_import_splits_into_two_siblings_in_order() {
    let out = run(
        "src/components/Box.js",
        "import emotion, { css } from \"react-emotion\";\n\nconst a = 1;\n",
    );
    assert_eq!(
        out.source,
        "import { styled } from \"linaria/react\";\nimport { css } from \"linaria\";\n\nconst a = 1;\n"
    );
}

#[test]
fn theme_calls_convert_to_accessor_chains() {
    let out = run(
        "src/components/Button.js",
        concat!(
            "import styled from \"react-emotion\";\n",
            "import theme from \"@jetshop/ui/utils/theme\";\n",
            "\n",
            "const Button = styled(\"button\")`\n",
            "  color: ${theme(\"colors.1\")};\n",
            "  font-family: ${theme(\"fontFamilies.heavy\")};\n",
            "`;\n",
        ),
    );
    assert!(out.source.contains("import { theme } from \"./Theme\";"));
    assert!(out.source.contains("color: ${theme.colors[1]};"));
    assert!(out.source.contains("font-family: ${theme.fontFamilies.heavy};"));
}

#[test]
fn destructured_theme_unwraps_with_import_after_last_import() {
    let out = run(
        "src/components/Box.js",
        concat!(
            "import styled from \"react-emotion\";\n",
            "\n",
            "const Box = styled.div`\n",
            "  color: ${({ theme }) => theme.color.red};\n",
            "`;\n",
        ),
    );
    assert_eq!(
        out.source,
        concat!(
            "import { styled } from \"linaria/react\";\n",
            "import { theme } from \"./Theme\";\n",
            "\n",
            "const Box = styled.div`\n",
            "  color: ${theme.color.red};\n",
            "`;\n",
        )
    );
    assert!(out.diagnostics.is_empty());
}

#[test]
fn props_dot_theme_unwraps() {
    let out = run(
        "src/components/Box.js",
        "import styled from \"react-emotion\";\nconst Box = styled.div`\n  ${props => props.theme.below.xl};\n`;\n",
    );
    assert!(out.source.contains("${theme.below.xl};"));
}

#[test]
fn transform_is_idempotent() {
    let source = concat!(
        "import styled from \"react-emotion\";\n",
        "import theme from \"@jetshop/ui/utils/theme\";\n",
        "\n",
        "const Box = styled.div`\n",
        "  color: ${({ theme }) => theme.color.red};\n",
        "  background: ${theme(\"colors.0\")};\n",
        "`;\n",
    );
    let once = run("src/components/Box.js", source);
    let twice = run("src/components/Box.js", &once.source);
    assert_eq!(once.source, twice.source);
    assert_eq!(once.source.matches("import { theme }").count(), 1);
}

#[test]
fn inline_css_abstains_with_exactly_one_diagnostic() {
    let source = concat!(
        "import styled from \"react-emotion\";\n",
        "const Box = styled.div`\n",
        "  ${({ root }) => root && css`color: red`}\n",
        "`;\n",
    );
    let out = run("src/components/Box.js", source);
    assert!(out
        .source
        .contains("${({ root }) => root && css`color: red`}"));
    assert_eq!(out.diagnostics.len(), 1);
    assert!(out.diagnostics[0].message.contains("css"));
}

#[test]
fn css_prop_flattens_to_style_object() {
    let out = run(
        "src/components/Box.js",
        "import { css } from \"react-emotion\";\nconst el = <div css={css`color: red;\n font-weight: 600;`}>x</div>;\n",
    );
    assert!(out
        .source
        .contains("style={{ color: \"red\", fontWeight: \"600\" }}"));
}

#[test]
fn class_name_interpolations_diagnose_per_expression() {
    let source = concat!(
        "const el = (\n",
        "  <div\n",
        "    className={css`\n",
        "      color: ${main};\n",
        "      width: ${wide};\n",
        "    `}\n",
        "  />\n",
        ");\n",
    );
    let out = run("src/components/Box.js", source);
    assert_eq!(out.source, source);
    assert_eq!(out.diagnostics.len(), 2);
    assert_eq!(out.diagnostics[0].line, 4);
    assert_eq!(out.diagnostics[1].line, 5);
}

#[test]
fn diagnostics_are_sorted_by_line() {
    let source = concat!(
        "import styled from \"react-emotion\";\n",
        "const A = Box.withComponent(\"a\");\n",
        "const Box = styled.div`\n",
        "  ${({ root }) => root && css`color: red`}\n",
        "`;\n",
    );
    let out = run("src/components/Box.js", source);
    assert_eq!(out.diagnostics.len(), 2);
    assert!(out.diagnostics[0].line <= out.diagnostics[1].line);
}

#[test]
fn cleanup_drops_css_wrapper_arrows() {
    let out = run(
        "src/components/Box.js",
        "import { css } from \"react-emotion\";\nconst styles = () => css`color: red;`;\n",
    );
    assert!(out.source.contains("const styles = css`color: red;`;"));
}

#[test]
fn parse_failure_is_a_per_file_error() {
    let result = emotion_to_linaria(&SourceFile::new(
        "src/components/Broken.js",
        "const x = `unterminated;\n",
    ));
    assert!(result.is_err());
}
