mod common;

use common::{net_workspace, write_file, SUBNET_RENDERED, VPC_RENDERED};
use tempfile::TempDir;
use terrapy::error::Error;
use terrapy::materializer::Materializer;
use terrapy::pipeline::{RenderPipeline, RenderResult, RenderedFile};
use terrapy::renderer::MiniJinjaRenderer;

fn rendered(relative: &str, content: &str) -> RenderedFile {
    RenderedFile {
        relative: relative.to_string(),
        source: format!("net/{relative}.j2"),
        content: content.to_string(),
    }
}

#[test]
fn test_materialize_mirrors_project_layout() {
    let (_dir, settings) = net_workspace();
    let renderer = MiniJinjaRenderer::from_settings(&settings);
    let result = RenderPipeline::new(&settings, &renderer)
        .unwrap()
        .render_project("net", "terrapy.vars")
        .unwrap();

    let materializer = Materializer::new(&settings.output_dir);
    let written = materializer.materialize("net", &result).unwrap();
    assert_eq!(
        written,
        [
            settings.output_dir.join("net").join("subnets").join("subnet.tf"),
            settings.output_dir.join("net").join("vpc.tf"),
        ]
    );

    let expected = TempDir::new().unwrap();
    write_file(expected.path(), "vpc.tf", VPC_RENDERED);
    write_file(expected.path(), "subnets/subnet.tf", SUBNET_RENDERED);
    assert!(!dir_diff::is_different(settings.output_dir.join("net"), expected.path()).unwrap());
}

#[test]
fn test_materialize_overwrites_existing_files() {
    let output = TempDir::new().unwrap();
    write_file(output.path(), "net/main.tf", "stale");

    let result = RenderResult::from_files([rendered("main.tf", "fresh")]).unwrap();
    Materializer::new(output.path()).materialize("net", &result).unwrap();

    let content = std::fs::read_to_string(output.path().join("net/main.tf")).unwrap();
    assert_eq!(content, "fresh");
}

#[test]
fn test_traversal_is_rejected_before_writing() {
    let output = TempDir::new().unwrap();
    let result = RenderResult::from_files([
        rendered("a.tf", "safe"),
        rendered("../../etc/output", "escaped"),
    ])
    .unwrap();

    let err = Materializer::new(output.path()).materialize("net", &result).unwrap_err();
    assert!(matches!(err, Error::PathSafety { .. }));
    assert!(!output.path().join("net").exists());
}

#[test]
fn test_project_name_is_checked() {
    let output = TempDir::new().unwrap();
    let result = RenderResult::from_files([rendered("a.tf", "safe")]).unwrap();

    let err = Materializer::new(output.path()).materialize("..", &result).unwrap_err();
    assert!(matches!(err, Error::PathSafety { .. }));
}

#[test]
fn test_duplicate_outputs_are_rejected() {
    let result = RenderResult::from_files([rendered("a.tf", "one"), rendered("a.tf", "two")]);
    assert!(matches!(result, Err(Error::DuplicateOutput { .. })));
}
