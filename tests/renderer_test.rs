mod common;

use common::{empty_workspace, write_file};
use indexmap::IndexMap;
use terrapy::error::Error;
use terrapy::renderer::{MiniJinjaRenderer, TemplateRenderer};
use terrapy::variables::{VarValue, VariableSet};

fn vars(pairs: &[(&str, VarValue)]) -> VariableSet {
    VariableSet::new(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
}

fn string(s: &str) -> VarValue {
    VarValue::String(s.to_string())
}

#[test]
fn test_render_substitutes_variables() {
    let (_dir, settings) = empty_workspace();
    write_file(&settings.templates_dir, "net/vpc.tf.j2", "region = \"{{ region }}\"\n");

    let renderer = MiniJinjaRenderer::from_settings(&settings);
    let rendered = renderer.render("net/vpc.tf.j2", &vars(&[("region", string("us-east-1"))]));
    assert_eq!(rendered.unwrap(), "region = \"us-east-1\"\n");
}

#[test]
fn test_render_loops_conditionals_and_nested_values() {
    let (_dir, settings) = empty_workspace();
    write_file(
        &settings.templates_dir,
        "net/subnets.tf.j2",
        "{% for s in subnets %}{{ s.name }}={{ s.cidr }};{% endfor %}\
         {% if public %} public{% endif %} x{{ count }}",
    );

    let subnet = |name: &str, cidr: &str| {
        let mut map = IndexMap::new();
        map.insert("name".to_string(), string(name));
        map.insert("cidr".to_string(), string(cidr));
        VarValue::Map(map)
    };
    let vars = vars(&[
        ("subnets", VarValue::Seq(vec![subnet("a", "10.0.1.0/24"), subnet("b", "10.0.2.0/24")])),
        ("public", VarValue::Bool(true)),
        ("count", VarValue::Int(2)),
    ]);

    let renderer = MiniJinjaRenderer::from_settings(&settings);
    assert_eq!(
        renderer.render("net/subnets.tf.j2", &vars).unwrap(),
        "a=10.0.1.0/24;b=10.0.2.0/24; public x2"
    );
}

#[test]
fn test_undefined_variable_fails() {
    let (_dir, settings) = empty_workspace();
    write_file(&settings.templates_dir, "net/vpc.tf.j2", "{{ region }} {{ missing }}");

    let renderer = MiniJinjaRenderer::from_settings(&settings);
    match renderer.render("net/vpc.tf.j2", &vars(&[("region", string("us-east-1"))])) {
        Err(Error::UndefinedVariable { name, .. }) => assert_eq!(name, "net/vpc.tf.j2"),
        other => panic!("Expected UndefinedVariable, got {other:?}"),
    }
}

#[test]
fn test_syntax_error() {
    let (_dir, settings) = empty_workspace();
    write_file(&settings.templates_dir, "net/broken.tf.j2", "{% if %}oops");

    let renderer = MiniJinjaRenderer::from_settings(&settings);
    let result = renderer.render("net/broken.tf.j2", &VariableSet::default());
    assert!(matches!(result, Err(Error::TemplateSyntaxError { .. })));
}

#[test]
fn test_template_not_found() {
    let (_dir, settings) = empty_workspace();
    write_file(&settings.variables_dir, "secret.vars", "password: hunter2\n");

    let renderer = MiniJinjaRenderer::from_settings(&settings);
    let result = renderer.render("net/absent.tf.j2", &VariableSet::default());
    assert!(matches!(result, Err(Error::TemplateNotFound { .. })));

    let result = renderer.render("../variables/secret.vars", &VariableSet::default());
    assert!(matches!(result, Err(Error::TemplateNotFound { .. })));
}

#[test]
fn test_include_within_templates_root() {
    let (_dir, settings) = empty_workspace();
    write_file(&settings.templates_dir, "net/common/tags.j2", "tags = { env = \"{{ env }}\" }");
    write_file(&settings.templates_dir, "net/vpc.tf.j2", "{% include \"net/common/tags.j2\" %}");

    let renderer = MiniJinjaRenderer::from_settings(&settings);
    let rendered = renderer.render("net/vpc.tf.j2", &vars(&[("env", string("prod"))])).unwrap();
    assert_eq!(rendered, "tags = { env = \"prod\" }");
}

#[test]
fn test_macros_directory_is_importable() {
    let (_dir, settings) = empty_workspace();
    write_file(
        &settings.macros_dir,
        "network.j2",
        "{% macro cidr_block(c) %}cidr_block = \"{{ c }}\"{% endmacro %}",
    );
    write_file(
        &settings.templates_dir,
        "net/vpc.tf.j2",
        "{% import \"network.j2\" as network %}{{ network.cidr_block(cidr) }}",
    );

    let renderer = MiniJinjaRenderer::from_settings(&settings);
    let rendered = renderer.render("net/vpc.tf.j2", &vars(&[("cidr", string("10.0.0.0/16"))]));
    assert_eq!(rendered.unwrap(), "cidr_block = \"10.0.0.0/16\"");
}

#[test]
fn test_naming_and_hcl_filters() {
    let (_dir, settings) = empty_workspace();
    write_file(
        &settings.templates_dir,
        "net/names.tf.j2",
        "{{ name | snake_case }} {{ name | pascal_case }} {{ desc | tf_string }}",
    );

    let renderer = MiniJinjaRenderer::from_settings(&settings);
    let vars = vars(&[("name", string("main_vpc")), ("desc", string("uses ${var.x}"))]);
    assert_eq!(
        renderer.render("net/names.tf.j2", &vars).unwrap(),
        "main_vpc MainVpc \"uses $${var.x}\""
    );
}
