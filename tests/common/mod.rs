#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use terrapy::config::Settings;

pub const VPC_TEMPLATE: &str = r#"provider "aws" {
  region = "{{ region }}"
}

resource "aws_vpc" "main" {
  cidr_block = "{{ cidr }}"
}
"#;

pub const VPC_RENDERED: &str = r#"provider "aws" {
  region = "us-east-1"
}

resource "aws_vpc" "main" {
  cidr_block = "10.0.0.0/16"
}
"#;

pub const SUBNET_TEMPLATE: &str = r#"resource "aws_subnet" "primary" {
  vpc_id     = aws_vpc.main.id
  cidr_block = cidrsubnet("{{ cidr }}", 8, 1)
  # {{ region }}
}
"#;

pub const SUBNET_RENDERED: &str = r#"resource "aws_subnet" "primary" {
  vpc_id     = aws_vpc.main.id
  cidr_block = cidrsubnet("10.0.0.0/16", 8, 1)
  # us-east-1
}
"#;

pub const VARS: &str = "region: us-east-1\ncidr: 10.0.0.0/16\n";

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Scratch workspace with default settings rooted in it and nothing else.
pub fn empty_workspace() -> (TempDir, Settings) {
    let dir = TempDir::new().unwrap();
    let settings = Settings::default().rooted_at(dir.path());
    (dir, settings)
}

/// Workspace holding project `net` (`vpc.tf.j2`, `subnets/subnet.tf.j2`) and `terrapy.vars`.
pub fn net_workspace() -> (TempDir, Settings) {
    let (dir, settings) = empty_workspace();
    write_file(&settings.templates_dir, "net/vpc.tf.j2", VPC_TEMPLATE);
    write_file(&settings.templates_dir, "net/subnets/subnet.tf.j2", SUBNET_TEMPLATE);
    write_file(&settings.variables_dir, "terrapy.vars", VARS);
    (dir, settings)
}
