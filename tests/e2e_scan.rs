//! Manifest discovery across ecosystems, linted without registry data

mod helper;

use depshub::lint::config::Config;
use depshub::lint::{Level, Linter, Mistake};
use depshub::metadata::types::PackagesInfo;
use depshub::parser::types::{ManagerType, Manifest};
use depshub::scanner::{Scanner, unique_dependencies};

use helper::Workspace;

fn polyglot_workspace() -> Workspace {
    Workspace::new()
        .with_file(
            "Cargo.toml",
            r#"[package]
name = "service"
version = "0.1.0"

[dependencies]
tokio = { version = "1.49", features = ["full"] }
serde = "1.0"
local = { path = "../local" }

[dev-dependencies]
rstest = "0.26"
"#,
        )
        .with_file("Cargo.lock", "")
        .with_file(
            "tools/go.mod",
            r#"module example.com/tools

go 1.22

require (
	github.com/pkg/errors v0.9.1
	github.com/spf13/cobra v1.8.0
	golang.org/x/text v0.14.0
)
"#,
        )
        .with_file(
            "scripts/requirements.txt",
            "# pinned\nnumpy>=1.26.0\n-r base.txt\nrequests==2.31.0\n",
        )
        .with_file(
            "services/api/pom.xml",
            r#"<project>
  <properties>
    <slf4j.version>2.0.9</slf4j.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>${slf4j.version}</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.13.2</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
"#,
        )
        .with_file(
            "web/Gemfile",
            "source 'https://rubygems.org'\n\ngem 'rails', '~> 7.1.0'\n",
        )
        .with_file("web/Gemfile.lock", "")
        .with_file("web/node_modules/left-pad/package.json", r#"{"dependencies": {"a": "1.0.0"}}"#)
}

fn lint(manifests: &[Manifest], config: &Config) -> Vec<Mistake> {
    Linter::default()
        .check(manifests, &PackagesInfo::new(), config)
        .unwrap()
}

#[test]
fn scans_every_supported_ecosystem() {
    let workspace = polyglot_workspace();

    let manifests = Scanner::default()
        .scan(workspace.root(), &Config::default())
        .unwrap();

    let found: Vec<_> = manifests
        .iter()
        .map(|m| (m.path.as_str(), m.manager, m.lockfile.is_some()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("Cargo.toml", ManagerType::Cargo, true),
            ("scripts/requirements.txt", ManagerType::Pip, false),
            ("services/api/pom.xml", ManagerType::Maven, false),
            ("tools/go.mod", ManagerType::Go, false),
            ("web/Gemfile", ManagerType::Gem, true),
        ]
    );

    let cargo: Vec<_> = manifests[0]
        .dependencies
        .iter()
        .map(|d| (d.name.as_str(), d.version.as_str(), d.dev))
        .collect();
    assert_eq!(
        cargo,
        vec![
            ("tokio", "1.49", false),
            ("serde", "1.0", false),
            ("rstest", "0.26", true),
        ]
    );

    let maven: Vec<_> = manifests[2]
        .dependencies
        .iter()
        .map(|d| (d.name.as_str(), d.version.as_str(), d.dev, d.definition.line))
        .collect();
    assert_eq!(
        maven,
        vec![
            ("org.slf4j:slf4j-api", "2.0.9", false, 8),
            ("junit:junit", "4.13.2", true, 13),
        ]
    );

    let go_versions: Vec<_> = manifests[3]
        .dependencies
        .iter()
        .map(|d| d.version.as_str())
        .collect();
    assert_eq!(go_versions, vec!["v0.9.1", "v1.8.0", "v0.14.0"]);

    assert_eq!(unique_dependencies(&manifests).len(), 11);
}

#[test]
fn lints_scanned_manifests_without_metadata() {
    let workspace = polyglot_workspace();
    let config = Config::default();
    let manifests = Scanner::default().scan(workspace.root(), &config).unwrap();

    let mistakes = lint(&manifests, &config);

    let summary: Vec<_> = mistakes
        .iter()
        .map(|m| (m.rule, m.definitions[0].path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("sorted", "Cargo.toml"),
            ("no-unstable", "Cargo.toml"),
            ("no-unstable", "tools/go.mod"),
            ("no-unstable", "tools/go.mod"),
            ("lockfile", "scripts/requirements.txt"),
        ]
    );
}

#[test]
fn configuration_precedence_follows_policy_order() {
    let workspace = polyglot_workspace();
    let config = Config::from_yaml(
        r#"
manifest_files:
  - filter: "**/*.mod"
    rules:
      - name: sorted
        disabled: true
      - name: no-unstable
        level: warning
  - filter: "tools/**"
    packages: ["golang.org/x/text"]
    rules:
      - name: no-unstable
        disabled: true
  - filter: "scripts/*"
    rules:
      - name: lockfile
        level: warning
"#,
    )
    .unwrap();
    let manifests = Scanner::default().scan(workspace.root(), &config).unwrap();

    let mistakes = lint(&manifests, &config);

    let summary: Vec<_> = mistakes
        .iter()
        .map(|m| (m.rule, m.level, m.definitions[0].path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("sorted", Level::Error, "Cargo.toml"),
            ("no-unstable", Level::Error, "Cargo.toml"),
            ("no-unstable", Level::Warning, "tools/go.mod"),
            ("lockfile", Level::Warning, "scripts/requirements.txt"),
        ]
    );
}
