//! Parser layer
//! - traits.rs: ManifestParser trait definition
//! - types.rs: Common types (Manifest, Dependency, Definition, ManagerType)
//! - package_json.rs: package.json parser
//! - cargo_toml.rs: Cargo.toml parser
//! - go_mod.rs: go.mod parser
//! - requirements_txt.rs: requirements.txt parser
//! - pyproject_toml.rs: pyproject.toml parser
//! - gemfile.rs: Gemfile parser
//! - mix_exs.rs: mix.exs parser
//! - pom_xml.rs: Maven pom.xml parser

pub mod cargo_toml;
pub mod gemfile;
pub mod go_mod;
pub mod mix_exs;
pub mod package_json;
pub mod pom_xml;
pub mod pyproject_toml;
pub mod requirements_txt;
pub mod traits;
pub mod types;

pub use cargo_toml::CargoTomlParser;
pub use gemfile::GemfileParser;
pub use go_mod::GoModParser;
pub use mix_exs::MixExsParser;
pub use package_json::PackageJsonParser;
pub use pom_xml::PomXmlParser;
pub use pyproject_toml::PyprojectTomlParser;
pub use requirements_txt::RequirementsTxtParser;
pub use traits::{ManifestParser, ParseError};
pub use types::{Definition, Dependency, Lockfile, ManagerType, Manifest, clean_version};

/// All built-in manifest parsers
pub fn default_parsers() -> Vec<Box<dyn ManifestParser>> {
    vec![
        Box::new(PackageJsonParser::new()),
        Box::new(CargoTomlParser::new()),
        Box::new(GoModParser::new()),
        Box::new(RequirementsTxtParser::new()),
        Box::new(PyprojectTomlParser::new()),
        Box::new(MixExsParser::new()),
        Box::new(GemfileParser::new()),
        Box::new(PomXmlParser::new()),
    ]
}
