use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Invalid arguments: {message}")]
    #[diagnostic(
        code(config::invalid_arguments),
        help("Either a mod directory or a base package and checked packages must be specified")
    )]
    Configuration { message: String },

    #[error("Failed to read base package: {path}")]
    #[diagnostic(
        code(vpk::base_package),
        help("Make sure the path points to a VPK directory file, e.g. pak01_dir.vpk")
    )]
    BasePackage {
        path: Utf8PathBuf,
        #[source]
        source: vpk_index::VpkError,
    },

    #[error("Base package {path} has no paths matching '{name_match}'")]
    #[diagnostic(
        code(vpk::empty_base),
        help("No base package paths contain the --name-match string. Try a broader filter")
    )]
    EmptyBase {
        path: Utf8PathBuf,
        name_match: String,
    },

    #[error("Failed to load addon list {path}: {message}")]
    #[diagnostic(
        code(addon_list::invalid),
        help("The addon list must be a JSON document with a top-level \"plugins\" object")
    )]
    AddonList { path: Utf8PathBuf, message: String },

    #[error("Configuration file error: {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check your config.toml file for syntax errors")
    )]
    ConfigParse {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl From<vpk_conflicts::Error> for CliError {
    fn from(err: vpk_conflicts::Error) -> Self {
        use vpk_conflicts::Error;

        match err {
            Error::Configuration(message) => CliError::Configuration { message },
            Error::BasePackage { path, source } => CliError::BasePackage { path, source },
            Error::EmptyBase { path, name_match } => CliError::EmptyBase { path, name_match },
            Error::AddonList { path, message } => CliError::AddonList { path, message },
        }
    }
}
