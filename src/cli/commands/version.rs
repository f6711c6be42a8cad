//! Version command implementation.

use crate::cli::VersionArgs;

/// Version line for `qms version`.
#[must_use]
pub fn version_line(args: &VersionArgs) -> String {
    let version = env!("CARGO_PKG_VERSION");

    // --short: only the version number
    if args.short {
        return version.to_string();
    }

    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    format!("qms version {version} ({build})")
}

/// Execute the version command.
pub fn execute(args: &VersionArgs) {
    println!("{}", version_line(args));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_is_bare_version() {
        let line = version_line(&VersionArgs { short: true });
        assert_eq!(line, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn long_names_the_binary() {
        let line = version_line(&VersionArgs::default());
        assert!(line.starts_with("qms version "));
    }
}
