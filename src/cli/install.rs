use clap::Parser;
use std::path::PathBuf;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install a packaged model:\n    ml install audit_1.2.0.mlm\n    \
                   ml install https://example.com/models/audit_1.2.0.mlm\n\n\
                   Install from a repository:\n    ml install acme/rain\n    \
                   ml install acme/rain@v2:models/rain/MLHUB.yaml\n    \
                   ml install gitlab:acme/rain\n    \
                   ml install https://bitbucket.org/acme/rain/src/master/\n\n\
                   Install from a private repository:\n    ml install gitlab:acme/secret -i ~/.ssh/deploy_key")]
pub struct InstallArgs {
    /// Package reference: archive path or URL, owner/repo[@ref][:path],
    /// gitlab:owner/repo, bitbucket:owner/repo, or a hosting service URL
    pub reference: String,

    /// Replace an installed version without asking
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// SSH private key for cloning private repositories
    #[arg(long, short = 'i', value_name = "KEY")]
    pub identity: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_install() {
        let cli = super::super::Cli::try_parse_from(["ml", "install", "acme/rain@v2"])
            .unwrap_or_else(|e| {
                panic!("Failed to parse CLI arguments: {}", e);
            });
        match cli.command {
            super::super::Commands::Install(args) => {
                assert_eq!(args.reference, "acme/rain@v2");
                assert!(!args.yes);
                assert_eq!(args.identity, None);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_install_with_options() {
        let cli = super::super::Cli::try_parse_from([
            "ml",
            "install",
            "gitlab:acme/secret",
            "-y",
            "--identity",
            "/keys/deploy",
        ])
        .unwrap_or_else(|e| {
            panic!("Failed to parse CLI arguments: {}", e);
        });
        match cli.command {
            super::super::Commands::Install(args) => {
                assert!(args.yes);
                assert_eq!(args.identity, Some(PathBuf::from("/keys/deploy")));
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_install_requires_reference() {
        assert!(super::super::Cli::try_parse_from(["ml", "install"]).is_err());
    }
}
