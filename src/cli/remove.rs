use clap::Parser;

/// Arguments for the remove command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Remove a package, asking first:\n    ml remove rain\n\n\
                   Remove without asking (downloaded files stay cached):\n    ml remove rain -y")]
pub struct RemoveArgs {
    /// Name of the installed package
    pub name: String,

    /// Skip confirmation prompts; the cache is kept
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    #[test]
    fn test_cli_parsing_remove() {
        let cli = super::super::Cli::try_parse_from(["ml", "remove", "rain", "-y"]).unwrap_or_else(|e| {
            panic!("Failed to parse CLI arguments: {}", e);
        });
        match cli.command {
            super::super::Commands::Remove(args) => {
                assert_eq!(args.name, "rain");
                assert!(args.yes);
            }
            _ => panic!("Expected Remove command"),
        }
    }

    #[test]
    fn test_cli_parsing_remove_requires_name() {
        assert!(super::super::Cli::try_parse_from(["ml", "remove"]).is_err());
    }
}
