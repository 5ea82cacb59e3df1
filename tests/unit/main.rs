//! Unit tests mirroring the `src` tree

mod io;
mod model;

#[cfg(test)]
mod tests {
    use clap::Parser;
    use vinegen::io::cli::Cli;
    use vinegen::placement::StrategyRegistry;

    // Tests the strategy listing runs end to end
    // Verified by installing the logger before listing
    #[test]
    fn test_strategies_command() {
        let cli = Cli::parse_from(["vinegen", "strategies"]);
        assert!(cli.run(&StrategyRegistry::with_defaults()).is_ok());
    }

    // Tests rendering a missing level reports the path
    // Verified by panicking on unreadable files
    #[test]
    fn test_render_missing_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level_404.json");
        let cli = Cli::parse_from(["vinegen", "--quiet", "render", &path.to_string_lossy()]);

        let error = cli.run(&StrategyRegistry::with_defaults()).unwrap_err();
        assert!(error.to_string().contains("level_404.json"));
    }
}
