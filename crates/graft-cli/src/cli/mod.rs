//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "graft",
    bin_name = "graft",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Blueprint-driven project grafting",
    long_about = "Graft applies declarative blueprints to existing projects: \
                  creating files, merging manifests, editing source entry \
                  points, and running setup commands.  Every change is staged \
                  in memory first and only committed once the whole blueprint \
                  succeeded.",
    after_help = "EXAMPLES:\n\
        \x20 graft apply react-query.json --project ./my-app -p project.hasApi=true\n\
        \x20 graft plan tailwind.json --project ./my-app\n\
        \x20 graft validate blueprints/auth.json\n\
        \x20 graft completions bash > /usr/share/bash-completion/completions/graft",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a blueprint to a project.
    #[command(
        visible_alias = "a",
        about = "Apply a blueprint to a project",
        after_help = "EXAMPLES:\n\
            \x20 graft apply react-query.json --project ./my-app --yes\n\
            \x20 graft apply auth.json -p project.hasApi=true -p api.url=https://api.example.com\n\
            \x20 graft apply heavy-setup.json --timeout 600\n\
            \x20 graft apply react-query.json --dry-run"
    )]
    Apply(ApplyArgs),

    /// Preview a blueprint's actions and footprint without running it.
    #[command(
        visible_alias = "preview",
        about = "Show what a blueprint would touch",
        after_help = "EXAMPLES:\n\
            \x20 graft plan tailwind.json\n\
            \x20 graft plan tailwind.json --project ./my-app   # marks existing files"
    )]
    Plan(PlanArgs),

    /// Parse and validate a blueprint file.
    #[command(
        visible_alias = "check",
        about = "Validate a blueprint file",
        after_help = "EXAMPLES:\n\
            \x20 graft validate blueprints/auth.json\n\
            \x20 graft validate auth        # resolved via blueprints.search_path"
    )]
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 graft completions bash > ~/.local/share/bash-completion/completions/graft\n\
            \x20 graft completions zsh  > ~/.zfunc/_graft\n\
            \x20 graft completions fish > ~/.config/fish/completions/graft.fish"
    )]
    Completions(CompletionsArgs),
}

// ── apply ─────────────────────────────────────────────────────────────────────

/// Arguments for `graft apply`.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Blueprint file, or a bare name resolved via `blueprints.search_path`.
    #[arg(value_name = "BLUEPRINT", help = "Blueprint JSON file to apply")]
    pub blueprint: PathBuf,

    /// Project directory the blueprint is applied to.
    #[arg(
        long = "project",
        value_name = "DIR",
        help = "Project directory (default: current directory)"
    )]
    pub project: Option<PathBuf>,

    /// Context parameter, repeatable.  Dotted keys nest (`project.hasApi`),
    /// values parse as JSON when possible (`true`, `3`), else as strings.
    #[arg(
        short = 'p',
        long = "param",
        value_name = "KEY=VALUE",
        action = clap::ArgAction::Append,
        help = "Context parameter (repeatable)"
    )]
    pub params: Vec<String>,

    /// Stage and report, but write nothing and run no commands.
    #[arg(long = "dry-run", help = "Rehearse without writing files or running commands")]
    pub dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation and apply immediately")]
    pub yes: bool,

    /// Per-command timeout for run-command actions.
    #[arg(
        long = "timeout",
        value_name = "SECS",
        help = "Per-command timeout in seconds (default: 120)"
    )]
    pub timeout: Option<u64>,
}

// ── plan ──────────────────────────────────────────────────────────────────────

/// Arguments for `graft plan`.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Blueprint file, or a bare name resolved via `blueprints.search_path`.
    #[arg(value_name = "BLUEPRINT", help = "Blueprint JSON file to preview")]
    pub blueprint: PathBuf,

    /// When given, footprint entries are marked `present` or `new` against
    /// this directory.
    #[arg(
        long = "project",
        value_name = "DIR",
        help = "Project directory to check the footprint against"
    )]
    pub project: Option<PathBuf>,
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Arguments for `graft validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Blueprint file, or a bare name resolved via `blueprints.search_path`.
    #[arg(value_name = "BLUEPRINT", help = "Blueprint JSON file to validate")]
    pub blueprint: PathBuf,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `graft completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_apply_command() {
        let cli = Cli::parse_from([
            "graft",
            "apply",
            "react-query.json",
            "--project",
            "./my-app",
            "-p",
            "project.hasApi=true",
            "--yes",
        ]);
        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.blueprint, PathBuf::from("react-query.json"));
                assert_eq!(args.project, Some(PathBuf::from("./my-app")));
                assert_eq!(args.params, vec!["project.hasApi=true".to_string()]);
                assert!(args.yes);
                assert!(!args.dry_run);
            }
            other => panic!("expected Apply, got {other:?}"),
        }
    }

    #[test]
    fn params_accumulate_in_order() {
        let cli = Cli::parse_from([
            "graft", "apply", "bp.json", "-p", "a=1", "-p", "b=2", "-p", "c=3",
        ]);
        if let Commands::Apply(args) = cli.command {
            assert_eq!(args.params, vec!["a=1", "b=2", "c=3"]);
        } else {
            panic!("expected Apply command");
        }
    }

    #[test]
    fn apply_alias_a() {
        let cli = Cli::parse_from(["graft", "a", "bp.json"]);
        assert!(matches!(cli.command, Commands::Apply(_)));
    }

    #[test]
    fn plan_alias_preview() {
        let cli = Cli::parse_from(["graft", "preview", "bp.json"]);
        assert!(matches!(cli.command, Commands::Plan(_)));
    }

    #[test]
    fn validate_alias_check() {
        let cli = Cli::parse_from(["graft", "check", "bp.json"]);
        assert!(matches!(cli.command, Commands::Validate(_)));
    }

    #[test]
    fn format_is_an_alias_for_output_format() {
        let cli = Cli::parse_from(["graft", "--format", "json", "validate", "bp.json"]);
        assert_eq!(cli.global.output_format, OutputFormat::Json);
    }

    #[test]
    fn timeout_parses_as_seconds() {
        let cli = Cli::parse_from(["graft", "apply", "bp.json", "--timeout", "600"]);
        if let Commands::Apply(args) = cli.command {
            assert_eq!(args.timeout, Some(600));
        } else {
            panic!("expected Apply command");
        }
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        // clap should reject --quiet --verbose together
        let result = Cli::try_parse_from(["graft", "--quiet", "--verbose", "validate", "x.json"]);
        assert!(result.is_err());
    }
}
