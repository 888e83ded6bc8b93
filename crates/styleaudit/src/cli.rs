//! Command-line entry point.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::audit::{AuditRequest, AuditSettings, Auditor};
use crate::app::patch::{PatchOptions, patch_file};
use crate::app::report::{AuditReport, ReportFormat, ReportRenderer};
use crate::infra::config::Config;
use crate::infra::prompt::{Prompter, ScriptedPrompter, TerminalPrompter};

const BANNER: &str = "\
This relies on the stylesheet having a clean, flat structure (one rule per block).
Run a formatter such as Prettier first if it does not.
";

#[derive(Debug, Parser)]
#[command(
    name = "styleaudit",
    author,
    version,
    about = "Find stylesheet rules a page never uses and write a trimmed copy",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Extra config file layered over user and workspace config
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report selectors missing from an HTML file and write a trimmed stylesheet
    Audit(AuditArgs),
    /// Enable source maps and named chunks in an Angular workspace file
    PatchConfig(PatchArgs),
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// HTML file to search for selectors
    #[arg(long, value_name = "FILE")]
    pub markup: Option<PathBuf>,
    /// Stylesheet to audit (defaults to the HTML name with the style extension)
    #[arg(long, value_name = "FILE")]
    pub style: Option<PathBuf>,
    /// Stylesheet extension, e.g. scss or css
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,
    /// File stem of the trimmed stylesheet
    #[arg(long, value_name = "STEM")]
    pub output: Option<String>,
    /// Directory for scratch files and the trimmed stylesheet
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
    /// Never prompt; fail instead
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Debug, Args)]
pub struct PatchArgs {
    /// Workspace file to patch
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Project whose build configurations are patched
    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,
}

/// Parse arguments, set up logging, and dispatch.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::init(cli.verbose);

    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "styleaudit", &mut io::stdout());
            Ok(())
        }
        Commands::Audit(args) => {
            let config = Config::load(cli.config.as_deref())?;
            run_audit(args, &config)
        }
        Commands::PatchConfig(args) => {
            let config = Config::load(cli.config.as_deref())?;
            run_patch(args, &config)
        }
    }
}

fn run_audit(args: AuditArgs, config: &Config) -> Result<()> {
    let work_dir = match args.out_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("unable to determine working directory")?,
    };

    let mut settings = AuditSettings::from_config(config, work_dir);
    if let Some(extension) = args.extension {
        settings.style_extension = extension.trim_start_matches('.').to_owned();
    }
    if let Some(output) = args.output {
        settings.output_stem = output;
    }

    let format = match args.format {
        Some(format) => format,
        None => config
            .defaults
            .report_format
            .parse()
            .context("invalid report_format in config")?,
    };

    let mut prompter: Box<dyn Prompter> = if args.no_input {
        Box::new(ScriptedPrompter::empty())
    } else {
        Box::new(TerminalPrompter::new())
    };

    let interactive = !args.no_input && (args.markup.is_none() || args.style.is_none());
    if interactive {
        eprintln!("{BANNER}");
        eprintln!(
            "Looking for .{} stylesheets; pass --extension to change this.\n",
            settings.style_extension
        );
    }

    let request = AuditRequest::resolve(
        args.markup,
        args.style,
        &settings.style_extension,
        prompter.as_mut(),
    )?;

    let auditor = Auditor::new(settings)?;
    let outcome = auditor.run(request, prompter.as_mut())?;

    let report = AuditReport::from_outcome(&outcome)?;
    let rendered = ReportRenderer::new()?.render(&report, format)?;
    println!("{rendered}");
    Ok(())
}

fn run_patch(args: PatchArgs, config: &Config) -> Result<()> {
    let mut options = PatchOptions::from_config(config);
    if let Some(file) = args.file {
        options.file = file;
    }
    if let Some(project) = args.project {
        options.project = project;
    }

    let outcome = patch_file(&options)?;
    if outcome.changed.is_empty() {
        tracing::info!("build flags were already enabled");
    }
    println!("{} successfully written", outcome.file.display());
    Ok(())
}
