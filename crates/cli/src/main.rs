// keymatch CLI - keyed reconciliation of delimited tabular files

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use keymatch_core::config::{JobConfig, Operation, OutputConfig, SourceConfig};
use keymatch_core::engine::RunReport;
use keymatch_core::KeymatchError;

use exit_codes::{exit_code_for, EXIT_CONFIG, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "keymatch")]
#[command(about = "Reconcile two delimited tabular files by composite key")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation job from a TOML config file
    #[command(after_help = "\
Examples:
  keymatch run nightly.job.toml
  keymatch run nightly.job.toml --json
  keymatch run nightly.job.toml --report report.json")]
    Run {
        /// Path to the .job.toml config file
        config: PathBuf,

        /// Print the run report as JSON instead of a human summary
        #[arg(long)]
        json: bool,

        /// Write the JSON run report to a file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Validate a job config without running it
    Validate {
        /// Path to the .job.toml config file
        config: PathBuf,
    },

    /// Keys present in both files; records taken from RIGHT
    #[command(name = "match", after_help = "\
Examples:
  keymatch match a.csv b.csv --left-key animal --left-key number \\
      --right-key creature --right-key num --output matched.csv")]
    Match(CompareArgs),

    /// Keys present in LEFT but absent from RIGHT
    Diff(CompareArgs),

    /// Overlay named fields from RIGHT onto matching LEFT records
    #[command(after_help = "\
Examples:
  keymatch merge a.csv b.csv --left-key animal --right-key creature \\
      --field chemical --output merged.csv")]
    Merge {
        #[command(flatten)]
        compare: CompareArgs,

        /// Field to pull over from RIGHT (repeatable)
        #[arg(long = "field", required = true)]
        fields: Vec<String>,
    },
}

#[derive(Args)]
struct CompareArgs {
    /// Left input file
    left: PathBuf,

    /// Right input file
    right: PathBuf,

    /// Key field on the left file (repeatable; omit to key on every column)
    #[arg(long = "left-key")]
    left_keys: Vec<String>,

    /// Key field on the right file (repeatable; omit to key on every column)
    #[arg(long = "right-key")]
    right_keys: Vec<String>,

    /// Write the result to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the run report as JSON instead of a human summary
    #[arg(long)]
    json: bool,
}

struct CliError {
    code: u8,
    message: String,
}

impl From<KeymatchError> for CliError {
    fn from(err: KeymatchError) -> Self {
        CliError { code: exit_code_for(&err), message: err.to_string() }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli.command) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            ExitCode::from(e.code)
        }
    }
}

fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Run { config, json, report } => cmd_run(config, json, report),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Match(args) => cmd_compare(Operation::Match, args, Vec::new()),
        Commands::Diff(args) => cmd_compare(Operation::Diff, args, Vec::new()),
        Commands::Merge { compare, fields } => cmd_compare(Operation::Merge, compare, fields),
    }
}

fn read_config(path: &Path) -> Result<JobConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
    })?;
    Ok(JobConfig::from_toml(&config_str)?)
}

fn cmd_run(config_path: PathBuf, json: bool, report_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    // Source and output paths resolve relative to the config file
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let (_, report) = keymatch_core::run(&config, base_dir)?;

    if let Some(path) = report_path {
        std::fs::write(&path, report.to_json()).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("cannot write report {}: {e}", path.display()),
        })?;
    }

    print_report(&report, json);
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    println!("ok: '{}' ({})", config.name, config.operation);
    Ok(())
}

/// Direct match/diff/merge invocation: assemble an in-memory job config
/// and run it against the current directory.
fn cmd_compare(
    operation: Operation,
    args: CompareArgs,
    merge_fields: Vec<String>,
) -> Result<(), CliError> {
    let config = job_from_args(operation, &args, merge_fields);
    config.validate()?;

    let (_, report) = keymatch_core::run(&config, Path::new("."))?;
    print_report(&report, args.json);
    Ok(())
}

fn job_from_args(operation: Operation, args: &CompareArgs, merge_fields: Vec<String>) -> JobConfig {
    JobConfig {
        name: format!("{operation} {} {}", args.left.display(), args.right.display()),
        operation,
        merge_fields,
        left: SourceConfig {
            file: args.left.to_string_lossy().into_owned(),
            key_fields: args.left_keys.clone(),
        },
        right: SourceConfig {
            file: args.right.to_string_lossy().into_owned(),
            key_fields: args.right_keys.clone(),
        },
        output: OutputConfig {
            file: args.output.as_ref().map(|p| p.to_string_lossy().into_owned()),
            fieldnames: None,
        },
    }
}

fn print_report(report: &RunReport, json: bool) {
    if json {
        println!("{}", report.to_json());
        return;
    }
    println!("job:     {} ({})", report.meta.job_name, report.meta.operation);
    println!(
        "left:    {} key(s), {} lost to duplicates",
        report.summary.left_keys, report.summary.left_loss
    );
    println!(
        "right:   {} key(s), {} lost to duplicates",
        report.summary.right_keys, report.summary.right_loss
    );
    println!("result:  {} record(s)", report.summary.result_keys);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(left_keys: &[&str], right_keys: &[&str]) -> CompareArgs {
        CompareArgs {
            left: PathBuf::from("a.csv"),
            right: PathBuf::from("b.csv"),
            left_keys: left_keys.iter().map(|k| k.to_string()).collect(),
            right_keys: right_keys.iter().map(|k| k.to_string()).collect(),
            output: None,
            json: false,
        }
    }

    #[test]
    fn direct_args_become_a_job() {
        let config = job_from_args(
            Operation::Merge,
            &args(&["animal"], &["creature"]),
            vec!["chemical".into()],
        );
        assert_eq!(config.operation, Operation::Merge);
        assert_eq!(config.left.file, "a.csv");
        assert_eq!(config.right.key_fields, ["creature"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn mismatched_direct_keys_fail_validation() {
        let config = job_from_args(
            Operation::Match,
            &args(&["animal", "number"], &["creature"]),
            Vec::new(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn end_to_end_direct_match() {
        use keymatch_core::{match_records, Keyed, LoadedCollection};

        let dir = tempfile::tempdir().unwrap();
        let left_path = dir.path().join("a.csv");
        let right_path = dir.path().join("b.csv");
        std::fs::write(&left_path, "animal,number,code\ncat,1,x\ndog,2,y\n").unwrap();
        std::fs::write(&right_path, "creature,num,chemical\ncat,1,p\nfish,3,q\n").unwrap();

        let left = LoadedCollection::from_path(
            &left_path,
            &["animal".to_string(), "number".to_string()],
        )
        .unwrap();
        let right = LoadedCollection::from_path(
            &right_path,
            &["creature".to_string(), "num".to_string()],
        )
        .unwrap();

        let result = match_records(&left, &right).unwrap();
        assert_eq!(result.records().len(), 1);
    }
}
