use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use harfnegar::{
    find_matches, transform_records, transform_text, unshape, ArabicShaper, Document,
    ExceptionStore, Format, PathKey,
};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "harfnegar")]
#[command(about = "Persian/Arabic text processor", long_about = None)]
#[command(version)]
struct Cli {
    /// Exception store file (default: ~/.harfnegar/exceptions.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shape text for display (contextual forms + visual reordering)
    Encode {
        #[command(flatten)]
        input: InputArgs,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ignore exception rules for this run
        #[arg(long)]
        no_exceptions: bool,
    },

    /// Reverse shaped text back to logical order (best-effort)
    Decode {
        #[command(flatten)]
        input: InputArgs,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Test patterns against input and list the matches
    Match {
        #[command(flatten)]
        input: InputArgs,

        /// Pattern to match (repeatable)
        #[arg(short, long = "pattern", required = true)]
        patterns: Vec<String>,
    },

    /// Shape only the spans the patterns match
    Apply {
        #[command(flatten)]
        input: InputArgs,

        /// Pattern to match (repeatable)
        #[arg(short, long = "pattern", required = true)]
        patterns: Vec<String>,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ignore exception rules for this run
        #[arg(long)]
        no_exceptions: bool,

        /// Show a unified diff of the change
        #[arg(short, long)]
        diff: bool,
    },

    /// Work on structured documents (PO, JSON, YAML, XML)
    Doc {
        #[command(subcommand)]
        command: DocCommands,
    },

    /// Manage exception rules
    Exceptions {
        #[command(subcommand)]
        command: ExceptionCommands,
    },
}

#[derive(Subcommand)]
enum DocCommands {
    /// List a document as flat records
    Records {
        file: PathBuf,

        /// Override format detection (po, json, yaml, xml)
        #[arg(long)]
        format: Option<String>,
    },

    /// Set the value at one record path and save
    Set {
        file: PathBuf,
        path: String,
        value: String,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a unified diff of the change
        #[arg(short, long)]
        diff: bool,
    },

    /// Shape every record value of a document (or a directory of them)
    Transform {
        target: PathBuf,

        /// Recurse into directories, picking up known extensions
        #[arg(short, long)]
        recursive: bool,

        /// Only shape spans matched by these patterns (repeatable)
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,

        /// Ignore exception rules for this run
        #[arg(long)]
        no_exceptions: bool,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a unified diff per file
        #[arg(short, long)]
        diff: bool,
    },
}

#[derive(Subcommand)]
enum ExceptionCommands {
    /// List all rules
    List,

    /// Add a rule (enabled)
    Add {
        pattern: String,

        #[arg(default_value = "")]
        description: String,
    },

    /// Replace a rule's fields
    Update {
        id: u64,

        #[arg(long)]
        pattern: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a rule
    Delete { id: u64 },

    /// Enable a rule
    Enable { id: u64 },

    /// Disable a rule
    Disable { id: u64 },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Literal input text
    #[arg(short = 't', long)]
    text: Option<String>,

    /// Read input from a file
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    /// Read input from stdin
    #[arg(short = 's', long)]
    stdin: bool,
}

impl InputArgs {
    fn read(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(file) = &self.file {
            return fs::read_to_string(file)
                .with_context(|| format!("cannot read {}", file.display()));
        }
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("cannot read stdin")?;
        Ok(buffer)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let store_path = cli.store.clone();

    match cli.command {
        Commands::Encode {
            input,
            output,
            no_exceptions,
        } => cmd_encode(&input, output.as_deref(), no_exceptions, store_path),

        Commands::Decode { input, output } => cmd_decode(&input, output.as_deref()),

        Commands::Match { input, patterns } => cmd_match(&input, &patterns),

        Commands::Apply {
            input,
            patterns,
            output,
            no_exceptions,
            diff,
        } => cmd_apply(&input, &patterns, output.as_deref(), no_exceptions, diff, store_path),

        Commands::Doc { command } => match command {
            DocCommands::Records { file, format } => cmd_doc_records(&file, format.as_deref()),
            DocCommands::Set {
                file,
                path,
                value,
                dry_run,
                diff,
            } => cmd_doc_set(&file, &path, &value, dry_run, diff),
            DocCommands::Transform {
                target,
                recursive,
                patterns,
                no_exceptions,
                dry_run,
                diff,
            } => cmd_doc_transform(
                &target,
                recursive,
                &patterns,
                no_exceptions,
                dry_run,
                diff,
                store_path,
            ),
        },

        Commands::Exceptions { command } => cmd_exceptions(command, store_path),
    }
}

/// Resolve the store path: flag, then environment, then home directory.
fn open_store(cli_store: Option<PathBuf>) -> Result<ExceptionStore> {
    let path = match cli_store {
        Some(path) => path,
        None => match env::var_os("HARFNEGAR_STORE") {
            Some(path) => PathBuf::from(path),
            None => ExceptionStore::default_path()
                .context("cannot locate a home directory for the exception store")?,
        },
    };
    Ok(ExceptionStore::open(path)?)
}

fn load_rules(
    no_exceptions: bool,
    store_path: Option<PathBuf>,
) -> Result<Vec<harfnegar::ExceptionRule>> {
    if no_exceptions {
        return Ok(Vec::new());
    }
    Ok(open_store(store_path)?.rules().to_vec())
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
            println!("{}", format!("✓ Output written to: {}", path.display()).green());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn cmd_encode(
    input: &InputArgs,
    output: Option<&Path>,
    no_exceptions: bool,
    store_path: Option<PathBuf>,
) -> Result<()> {
    let text = input.read()?;
    let rules = load_rules(no_exceptions, store_path)?;
    let outcome = transform_text(&text, None, &rules, &ArabicShaper)?;
    if outcome.exempted {
        eprintln!("{}", "text matches an exception rule; left unchanged".yellow());
    }
    emit(output, &outcome.output)
}

fn cmd_decode(input: &InputArgs, output: Option<&Path>) -> Result<()> {
    let text = input.read()?;
    emit(output, &unshape(&text))
}

fn cmd_match(input: &InputArgs, patterns: &[String]) -> Result<()> {
    let text = input.read()?;
    let set = find_matches(&text, patterns);

    for failure in &set.failures {
        eprintln!("{}", format!("✗ {}", failure.error).red());
    }
    if set.failures.len() == patterns.len() {
        bail!("no usable pattern");
    }

    if set.matches.is_empty() {
        println!("No matches found");
        return Ok(());
    }

    println!("{}", format!("✓ {} matches:", set.matches.len()).green());
    for (i, m) in set.matches.iter().take(20).enumerate() {
        println!("{}. '{}' ({}-{})", i + 1, m.text, m.start, m.end);
    }
    if set.matches.len() > 20 {
        println!("... and {} more", set.matches.len() - 20);
    }
    Ok(())
}

fn cmd_apply(
    input: &InputArgs,
    patterns: &[String],
    output: Option<&Path>,
    no_exceptions: bool,
    diff: bool,
    store_path: Option<PathBuf>,
) -> Result<()> {
    let text = input.read()?;
    let rules = load_rules(no_exceptions, store_path)?;
    let outcome = transform_text(&text, Some(patterns), &rules, &ArabicShaper)?;

    for failure in &outcome.failures {
        eprintln!("{}", format!("✗ {}", failure.error).red());
    }
    if outcome.exempted {
        eprintln!("{}", "text matches an exception rule; left unchanged".yellow());
    }
    if diff {
        display_diff("<input>", &text, &outcome.output);
    }
    emit(output, &outcome.output)
}

fn cmd_doc_records(file: &Path, format: Option<&str>) -> Result<()> {
    let document = load_document(file, format)?;
    for record in document.records() {
        let mut line = format!("{}\t{}", record.path, record.value);
        if !record.flags.is_empty() {
            let flags: Vec<&str> = record.flags.iter().map(String::as_str).collect();
            line.push_str(&format!("\t[{}]", flags.join(", ")));
        }
        println!("{line}");
        if let Some(comment) = &record.comment {
            for part in comment.lines() {
                println!("{}", format!("\t# {part}").dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_doc_set(file: &Path, path: &str, value: &str, dry_run: bool, diff: bool) -> Result<()> {
    let key = PathKey::parse(path)?;
    let mut document = Document::load(file)?;
    let original = document.render()?;

    let mut records = document.records();
    let record = records
        .iter_mut()
        .find(|record| record.path == key)
        .with_context(|| format!("no record at path '{key}' in {}", file.display()))?;
    record.value = value.to_string();

    document.apply_records(&records)?;
    let modified = document.render()?;

    if diff || dry_run {
        display_diff(&file.display().to_string(), &original, &modified);
    }
    if dry_run {
        println!("{}", "dry run - nothing written".yellow());
        return Ok(());
    }

    document.save(file)?;
    println!("{}", format!("✓ {} updated", file.display()).green());
    Ok(())
}

fn cmd_doc_transform(
    target: &Path,
    recursive: bool,
    patterns: &[String],
    no_exceptions: bool,
    dry_run: bool,
    diff: bool,
    store_path: Option<PathBuf>,
) -> Result<()> {
    let rules = load_rules(no_exceptions, store_path)?;
    let patterns = (!patterns.is_empty()).then_some(patterns);

    let files = if target.is_dir() {
        if !recursive {
            bail!(
                "{} is a directory; pass --recursive to process it",
                target.display()
            );
        }
        discover_documents(target)?
    } else {
        vec![target.to_path_buf()]
    };

    if files.is_empty() {
        bail!("no documents found under {}", target.display());
    }

    for file in files {
        let mut document = Document::load(&file)?;
        let original = document.render()?;

        let mut records = document.records();
        let summary = transform_records(&mut records, patterns, &rules, &ArabicShaper)?;
        document.apply_records(&records)?;
        let modified = document.render()?;

        for failure in &summary.failures {
            eprintln!("{}", format!("✗ {}", failure.error).red());
        }
        if diff {
            display_diff(&file.display().to_string(), &original, &modified);
        }

        let status = format!(
            "{}: {} shaped, {} exempt, {} unchanged",
            file.display(),
            summary.transformed,
            summary.exempted,
            summary.unchanged
        );
        if dry_run {
            println!("{}", format!("· {status} (dry run)").dimmed());
            continue;
        }
        if modified == original {
            println!("{}", format!("· {status}").dimmed());
            continue;
        }
        document.save(&file)?;
        println!("{}", format!("✓ {status}").green());
    }

    Ok(())
}

/// All files with a known document extension under `dir`, sorted.
fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && Format::from_path(entry.path()).is_some() {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn load_document(file: &Path, format: Option<&str>) -> Result<Document> {
    match format {
        Some(name) => {
            let format =
                Format::from_name(name).with_context(|| format!("unknown format '{name}'"))?;
            Ok(Document::load_as(format, file)?)
        }
        None => Ok(Document::load(file)?),
    }
}

fn cmd_exceptions(command: ExceptionCommands, store_path: Option<PathBuf>) -> Result<()> {
    let mut store = open_store(store_path)?;

    match command {
        ExceptionCommands::List => {
            if store.rules().is_empty() {
                println!("no exception rules in {}", store.path().display());
                return Ok(());
            }
            for rule in store.rules() {
                let state = if rule.enabled {
                    "on ".green()
                } else {
                    "off".dimmed()
                };
                let mut line = format!("{:>3}  [{state}]  {}", rule.id, rule.pattern);
                if !rule.description.is_empty() {
                    line.push_str(&format!("  {}", rule.description.dimmed()));
                }
                println!("{line}");
            }
        }
        ExceptionCommands::Add {
            pattern,
            description,
        } => {
            if store.add(&pattern, &description)? {
                println!("{}", format!("✓ added '{pattern}'").green());
            } else {
                println!("{}", format!("'{pattern}' is already present").yellow());
            }
        }
        ExceptionCommands::Update {
            id,
            pattern,
            description,
        } => {
            let current = store.get(id)?.clone();
            store.update(
                id,
                pattern.as_deref().unwrap_or(&current.pattern),
                description.as_deref().unwrap_or(&current.description),
                current.enabled,
            )?;
            println!("{}", format!("✓ rule {id} updated").green());
        }
        ExceptionCommands::Delete { id } => {
            store.delete(id)?;
            println!("{}", format!("✓ rule {id} deleted").green());
        }
        ExceptionCommands::Enable { id } => {
            store.set_enabled(id, true)?;
            println!("{}", format!("✓ rule {id} enabled").green());
        }
        ExceptionCommands::Disable { id } => {
            store.set_enabled(id, false)?;
            println!("{}", format!("✓ rule {id} disabled").green());
        }
    }

    Ok(())
}

/// Show a unified diff between original and modified content.
fn display_diff(name: &str, original: &str, modified: &str) {
    println!("\n{}", format!("--- {name} (original)").dimmed());
    println!("{}", format!("+++ {name} (modified)").dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        print!("{line}");
    }
    println!();
}
