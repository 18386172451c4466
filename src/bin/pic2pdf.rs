//! pic2pdf CLI tool
//!
//! A command-line front end for collecting images and turning them into a PDF.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use glob::glob;

use pic2pdf::init_logger;
use pic2pdf::pdf::extract_metadata;
use pic2pdf::session::{AcceptSuggested, SaveDialog, Session, Status};
use pic2pdf::shell::{parse_command, Command, HELP};

/// pic2pdf - Put images into a PDF, one per page
#[derive(Parser)]
#[command(name = "pic2pdf")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Build scans.pdf on the desktop from all PNGs, in name order
    pic2pdf build -o scans \"*.png\"

    # Build into a specific directory and open the result
    pic2pdf build -o report --dir out --open cover.jpg page-*.png

    # Collect images interactively (drag files into the terminal)
    pic2pdf session")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble images into a PDF in one step
    Build {
        /// Input images (in order). Supports glob patterns like "*.png"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file name (".pdf" is added when missing)
        #[arg(short, long)]
        output: String,

        /// Directory for the output file [default: desktop]
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Collect images interactively, then generate one or more PDFs
    Session {
        /// Directory suggested for output files [default: desktop]
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Show information about a generated PDF
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Build { inputs, output, dir, open } => cmd_build(inputs, output, dir, open),
        Commands::Session { dir } => cmd_session(dir),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
///
/// Matches of one pattern come out sorted; the patterns themselves keep
/// their command-line order.
fn expand_globs(patterns: Vec<String>) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            let entries = glob(&pattern)
                .map_err(pic2pdf::Error::from)
                .with_context(|| format!("Cannot expand '{}'", pattern))?;
            for entry in entries {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => eprintln!("Warning: glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                return Err(pic2pdf::Error::NoFilesMatched(pattern).into());
            }
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Assemble images into a PDF without prompting
fn cmd_build(
    inputs: Vec<String>,
    output: String,
    dir: Option<PathBuf>,
    open: bool,
) -> anyhow::Result<()> {
    let inputs = expand_globs(inputs)?;

    // Missing files are only an error once the collection has accepted
    // them; assembly reports those as "File not found"
    let mut session = Session::new(dir.unwrap_or_else(Session::default_output_dir));

    let submitted = inputs.len();
    let status = session.drop_files(inputs);
    let skipped = submitted - session.collection().len();
    eprintln!("{}", status);
    if skipped > 0 {
        eprintln!("Skipped {} unsupported or duplicate file(s)", skipped);
    }

    match session.generate(&output, &mut AcceptSuggested) {
        Some(Status::Generated(report)) => {
            eprintln!("{}", Status::Generated(report.clone()));
            if open {
                open_file(&report.output_path)?;
            }
            Ok(())
        }
        Some(Status::Failed(err)) => Err(err).context("Failed to generate PDF"),
        Some(other) => bail!("Unexpected status: {}", other),
        None => bail!("Output path was not accepted"),
    }
}

/// Save dialog that asks on the terminal
///
/// Enter accepts the suggestion, a typed path replaces it, and `-` or end
/// of input cancels.
struct PromptDialog<'a, R> {
    input: &'a mut R,
}

impl<R: BufRead> SaveDialog for PromptDialog<'_, R> {
    fn choose_destination(&mut self, suggested: &Path) -> Option<PathBuf> {
        print!("Save PDF as [{}] (- to cancel): ", suggested.display());
        io::stdout().flush().ok()?;

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => match answer.trim() {
                "" => Some(suggested.to_path_buf()),
                "-" => None,
                typed => Some(PathBuf::from(typed)),
            },
        }
    }
}

/// Interactive session: add, list, clear, generate
fn cmd_session(dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut session = Session::new(dir.unwrap_or_else(Session::default_output_dir));
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("Drop images here (type 'help' for commands)");
    println!("Suggested output directory: {}", session.output_dir().display());

    loop {
        print!("pic2pdf> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            println!();
            break;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Add(paths) => println!("{}", session.drop_files(paths)),
            Command::List => {
                if session.collection().is_empty() {
                    println!("No images yet");
                }
                for (i, path) in session.collection().paths().iter().enumerate() {
                    println!("{:>3}. {}", i + 1, path.display());
                }
            }
            Command::Clear => println!("{}", session.clear()),
            Command::Generate(name) => {
                let mut dialog = PromptDialog { input: &mut input };
                if let Some(status) = session.generate(&name, &mut dialog) {
                    println!("{}", status);
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Empty => {}
        }
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let metadata = extract_metadata(&input)
        .with_context(|| format!("Cannot read {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(producer) = metadata.producer {
        println!("Producer: {}", producer);
    }
    for image in &metadata.images {
        println!(
            "  page {:>3}: image {:.1} x {:.1} mm",
            image.page_number,
            image.width.mm(),
            image.height.mm()
        );
    }

    Ok(())
}
