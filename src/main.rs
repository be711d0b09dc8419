use clap::{ArgGroup, Parser, Subcommand};
use is_terminal::IsTerminal;
use sprig::areas::repository::Repository;
use sprig::artifacts::core::PagerWriter;
use sprig::commands::plumbing::cat_file::CatFileMode;
use sprig::commands::porcelain::checkout::CheckoutTarget;
use sprig::config::Config;
use sprig::errors::exit_code_for;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sprig",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A miniature version control system",
    long_about = "sprig stores snapshots of a directory as content-addressed objects, \
    keeps a staging index, tracks branches and merges them with a three-way merge.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[arg(
        short = 'C',
        global = true,
        value_name = "PATH",
        help = "Run as if started in PATH"
    )]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Create an empty repository")]
    Init,
    #[command(
        name = "cat-file",
        about = "Print an object",
        long_about = "Print the payload of an object, or its kind or size."
    )]
    CatFile {
        #[arg(short = 't', conflicts_with = "size", help = "Print the object kind")]
        kind: bool,
        #[arg(short = 's', help = "Print the payload size")]
        size: bool,
        #[arg(index = 1)]
        object_id: String,
    },
    #[command(
        name = "hash-object",
        about = "Store a file as a blob and print its id"
    )]
    HashObject {
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "update-cache",
        about = "Stage files in the index",
        long_about = "Hash each file into the object store and record it in the index. \
        Use . to stage the whole working tree."
    )]
    UpdateCache {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    #[command(name = "write-tree", about = "Store the index as a tree")]
    WriteTree,
    #[command(
        name = "commit-tree",
        about = "Create a commit from a tree",
        long_about = "Create a commit for the given tree on top of HEAD and advance the \
        current branch (or HEAD itself when detached)."
    )]
    CommitTree {
        #[arg(index = 1)]
        tree_id: String,
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "rm", about = "Remove a path (or . for all) from the index")]
    Rm {
        #[arg(index = 1)]
        path: PathBuf,
    },
    #[command(name = "log", about = "Show the first-parent history of HEAD")]
    Log,
    #[command(name = "branch", about = "Create a branch and switch to it")]
    Branch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(
        name = "checkout",
        about = "Switch to a branch or a commit",
        group(ArgGroup::new("target").required(true).args(["branch", "commit"]))
    )]
    Checkout {
        #[arg(long, help = "Attach HEAD to this branch")]
        branch: Option<String>,
        #[arg(long, help = "Detach HEAD at this commit")]
        commit: Option<String>,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(
        name = "merge",
        about = "Merge a branch into the current branch"
    )]
    Merge {
        #[arg(index = 1)]
        branch: String,
        #[arg(short, long, help = "Message of the merge commit")]
        message: Option<String>,
    },
    #[command(name = "diff", about = "Show changes between two commits")]
    Diff {
        #[arg(index = 1)]
        old: String,
        #[arg(index = 2)]
        new: String,
    },
}

impl Commands {
    fn is_paged(&self) -> bool {
        matches!(self, Commands::Log | Commands::Diff { .. })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(exit_code_for(&error))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = Config::from_env()?;

    let use_pager = cli.command.is_paged()
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_PAGER").is_none();
    let pager = minus::Pager::new();
    let writer: Box<dyn std::io::Write> = if use_pager {
        Box::new(PagerWriter::new(pager.clone()))
    } else {
        Box::new(std::io::stdout())
    };

    let mut repository = match cli.command {
        Commands::Init => Repository::new(&root, writer, config)?,
        _ => Repository::open(&root, writer, config)?,
    };

    match cli.command {
        Commands::Init => repository.init()?,
        Commands::CatFile {
            kind,
            size,
            object_id,
        } => {
            let mode = match (kind, size) {
                (true, _) => CatFileMode::Kind,
                (_, true) => CatFileMode::Size,
                _ => CatFileMode::Pretty,
            };
            repository.cat_file(&object_id, mode)?
        }
        Commands::HashObject { file } => repository.hash_object(&file)?,
        Commands::UpdateCache { paths } => repository.update_cache(&paths).await?,
        Commands::WriteTree => repository.write_tree().await?,
        Commands::CommitTree { tree_id, message } => {
            repository.commit_tree(&tree_id, &message)?
        }
        Commands::Rm { path } => repository.rm(&path).await?,
        Commands::Log => repository.log()?,
        Commands::Branch { name } => repository.branch(&name)?,
        Commands::Checkout { branch, commit } => {
            let target = match (branch, commit) {
                (Some(branch), _) => CheckoutTarget::Branch(branch),
                (None, Some(commit)) => CheckoutTarget::Commit(commit),
                (None, None) => anyhow::bail!("checkout needs --branch or --commit"),
            };
            repository.checkout(&target).await?
        }
        Commands::Status => {
            repository.status().await?;
        }
        Commands::Merge { branch, message } => {
            repository.merge(&branch, message.as_deref()).await?;
        }
        Commands::Diff { old, new } => repository.diff(&old, &new)?,
    }

    if use_pager {
        minus::page_all(pager)?;
    }

    Ok(())
}
