#![allow(dead_code)]

use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::commands::plumbing::cat_file::CatFileMode;
use crate::commands::porcelain::reset::ResetMode;
use clap::{Parser, Subcommand};

mod areas;
mod artifacts;
mod commands;
mod errors;

#[derive(Parser)]
#[command(
    name = "rit",
    version = "0.1.0",
    about = "A minimal, Git-compatible version control core",
    long_about = "A minimal reimplementation of Git's plumbing: loose objects, \
    the binary index, trees and commits, and the read/write paths connecting \
    a working tree to committed history. Repositories it writes are readable \
    by Git and vice versa."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Initialize a repository")]
    Init {
        #[arg(index = 1, help = "Path to the repository root")]
        path: Option<String>,
    },
    #[command(name = "hash-object", about = "Hash a file, optionally storing it")]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(
            short = 't',
            long = "type",
            default_value = "blob",
            value_parser = ["blob", "tree", "commit"],
            help = "Object type to hash as"
        )]
        object_type: String,
        #[arg(index = 1, help = "File to hash")]
        file: String,
    },
    #[command(name = "cat-file", about = "Inspect an object")]
    CatFile {
        #[arg(short = 'p', help = "Pretty-print the object", conflicts_with_all = ["type_only", "size_only"])]
        pretty: bool,
        #[arg(short = 't', help = "Print the object type", conflicts_with = "size_only")]
        type_only: bool,
        #[arg(short = 's', help = "Print the payload size")]
        size_only: bool,
        #[arg(index = 1, help = "Object id, prefix, or revision")]
        object: String,
    },
    #[command(about = "Stage files or directories")]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(name = "ls-files", about = "List index entries")]
    LsFiles {
        #[arg(short, long, help = "Show mode and object id")]
        stage: bool,
    },
    #[command(about = "Show the working tree status")]
    Status,
    #[command(about = "Show unstaged changes")]
    Diff,
    #[command(name = "write-tree", about = "Write the index as a tree object")]
    WriteTree,
    #[command(about = "Record the staged tree as a commit")]
    Commit {
        #[arg(short, long, help = "Commit message")]
        message: Option<String>,
        #[arg(long, help = "Replace the tip commit instead of appending")]
        amend: bool,
    },
    #[command(about = "Show commit history")]
    Log {
        #[arg(long, help = "One commit per line")]
        oneline: bool,
        #[arg(short = 'n', long = "max-count", default_value_t = 10)]
        max_count: usize,
    },
    #[command(name = "rev-parse", about = "Resolve a revision to a commit id")]
    RevParse {
        #[arg(index = 1, help = "Revision (HEAD, branch, full or short id)")]
        revision: String,
    },
    #[command(about = "List or create branches")]
    Branch {
        #[arg(index = 1, help = "Branch name to create")]
        name: Option<String>,
    },
    #[command(about = "Switch branches or detach HEAD at a commit")]
    Checkout {
        #[arg(index = 1, help = "Branch name or revision")]
        target: String,
    },
    #[command(about = "Remove tracked files from the index and working tree")]
    Rm {
        #[arg(index = 1, required = true, help = "Tracked files or directories")]
        paths: Vec<String>,
    },
    #[command(about = "Reset index entries from HEAD")]
    Restore {
        #[arg(long, help = "Restore the staged copy only")]
        staged: bool,
        #[arg(index = 1, required = true, help = "Paths to restore")]
        paths: Vec<String>,
    },
    #[command(about = "Move HEAD to another commit")]
    Reset {
        #[arg(long, help = "Move HEAD only", conflicts_with = "mixed")]
        soft: bool,
        #[arg(long, help = "Move HEAD and rebuild the index (default)")]
        mixed: bool,
        #[arg(index = 1, help = "Target revision")]
        revision: String,
    },
    #[command(about = "Manage remotes")]
    Remote {
        #[command(subcommand)]
        command: Option<RemoteCommands>,
    },
    #[command(about = "Push a branch to a remote")]
    Push {
        #[arg(index = 1, help = "Remote name (default: origin)")]
        remote: Option<String>,
        #[arg(index = 2, help = "Branch name (default: current branch)")]
        branch: Option<String>,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    #[command(about = "List remotes")]
    List {
        #[arg(short, long, help = "Show remote URLs")]
        verbose: bool,
    },
    #[command(about = "Add a remote")]
    Add {
        #[arg(index = 1)]
        name: String,
        #[arg(index = 2)]
        url: String,
    },
    #[command(name = "get-url", about = "Print a remote's URL")]
    GetUrl {
        #[arg(index = 1)]
        name: String,
    },
    #[command(about = "Remove a remote")]
    Remove {
        #[arg(index = 1)]
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let stdout = || Box::new(std::io::stdout()) as Box<dyn std::io::Write>;

    if let Commands::Init { path } = &cli.command {
        let target = match path {
            Some(path) => std::path::PathBuf::from(path),
            None => std::env::current_dir()?,
        };
        std::fs::create_dir_all(&target)?;
        let repository = Repository::open(target, stdout())?;
        return repository.init();
    }

    let cwd = std::env::current_dir()?;
    let mut repository = Repository::discover(&cwd, stdout())?;

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),
        Commands::HashObject {
            write,
            object_type,
            file,
        } => repository.hash_object(&file, ObjectType::try_parse(&object_type)?, write),
        Commands::CatFile {
            pretty,
            type_only,
            size_only,
            object,
        } => {
            let mode = if type_only {
                CatFileMode::TypeOnly
            } else if size_only {
                CatFileMode::SizeOnly
            } else if pretty {
                CatFileMode::Pretty
            } else {
                return Err(anyhow::anyhow!("one of -p, -t or -s is required"));
            };
            repository.cat_file(mode, &object)
        }
        Commands::Add { paths } => repository.add(&paths),
        Commands::LsFiles { stage } => repository.ls_files(stage),
        Commands::Status => repository.status(),
        Commands::Diff => repository.diff(),
        Commands::WriteTree => repository.write_tree(),
        Commands::Commit { message, amend } => repository.commit(message, amend),
        Commands::Log { oneline, max_count } => repository.log(oneline, max_count),
        Commands::RevParse { revision } => repository.rev_parse(&revision),
        Commands::Branch { name } => repository.branch(name.as_deref()),
        Commands::Checkout { target } => repository.checkout(&target),
        Commands::Rm { paths } => repository.rm(&paths),
        Commands::Restore { staged, paths } => {
            if !staged {
                return Err(anyhow::anyhow!("only '--staged' restore is implemented"));
            }
            repository.restore_staged(&paths)
        }
        Commands::Reset {
            soft,
            mixed: _,
            revision,
        } => {
            let mode = if soft { ResetMode::Soft } else { ResetMode::Mixed };
            repository.reset(mode, &revision)
        }
        Commands::Remote { command } => match command.unwrap_or(RemoteCommands::List {
            verbose: false,
        }) {
            RemoteCommands::List { verbose } => repository.remote_list(verbose),
            RemoteCommands::Add { name, url } => repository.remote_add(&name, &url),
            RemoteCommands::GetUrl { name } => repository.remote_get_url(&name),
            RemoteCommands::Remove { name } => repository.remote_remove(&name),
        },
        Commands::Push { remote, branch } => {
            repository.push(remote.as_deref(), branch.as_deref())
        }
    }
}
