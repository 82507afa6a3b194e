//! Narrator CLI - Command-line interface for multi-speaker story narration
//!
//! This binary parses scripts, manages the cast and voice library, and
//! renders narrated stories to WAV through an external synthesizer.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use narrator_cli::commands;
use narrator_cli::commands::cast::CastOptions;
use narrator_cli::commands::generate::GenerateOptions;
use narrator_cli::config::{resolve_library_dir, SynthArgs};

/// Narrator - multi-speaker story narration
#[derive(Parser)]
#[command(name = "narrator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Voice library directory (default: $NARRATOR_HOME, then the platform data dir)
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a script and list its lines and speakers
    Parse {
        /// Path to the script file
        script: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Register a script's speakers and edit their voice settings
    Cast {
        /// Path to the script file
        script: String,

        /// Cast file (default: <script stem>.cast.json next to the script)
        #[arg(long)]
        cast: Option<String>,

        /// Pick random catalog voices for newly registered speakers
        #[arg(long)]
        randomize: bool,

        /// Seed for --randomize
        #[arg(long)]
        seed: Option<u32>,

        /// Edit a setting: NAME=FIELD:VALUE (field: voice, pitch, speed, volume, emotion)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Apply a preset: NAME=PRESET_ID
        #[arg(long = "preset")]
        presets: Vec<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Synthesize every line and write the story as WAV
    Generate {
        /// Path to the script file
        script: String,

        /// Cast file (default: <script stem>.cast.json next to the script)
        #[arg(long)]
        cast: Option<String>,

        /// Output file (default: Story_<date>.wav in --out-dir)
        #[arg(short, long)]
        out: Option<String>,

        /// Directory for the dated output file (default: current directory)
        #[arg(long)]
        out_dir: Option<String>,

        /// Background track (WAV or raw PCM) looped under the speech
        #[arg(long)]
        background: Option<String>,

        /// Background gain
        #[arg(long)]
        background_level: Option<f32>,

        /// Pick random catalog voices for speakers not yet in the cast
        #[arg(long)]
        randomize: bool,

        /// Seed for --randomize
        #[arg(long)]
        seed: Option<u32>,

        #[command(flatten)]
        synth: SynthArgs,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Synthesize a short introduction in one speaker's voice
    Preview {
        /// Path to the script file
        script: String,

        /// Speaker to preview
        speaker: String,

        /// Cast file (default: <script stem>.cast.json next to the script)
        #[arg(long)]
        cast: Option<String>,

        /// Output file (default: Preview_<speaker>.wav)
        #[arg(short, long)]
        out: Option<String>,

        #[command(flatten)]
        synth: SynthArgs,
    },

    /// Manage voice presets
    Presets {
        #[command(subcommand)]
        command: PresetCommands,
    },

    /// Manage cloned voices
    Clones {
        #[command(subcommand)]
        command: CloneCommands,
    },

    /// Show the format and PCM hash of a WAV file
    Inspect {
        /// Path to the WAV file
        file: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check the synthesizer, library and permissions
    Doctor {
        #[command(flatten)]
        synth: SynthArgs,
    },
}

#[derive(Subcommand)]
enum PresetCommands {
    /// List saved presets
    List {
        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Save a speaker's current settings as a preset
    Save {
        /// Preset name
        name: String,

        /// Script whose cast holds the speaker
        #[arg(long)]
        script: String,

        /// Speaker to copy settings from
        #[arg(long)]
        speaker: String,

        /// Cast file (default: <script stem>.cast.json next to the script)
        #[arg(long)]
        cast: Option<String>,
    },

    /// Remove a preset
    Remove {
        /// Preset id
        id: String,
    },
}

#[derive(Subcommand)]
enum CloneCommands {
    /// List cloned voices
    List {
        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Register a cloned voice
    Add {
        /// Display name
        name: String,

        /// Catalog voice that speaks for the clone (default: Fenrir)
        #[arg(long)]
        base: Option<String>,
    },

    /// Remove a cloned voice
    Remove {
        /// Clone id
        id: String,
    },

    /// Rename a cloned voice
    Rename {
        /// Clone id
        id: String,

        /// New display name
        name: String,
    },

    /// Toggle the favorite flag of a cloned voice
    Favorite {
        /// Clone id
        id: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let library_flag = cli.library.as_deref();
    let library_dir = || {
        resolve_library_dir(library_flag).map(|(dir, source)| {
            tracing::debug!(dir = %dir.display(), %source, "library directory");
            dir
        })
    };

    let result = match cli.command {
        Commands::Parse { script, json } => commands::parse::run(&script, json),
        Commands::Cast {
            script,
            cast,
            randomize,
            seed,
            set,
            presets,
            json,
        } => library_dir().and_then(|dir| {
            commands::cast::run(
                &script,
                &dir,
                &CastOptions {
                    cast,
                    randomize,
                    seed,
                    set,
                    presets,
                    json,
                },
            )
        }),
        Commands::Generate {
            script,
            cast,
            out,
            out_dir,
            background,
            background_level,
            randomize,
            seed,
            synth,
            json,
        } => library_dir().and_then(|dir| {
            commands::generate::run(
                &script,
                &dir,
                &GenerateOptions {
                    cast,
                    out,
                    out_dir,
                    background,
                    background_level,
                    randomize,
                    seed,
                    synth,
                    json,
                },
            )
        }),
        Commands::Preview {
            script,
            speaker,
            cast,
            out,
            synth,
        } => library_dir().and_then(|dir| {
            commands::preview::run(
                &script,
                &speaker,
                cast.as_deref(),
                out.as_deref(),
                &dir,
                &synth,
            )
        }),
        Commands::Presets { command } => library_dir().and_then(|dir| match command {
            PresetCommands::List { json } => commands::presets::list(&dir, json),
            PresetCommands::Save {
                name,
                script,
                speaker,
                cast,
            } => commands::presets::save(&dir, &name, &script, &speaker, cast.as_deref()),
            PresetCommands::Remove { id } => commands::presets::remove(&dir, &id),
        }),
        Commands::Clones { command } => library_dir().and_then(|dir| match command {
            CloneCommands::List { json } => commands::clones::list(&dir, json),
            CloneCommands::Add { name, base } => {
                commands::clones::add(&dir, &name, base.as_deref())
            }
            CloneCommands::Remove { id } => commands::clones::remove(&dir, &id),
            CloneCommands::Rename { id, name } => commands::clones::rename(&dir, &id, &name),
            CloneCommands::Favorite { id } => commands::clones::favorite(&dir, &id),
        }),
        Commands::Inspect { file, json } => commands::inspect::run(&file, json),
        Commands::Doctor { synth } => commands::doctor::run(library_flag, &synth.synthesizer()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
