use crate::config::Backend;
use crate::export::ExportFormat;
use clap::{ArgGroup, Parser, Subcommand};

/// Command-line interface definition for rAttendance
/// Session attendance tracking for educational programs
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track per-session attendance, signatures and gifts of program participants",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the directory of the JSON cache files
    #[arg(global = true, long = "cache-dir")]
    pub cache_dir: Option<String>,

    /// Override the storage backend
    #[arg(global = true, long = "backend", value_enum)]
    pub backend: Option<Backend>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init {
        #[arg(long, help = "Load the demo programs, participants and records into an empty database")]
        seed: bool,
    },

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, info)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database and attendance integrity")]
        check: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a backup copy of the data files
    Backup {
        #[arg(long, value_name = "FILE", help = "Absolute path of the backup file")]
        file: String,

        #[arg(long)]
        compress: bool,
    },

    /// Manage programs
    Program {
        #[command(subcommand)]
        action: ProgramCmd,
    },

    /// Manage participants
    Participant {
        #[command(subcommand)]
        action: ParticipantCmd,
    },

    /// List or delete attendance records
    Attendance {
        #[command(subcommand)]
        action: AttendanceCmd,
    },

    /// Sign one or more sessions for a participant
    #[command(group(ArgGroup::new("which").required(true).args(["session", "all"])))]
    #[command(group(ArgGroup::new("sig").required(true).args(["signature", "signature_file"])))]
    Attend {
        #[arg(long, help = "Program id")]
        program: i64,

        #[arg(long, help = "Participant id")]
        participant: i64,

        #[arg(long = "session", value_name = "N", help = "Session number (repeat for several sessions)")]
        session: Vec<i64>,

        #[arg(long, help = "Sign every session not attended yet")]
        all: bool,

        #[arg(long, help = "Signature payload")]
        signature: Option<String>,

        #[arg(long = "signature-file", value_name = "FILE", help = "Read the signature payload from a file")]
        signature_file: Option<String>,
    },

    /// Attendance status of a participant, a program or all programs
    Status {
        #[arg(long)]
        program: Option<i64>,

        #[arg(long)]
        participant: Option<i64>,
    },

    /// Track souvenir/gift distribution
    Gift {
        #[command(subcommand)]
        action: GiftCmd,
    },

    /// Attendance report with completion statistics
    Report {
        #[arg(long)]
        program: Option<i64>,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Export attendance tables
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, help = "Export a single program (default: all programs)")]
        program: Option<i64>,

        #[arg(long, value_name = "FILE", help = "Absolute output path (default: export_dir)")]
        file: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ProgramCmd {
    /// List all programs
    List,

    /// Show a program with its statistics
    Show { id: i64 },

    /// Create a program
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, help = "Number of sessions (>= 1)")]
        sessions: u32,

        #[arg(long, help = "Start date (YYYY-MM-DD)")]
        start: String,

        #[arg(long, help = "End date (YYYY-MM-DD)")]
        end: String,
    },

    /// Change fields of a program
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        sessions: Option<u32>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ParticipantCmd {
    /// List participants (sorted by name when filtered by program)
    List {
        #[arg(long)]
        program: Option<i64>,
    },

    /// Show a participant with their attended and missed sessions
    Show { id: i64 },

    /// Enrol a participant in a program
    Add {
        #[arg(long)]
        program: i64,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        position: Option<String>,
    },

    /// Change fields of a participant
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        position: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AttendanceCmd {
    /// List attendance records
    List {
        #[arg(long)]
        program: Option<i64>,

        #[arg(long)]
        participant: Option<i64>,

        #[arg(long)]
        session: Option<u32>,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter by year/month/day of signature or a custom START:END range"
        )]
        range: Option<String>,
    },

    /// Delete an attendance record by id
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum GiftCmd {
    /// Set the gift flag of a participant
    #[command(group(ArgGroup::new("state").required(true).args(["received", "not_received", "toggle"])))]
    Set {
        participant: i64,

        #[arg(long)]
        received: bool,

        #[arg(long = "not-received")]
        not_received: bool,

        #[arg(long)]
        toggle: bool,
    },

    /// List participants with their gift flag
    List {
        #[arg(long)]
        program: Option<i64>,

        #[arg(long, help = "Only participants whose flag is true or false")]
        received: Option<bool>,
    },
}
