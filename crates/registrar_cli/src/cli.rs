//! Command-line definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use registrar_core::{Backend, Collection};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "registrar")]
#[command(about = "Academic records store: students, instructors, courses and registrations")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides config and REGISTRAR_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    /// Directory of the JSON collection files
    #[arg(long, global = true, value_name = "DIR")]
    pub documents: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage students
    #[command(subcommand)]
    Student(PersonCommand),

    /// Manage instructors
    #[command(subcommand)]
    Instructor(PersonCommand),

    /// Manage courses
    #[command(subcommand)]
    Course(CourseCommand),

    /// Register a student in a course
    Register {
        student_id: String,
        course_id: String,
    },

    /// Remove a student from a course
    Drop {
        student_id: String,
        course_id: String,
    },

    /// Set the instructor of a course
    Assign {
        course_id: String,
        instructor_id: String,
    },

    /// Replace the instructor of a course
    ChangeInstructor {
        course_id: String,
        instructor_id: String,
    },

    /// Show records whose name and/or id match exactly
    Filter {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        id: String,
    },

    /// Show every record
    List,

    /// Write the record set as JSON files
    Export(TransferArgs),

    /// Append records from JSON files
    Import(TransferArgs),

    /// Write every record as one flat CSV table
    ExportTable {
        /// Output file (default: config `table_path`)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
    /// Create a record
    Add {
        id: String,
        name: String,
        #[arg(allow_hyphen_values = true)]
        age: String,
        email: String,
    },

    /// Change some fields; omitted fields keep their values
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        age: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Change the record id
    Rename { id: String, new_id: String },

    /// Delete a record
    Delete { id: String },

    /// Show one record
    Show { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommand {
    /// Create a course
    Add {
        id: String,
        name: String,
        #[arg(long)]
        instructor: Option<String>,
    },

    /// Change some fields; omitted fields keep their values
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_instructor")]
        instructor: Option<String>,
        /// Remove the instructor link
        #[arg(long)]
        clear_instructor: bool,
    },

    /// Change the course id
    Rename { id: String, new_id: String },

    /// Delete a course and its registrations
    Delete { id: String },

    /// Show one course
    Show { id: String },
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Directory of the JSON files (default: config `documents_dir`)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Restrict to one or more collections
    #[arg(long, value_enum)]
    pub collection: Vec<CollectionArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    Sqlite,
    Json,
}

impl From<BackendArg> for Backend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Sqlite => Backend::Sqlite,
            BackendArg::Json => Backend::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionArg {
    Students,
    Instructors,
    Courses,
    Registrations,
}

impl From<CollectionArg> for Collection {
    fn from(value: CollectionArg) -> Self {
        match value {
            CollectionArg::Students => Collection::Students,
            CollectionArg::Instructors => Collection::Instructors,
            CollectionArg::Courses => Collection::Courses,
            CollectionArg::Registrations => Collection::Registrations,
        }
    }
}

impl TransferArgs {
    /// Selected collections in dependency order; all of them when none is given.
    pub fn collections(&self) -> Vec<Collection> {
        if self.collection.is_empty() {
            return Collection::ALL.to_vec();
        }
        Collection::ALL
            .into_iter()
            .filter(|collection| {
                self.collection
                    .iter()
                    .any(|arg| Collection::from(*arg) == *collection)
            })
            .collect()
    }
}
