//! Command dispatch against the configured record store.

use crate::cli::{Cli, Commands, CourseCommand, PersonCommand, TransferArgs};
use crate::output;
use anyhow::{Context, Result};
use log::info;
use registrar_core::interchange::tabular::write_table_file;
use registrar_core::model::validation::parse_age;
use registrar_core::{
    init_logging, open_store, CoursePatch, DocumentDir, InstructorPatch, Person, PersonPatch,
    RecordFilter, RecordKind, RecordStore, RegistrarConfig, StoreError,
};
use std::path::{Path, PathBuf};

pub fn run(cli: Cli) -> Result<()> {
    let config = effective_config(&cli)?;
    if config.logging.dir.is_some() {
        init_logging(&config.logging).context("failed to start logging")?;
    }

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut store = open_store(&config).context("failed to open record store")?;
    info!(
        "event=cli_command module=cli status=start backend={}",
        store.backend_name()
    );
    execute(store.as_mut(), &config, cli.command)
}

/// Config file (if any), then `REGISTRAR_DB_PATH`, then command-line flags.
fn effective_config(cli: &Cli) -> Result<RegistrarConfig> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let mut config = match &cli.config {
        Some(path) => RegistrarConfig::load(&cwd.join(path))?,
        None => {
            let mut config = RegistrarConfig::default();
            config.resolve_relative_to(&cwd);
            config
        }
    };
    config.apply_env_overrides();

    if let Some(db) = &cli.db {
        config.database_path = cwd.join(db);
    }
    if let Some(backend) = cli.backend {
        config.backend = backend.into();
    }
    if let Some(dir) = &cli.documents {
        config.documents_dir = cwd.join(dir);
    }
    Ok(config)
}

fn execute(store: &mut dyn RecordStore, config: &RegistrarConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Student(command) => person_command(store, RecordKind::Student, command),
        Commands::Instructor(command) => person_command(store, RecordKind::Instructor, command),
        Commands::Course(command) => course_command(store, command),
        Commands::Register {
            student_id,
            course_id,
        } => {
            store.register_student(&student_id, &course_id)?;
            println!("Registered {student_id} in {course_id}");
            Ok(())
        }
        Commands::Drop {
            student_id,
            course_id,
        } => {
            if store.drop_student(&student_id, &course_id)? {
                println!("Dropped {student_id} from {course_id}");
            } else {
                println!("{student_id} was not registered in {course_id}");
            }
            Ok(())
        }
        Commands::Assign {
            course_id,
            instructor_id,
        } => {
            store.assign_instructor(&course_id, &instructor_id)?;
            println!("Assigned {instructor_id} to {course_id}");
            Ok(())
        }
        Commands::ChangeInstructor {
            course_id,
            instructor_id,
        } => {
            store.change_instructor(&course_id, &instructor_id)?;
            println!("Changed instructor of {course_id} to {instructor_id}");
            Ok(())
        }
        Commands::Filter { name, id } => {
            let result = store.query(&RecordFilter::new(&name, &id))?;
            print!("{}", output::format_records(&result));
            Ok(())
        }
        Commands::List => {
            let result = store.query(&RecordFilter::default())?;
            print!("{}", output::format_records(&result));
            Ok(())
        }
        Commands::Export(args) => export(store, config, &args),
        Commands::Import(args) => import(store, config, &args),
        Commands::ExportTable { output: target } => {
            let path = target
                .map(|path| resolve(&path))
                .transpose()?
                .unwrap_or_else(|| config.table_path.clone());
            let document = store.export_all()?;
            write_table_file(&path, &document).map_err(StoreError::from)?;
            println!("Wrote table to {}", path.display());
            Ok(())
        }
        Commands::Config => Ok(()),
    }
}

fn person_command(store: &mut dyn RecordStore, kind: RecordKind, command: PersonCommand) -> Result<()> {
    let is_student = kind == RecordKind::Student;
    match command {
        PersonCommand::Add {
            id,
            name,
            age,
            email,
        } => {
            let age = parse_age(&age).map_err(StoreError::from)?;
            if is_student {
                store.create_student(&id, &name, age, &email)?;
            } else {
                store.create_instructor(&id, &name, age, &email)?;
            }
            println!("Created {kind} {id}");
        }
        PersonCommand::Edit {
            id,
            name,
            age,
            email,
        } => {
            let patch = PersonPatch::from_form(
                name.as_deref().unwrap_or(""),
                age.as_deref().unwrap_or(""),
                email.as_deref().unwrap_or(""),
            )
            .map_err(StoreError::from)?;
            if is_student {
                store.edit_student(&id, &patch)?;
            } else {
                store.edit_instructor(&id, &patch)?;
            }
            println!("Updated {kind} {id}");
        }
        PersonCommand::Rename { id, new_id } => {
            if is_student {
                store.rename_student(&id, &new_id)?;
            } else {
                store.rename_instructor(&id, &new_id)?;
            }
            println!("Renamed {kind} {id} to {new_id}");
        }
        PersonCommand::Delete { id } => {
            let existed = if is_student {
                store.delete_student(&id)?
            } else {
                store.delete_instructor(&id)?
            };
            report_delete(kind, &id, existed);
        }
        PersonCommand::Show { id } => {
            let found = if is_student {
                store
                    .get_student(&id)?
                    .map(|student| (output::format_student(&student), student.introduce()))
            } else {
                store.get_instructor(&id)?.map(|instructor| {
                    (
                        output::format_instructor(&instructor),
                        instructor.introduce(),
                    )
                })
            };
            let (line, introduction) = found.ok_or(StoreError::NotFound { kind, id })?;
            println!("{line}");
            println!("{introduction}");
        }
    }
    Ok(())
}

fn course_command(store: &mut dyn RecordStore, command: CourseCommand) -> Result<()> {
    match command {
        CourseCommand::Add {
            id,
            name,
            instructor,
        } => {
            store.create_course(&id, &name, instructor.as_deref())?;
            println!("Created course {id}");
        }
        CourseCommand::Edit {
            id,
            name,
            instructor,
            clear_instructor,
        } => {
            let mut patch = CoursePatch::from_form(
                name.as_deref().unwrap_or(""),
                instructor.as_deref().unwrap_or(""),
            );
            if clear_instructor {
                patch.instructor = InstructorPatch::Clear;
            }
            store.edit_course(&id, &patch)?;
            println!("Updated course {id}");
        }
        CourseCommand::Rename { id, new_id } => {
            store.rename_course(&id, &new_id)?;
            println!("Renamed course {id} to {new_id}");
        }
        CourseCommand::Delete { id } => {
            let existed = store.delete_course(&id)?;
            report_delete(RecordKind::Course, &id, existed);
        }
        CourseCommand::Show { id } => {
            let course = store.get_course(&id)?.ok_or(StoreError::NotFound {
                kind: RecordKind::Course,
                id,
            })?;
            println!("{}", output::format_course(&course));
        }
    }
    Ok(())
}

fn export(store: &mut dyn RecordStore, config: &RegistrarConfig, args: &TransferArgs) -> Result<()> {
    let dir = transfer_dir(config, args)?;
    let collections = args.collections();
    let document = store.export_all()?;
    dir.write_collections(&document, &collections)
        .map_err(StoreError::from)?;
    for collection in &collections {
        println!(
            "Exported {} {} record(s) to {}",
            document.len(*collection),
            collection.kind(),
            dir.path(*collection).display()
        );
    }
    Ok(())
}

fn import(store: &mut dyn RecordStore, config: &RegistrarConfig, args: &TransferArgs) -> Result<()> {
    let dir = transfer_dir(config, args)?;
    let document = dir
        .read_collections(&args.collections())
        .map_err(StoreError::from)?;
    let report = store.import_all(&document)?;
    print!("{}", output::format_import_report(&report));
    Ok(())
}

fn transfer_dir(config: &RegistrarConfig, args: &TransferArgs) -> Result<DocumentDir> {
    let root = match &args.dir {
        Some(dir) => resolve(dir)?,
        None => config.documents_dir.clone(),
    };
    Ok(DocumentDir::new(root))
}

fn resolve(path: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}

fn report_delete(kind: RecordKind, id: &str, existed: bool) {
    if existed {
        println!("Deleted {kind} {id}");
    } else {
        println!("No {kind} with id {id}; nothing deleted");
    }
}
