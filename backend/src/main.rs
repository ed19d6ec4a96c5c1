//! EduRegister CLI - Manage student registration records
//!
//! # Commands
//!
//! ```bash
//! eduregister serve                    # Start HTTP server (port 3000)
//! eduregister add student.json         # Register a student from a JSON form
//! eduregister add edit.json --edit S1  # Update an existing student
//! eduregister list -q cs101            # Search records
//! eduregister show S1                  # Show one record
//! eduregister delete S1                # Delete one record
//! eduregister clear --yes              # Delete every record
//! eduregister export -o out.csv        # Export all records to CSV
//! eduregister count                    # Number of records
//! ```

use clap::{Parser, Subcommand};
use eduregister::{
    config, Config, CsvQuoting, Registrar, RegistrarError, StudentForm, StudentRecord,
};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eduregister")]
#[command(about = "Register, search and export student records", long_about = None)]
struct Cli {
    /// Data directory (overrides EDUREGISTER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides EDUREGISTER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    #[command(flatten)]
    Records(RecordCommand),
}

/// One-shot commands against the local store.
#[derive(Subcommand)]
enum RecordCommand {
    /// Register a student, or update one with --edit
    Add {
        /// JSON form file ("-" for stdin)
        input: PathBuf,

        /// Id of the record to update
        #[arg(long)]
        edit: Option<String>,
    },

    /// List records, optionally filtered
    List {
        /// Search text (name, email, roll number, course, phone)
        #[arg(short, long, default_value = "")]
        query: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one record
    Show {
        /// Record id
        id: String,
    },

    /// Print a record as an editable JSON form
    EditForm {
        /// Record id
        id: String,
    },

    /// Delete one record
    Delete {
        /// Record id
        id: String,
    },

    /// Delete every record
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },

    /// Export all records to CSV
    Export {
        /// Output file (default: students_<date>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Quote every field instead of only the address
        #[arg(long)]
        uniform: bool,
    },

    /// Print the number of records
    Count,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config::log_filter()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let result = run(cli.command, config).await;

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, mut config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            eduregister::server::start_server(config).await?;
            Ok(())
        }
        Commands::Records(command) => {
            let mut registrar =
                Registrar::new(config.open_store()).with_options(config.options.clone());
            run_records(command, &mut registrar)
        }
    }
}

fn run_records(
    command: RecordCommand,
    registrar: &mut Registrar,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        RecordCommand::Add { input, edit } => cmd_add(registrar, &input, edit.as_deref()),

        RecordCommand::List { query, json } => {
            let students = registrar.list(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&students)?);
            } else {
                print_table(&students, registrar.count()?, &query);
            }
            Ok(())
        }

        RecordCommand::Show { id } => {
            let student = registrar.get(&id)?;
            print_detail(&student);
            Ok(())
        }

        RecordCommand::EditForm { id } => {
            let form = registrar.edit_form(&id)?;
            println!("{}", serde_json::to_string_pretty(&form)?);
            Ok(())
        }

        RecordCommand::Delete { id } => {
            registrar.delete(&id)?;
            eprintln!("🗑️  Deleted: {}", id);
            Ok(())
        }

        RecordCommand::Clear { yes } => {
            let count = registrar.count()?;
            if count > 0 && !yes {
                return Err(format!(
                    "refusing to delete ALL {} student record(s) without --yes",
                    count
                )
                .into());
            }
            let cleared = registrar.clear()?;
            eprintln!("🧹 Cleared {} record(s)", cleared);
            Ok(())
        }

        RecordCommand::Export { output, uniform } => {
            let quoting = if uniform { CsvQuoting::Uniform } else { CsvQuoting::Compatible };
            match registrar.export(quoting)? {
                Some(export) => {
                    let path = output.unwrap_or_else(|| PathBuf::from(&export.file_name));
                    fs::write(&path, &export.content)?;
                    eprintln!("💾 Exported {} record(s) to: {}", export.count, path.display());
                }
                None => eprintln!("📋 No data to export."),
            }
            Ok(())
        }

        RecordCommand::Count => {
            println!("{}", registrar.count()?);
            Ok(())
        }
    }
}

fn cmd_add(
    registrar: &mut Registrar,
    input: &Path,
    edit: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(input)?
    };
    let form: StudentForm = serde_json::from_str(&content)?;

    match registrar.submit(form, edit) {
        Ok(saved) => {
            eprintln!("✅ Saved {} ({:?})", saved.record.id, saved.kind);
            println!("{}", serde_json::to_string_pretty(&saved.record)?);
            Ok(())
        }
        Err(RegistrarError::Rejected(rejection)) => {
            for err in rejection.field_errors() {
                eprintln!("   - {}: ⚠ {}", err.field, err.message);
            }
            Err(rejection.summary().into())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_table(students: &[StudentRecord], total: usize, query: &str) {
    if students.is_empty() {
        if total == 0 {
            eprintln!("📋 No students registered yet.");
        } else {
            eprintln!("📋 No students match your search.");
        }
        return;
    }

    println!(
        "{:>3}  {:<24} {:<10} {:<28} {:<12} {:<14} {:<10} {:<8} {}",
        "#", "Name", "Roll No", "Email", "Phone", "Course", "Year", "Gender", "Registered"
    );
    for (i, s) in students.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:<10} {:<28} {:<12} {:<14} {:<10} {:<8} {}",
            i + 1,
            s.full_name(),
            s.roll_no,
            s.email,
            s.phone,
            s.course,
            s.year,
            s.gender,
            s.registered_on.format("%d %b %Y"),
        );
    }
    if query.trim().is_empty() {
        eprintln!("\n{} record(s)", students.len());
    } else {
        eprintln!("\n{} of {} record(s) match '{}'", students.len(), total, query.trim());
    }
}

fn print_detail(s: &StudentRecord) {
    fn or_dash(v: &str) -> &str {
        if v.is_empty() {
            "-"
        } else {
            v
        }
    }

    println!("📄 {} ({})\n", s.full_name(), s.id);
    println!("Roll Number:     {}", s.roll_no);
    println!("Email:           {}", s.email);
    println!("Phone:           {}", s.phone);
    println!("Date of Birth:   {}", s.dob);
    println!("Gender:          {}", s.gender);
    println!("Course:          {}", s.course);
    println!("Year / Semester: {}", s.year);
    println!("Admission Date:  {}", or_dash(&s.admission_date));
    println!("Guardian Name:   {}", or_dash(&s.guardian_name));
    println!("Guardian Phone:  {}", or_dash(&s.guardian_phone));
    println!("Address:         {}", or_dash(&s.address));
    println!("Registered On:   {}", s.registered_on.format("%d %b %Y, %H:%M UTC"));
    if let Some(updated) = s.updated_on {
        println!("Last Updated:    {}", updated.format("%d %b %Y, %H:%M UTC"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_and_record_commands_parse_apart() {
        let cli = Cli::try_parse_from(["eduregister", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080) }));

        let cli = Cli::try_parse_from(["eduregister", "list", "-q", "cs1", "--json"]).unwrap();
        let Commands::Records(RecordCommand::List { query, json }) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(query, "cs1");
        assert!(json);

        let cli = Cli::try_parse_from(["eduregister", "count"]).unwrap();
        assert!(matches!(cli.command, Commands::Records(RecordCommand::Count)));
    }
}
