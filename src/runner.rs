//! Runner for CLI subcommands
//!
//! Resolves passwords, opens the key database and drives the library
//! operations, printing results for a human reader.

use crate::cert_ops::reader;
use crate::cli::{DatabaseArgs, ExportArgs, ImportArgs, LabelsArgs};
use crate::config::Settings;
use crate::export::{ExportRequest, KeyPairExporter};
use crate::keyring::KeyDatabase;
use crate::utils::Password;
use console::style;

/// Return `password` if given, otherwise prompt on a terminal.
fn resolve_password(password: Option<&str>, prompt: &str, flag: &str) -> anyhow::Result<Password> {
    if let Some(pwd) = password {
        return Ok(Password::from(pwd));
    }

    if console::Term::stderr().is_term() {
        let pwd = dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(Password::from(pwd))
    } else {
        anyhow::bail!("{} requires a password (use {})", prompt, flag);
    }
}

fn open_database(db: &DatabaseArgs) -> anyhow::Result<KeyDatabase> {
    let password = resolve_password(
        db.database_password.as_deref(),
        &format!("Password for {}", db.database.display()),
        "--database-password",
    )?;
    Ok(KeyDatabase::open(&db.database, password.as_str())?)
}

/// Export a key pair and convert it to PEM
pub fn run_export(args: &ExportArgs, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(dir) = &args.output_dir {
        settings.export.output_dir = dir.clone();
    }
    if let Some(name) = &args.key_out {
        settings.export.key_pem_name = name.clone();
    }
    if args.rollback {
        settings.export.rollback_on_failure = true;
    }
    settings.export.validate()?;

    // Reject bad names before asking for any password
    let exporter = KeyPairExporter::new(settings.export);
    let mut request = ExportRequest::new(
        args.cert_name.as_str(),
        args.key_name.as_str(),
        Password::default(),
        args.label.as_str(),
    );
    exporter.plan(&request)?;

    let mut database = open_database(&args.db)?;
    request.key_password = resolve_password(
        args.key_password.as_deref(),
        "Password for the exported key container",
        "--key-password",
    )?;

    let artifacts = exporter.export(&mut database, &request)?;

    println!(
        "{} Exported {} from {}",
        style("✓").green().bold(),
        style(&request.label).bold(),
        args.db.database.display()
    );
    for path in artifacts.paths() {
        println!("  {}", path.display());
    }

    if let Ok(summary) = reader::summarize_certificate_file(&artifacts.certificate_der) {
        println!();
        println!("  {:<12} {}", style("Subject").dim(), summary.subject);
        println!("  {:<12} {}", style("Issuer").dim(), summary.issuer);
        println!("  {:<12} {}", style("Serial").dim(), summary.serial);
        println!("  {:<12} {}", style("SHA-256").dim(), summary.fingerprint);
    }

    println!();
    println!(
        "{} {} contains an UNENCRYPTED private key. Restrict access to it and delete it when no longer needed.",
        style("Warning:").yellow().bold(),
        artifacts.private_key_pem.display()
    );

    Ok(())
}

/// Import a PKCS#12 file into a key database
pub fn run_import(args: &ImportArgs) -> anyhow::Result<()> {
    let p12_password = resolve_password(
        args.p12_password.as_deref(),
        &format!("Password for {}", args.p12.display()),
        "--p12-password",
    )?;

    let (mut database, db_password) = if args.create {
        let password = resolve_password(
            args.db.database_password.as_deref(),
            &format!("Password for new {}", args.db.database.display()),
            "--database-password",
        )?;
        (KeyDatabase::create(), password)
    } else {
        let password = resolve_password(
            args.db.database_password.as_deref(),
            &format!("Password for {}", args.db.database.display()),
            "--database-password",
        )?;
        let database = KeyDatabase::open(&args.db.database, password.as_str())?;
        (database, password)
    };

    database.import_key(&args.p12, p12_password.as_str(), &args.label)?;

    if args.create {
        database.save(&args.db.database, db_password.as_str())?;
    } else {
        database.save_in_place(db_password.as_str())?;
    }

    println!(
        "{} Imported {} as {} into {}",
        style("✓").green().bold(),
        args.p12.display(),
        style(&args.label).bold(),
        args.db.database.display()
    );
    Ok(())
}

/// List the labels of a key database
pub fn run_labels(args: &LabelsArgs) -> anyhow::Result<()> {
    let database = open_database(&args.db)?;
    let labels = database.labels();

    if labels.is_empty() {
        println!("{}", style("No records").dim());
        return Ok(());
    }

    for label in labels {
        let kind = if database.has_private_key(&label) {
            style("key pair").green()
        } else {
            style("certificate").cyan()
        };
        println!("{}  {}", label, kind);
    }
    Ok(())
}
