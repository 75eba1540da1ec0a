use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use docfill_core::{DocfillConfig, Services, SessionManager, SessionStatus};
use docfill_document::ValueMap;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let template = || {
        Arg::new("template")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Path to a .docx template")
    };
    let out = || {
        Arg::new("out")
            .long("out")
            .short('o')
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Where to write the filled document")
    };

    Command::new("docfill")
        .version(docfill_core::VERSION)
        .about("Fill .docx legal templates through a guided conversation")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("More logging (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("inspect")
                .about("List the fields detected in a template")
                .arg(template())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("fill")
                .about("Answer questions on stdin, then write the document on confirm")
                .arg(template())
                .arg(out()),
        )
        .subcommand(
            Command::new("render")
                .about("Render a JSON object of tag values into a template")
                .arg(template())
                .arg(
                    Arg::new("values")
                        .long("values")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON object mapping tag names to values"),
                )
                .arg(out()),
        )
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<DocfillConfig> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => DocfillConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DocfillConfig::default(),
    };
    Ok(config.apply_env_overrides())
}

fn read_template(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading template {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("inspect", args)) => inspect(&config, args).await,
        Some(("fill", args)) => fill(config, args).await,
        Some(("render", args)) => render(&config, args),
        _ => Ok(()),
    }
}

async fn inspect(config: &DocfillConfig, args: &ArgMatches) -> Result<()> {
    let path = required_path(args, "template")?;
    let services = Services::from_config(config);
    let parsed = services
        .parser
        .parse(&read_template(path)?)
        .with_context(|| format!("parsing {}", path.display()))?;
    let fields = services
        .detector
        .detect_fields(parsed.fields.clone(), &parsed.text, Some(parsed.metadata.document_type))
        .await;

    if args.get_flag("json") {
        let report = serde_json::json!({
            "metadata": parsed.metadata,
            "fields": fields,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Document type: {}", parsed.metadata.document_type);
    println!("Words: {}", parsed.metadata.word_count);
    println!("Fingerprint: {}", parsed.metadata.fingerprint.short());
    println!();
    println!("Fields ({}):", fields.len());
    for field in &fields {
        println!(
            "  {:>3}. {} [{}{}]",
            field.order + 1,
            field.placeholder,
            field.field_type,
            if field.required { "" } else { ", optional" }
        );
        if let Some(description) = &field.description {
            println!("       {description}");
        }
    }
    Ok(())
}

async fn fill(config: DocfillConfig, args: &ArgMatches) -> Result<()> {
    let path = required_path(args, "template")?;
    let out = required_path(args, "out")?;
    let manager = SessionManager::from_config(config);

    let started = manager
        .start_session(read_template(path)?)
        .await
        .with_context(|| format!("opening {}", path.display()))?;
    let id = started.session_id;
    println!("{}\n", started.reply);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await.context("reading answer")? else {
            bail!("input ended before the document was confirmed");
        };
        let reply = manager.handle_message(&id, &line).await?;
        println!("{reply}\n");

        if manager.session(&id).await?.status == SessionStatus::Complete {
            break;
        }
    }

    let report = manager.validate(&id).await?;
    for warning in &report.warnings {
        eprintln!("warning: {}: {}", warning.field, warning.message);
    }
    if !report.is_valid() {
        for error in &report.errors {
            eprintln!("error: {}: {}", error.field, error.message);
        }
        bail!("{} answer(s) failed validation; {} was not written", report.errors.len(), out.display());
    }

    let options = manager.config().generate_options().with_output_name(file_name(out));
    let document = manager
        .export(&id, Some(options))
        .await
        .context("generating document")?;
    std::fs::write(out, &document.buffer).with_context(|| format!("writing {}", out.display()))?;
    println!(
        "Wrote {} ({} bytes, checksum {})",
        out.display(),
        document.metadata.size_bytes,
        document.metadata.checksum.short()
    );
    manager.end_session(&id).await;
    Ok(())
}

fn render(config: &DocfillConfig, args: &ArgMatches) -> Result<()> {
    let path = required_path(args, "template")?;
    let values_path = required_path(args, "values")?;
    let out = required_path(args, "out")?;

    let values_text = std::fs::read_to_string(values_path)
        .with_context(|| format!("reading {}", values_path.display()))?;
    let values: ValueMap = serde_json::from_str(&values_text)
        .with_context(|| format!("{} must be a JSON object of strings", values_path.display()))?;

    let options = config.generate_options().with_output_name(file_name(out));
    let document = docfill_document::generate(&read_template(path)?, &values, &options)
        .context("generating document")?;
    std::fs::write(out, &document.buffer).with_context(|| format!("writing {}", out.display()))?;
    println!(
        "Wrote {} ({} bytes, checksum {})",
        out.display(),
        document.metadata.size_bytes,
        document.metadata.checksum.short()
    );
    Ok(())
}
