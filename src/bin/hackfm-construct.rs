//! CLI wrapper for the class construction engine.
//!
//! Usage:
//!   hackfm-construct [--templates DIR] [--config FILE] <class>=<instance>...
//!
//! Every instance is constructed, in order, into one environment which is
//! then printed. The template root defaults to `$HACKFM_DIR`, then `.`.

use hackfm_classes::runner::ds::env::Environment;
use hackfm_classes::runner::plugin::EngineConfig;
use hackfm_classes::runner::Engine;
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

struct Options {
    templates: Option<PathBuf>,
    config: Option<PathBuf>,
    requests: Vec<(String, String)>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("{}", msg);
                eprintln!();
            }
            print_usage();
            process::exit(if msg.is_empty() { 0 } else { 1 });
        }
    };

    let config = match &options.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config error: {}", e);
                process::exit(1);
            }
        },
        None => EngineConfig::new(),
    };
    let mut config = config.apply_env();
    if let Some(dir) = options.templates {
        config = config.with_template_root(dir);
    }

    let mut engine = match Engine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Config error: {}", e);
            process::exit(1);
        }
    };

    for (class, instance) in &options.requests {
        if let Err(e) = engine.construct(class, instance) {
            eprintln!("Construction error: {}", e);
            process::exit(1);
        }
    }

    dump(engine.env());
}

fn print_usage() {
    eprintln!("hackfm-construct - build class instances from templates");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  hackfm-construct [options] <class>=<instance>...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --templates DIR    Template root (overrides config and HACKFM_DIR)");
    eprintln!("  --config FILE      TOML engine configuration");
    eprintln!("  -h, --help         Show this help");
}

/// `Err("")` means help was requested.
fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        templates: None,
        config: None,
        requests: Vec::new(),
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(String::new()),
            "--templates" => {
                let dir = iter.next().ok_or("--templates needs a directory")?;
                options.templates = Some(PathBuf::from(dir));
            }
            "--config" => {
                let file = iter.next().ok_or("--config needs a file")?;
                options.config = Some(PathBuf::from(file));
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown option '{}'", other));
            }
            request => match request.find('=') {
                Some(pos) => options
                    .requests
                    .push((request[..pos].to_string(), request[pos + 1..].to_string())),
                None => return Err(format!("Expected <class>=<instance>, got '{}'", request)),
            },
        }
    }
    if options.requests.is_empty() {
        return Err("Nothing to construct".to_string());
    }
    Ok(options)
}

fn dump(env: &Environment) {
    for instance in env.instances() {
        println!(
            "{} {} ({}) [{}]",
            instance.id,
            instance.name,
            instance.class_name,
            instance.activation.to_hyphenated()
        );
        for container in &instance.containers {
            println!("  {} {} = {}", container.kind, container.name, container.value);
        }
        for method in &instance.methods {
            println!("  fn {} = {}", method.name, method.behavior);
        }
    }
}
