//! hostrun CLI
//!
//! Reads a module image from disk, loads it into a hosted runtime and
//! default-constructs one of its types.

use std::env;
use std::fs;
use std::process;

use anyhow::Context;
use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostrun::resolver;
use hostrun::wasm::WasmEngine;
use hostrun::ExecutionHost;
use hostrun::HostConfig;

/// Exit code when the image cannot be loaded as a module.
const EXIT_LOAD: i32 = 2;
/// Exit code when the type cannot be constructed.
const EXIT_CONSTRUCT: i32 = 3;

struct Args {
    module_path: String,
    type_name: String,
    version: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HOSTRUN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = env::args().collect();
    let Some(args) = parse_args(&argv) else {
        print_usage(argv.first().map(String::as_str).unwrap_or("hostrun"));
        process::exit(1);
    };

    // The host is dropped, and its runtime stopped, before the process exits.
    let code = run(args)?;
    if code != 0 {
        process::exit(code);
    }
    Ok(())
}

fn run(args: Args) -> Result<i32> {
    let image = fs::read(&args.module_path)
        .with_context(|| format!("failed to read {}", args.module_path))?;
    if image.is_empty() {
        anyhow::bail!("{} is empty", args.module_path);
    }
    info!(path = %args.module_path, len = image.len(), "module image read");

    let mut config = HostConfig::new();
    if let Some(version) = args.version {
        config = config.with_version(version);
    }
    let host = ExecutionHost::create_with(WasmEngine::new(), config)
        .context("runtime initialization failed")?;

    let module = match host.load(&image) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("Failed to load module: {}", e);
            return Ok(EXIT_LOAD);
        }
    };

    match module.construct(&args.type_name) {
        Ok(instance) => {
            println!(
                "Constructed {} (object {})",
                instance.type_name(),
                instance.handle().object()
            );
            Ok(0)
        }
        Err(e) => {
            eprintln!("Class construction failed: {}", e);
            if let resolver::Error::NotFound { .. } = e {
                if let Ok(names) = module.type_names() {
                    eprintln!("Available types:");
                    for name in names {
                        eprintln!("  {}", name);
                    }
                }
            }
            Ok(EXIT_CONSTRUCT)
        }
    }
}

fn parse_args(argv: &[String]) -> Option<Args> {
    let mut positional = Vec::new();
    let mut version = None;
    let mut rest = argv.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--runtime" | "-r" => version = Some(rest.next()?.clone()),
            "--help" | "-h" => return None,
            _ => positional.push(arg.clone()),
        }
    }

    let [module_path, type_name] = <[String; 2]>::try_from(positional).ok()?;
    Some(Args {
        module_path,
        type_name,
        version,
    })
}

fn print_usage(program: &str) {
    eprintln!("hostrun - construct a type from an in-memory module");
    eprintln!();
    eprintln!("Usage: {} <module_path> <type_name> [--runtime <version>]", program);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  HOSTRUN_LOG    log filter (default: info)");
}
