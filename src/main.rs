//! buildcfg CLI
//!
//! Entry point for the `buildcfg` command-line tool.

use buildcfg::config::{
    application_resolver, parse_expectation, process_env, BuiltinDefaults, ConfigError,
    ConfigOrigin, EffectiveConfig, LayerStack, ENV_PREFIX,
};
use buildcfg::{BuildType, ConfigResolver};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "buildcfg")]
#[command(about = "Resolve layered build configuration", version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve all layers and print the effective config as JSON
    Resolve {
        #[command(flatten)]
        layers: LayerArgs,

        /// Write the effective config to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show the resolved value of a key and the layer it came from
    Explain {
        /// Key to explain (e.g. kotlin.jvm_target)
        key: String,

        #[command(flatten)]
        layers: LayerArgs,
    },

    /// Check the configuration against the application build rules
    Verify {
        #[command(flatten)]
        layers: LayerArgs,
    },
}

#[derive(Args)]
struct LayerArgs {
    /// Path to project config file
    #[arg(long, short = 'p', default_value = "buildcfg.toml")]
    project: PathBuf,

    /// Path to host config file (default: ~/.config/buildcfg/config.toml)
    #[arg(long)]
    host: Option<PathBuf>,

    /// Skip the host config file
    #[arg(long)]
    no_host: bool,

    /// Build type overlay to apply (debug, release)
    #[arg(long, short = 'b', default_value = "debug")]
    build_type: BuildType,

    /// Override a key (KEY=VALUE, repeatable)
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Ignore environment overrides
    #[arg(long)]
    no_env: bool,

    /// Prefix of environment overrides
    #[arg(long, default_value = ENV_PREFIX)]
    env_prefix: String,

    /// Additional required key (repeatable)
    #[arg(long = "require", value_name = "KEY")]
    required: Vec<String>,

    /// Expected value type (KEY=string|integer|boolean, repeatable)
    #[arg(long = "expect", value_name = "KEY=KIND")]
    expected: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Resolve { layers, output } => run_resolve(&layers, output),
        Commands::Explain { key, layers } => run_explain(&key, &layers),
        Commands::Verify { layers } => run_verify(&layers),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_resolve(args: &LayerArgs, output: Option<PathBuf>) -> Result<(), ConfigError> {
    let resolver = with_extra_rules(ConfigResolver::new(), args)?;
    let effective = EffectiveConfig::build(build_stack(args)?, &resolver)?;

    match output {
        Some(path) => {
            effective
                .write_to_file(&path)
                .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
            eprintln!("Wrote effective config to: {}", path.display());
        }
        None => {
            let json = effective
                .to_json()
                .map_err(|e| ConfigError::ParseError(format!("JSON serialization failed: {}", e)))?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn run_explain(key: &str, args: &LayerArgs) -> Result<(), ConfigError> {
    let resolver = with_extra_rules(ConfigResolver::new(), args)?;
    let effective = EffectiveConfig::build(build_stack(args)?, &resolver)?;

    let Some(value) = effective.get(key) else {
        return Err(ConfigError::ValidationError(format!(
            "key '{}' is not defined by any layer",
            key
        )));
    };

    println!("{} = {}", key, value);
    if let Some(kind) = effective.kind_of(key) {
        println!("  Type: {}", kind);
    }

    if let Some(layer) = effective.origin_of(key) {
        println!("  Layer: {}", layer);
        if let Some(source) = effective.sources.iter().find(|s| s.layer == layer) {
            println!("  Origin: {}", source.origin.as_str());
            if let Some(ref path) = source.path {
                println!("  File: {}", path);
            }
        }
    }

    Ok(())
}

fn run_verify(args: &LayerArgs) -> Result<(), ConfigError> {
    let resolver = with_extra_rules(application_resolver(), args)?;
    let effective = EffectiveConfig::build(build_stack(args)?, &resolver)?;

    println!("Configuration valid ({} build)", args.build_type);
    println!();
    for key in [
        "application_id",
        "namespace",
        "version_name",
        "version_code",
        "min_sdk",
        "target_sdk",
        "compile_sdk",
        "signing_config",
    ] {
        if let Some(value) = effective.get(key) {
            println!("  {}: {}", key, value);
        }
    }
    println!();
    println!("  Layers: {}", effective.sources.len());
    for source in &effective.sources {
        match source.path {
            Some(ref path) => println!("    {} ({})", source.layer, path),
            None => println!("    {}", source.layer),
        }
    }
    if !effective.redactions.is_empty() {
        println!("  Redacted: {}", effective.redactions.join(", "));
    }

    Ok(())
}

fn build_stack(args: &LayerArgs) -> Result<LayerStack, ConfigError> {
    let mut stack = LayerStack::new();
    stack.push_builtin(&BuiltinDefaults::default());
    stack.push_build_type(args.build_type);

    if !args.no_host {
        if let Some(path) = args.host.clone().or_else(default_host_config) {
            stack.push_file(ConfigOrigin::Host, &path, Some(args.build_type))?;
        }
    }

    stack.push_file(ConfigOrigin::Project, &args.project, Some(args.build_type))?;

    if !args.no_env {
        stack.push_env(&args.env_prefix, process_env());
    }

    stack.push_cli_overrides(&args.overrides)?;
    Ok(stack)
}

fn with_extra_rules(
    mut resolver: ConfigResolver,
    args: &LayerArgs,
) -> Result<ConfigResolver, ConfigError> {
    resolver = resolver.require_all(args.required.iter().cloned());

    for raw in &args.expected {
        let (key, kind) = parse_expectation(raw)?;
        resolver = resolver.expect_type(key, kind);
    }

    Ok(resolver)
}

fn default_host_config() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/buildcfg/config.toml"))
}
