use std::path::PathBuf;
use std::process::ExitCode;

use femn_io::{ChannelFiles, PipelineConfig, PipelineError, VtkFormat};
use femn_model::Diagnostic;

fn usage() {
    eprintln!("usage:");
    eprintln!("  femn-cli run --input-dir <dir> --mesh <file> --output-dir <dir> --output-name <name> [options]");
    eprintln!("  femn-cli run --config <config.json>");
    eprintln!("  femn-cli --help");
    eprintln!("  femn-cli --version");
    eprintln!();
    eprintln!("options:");
    eprintln!("  --force-2d                 collapse the mesh onto the xy-plane");
    eprintln!("  --binary                   write VTK DataArrays base64-encoded instead of ascii");
    eprintln!("  --displacement <file>      displacement result channel");
    eprintln!("  --magnetic <file>          magnetic field result channel");
    eprintln!("  --current <file>           current density result channel");
    eprintln!("  --force <file>             nodal force result channel");
    eprintln!("  --lorentz-force <file>     Lorentz force result channel");
    eprintln!("  --heat <file>              heat result channel");
    eprintln!();
    eprintln!("examples:");
    eprintln!("  femn-cli run --input-dir job --mesh job.neu --output-dir out --output-name job");
    eprintln!("  femn-cli run --config job.json");
}

/// Command-line overrides collected from argv before being folded into a
/// [`PipelineConfig`]. `--config` supplies a base document that individual
/// flags then override, the same precedence order the flags are parsed in.
#[derive(Default)]
struct RunArgs {
    config_file: Option<PathBuf>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
    mesh_file: Option<PathBuf>,
    force_2d: bool,
    binary: bool,
    displacement: Option<PathBuf>,
    magnetic: Option<PathBuf>,
    current: Option<PathBuf>,
    force: Option<PathBuf>,
    lorentz_force: Option<PathBuf>,
    heat: Option<PathBuf>,
}

fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    let mut parsed = RunArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut take_value = || -> Result<String, String> {
            i += 1;
            args.get(i).cloned().ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag {
            "--config" => parsed.config_file = Some(PathBuf::from(take_value()?)),
            "--input-dir" => parsed.input_dir = Some(PathBuf::from(take_value()?)),
            "--output-dir" => parsed.output_dir = Some(PathBuf::from(take_value()?)),
            "--output-name" => parsed.output_name = Some(take_value()?),
            "--mesh" => parsed.mesh_file = Some(PathBuf::from(take_value()?)),
            "--force-2d" => parsed.force_2d = true,
            "--binary" => parsed.binary = true,
            "--displacement" => parsed.displacement = Some(PathBuf::from(take_value()?)),
            "--magnetic" => parsed.magnetic = Some(PathBuf::from(take_value()?)),
            "--current" => parsed.current = Some(PathBuf::from(take_value()?)),
            "--force" => parsed.force = Some(PathBuf::from(take_value()?)),
            "--lorentz-force" => parsed.lorentz_force = Some(PathBuf::from(take_value()?)),
            "--heat" => parsed.heat = Some(PathBuf::from(take_value()?)),
            other => return Err(format!("unrecognized flag: {other}")),
        }
        i += 1;
    }
    Ok(parsed)
}

fn build_config(parsed: RunArgs) -> Result<PipelineConfig, String> {
    let mut config = match &parsed.config_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read config file {}: {err}", path.display()))?;
            serde_json::from_str::<PipelineConfig>(&text)
                .map_err(|err| format!("invalid config file {}: {err}", path.display()))?
        }
        None => PipelineConfig {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            output_name: String::new(),
            force_2d: false,
            vtk_format: VtkFormat::Ascii,
            mesh_file: PathBuf::new(),
            channels: ChannelFiles::default(),
        },
    };

    if let Some(input_dir) = parsed.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output_dir) = parsed.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(output_name) = parsed.output_name {
        config.output_name = output_name;
    }
    if let Some(mesh_file) = parsed.mesh_file {
        config.mesh_file = mesh_file;
    }
    if parsed.force_2d {
        config.force_2d = true;
    }
    if parsed.binary {
        config.vtk_format = VtkFormat::Binary;
    }
    if parsed.displacement.is_some() {
        config.channels.displacement = parsed.displacement;
    }
    if parsed.magnetic.is_some() {
        config.channels.magnetic = parsed.magnetic;
    }
    if parsed.current.is_some() {
        config.channels.current = parsed.current;
    }
    if parsed.force.is_some() {
        config.channels.force = parsed.force;
    }
    if parsed.lorentz_force.is_some() {
        config.channels.lorentz_force = parsed.lorentz_force;
    }
    if parsed.heat.is_some() {
        config.channels.heat = parsed.heat;
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err("missing --output-dir (or config.output_dir)".to_string());
    }
    if config.output_name.is_empty() {
        return Err("missing --output-name (or config.output_name)".to_string());
    }
    if config.mesh_file.as_os_str().is_empty() {
        return Err("missing --mesh (or config.mesh_file)".to_string());
    }

    Ok(config)
}

fn print_diagnostics(diagnostics: impl Iterator<Item = Diagnostic>) {
    for diagnostic in diagnostics {
        eprintln!("diagnostic: {diagnostic}");
    }
}

fn run_pipeline(args: &[String]) -> ExitCode {
    let parsed = match parse_run_args(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{err}");
            usage();
            return ExitCode::from(2);
        }
    };

    let config = match build_config(parsed) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            usage();
            return ExitCode::from(2);
        }
    };

    log::info!("starting run: output_name={}", config.output_name);
    match femn_io::run(&config) {
        Ok(report) => {
            log::info!("run finished: {} step(s) written, {} diagnostic(s)", report.steps_written, report.diagnostics.len());
            println!("wrote {} step(s) to {}", report.steps_written, report.collection_path.display());
            print_diagnostics(report.diagnostics.iter().cloned());
            if report.diagnostics.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(PipelineError::UnreadableMesh { path, source }) => {
            log::warn!("run aborted: unreadable mesh file {}", path.display());
            eprintln!("cannot read mesh file {}: {source}", path.display());
            ExitCode::from(1)
        }
        Err(PipelineError::OutputDir { path, source }) => {
            log::warn!("run aborted: cannot create output directory {}", path.display());
            eprintln!("cannot create output directory {}: {source}", path.display());
            ExitCode::from(1)
        }
        Err(PipelineError::WriteCollection { path, source }) => {
            log::warn!("run aborted: cannot write collection file {}", path.display());
            eprintln!("cannot write collection file {}: {source}", path.display());
            ExitCode::from(1)
        }
        Err(PipelineError::Config(err)) => {
            log::warn!("run aborted: config error: {err}");
            eprintln!("config error: {err}");
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new().env().init().expect("logger already initialized");

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("help") | Some("-h") | Some("--help") => {
            usage();
            ExitCode::SUCCESS
        }
        Some("--version") | Some("-V") => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Some("run") => run_pipeline(&args[2..]),
        _ => {
            usage();
            ExitCode::from(2)
        }
    }
}
