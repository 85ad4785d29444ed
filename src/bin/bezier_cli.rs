use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use bezier_engine::config::{EngineConfig, load_config};
use bezier_engine::geom::{
    SamplingResolution, TessellationCache, TriangleMesh, expected_triangle_count,
    normalize_snapshot_text, snapshot_text, tessellate_surfaces, write_obj,
};
use bezier_engine::parse::{parse_control_net_file, parse_obj_file};

const USAGE: &str = r#"bezier_cli (bezier-engine)

USAGE:
  bezier_cli info <file>
  bezier_cli tessellate <file> [options]
  bezier_cli sweep <file>

FILES:
  *.obj              Triangle mesh (v/f subset)
  anything else      Bézier control net

OPTIONS (tessellate):
  --resolution <n>   Samples per degree, clamped to [1, 10]
  --config <path>    JSON engine config (resolution from --resolution wins)
  --obj <path>       Write the mesh as OBJ
  --snap <path>      Write the snapshot instead of printing it
  --overwrite        Overwrite existing output files
  -h, --help         Show this help

Logging goes to stderr; set RUST_LOG (default: info).
"#;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        eprintln!("bezier_cli error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut args = Args::new(args);

    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "info" => cmd_info(&mut args),
        "tessellate" => cmd_tessellate(&mut args),
        "sweep" => cmd_sweep(&mut args),
        "-h" | "--help" | "help" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
    }
}

fn print_usage() {
    println!("{USAGE}");
}

fn is_obj(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"))
}

fn cmd_info(args: &mut Args) -> Result<(), String> {
    let path = PathBuf::from(args.next().ok_or("missing input file")?);

    if is_obj(&path) {
        let mesh = parse_obj_file(&path).map_err(|e| e.to_string())?;
        println!("mesh {}", path.display());
        println!("  vertices: {}", mesh.vertex_count());
        println!("  triangles: {}", mesh.triangle_count());
        if let Some(bounds) = mesh.bounds() {
            println!("  bounds: {:?} .. {:?}", bounds.min.to_array(), bounds.max.to_array());
        }
        return Ok(());
    }

    let surfaces = parse_control_net_file(&path).map_err(|e| e.to_string())?;
    println!("control net {}: {} surface(s)", path.display(), surfaces.len());
    for (index, surface) in surfaces.iter().enumerate() {
        println!(
            "  surface {index}: degree ({}, {}), {} control points, {} triangles at resolution {}",
            surface.degree_u(),
            surface.degree_v(),
            surface.control_point_count(),
            expected_triangle_count(surface, SamplingResolution::DEFAULT),
            SamplingResolution::DEFAULT,
        );
    }
    Ok(())
}

fn cmd_tessellate(args: &mut Args) -> Result<(), String> {
    let path = PathBuf::from(args.next().ok_or("missing input file")?);

    let mut resolution: Option<i64> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut obj_path: Option<PathBuf> = None;
    let mut snap_path: Option<PathBuf> = None;
    let mut overwrite = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--resolution" => {
                let value = args.value("--resolution")?;
                resolution = Some(
                    value
                        .parse()
                        .map_err(|_| format!("--resolution expects an integer, got `{value}`"))?,
                );
            }
            "--config" => config_path = Some(PathBuf::from(args.value("--config")?)),
            "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
            "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
            "--overwrite" => overwrite = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }

    let mut config = match config_path.as_deref() {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(requested) = resolution {
        config.tessellation.resolution = SamplingResolution::new_clamped(requested);
    }
    let options = config.tessellation;

    let (mesh, diagnostics, op) = if is_obj(&path) {
        let mesh = parse_obj_file(&path).map_err(|e| e.to_string())?;
        let diagnostics = bezier_engine::TessellationDiagnostics {
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            ..Default::default()
        };
        (mesh, diagnostics, "import".to_string())
    } else {
        let surfaces = parse_control_net_file(&path).map_err(|e| e.to_string())?;
        let (mesh, diagnostics) = tessellate_surfaces(&surfaces, &options);
        (mesh, diagnostics, format!("tessellate r={}", options.resolution))
    };
    mesh.validate().map_err(|e| format!("mesh validation failed: {e}"))?;

    let snapshot = snapshot_text(&op, &mesh, &diagnostics);
    if let Some(path) = snap_path.as_deref() {
        write_text_file(path, &snapshot, overwrite)?;
        eprintln!("wrote {}", path.display());
    } else {
        print!("{snapshot}");
    }

    if let Some(out) = obj_path.as_deref() {
        let name = path
            .file_stem()
            .map_or_else(|| "mesh".to_string(), |stem| stem.to_string_lossy().into_owned());
        write_obj_file(out, &mesh, &name, overwrite)?;
        eprintln!("wrote {}", out.display());
    }

    eprintln!(
        "{}: vertices={} triangles={} | {}",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count(),
        diagnostics.summary()
    );
    Ok(())
}

fn cmd_sweep(args: &mut Args) -> Result<(), String> {
    let path = PathBuf::from(args.next().ok_or("missing input file")?);
    let surfaces = parse_control_net_file(&path).map_err(|e| e.to_string())?;

    let mut cache = TessellationCache::default();
    cache.set_resolution(i64::from(SamplingResolution::MIN));
    cache.set_surfaces(surfaces);

    loop {
        let mesh = cache.current_mesh();
        println!(
            "resolution {:>2}: triangles={} vertices={}",
            cache.resolution(),
            mesh.triangle_count(),
            mesh.vertex_count()
        );
        if cache.resolution() == SamplingResolution::MAX {
            break;
        }
        cache.increase_resolution();
    }

    let stats = cache.stats();
    eprintln!("rebuilds={} generation={}", stats.rebuild_count, stats.generation);
    Ok(())
}

fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), String> {
    if path.exists() && !overwrite {
        return Err(format!(
            "refusing to overwrite existing file {} (use --overwrite)",
            path.display()
        ));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
    }
    Ok(())
}

fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
    ensure_writable(path, overwrite)?;
    fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
}

fn write_obj_file(path: &Path, mesh: &TriangleMesh, name: &str, overwrite: bool) -> Result<(), String> {
    ensure_writable(path, overwrite)?;
    let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_obj(&mut writer, mesh, name).map_err(|e| format!("write obj {}: {e}", path.display()))
}

struct Args {
    args: Vec<String>,
    pos: usize,
}

impl Args {
    fn new(args: Vec<String>) -> Self {
        Self { args, pos: 0 }
    }

    fn next(&mut self) -> Option<String> {
        let arg = self.args.get(self.pos)?.clone();
        self.pos += 1;
        Some(arg)
    }

    fn value(&mut self, flag: &str) -> Result<String, String> {
        self.next().ok_or_else(|| format!("missing value for {flag}"))
    }
}
