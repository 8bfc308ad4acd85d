use std::{env, fs, path::PathBuf};

use anyhow::{ensure, Context, Result};
use dcpuasm::{assemble_with_debug, Config};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    ensure!(args.len() == 1, "usage: dcpuasm <file>");
    let input = PathBuf::from(&args[0]);

    let config = Config::from_env()?;
    let program_text = fs::read_to_string(&input)
        .with_context(|| format!("Couldn't read {}", input.display()))?;

    let name = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("program");
    let assembly = assemble_with_debug(name, &program_text, &config)?;

    let binary = input.with_extension("bin");
    let debug = input.with_extension("dbg");
    ensure!(
        binary != input && debug != input,
        "{} would be overwritten by its own output",
        input.display()
    );

    fs::write(&binary, assembly.image.to_bytes(config.byte_order))
        .with_context(|| format!("Couldn't write {}", binary.display()))?;
    fs::write(&debug, assembly.debug.to_string()?)
        .with_context(|| format!("Couldn't write {}", debug.display()))?;

    log::info!(
        "wrote {} words to {}",
        assembly.image.len(),
        binary.display()
    );

    Ok(())
}
