use easel::{
    CommandCompiler, DeckCompiler, FontLibrary, OutputFormat, PassthroughCompiler, Pipeline,
    PipelineError, RenderOptions,
};
use std::env;
use std::path::Path;
use std::sync::Arc;

/// Names the external DSL compiler executable; without it, inputs are
/// treated as already-compiled deck XML.
const COMPILER_ENV: &str = "EASEL_DSL_COMPILER";

/// A thin CLI over the library pipeline: render one deck file.
fn main() -> Result<(), PipelineError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Render a deck file to SVG, PNG, PDF or pass-through XML.");
        eprintln!();
        eprintln!("Usage: {} <input.dsh> [svg|png|pdf|xml]", args[0]);
        eprintln!();
        eprintln!(
            "Set {} to the DSL compiler executable; without it the input must be deck XML.",
            COMPILER_ENV
        );
        std::process::exit(1);
    }

    let input = Path::new(&args[1]);
    let format_name = args.get(2).map(String::as_str).unwrap_or("pdf");
    let format = OutputFormat::from_name(format_name)
        .ok_or_else(|| PipelineError::UnsupportedFormat(format_name.to_string()))?;

    let compiler: Arc<dyn DeckCompiler> = match env::var(COMPILER_ENV) {
        Ok(program) if !program.is_empty() => Arc::new(CommandCompiler::new(program)),
        _ => Arc::new(PassthroughCompiler),
    };

    let pipeline = Pipeline::new(compiler, FontLibrary::from_env());
    let output = pipeline.render_file(input, format, &RenderOptions::default(), None)?;
    println!("wrote {}", output.display());
    Ok(())
}
