use std::path::PathBuf;

const HELP: &str = "\
Wraps a bare CFF font program into an OpenType font.

USAGE:
  cff-wrap [OPTIONS] [INPUT] [OUTPUT] [MAPPING]

OPTIONS:
  --input <path>        CFF data
  --output <path>       Where to write the font
  --to-unicode <path>   A ToUnicode CMap or a JSON glyph id mapping
  -h, --help            Prints this help

Named options take precedence over positional arguments.
";

struct Args {
    input: PathBuf,
    output: PathBuf,
    to_unicode: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {}.", e);
            std::process::exit(2);
        }
    };

    let options = fontsynth::WrapOptions::default();
    let result = fontsynth::wrap_cff(
        &args.input,
        &args.output,
        args.to_unicode.as_deref(),
        &options,
    );

    if let Err(e) = result {
        eprintln!("Error: {}.", e);
        std::process::exit(e.exit_code());
    }
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(None);
    }

    let input: Option<PathBuf> = args.opt_value_from_str("--input").map_err(|e| e.to_string())?;
    let output: Option<PathBuf> = args.opt_value_from_str("--output").map_err(|e| e.to_string())?;
    let to_unicode: Option<PathBuf> =
        args.opt_value_from_str("--to-unicode").map_err(|e| e.to_string())?;

    let mut free = args.finish().into_iter().map(PathBuf::from);
    let positional = (free.next(), free.next(), free.next());
    if let Some(path) = free.next() {
        return Err(format!("unexpected argument '{}'", path.display()));
    }

    let input = input.or(positional.0).ok_or("an input CFF file is required")?;
    let output = output.or(positional.1).ok_or("an output path is required")?;
    let to_unicode = to_unicode.or(positional.2);

    Ok(Some(Args { input, output, to_unicode }))
}
