use std::path::PathBuf;

const HELP: &str = "\
Builds OpenType fonts from Type3 glyph outlines.

USAGE:
  type3-synth --input <json> --otf-output <otf> [OPTIONS]

OPTIONS:
  --input <path>          Glyph outlines as JSON
  --otf-output <path>     Where to write the CFF-flavored font
  --ttf-output <path>     Where to write the TrueType font
  --family-name <name>    [default: Type3 Synth]
  --style-name <name>     [default: Regular]
  --units-per-em <n>      [default: 1000]
  --cu2qu-error <f>       Maximum cubic to quadratic error [default: 1.0]
  -h, --help              Prints this help
";

struct Args {
    input: PathBuf,
    otf_output: PathBuf,
    ttf_output: Option<PathBuf>,
    options: fontsynth::SynthOptions,
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

    let result = fontsynth::synthesize(
        &args.input,
        &args.otf_output,
        args.ttf_output.as_deref(),
        &args.options,
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

    let mut options = fontsynth::SynthOptions::default();
    let input: Option<PathBuf> = args.opt_value_from_str("--input").map_err(|e| e.to_string())?;
    let otf_output: Option<PathBuf> =
        args.opt_value_from_str("--otf-output").map_err(|e| e.to_string())?;
    let ttf_output: Option<PathBuf> =
        args.opt_value_from_str("--ttf-output").map_err(|e| e.to_string())?;

    if let Some(name) = args.opt_value_from_str::<_, String>("--family-name").map_err(|e| e.to_string())? {
        options.family_name = name;
    }

    if let Some(name) = args.opt_value_from_str::<_, String>("--style-name").map_err(|e| e.to_string())? {
        options.style_name = name;
    }

    if let Some(n) = args.opt_value_from_str("--units-per-em").map_err(|e| e.to_string())? {
        options.units_per_em = n;
    }

    if let Some(n) = args.opt_value_from_str("--cu2qu-error").map_err(|e| e.to_string())? {
        options.cu2qu_error = n;
    }

    let rest = args.finish();
    if !rest.is_empty() {
        return Err(format!("unexpected arguments: {:?}", rest));
    }

    let input = input.ok_or("--input is required")?;
    let otf_output = otf_output.ok_or("--otf-output is required")?;

    Ok(Some(Args { input, otf_output, ttf_output, options }))
}
