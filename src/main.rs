//! image-stencil CLI
//!
//! Usage:
//!   image-stencil [OPTIONS] <TEMPLATE>
//!
//! Loads a template JSON file, fills its variables from --set arguments,
//! renders onto a software canvas and writes a PPM image. Pass --variables
//! to list the variables a template needs instead of rendering.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use image_stencil::{
    Builder, Canvas as _, ComponentRegistry, NamedValues, Options, PixmapCanvas, PropValue,
};

#[derive(Parser)]
#[command(name = "image-stencil")]
#[command(about = "Render declarative image templates with deferred variables")]
struct Cli {
    /// Template JSON file
    template: PathBuf,

    /// Variable assignment as name=value; repeatable. Values parse as
    /// integer, float (use a decimal point), bool or duration before
    /// falling back to string.
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Render options file (TOML: width, height, ppi)
    #[arg(short, long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Output PPM file (defaults to template name with .ppm extension)
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// List the unresolved variables the template needs and exit
    #[arg(long)]
    variables: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let options = match &cli.options {
        Some(path) => match Options::from_file(path) {
            Ok(options) => options,
            Err(err) => {
                eprintln!("Error loading options '{}': {}", path.display(), err);
                return ExitCode::FAILURE;
            }
        },
        None => Options::default(),
    };

    let data = match fs::read(&cli.template) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Error reading template '{}': {}", cli.template.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let canvas = PixmapCanvas::new(options.width, options.height);
    let canvas = canvas.with_ppi(options.ppi);
    let mut builder = Builder::new(ComponentRegistry::with_builtin_kinds(), canvas);
    if let Err(err) = builder.load_data(&data) {
        eprintln!("Error loading template: {err}");
        return ExitCode::FAILURE;
    }

    if cli.variables {
        for name in builder.variables() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let values = match parse_assignments(&cli.set) {
        Ok(values) => values,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::FAILURE;
        }
    };
    if !values.is_empty() {
        if let Err(err) = builder.set_named_values(&values) {
            eprintln!("Error applying variables: {err}");
            return ExitCode::FAILURE;
        }
    }

    if let Err(err) = builder.write_components() {
        eprintln!("Error rendering template: {err}");
        return ExitCode::FAILURE;
    }

    let output = cli
        .output
        .unwrap_or_else(|| cli.template.with_extension("ppm"));
    let encoded = builder.canvas().snapshot().to_ppm();
    if let Err(err) = fs::write(&output, encoded) {
        eprintln!("Error writing '{}': {}", output.display(), err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Parse repeated `name=value` assignments, inferring a value type for
/// each: integer, float, bool and duration literals are recognised, and
/// anything else stays a string.
fn parse_assignments(assignments: &[String]) -> Result<NamedValues, String> {
    let mut values = NamedValues::new();
    for assignment in assignments {
        let Some((name, raw)) = assignment.split_once('=') else {
            return Err(format!("invalid assignment '{assignment}', expected name=value"));
        };
        if name.is_empty() {
            return Err(format!("invalid assignment '{assignment}', empty variable name"));
        }
        values.insert(name.to_string(), infer_value(raw));
    }
    Ok(values)
}

fn infer_value(raw: &str) -> PropValue {
    if let Ok(value) = raw.parse::<i64>() {
        return PropValue::Int(value);
    }
    if let Ok(value) = raw.parse::<f64>() {
        return PropValue::Float(value);
    }
    if let Ok(value) = raw.parse::<bool>() {
        return PropValue::Bool(value);
    }
    if let Some(value) = image_stencil::property::parse_duration(raw) {
        return PropValue::Duration(value);
    }
    PropValue::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_assignment_type_inference() {
        let values = parse_assignments(&[
            "radius=12".to_string(),
            "size=14.5".to_string(),
            "visible=true".to_string(),
            "expiry=1m30s".to_string(),
            "name=Ada".to_string(),
        ])
        .expect("Should parse");
        assert_eq!(values["radius"], PropValue::Int(12));
        assert_eq!(values["size"], PropValue::Float(14.5));
        assert_eq!(values["visible"], PropValue::Bool(true));
        assert_eq!(
            values["expiry"],
            PropValue::Duration(chrono::Duration::seconds(90))
        );
        assert_eq!(values["name"], PropValue::String("Ada".to_string()));
    }

    #[test]
    fn test_malformed_assignment_errors() {
        assert!(parse_assignments(&["radius".to_string()]).is_err());
        assert!(parse_assignments(&["=5".to_string()]).is_err());
    }

    #[test]
    fn test_value_with_equals_sign_keeps_remainder() {
        let values =
            parse_assignments(&["query=a=b".to_string()]).expect("Should parse");
        assert_eq!(values["query"], PropValue::String("a=b".to_string()));
    }
}
