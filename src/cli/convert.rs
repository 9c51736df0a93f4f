//! File and stream conversion.
//!
//! - no input or `-`: stdin -> stdout (or `--output`)
//! - one input: file -> stdout (or `--output`)
//! - `--out-dir`: every input -> `DIR/<file name>`, converted in parallel

use crate::{
    cli::Cli,
    config::AmpConfig,
    debug,
    dom::RenderOptions,
    log,
    pipeline::{self, CompileOutput},
};
use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use std::{
    collections::HashSet,
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

/// Marker argument for standard input.
const STDIN_ARG: &str = "-";

/// Where a document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn from_arg(path: &Path) -> Self {
        if path.as_os_str() == STDIN_ARG {
            Self::Stdin
        } else {
            Self::File(path.to_path_buf())
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Read the document. Invalid UTF-8 is replaced rather than rejected.
    fn read(&self) -> Result<String> {
        let bytes = match self {
            Self::Stdin => {
                let mut buf = Vec::new();
                io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .context("Failed to read stdin")?;
                buf
            }
            Self::File(path) => {
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
            }
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Run the conversion described by the command line.
pub fn run(cli: &Cli, config: &AmpConfig) -> Result<()> {
    let options = config.format.render_options();

    if let Some(out_dir) = &cli.out_dir {
        return convert_batch(&cli.inputs, out_dir, &options);
    }

    let source = match cli.inputs.as_slice() {
        [] => Source::Stdin,
        [input] => Source::from_arg(input),
        _ => bail!(
            "{} inputs given; use --out-dir to convert more than one file",
            cli.inputs.len()
        ),
    };

    let html = convert(&source, &options)?;
    match &cli.output {
        Some(path) => write_file(path, &html),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(html.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write stdout")
        }
    }
}

/// Read, compile and log one document.
fn convert(source: &Source, options: &RenderOptions) -> Result<String> {
    let label = source.label();
    let input = source.read()?;
    let CompileOutput {
        mut html,
        facts,
        stats,
    } =
        pipeline::compile(&input, options).with_context(|| format!("Failed to convert {label}"))?;

    if stats.heads == 0 {
        log!("warning"; "{}: no <head> element, boilerplate not added", label);
    }
    debug!(
        "amp";
        "{}: {} renamed, {} scripts removed, charset {}, doctype {}",
        label,
        stats.renamed,
        stats.scripts_removed,
        if stats.charset_injected { "injected" } else { "kept" },
        if facts.needs_doctype { "added" } else { "kept" }
    );

    html.push('\n');
    Ok(html)
}

/// Convert every input into `out_dir`, keeping file names.
fn convert_batch(inputs: &[PathBuf], out_dir: &Path, options: &RenderOptions) -> Result<()> {
    let jobs = plan_batch(inputs, out_dir)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory {}", out_dir.display()))?;

    let has_error = AtomicBool::new(false);
    jobs.par_iter().try_for_each(|(input, output)| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }
        let result = convert(&Source::File(input.clone()), options)
            .and_then(|html| write_file(output, &html));
        if let Err(e) = result {
            if !has_error.swap(true, Ordering::Relaxed) {
                log!("error"; "{}: {:#}", input.display(), e);
            }
            return Err(anyhow!("Conversion failed"));
        }
        debug!("amp"; "{} -> {}", input.display(), output.display());
        Ok(())
    })?;

    log!("done"; "converted {} file(s) into {}", jobs.len(), out_dir.display());
    Ok(())
}

/// Pair each input with its output path, rejecting inputs that cannot be
/// written side by side.
fn plan_batch(inputs: &[PathBuf], out_dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    if inputs.is_empty() {
        bail!("--out-dir requires at least one input file");
    }

    let mut seen = HashSet::new();
    inputs
        .iter()
        .map(|input| -> Result<(PathBuf, PathBuf)> {
            if Source::from_arg(input) == Source::Stdin {
                bail!("stdin cannot be used with --out-dir");
            }
            let name = input
                .file_name()
                .with_context(|| format!("{} has no file name", input.display()))?;
            if !seen.insert(name.to_os_string()) {
                bail!("more than one input is named {}", name.to_string_lossy());
            }
            Ok((input.clone(), out_dir.join(name)))
        })
        .collect()
}

fn write_file(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::doctype::AMP_DOCTYPE;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ampify").chain(args.iter().copied()))
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_single_file_to_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.html");
        let output = dir.path().join("out.html");
        fs::write(&input, r#"<html><body><img src="a.jpg"></body></html>"#).unwrap();

        let cli = cli(&[path_str(&input), "-o", path_str(&output)]);
        run(&cli, &AmpConfig::default()).unwrap();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.starts_with(AMP_DOCTYPE));
        assert!(html.contains(r#"<amp-img src="a.jpg"></amp-img>"#));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_batch_into_out_dir() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("amp");
        let a = dir.path().join("a.html");
        let b = dir.path().join("b.html");
        fs::write(&a, "<p>a</p>").unwrap();
        fs::write(&b, r#"<meta charset="utf-8"><p>b</p>"#).unwrap();

        let cli = cli(&[path_str(&a), path_str(&b), "-d", path_str(&out_dir)]);
        run(&cli, &AmpConfig::default()).unwrap();

        let out_a = fs::read_to_string(out_dir.join("a.html")).unwrap();
        let out_b = fs::read_to_string(out_dir.join("b.html")).unwrap();
        assert!(out_a.contains("<p>a</p>"));
        assert!(out_b.contains("<p>b</p>"));
        assert_eq!(out_b.matches("charset").count(), 1);
    }

    #[test]
    fn test_pretty_from_config() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.html");
        let output = dir.path().join("out.html");
        fs::write(&input, "<html><head></head><body><p>x</p></body></html>").unwrap();

        let mut config = AmpConfig::default();
        config.format.pretty = true;
        run(&cli(&[path_str(&input), "-o", path_str(&output)]), &config).unwrap();

        let html = fs::read_to_string(&output).unwrap();
        let mut lines = html.lines();
        assert_eq!(lines.next(), Some(AMP_DOCTYPE));
        assert_eq!(lines.next(), Some("<html amp>"));
        assert!(html.contains("\n    <p>x</p>\n"));
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.html");
        let output = dir.path().join("out.html");
        fs::write(&input, b"<p>caf\xe9</p>").unwrap();

        run(&cli(&[path_str(&input), "-o", path_str(&output)]), &AmpConfig::default()).unwrap();
        assert!(fs::read_to_string(&output).unwrap().contains("<p>caf\u{fffd}</p>"));
    }

    #[test]
    fn test_multiple_inputs_need_out_dir() {
        let err = run(&cli(&["a.html", "b.html"]), &AmpConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--out-dir"));
    }

    #[test]
    fn test_missing_input_reported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.html");
        let err = run(&cli(&[path_str(&missing)]), &AmpConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_plan_batch_rejections() {
        let out = Path::new("out");
        assert!(plan_batch(&[], out).is_err());
        assert!(plan_batch(&[PathBuf::from("-")], out).is_err());

        let err = plan_batch(
            &[PathBuf::from("a/page.html"), PathBuf::from("b/page.html")],
            out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("page.html"));

        let jobs = plan_batch(&[PathBuf::from("src/x.html")], out).unwrap();
        assert_eq!(jobs, vec![(PathBuf::from("src/x.html"), out.join("x.html"))]);
    }

    #[test]
    fn test_stdin_argument() {
        assert_eq!(Source::from_arg(Path::new("-")), Source::Stdin);
        assert_eq!(
            Source::from_arg(Path::new("a.html")),
            Source::File(PathBuf::from("a.html"))
        );
    }
}
