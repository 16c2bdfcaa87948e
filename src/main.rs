use anyhow::{Context, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use locale_mt::config::{BackendKind, Settings};
use locale_mt::fill::{Filler, LocaleOutcome};
use locale_mt::logging::{setup_logging, should_use_json};
use locale_mt::mt::google_translate;
use locale_mt::mt::translator::validate_locale;
use locale_mt::report::coverage;
use locale_mt::store::{self, TargetStatus};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

fn locale_args() -> [Arg; 3] {
    [
        Arg::new("src")
            .long("src")
            .help("Reference catalog, e.g. locales/en.json")
            .required(true)
            .value_parser(value_parser!(PathBuf)),
        Arg::new("to")
            .long("to")
            .help("Target locale codes")
            .required(true)
            .num_args(1..)
            .action(ArgAction::Append),
        Arg::new("outdir")
            .long("outdir")
            .help("Directory holding <locale>.json files")
            .default_value("locales")
            .value_parser(value_parser!(PathBuf)),
    ]
}

fn cli() -> Command {
    Command::new("locale-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fill missing strings in JSON locale files with machine translation")
        .subcommand_required(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log level when RUST_LOG is not set")
                .default_value("info"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .help("Emit logs as JSON lines")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("fill")
                .about("Translate missing and blank strings into each target locale")
                .args(locale_args())
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("TOML settings file")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("backend")
                        .long("backend")
                        .help("Translation backend: libre, google, mock or none"),
                )
                .arg(
                    Arg::new("engine")
                        .long("engine")
                        .env("LOCALE_MT_ENGINE")
                        .help("LibreTranslate server URL"),
                )
                .arg(
                    Arg::new("api-key")
                        .long("api-key")
                        .env("LOCALE_MT_API_KEY")
                        .hide_env_values(true)
                        .help("API key for the translation backend"),
                )
                .arg(
                    Arg::new("batch")
                        .long("batch")
                        .help("Strings per backend call")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("sleep")
                        .long("sleep")
                        .help("Seconds to pause between backend calls")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("source-locale")
                        .long("source-locale")
                        .help("Locale of the reference catalog"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help("Seconds before a backend call is abandoned")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Plan and report without calling the backend or writing files")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-backup")
                        .long("no-backup")
                        .help("Do not keep <locale>.json.bak")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Print a JSON coverage report for each target locale")
                .args(locale_args()),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();

    let json = matches.get_flag("log-json") || should_use_json();
    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    setup_logging(json, level);

    match matches.subcommand() {
        Some(("fill", sub)) => run_fill(sub).await,
        Some(("check", sub)) => run_check(sub),
        _ => bail!("no subcommand given"),
    }
}

fn locales(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("to")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn path_arg<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a Path> {
    matches
        .get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing --{}", name))
}

/// Settings file first, then flags and environment on top
fn load_settings(matches: &ArgMatches) -> anyhow::Result<Settings> {
    let mut settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    if let Some(kind) = matches.get_one::<String>("backend") {
        settings.backend.kind = kind.parse::<BackendKind>()?;
    }
    if let Some(url) = matches.get_one::<String>("engine") {
        settings.backend.url = Some(url.clone());
    }
    if let Some(key) = matches.get_one::<String>("api-key") {
        settings.backend.api_key = Some(key.clone());
    }
    if settings.backend.kind == BackendKind::Google && settings.backend.api_key.is_none() {
        settings.backend.api_key = std::env::var(google_translate::API_KEY_ENV).ok();
    }
    if let Some(batch) = matches.get_one::<usize>("batch") {
        settings.batch_size = *batch;
    }
    if let Some(sleep) = matches.get_one::<f64>("sleep") {
        if !sleep.is_finite() || *sleep < 0.0 {
            bail!("--sleep must be a non-negative number of seconds");
        }
        settings.pace_ms = (sleep * 1000.0).round() as u64;
    }
    if let Some(locale) = matches.get_one::<String>("source-locale") {
        settings.source_locale = locale.clone();
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        settings.timeout_secs = *timeout;
    }
    if matches.get_flag("no-backup") {
        settings.backup = false;
    }

    settings.validate()?;
    Ok(settings)
}

async fn run_fill(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let settings = load_settings(matches)?;
    let reference = path_arg(matches, "src")?;
    let outdir = path_arg(matches, "outdir")?;
    let locales = locales(matches);

    let translator = settings.translator()?;
    let reports = Filler::new(&settings, translator.as_ref(), outdir)?
        .with_dry_run(matches.get_flag("dry-run"))
        .run(reference, &locales)
        .await
        .context("fill aborted")?;

    let mut failed = 0;
    for report in &reports {
        match &report.outcome {
            LocaleOutcome::Written { path, summary } => info!(
                locale = %report.locale,
                path = %path.display(),
                translated = summary.translated,
                fallbacks = summary.fallbacks,
                "done"
            ),
            LocaleOutcome::UpToDate { path } => {
                info!(locale = %report.locale, path = %path.display(), "already complete")
            }
            LocaleOutcome::Planned { path, pending } => {
                info!(locale = %report.locale, path = %path.display(), pending, "dry run")
            }
            LocaleOutcome::Failed(e) => {
                warn!(locale = %report.locale, error = %e, "not written");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        warn!(failed, total = reports.len(), "some locales failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let reference = store::load_reference(path_arg(matches, "src")?)?;
    let outdir = path_arg(matches, "outdir")?;

    let mut complete = true;
    let mut output = Map::new();
    for locale in locales(matches) {
        let entry = match check_locale(&reference, outdir, &locale) {
            Ok(report) => {
                complete &= report.is_complete();
                serde_json::to_value(&report)?
            }
            Err(e) => {
                complete = false;
                json!({ "error": e.to_string() })
            }
        };
        output.insert(locale, entry);
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    Ok(if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn check_locale(
    reference: &Value,
    outdir: &Path,
    locale: &str,
) -> anyhow::Result<locale_mt::CoverageReport> {
    validate_locale(locale)?;
    let path = store::target_path(outdir, locale);
    let loaded = store::load_target(&path)?;
    if let TargetStatus::Malformed(e) = &loaded.status {
        bail!("{} is not valid JSON: {}", path.display(), e);
    }
    Ok(coverage(reference, &loaded.tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_fill_flags_override_defaults() {
        let matches = cli()
            .try_get_matches_from([
                "locale-mt", "fill", "--src", "en.json", "--to", "fr", "de", "--backend", "mock",
                "--batch", "5", "--sleep", "0.5", "--no-backup",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let settings = load_settings(sub).unwrap();
        assert_eq!(settings.backend.kind, BackendKind::Mock);
        assert_eq!(settings.batch_size, 5);
        assert_eq!(settings.pace_ms, 500);
        assert!(!settings.backup);
        assert_eq!(locales(sub), vec!["fr", "de"]);
        assert_eq!(path_arg(sub, "outdir").unwrap(), Path::new("locales"));
    }

    #[test]
    fn test_fill_rejects_zero_batch() {
        let matches = cli()
            .try_get_matches_from([
                "locale-mt", "fill", "--src", "en.json", "--to", "fr", "--backend", "none",
                "--batch", "0",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(load_settings(sub).is_err());
    }

    #[test]
    fn test_check_requires_targets() {
        assert!(
            cli()
                .try_get_matches_from(["locale-mt", "check", "--src", "en.json"])
                .is_err()
        );
    }
}
