//! The `fill` pass: one reference catalog, many target locales
//!
//! Locales are processed one after another. Each gets its own load, plan,
//! translate and save cycle, and a failure in one locale is recorded in its
//! report without stopping the others. Only a broken reference stops the run.

use crate::config::Settings;
use crate::error::{MtError, MtResult};
use crate::mt::driver::{BatchDriver, RunSummary};
use crate::mt::mask::PlaceholderSet;
use crate::mt::translator::{MachineTranslator, validate_locale};
use crate::plan::plan_units;
use crate::store::{self, TargetStatus};
use crate::tree::Tree;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// What happened to one locale
#[derive(Debug)]
pub enum LocaleOutcome {
    /// Target rewritten after a translation pass
    Written { path: PathBuf, summary: RunSummary },
    /// Every reference string already had a value; file left alone
    UpToDate { path: PathBuf },
    /// `--dry-run`: how many units would have been translated
    Planned { path: PathBuf, pending: usize },
    Failed(MtError),
}

#[derive(Debug)]
pub struct LocaleReport {
    pub locale: String,
    pub outcome: LocaleOutcome,
}

impl LocaleReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, LocaleOutcome::Failed(_))
    }
}

/// Fills `<outdir>/<locale>.json` for each locale from one reference file
pub struct Filler<'a> {
    translator: &'a dyn MachineTranslator,
    placeholders: PlaceholderSet,
    settings: &'a Settings,
    outdir: PathBuf,
    dry_run: bool,
}

impl<'a> Filler<'a> {
    pub fn new(
        settings: &'a Settings,
        translator: &'a dyn MachineTranslator,
        outdir: impl Into<PathBuf>,
    ) -> MtResult<Self> {
        Ok(Self {
            translator,
            placeholders: settings.placeholder_set()?,
            settings,
            outdir: outdir.into(),
            dry_run: false,
        })
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run every locale against the reference at `reference_path`
    ///
    /// # Errors
    /// Only when the reference cannot be loaded; per-locale failures end up
    /// in the returned reports.
    pub async fn run(
        &self,
        reference_path: &Path,
        locales: &[String],
    ) -> MtResult<Vec<LocaleReport>> {
        let reference = store::load_reference(reference_path)?;
        info!(
            reference = %reference_path.display(),
            locales = locales.len(),
            provider = self.translator.provider_name(),
            "starting fill"
        );

        let mut reports = Vec::with_capacity(locales.len());
        for locale in locales {
            let outcome = match self.fill_locale(&reference, locale).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(locale = %locale, error = %e, "locale failed");
                    LocaleOutcome::Failed(e)
                }
            };
            reports.push(LocaleReport {
                locale: locale.clone(),
                outcome,
            });
        }
        Ok(reports)
    }

    async fn fill_locale(&self, reference: &Tree, locale: &str) -> MtResult<LocaleOutcome> {
        validate_locale(locale)?;
        let path = store::target_path(&self.outdir, locale);
        let mut loaded = store::load_target(&path)?;
        let units = plan_units(reference, loaded.existing());
        info!(locale, path = %path.display(), pending = units.len(), "planned");

        if self.dry_run {
            return Ok(LocaleOutcome::Planned {
                path,
                pending: units.len(),
            });
        }
        if units.is_empty() && matches!(loaded.status, TargetStatus::Loaded) {
            return Ok(LocaleOutcome::UpToDate { path });
        }

        let source_locale = &self.settings.source_locale;
        let summary = BatchDriver::new(self.translator, &self.placeholders, source_locale)
            .with_batch_size(self.settings.batch_size)
            .with_pace(self.settings.pace())
            .with_call_timeout(Some(self.settings.timeout()))
            .run(&mut loaded.tree, &units, locale)
            .await?;

        store::save_tree(&path, &loaded.tree, self.settings.backup)?;
        info!(locale, path = %path.display(), "written");
        Ok(LocaleOutcome::Written { path, summary })
    }
}
