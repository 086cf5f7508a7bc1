//! The extraction pipeline.
//!
//! [`Extractor::run`] executes every step against a fresh [`Model`]. Steps
//! are independent where the data allows: a failed step is reported and
//! logged, and the remaining steps still run.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use vanadiel_dat::{parse_dat, parse_items, walk, Walk};
use vanadiel_model::merge::{merge_all, merge_by_id};
use vanadiel_model::{fixes, transform, Model, Record, RecordCollection};

use crate::files::{self, StringTable, COLLECTIONS, ITEMS, LANGUAGES, SPELL_ABILITY_DATA};
use crate::{DatSource, Error, Result};

/// Ability ids from this value up are job abilities; lower ids are weapon skills.
pub const JOB_ABILITY_OFFSET: i64 = 0x200;

const ITEM_IGNORE: &[&str] = &["."];
const SPELL_IGNORE: &[&str] = &["."];
const ZONE_IGNORE: &[&str] = &["none"];
const BUFF_IGNORE: &[&str] = &[".", "(None)", "(Imagery)"];

/// A unit of work in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Items,
    SpellAbilityData,
    Spells,
    Abilities,
    Zones,
    Buffs,
    Fixes,
}

impl Step {
    /// Every step, in execution order.
    pub const ALL: [Step; 7] = [
        Step::Items,
        Step::SpellAbilityData,
        Step::Spells,
        Step::Abilities,
        Step::Zones,
        Step::Buffs,
        Step::Fixes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Step::Items => "items",
            Step::SpellAbilityData => "spell and ability data",
            Step::Spells => "spells",
            Step::Abilities => "abilities",
            Step::Zones => "zones",
            Step::Buffs => "buffs",
            Step::Fixes => "fixes",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Outcome of one step.
#[derive(Debug)]
pub struct StepReport {
    pub step: Step,
    pub elapsed: Duration,
    /// Number of records (or blocks, or fixes) produced, or the failure.
    pub outcome: Result<usize>,
}

/// Per-step outcomes of a run.
#[derive(Debug, Default)]
pub struct Report {
    steps: Vec<StepReport>,
}

impl Report {
    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    /// Steps that failed.
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.outcome.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Run `f` as `step`, keeping its value on success.
    fn record<T>(
        &mut self,
        step: Step,
        f: impl FnOnce() -> Result<T>,
        count: impl FnOnce(&T) -> usize,
    ) -> Option<T> {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let (outcome, value) = match result {
            Ok(value) => {
                let n = count(&value);
                tracing::info!(%step, count = n, ?elapsed, "step complete");
                (Ok(n), Some(value))
            }
            Err(e) => {
                tracing::error!(%step, error = %e, "step failed");
                (Err(e), None)
            }
        };

        self.steps.push(StepReport {
            step,
            elapsed,
            outcome,
        });
        value
    }
}

/// Keep only the name records whose id already exists in `target`, then merge them.
fn merge_names(target: &mut RecordCollection, parts: Vec<Vec<Record>>) {
    let known: HashSet<i64> = target.iter().filter_map(Record::id).collect();
    for part in parts {
        merge_by_id(
            target,
            part.into_iter()
                .filter(|r| r.id().is_some_and(|id| known.contains(&id))),
        );
    }
}

/// Runs the extraction steps against a [`DatSource`].
#[derive(Debug)]
pub struct Extractor<S> {
    source: S,
    fixes: Option<PathBuf>,
}

impl<S: DatSource> Extractor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            fixes: None,
        }
    }

    /// Apply the fixes document at `path` as the last step.
    pub fn with_fixes(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixes = Some(path.into());
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run every step.
    pub fn run(&self) -> (Model, Report) {
        self.run_with(|_| {})
    }

    /// Run every step, calling `on_step` before each one starts.
    pub fn run_with(&self, mut on_step: impl FnMut(Step)) -> (Model, Report) {
        let mut model = Model::new(COLLECTIONS);
        let mut report = Report::default();

        on_step(Step::Items);
        report.record(Step::Items, || self.extract_items(&mut model), |n| *n);

        on_step(Step::SpellAbilityData);
        let data = report.record(
            Step::SpellAbilityData,
            || self.load_spell_ability_data(),
            |w| w.blocks.len(),
        );

        on_step(Step::Spells);
        report.record(
            Step::Spells,
            || match &data {
                Some(walk) => self.extract_spells(&mut model, walk),
                None => Err(Error::MissingInput("spell and ability data")),
            },
            |n| *n,
        );

        on_step(Step::Abilities);
        report.record(
            Step::Abilities,
            || match &data {
                Some(walk) => self.extract_abilities(&mut model, walk),
                None => Err(Error::MissingInput("spell and ability data")),
            },
            |n| *n,
        );

        on_step(Step::Zones);
        report.record(
            Step::Zones,
            || self.extract_strings(&mut model, &files::ZONES, ZONE_IGNORE),
            |n| *n,
        );

        on_step(Step::Buffs);
        report.record(
            Step::Buffs,
            || self.extract_strings(&mut model, &files::BUFFS, BUFF_IGNORE),
            |n| *n,
        );

        if self.fixes.is_some() {
            on_step(Step::Fixes);
            report.record(Step::Fixes, || self.apply_fixes(&mut model), |n| *n);
        }

        (model, report)
    }

    /// Decode the item files of every language into `items` and `monstrosity`.
    pub fn extract_items(&self, model: &mut Model) -> Result<usize> {
        let mut items = RecordCollection::new("items");
        let mut monstrosity = RecordCollection::new("monstrosity");

        for position in 0..ITEMS[0].len() {
            let files = ITEMS
                .iter()
                .map(|group| self.source.read(group[position]))
                .collect::<Result<Vec<_>>>()?;
            let buffers: Vec<&[u8]> = files.iter().map(Vec::as_slice).collect();

            let (mons, rest): (Vec<Record>, Vec<Record>) = parse_items(&buffers)?
                .into_iter()
                .partition(|r| r.get_str("category") == Some("Monstrosity"));

            tracing::debug!(
                file_id = ITEMS[0][position],
                items = rest.len(),
                monstrosity = mons.len(),
                "parsed item files"
            );
            merge_by_id(&mut items, rest);
            merge_by_id(&mut monstrosity, mons);
        }

        transform::retain_valid_names(&mut items, &["en"], ITEM_IGNORE);
        transform::retain_valid_names(&mut monstrosity, &["en"], ITEM_IGNORE);

        let count = items.len() + monstrosity.len();
        model.insert(items);
        model.insert(monstrosity);
        Ok(count)
    }

    /// Walk the spell and ability container.
    pub fn load_spell_ability_data(&self) -> Result<Walk> {
        let data = self.source.read(SPELL_ABILITY_DATA)?;
        Ok(walk(&data)?)
    }

    /// Decode every file of a string table, in language order.
    fn load_strings(&self, table: &StringTable) -> Result<Vec<Vec<Record>>> {
        table
            .files
            .iter()
            .map(|(file_id, fields)| {
                let data = self.source.read(*file_id)?;
                let records = parse_dat(&data, fields)?;
                tracing::debug!(file_id, count = records.len(), collection = table.collection, "parsed string table");
                Ok(records)
            })
            .collect()
    }

    /// Build `spells` from the spell blocks and the spell name tables.
    pub fn extract_spells(&self, model: &mut Model, data: &Walk) -> Result<usize> {
        let mut spells = RecordCollection::from_records("spells", data.spells().cloned().collect());
        merge_names(&mut spells, self.load_strings(&files::SPELL_NAMES)?);
        transform::retain_valid_names(&mut spells, &LANGUAGES, SPELL_IGNORE);

        let count = spells.len();
        model.insert(spells);
        Ok(count)
    }

    /// Build `weapon_skills`, `job_abilities` and `ability_recasts`.
    pub fn extract_abilities(&self, model: &mut Model, data: &Walk) -> Result<usize> {
        let mut abilities =
            RecordCollection::from_records("abilities", data.abilities().cloned().collect());
        merge_names(&mut abilities, self.load_strings(&files::ABILITY_NAMES)?);
        transform::retain_valid_names(&mut abilities, &LANGUAGES, SPELL_IGNORE);
        abilities.retain(|r| !r.get_str("en").is_some_and(|name| name.starts_with('#')));
        model.insert(abilities);

        let weapon_skills = transform::split_by(
            model,
            "abilities",
            "weapon_skills",
            |r| r.id().is_some_and(|id| id < JOB_ABILITY_OFFSET),
            |id| id,
        )?;
        let job_abilities = transform::split_by(
            model,
            "abilities",
            "job_abilities",
            |_| true,
            |id| id - JOB_ABILITY_OFFSET,
        )?;
        model.remove("abilities");

        let recasts = transform::cross_reference(model, "job_abilities", "recast_id", "ability_recasts")?;
        tracing::debug!(weapon_skills, job_abilities, recasts, "split abilities");
        Ok(weapon_skills + job_abilities)
    }

    /// Build a collection from a localized string table alone.
    pub fn extract_strings(&self, model: &mut Model, table: &StringTable, ignore: &[&str]) -> Result<usize> {
        let mut collection = merge_all(table.collection, self.load_strings(table)?);
        transform::retain_valid_names(&mut collection, &LANGUAGES, ignore);

        let count = collection.len();
        model.insert(collection);
        Ok(count)
    }

    /// Apply the configured fixes document, if any.
    pub fn apply_fixes(&self, model: &mut Model) -> Result<usize> {
        match &self.fixes {
            Some(path) => Ok(fixes::apply_fixes_file(model, path)?),
            None => Ok(0),
        }
    }
}
