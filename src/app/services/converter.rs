//! End-to-end conversion from delimited text to flat user records
//!
//! `FlatConverter` wires the services together from a [`Config`]. Everything
//! that can fail fatally (unknown labels, missing corpora, bad patterns or
//! defaults) fails inside [`FlatConverter::from_config`], before any record is
//! read. After that a run only ever reports problems; it never aborts on
//! record data.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::app::models::{Field, RawRecord, RequestedField};
use crate::app::services::column_detector::{
    ClaimPolicy, ColumnDetector, DetectionState, WellFormedness,
};
use crate::app::services::corpus_store::CorpusStore;
use crate::app::services::date_classifier::DateClassifier;
use crate::app::services::field_registry::FieldSpecRegistry;
use crate::app::services::flat_writer::{FlatSchema, FlatWriter, WriteStats};
use crate::app::services::record_extractor::RecordExtractor;
use crate::app::services::tag_bindings::TagBindingTable;
use crate::app::services::text_reader;
use crate::config::Config;
use crate::{Error, Result};

/// Outcome of one conversion run
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub verdict: WellFormedness,
    pub detection: DetectionState,
    pub stats: WriteStats,
    /// Rows that yielded no field at all and were not written
    pub skipped_records: usize,
}

impl ConversionReport {
    pub fn is_well_formed(&self) -> bool {
        self.verdict.is_well_formed
    }

    /// Get summary of the run
    pub fn summary(&self) -> String {
        format!(
            "{} ({} skipped, input {})",
            self.stats.summary(),
            self.skipped_records,
            if self.verdict.is_well_formed {
                "well formed"
            } else {
                "not well formed"
            }
        )
    }
}

/// Detects, extracts and writes customer records for one run
#[derive(Debug, Clone)]
pub struct FlatConverter {
    detector: ColumnDetector,
    extractor: RecordExtractor,
    writer: FlatWriter,
    delimiter: String,
}

impl FlatConverter {
    /// Build a converter evaluated against today's date
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_classifier(config, DateClassifier::new()?)
    }

    /// Build a converter with an explicit date classifier
    pub fn with_classifier(config: &Config, dates: DateClassifier) -> Result<Self> {
        config.validate()?;
        let schema = FlatSchema::symphony();

        let mut input = TagBindingTable::canonical_fields();
        let mut output = TagBindingTable::symphony_defaults();
        for (label, system_field) in &config.output_bindings {
            if !schema.is_system_field(system_field) {
                return Err(Error::configuration(format!(
                    "Output binding '{}' targets unknown system field '{}'",
                    label, system_field
                )));
            }
            output.bind(label.as_str(), system_field.as_str());
        }
        for (old, new) in &config.field_bindings {
            debug!("Renaming label '{}' to '{}'", old, new);
            input.rename(old, new);
            output.rename(old, new);
        }

        let requested = resolve_requested(config, &input)?;

        let corpora = load_corpora(config, &input)?;

        let mut registry = FieldSpecRegistry::standard()?;
        for (label, pattern) in &config.patterns {
            registry = registry.with_pattern(resolve_label(&input, label)?, pattern)?;
        }

        let claim_policy = if config.exclusive_columns {
            ClaimPolicy::Exclusive
        } else {
            ClaimPolicy::CorpusOnly
        };
        let detector = ColumnDetector::new(
            Arc::new(registry),
            Arc::new(corpora),
            dates.clone(),
            &requested,
        )?
        .with_claim_policy(claim_policy)
        .with_threshold(config.threshold);

        let extractor = RecordExtractor::new(&requested, input);

        let mut writer = FlatWriter::new(schema, output, dates)
            .with_form_id(config.form_id.as_str())
            .with_merges(config.merge.clone());
        for (system_field, value) in &config.defaults {
            writer.set_default(system_field, value)?;
        }

        info!(
            "Converter ready: {} requested field(s), threshold {:.1}%, {:?} column claims",
            requested.len(),
            config.threshold,
            claim_policy
        );

        Ok(Self {
            detector,
            extractor,
            writer,
            delimiter: config.delimiter.clone(),
        })
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn detector(&self) -> &ColumnDetector {
        &self.detector
    }

    pub fn writer(&self) -> &FlatWriter {
        &self.writer
    }

    /// Read an input file with the configured delimiter
    ///
    /// An `auto` delimiter is replaced by the one sniffed from the file.
    pub fn read(&mut self, path: &Path) -> Result<Vec<RawRecord>> {
        let (delimiter, records) = text_reader::read_delimited(path, &self.delimiter)?;
        if delimiter != self.delimiter {
            debug!("Delimiter resolved to {:?}", delimiter);
            self.delimiter = delimiter;
        }
        Ok(records)
    }

    /// Run column detection with fresh state
    pub fn detect(&self, records: &[RawRecord]) -> DetectionState {
        self.detector.run(records)
    }

    /// Well-formedness verdict for a detection run
    pub fn verdict(&self, state: &DetectionState) -> WellFormedness {
        self.detector.verdict(state)
    }

    /// Detect, then write every record
    pub fn convert<W: Write>(
        &mut self,
        records: &[RawRecord],
        out: &mut W,
    ) -> Result<ConversionReport> {
        let detection = self.detect(records);
        let verdict = self.verdict(&detection);
        self.write_records(records, detection, verdict, out, || {})
    }

    /// Write records using a finished detection run
    ///
    /// `on_record` is called once per input row, written or not.
    pub fn write_records<W, F>(
        &mut self,
        records: &[RawRecord],
        detection: DetectionState,
        verdict: WellFormedness,
        out: &mut W,
        mut on_record: F,
    ) -> Result<ConversionReport>
    where
        W: Write,
        F: FnMut(),
    {
        if !verdict.is_well_formed {
            warn!("Input is not well formed; writing best-effort output");
        }

        let mut skipped_records = 0;
        for raw in records {
            let customer = self.extractor.extract(raw, &detection.assignment);
            if customer.is_empty() {
                warn!("Line {}: no requested field found, skipping", raw.line_number);
                skipped_records += 1;
            } else {
                self.writer.write_record(customer, out)?;
            }
            on_record();
        }
        out.flush()
            .map_err(|e| Error::io("Failed to flush flat output", e))?;

        let stats = self.writer.stats().clone();
        info!("{}", stats.summary());

        Ok(ConversionReport {
            verdict,
            detection,
            stats,
            skipped_records,
        })
    }
}

/// Map a label to its canonical field through the input bindings
fn resolve_label(input: &TagBindingTable, label: &str) -> Result<Field> {
    let canonical = input.resolve(label).ok_or_else(|| {
        Error::configuration(format!("Unknown field label '{}'", label))
    })?;
    canonical.parse()
}

/// Requested fields in configured order, required first
fn resolve_requested(config: &Config, input: &TagBindingTable) -> Result<Vec<RequestedField>> {
    let required = config
        .required
        .iter()
        .map(|label| resolve_label(input, label).map(RequestedField::required));
    let optional = config
        .optional
        .iter()
        .map(|label| resolve_label(input, label).map(RequestedField::optional));
    required.chain(optional).collect()
}

/// Load every configured corpus under its field's canonical name
///
/// Every corpus-detected field must end up with a corpus, whether or not it
/// is requested.
fn load_corpora(config: &Config, input: &TagBindingTable) -> Result<CorpusStore> {
    if config.corpus.is_empty() {
        return Err(Error::configuration("no 'corpus' files were specified"));
    }

    let registry = FieldSpecRegistry::standard()?;
    let mut store = CorpusStore::new();

    for (label, _) in &config.corpus {
        let field = resolve_label(input, label)?;
        let needs_corpus = registry.get(field).is_some_and(|spec| spec.needs_corpus());
        if !needs_corpus {
            return Err(Error::configuration(format!(
                "Field '{}' is not detected by corpus",
                label
            )));
        }
        let Some(path) = config.corpus_path(label) else {
            continue;
        };
        store.load(field.as_str(), path)?;
    }

    for field in registry.corpus_fields() {
        if !store.contains(field.as_str()) {
            let label = input.label_for(field.as_str()).unwrap_or(field.as_str());
            return Err(Error::corpus(
                label,
                format!("expected a lookup file for '{}'", label),
            ));
        }
    }

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    const CUSTOMERS: &str = "\
Harold,Jones,1234-567 Ave,Edmonton,T6G 0G4,harold@example.com,08/22/1999
Ava,Smith,22 Jasper Avenue,Calgary,t5j1a1,ava@example.com,1985-03-04
";

    fn write_corpora(dir: &TempDir) {
        fs::write(dir.path().join("street.txt"), "Ave\nAvenue\nStreet\n").unwrap();
        fs::write(dir.path().join("city.txt"), "# towns\nEdmonton\nCalgary\n").unwrap();
        fs::write(dir.path().join("last.txt"), "Jones\nSmith\nHamilton\n").unwrap();
        fs::write(dir.path().join("first.txt"), "Harold\nAva\nLewis\n").unwrap();
        fs::write(dir.path().join("branch.txt"), "EPLMNA\nEPLWMC\n").unwrap();
        fs::write(dir.path().join("profile.txt"), "EPL_ADULT\nEPL_JUV\n").unwrap();
    }

    /// Attach every corpus, with the first-name corpus under `first_name_label`
    fn with_corpora(config: Config, dir: &TempDir, first_name_label: &str) -> Config {
        write_corpora(dir);
        config
            .with_corpus("street", dir.path().join("street.txt"))
            .with_corpus("city", dir.path().join("city.txt"))
            .with_corpus("lastName", dir.path().join("last.txt"))
            .with_corpus(first_name_label, dir.path().join("first.txt"))
            .with_corpus("branch", dir.path().join("branch.txt"))
            .with_corpus("profile", dir.path().join("profile.txt"))
    }

    fn test_config(dir: &TempDir) -> Config {
        with_corpora(
            Config::new()
                .with_required(["firstName", "lastName", "street", "postalcode"])
                .with_optional(["email", "birthday", "city"]),
            dir,
            "firstName",
        )
    }

    fn test_dates() -> DateClassifier {
        DateClassifier::with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()).unwrap()
    }

    #[test]
    fn test_convert_end_to_end() {
        let dir = TempDir::new().unwrap();
        let mut converter = FlatConverter::with_classifier(&test_config(&dir), test_dates()).unwrap();
        let records = text_reader::parse_records(CUSTOMERS, converter.delimiter());

        let mut out = Vec::new();
        let report = converter.convert(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(report.is_well_formed());
        assert_eq!(report.stats.records, 2);
        assert_eq!(report.stats.errors, 0);
        assert_eq!(report.detection.column_of(Field::PostalCode), Some(4));
        assert_eq!(text.matches("*** DOCUMENT BOUNDARY ***").count(), 2);
        assert!(text.contains(".USER_FIRST_NAME.   |aHarold\n"));
        assert!(text.contains(".USER_BIRTH_DATE.   |a19990822\n"));
        assert!(text.contains(".USER_BIRTH_DATE.   |a19850304\n"));
        assert!(text.contains(".POSTALCODE.   |aT5J 1A1\n"));
        assert!(text.contains(".CITY/PROV.   |aCalgary\n"));
        assert!(text.contains(".USER_PREF_LANG.   |aENGLISH\n"));
        assert_eq!(report.summary(), "processed 2 records with 0 error(s) (0 skipped, input well formed)");
    }

    #[test]
    fn test_renamed_label_flows_through() {
        let dir = TempDir::new().unwrap();
        let config = with_corpora(
            Config::new()
                .with_field_binding("firstName", "givenName")
                .with_required(["givenName"]),
            &dir,
            "givenName",
        );

        let mut converter = FlatConverter::with_classifier(&config, test_dates()).unwrap();
        let records = text_reader::parse_records("x,Lewis\n", ",");
        let mut out = Vec::new();
        converter.convert(&records, &mut out).unwrap();

        assert!(String::from_utf8(out).unwrap().contains(".USER_FIRST_NAME.   |aLewis\n"));
    }

    #[test]
    fn test_rename_twice_changes_only_the_label() {
        let dir = TempDir::new().unwrap();
        let records = text_reader::parse_records("Hamilton,Lewis\n", ",");

        let plain = with_corpora(
            Config::new().with_required(["firstName", "lastName"]),
            &dir,
            "firstName",
        );
        let renamed = with_corpora(
            Config::new()
                .with_field_binding("firstName", "givenName")
                .with_field_binding("givenName", "nom")
                .with_required(["nom", "lastName"]),
            &dir,
            "nom",
        );

        let mut plain = FlatConverter::with_classifier(&plain, test_dates()).unwrap();
        let mut renamed = FlatConverter::with_classifier(&renamed, test_dates()).unwrap();
        assert_eq!(plain.detect(&records), renamed.detect(&records));
        assert_eq!(renamed.detect(&records).column_of(Field::FirstName), Some(1));

        let mut plain_out = Vec::new();
        let mut renamed_out = Vec::new();
        plain.convert(&records, &mut plain_out).unwrap();
        renamed.convert(&records, &mut renamed_out).unwrap();
        let text = String::from_utf8(renamed_out).unwrap();

        assert!(text.contains(".USER_FIRST_NAME.   |aLewis\n"));
        assert_eq!(String::from_utf8(plain_out).unwrap(), text);

        // the intermediate label no longer exists
        let stale = with_corpora(
            Config::new()
                .with_field_binding("firstName", "givenName")
                .with_field_binding("givenName", "nom")
                .with_required(["givenName"]),
            &dir,
            "nom",
        );
        assert!(matches!(
            FlatConverter::with_classifier(&stale, test_dates()),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_read_reports_sniffed_delimiter() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("customers.txt");
        fs::write(&input, "Harold|Jones|1 Ave|T6G 0G4\n").unwrap();

        let config = test_config(&dir).with_delimiter("auto");
        let mut converter = FlatConverter::with_classifier(&config, test_dates()).unwrap();
        assert_eq!(converter.delimiter(), "auto");

        let records = converter.read(&input).unwrap();
        assert_eq!(converter.delimiter(), "|");
        assert_eq!(records[0].columns.len(), 4);
    }

    #[test]
    fn test_configured_output_and_defaults() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir)
            .with_optional(["country"])
            .with_output_binding("country", "userCategory3")
            .with_default("userProfile", "EPL_ADULT")
            .with_default("retrnmail", "")
            .with_form_id("LDUSER_EPL");

        let mut converter = FlatConverter::with_classifier(&config, test_dates()).unwrap();
        let records = text_reader::parse_records("Ava,Smith,22 Jasper Avenue,T5J 1A1,Canada\n", ",");
        let mut out = Vec::new();
        let report = converter.convert(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(report.stats.errors, 0);
        assert!(text.contains("FORM=LDUSER_EPL\n"));
        assert!(text.contains(".USER_CATEGORY3.   |aCanada\n"));
        assert!(text.contains(".USER_PROFILE.   |aEPL_ADULT\n"));
        assert!(!text.contains("RETRNMAIL"));
    }

    #[test]
    fn test_unbound_country_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir).with_optional(["country"]);
        let mut converter = FlatConverter::with_classifier(&config, test_dates()).unwrap();

        let records = text_reader::parse_records("Ava,Smith,22 Jasper Avenue,T5J 1A1,Canada\n", ",");
        let mut out = Vec::new();
        let report = converter.convert(&records, &mut out).unwrap();

        assert_eq!(report.stats.errors, 1);
        assert!(String::from_utf8(out).unwrap().contains(".USER_LAST_NAME.   |aSmith\n"));
    }

    #[test]
    fn test_rows_without_fields_are_skipped() {
        let dir = TempDir::new().unwrap();
        let mut converter = FlatConverter::with_classifier(&test_config(&dir), test_dates()).unwrap();
        let records = text_reader::parse_records("Harold,Jones,1 Ave,T6G 0G4\n,,,\n", ",");

        let mut out = Vec::new();
        let report = converter.convert(&records, &mut out).unwrap();

        assert_eq!(report.stats.records, 1);
        assert_eq!(report.skipped_records, 1);
        assert!(!report.is_well_formed());
    }

    #[test]
    fn test_exclusive_columns_setting_changes_assignment() {
        let dir = TempDir::new().unwrap();
        let base = with_corpora(
            Config::new().with_required(["userId"]).with_optional(["phone"]),
            &dir,
            "firstName",
        );
        let records = text_reader::parse_records("7805551212,Harold\n", ",");

        let exclusive = FlatConverter::with_classifier(&base, test_dates()).unwrap();
        let shared = FlatConverter::with_classifier(
            &base.clone().with_exclusive_columns(false),
            test_dates(),
        )
        .unwrap();

        assert_eq!(exclusive.detect(&records).column_of(Field::Phone), None);
        assert_eq!(shared.detect(&records).column_of(Field::Phone), Some(0));
    }

    #[test]
    fn test_every_corpus_field_needs_a_corpus() {
        let dir = TempDir::new().unwrap();
        write_corpora(&dir);

        // only email is requested, but the corpus fields still need files
        let only_street = Config::new()
            .with_required(["email"])
            .with_corpus("street", dir.path().join("street.txt"));
        assert!(matches!(
            FlatConverter::with_classifier(&only_street, test_dates()),
            Err(Error::Corpus { ref name, .. }) if name == "branch"
        ));

        let without_profile = Config::new()
            .with_required(["email"])
            .with_field_binding("firstName", "nom")
            .with_corpus("street", dir.path().join("street.txt"))
            .with_corpus("city", dir.path().join("city.txt"))
            .with_corpus("lastName", dir.path().join("last.txt"))
            .with_corpus("branch", dir.path().join("branch.txt"))
            .with_corpus("profile", dir.path().join("profile.txt"));
        assert!(matches!(
            FlatConverter::with_classifier(&without_profile, test_dates()),
            Err(Error::Corpus { ref name, .. }) if name == "nom"
        ));

        let complete = with_corpora(Config::new().with_required(["email"]), &dir, "firstName");
        assert!(FlatConverter::with_classifier(&complete, test_dates()).is_ok());
    }

    #[test]
    fn test_construction_errors() {
        let dir = TempDir::new().unwrap();
        let dates = test_dates;

        let unknown = test_config(&dir).with_optional(["shoeSize"]);
        assert!(matches!(
            FlatConverter::with_classifier(&unknown, dates()),
            Err(Error::Configuration { .. })
        ));

        let no_corpus = Config::new().with_required(["email"]);
        assert!(matches!(
            FlatConverter::with_classifier(&no_corpus, dates()),
            Err(Error::Configuration { .. })
        ));

        let missing_file = Config::new()
            .with_required(["street"])
            .with_corpus("street", dir.path().join("missing.txt"));
        assert!(matches!(
            FlatConverter::with_classifier(&missing_file, dates()),
            Err(Error::Corpus { .. })
        ));

        let corpus_for_pattern_field = test_config(&dir).with_corpus("email", dir.path().join("city.txt"));
        assert!(matches!(
            FlatConverter::with_classifier(&corpus_for_pattern_field, dates()),
            Err(Error::Configuration { .. })
        ));

        let bad_binding = test_config(&dir).with_output_binding("country", "userShoeSize");
        assert!(matches!(
            FlatConverter::with_classifier(&bad_binding, dates()),
            Err(Error::Configuration { .. })
        ));

        let bad_default = test_config(&dir).with_default("userShoeSize", "9");
        assert!(matches!(
            FlatConverter::with_classifier(&bad_default, dates()),
            Err(Error::Configuration { .. })
        ));

        let bad_pattern = test_config(&dir).with_pattern("postalcode", "(");
        assert!(matches!(
            FlatConverter::with_classifier(&bad_pattern, dates()),
            Err(Error::Pattern { .. })
        ));

        assert!(matches!(
            FlatConverter::with_classifier(&Config::new(), dates()),
            Err(Error::Configuration { .. })
        ));
    }
}
