//! End-to-end curation over an on-disk project

use exposome_curation::{
    migrate_corpus, strip_normalized, sync_taxonomy, validate_corpus, CurationError,
    KeywordClassifier, SyncOptions, ValidationFinding, NORMALIZED_FIELD,
};
use exposome_model::{corpus, LoadError, Taxonomy};
use exposome_test_utils::CorpusFixture;
use pretty_assertions::assert_eq;

#[test]
fn clean_corpus_passes() {
    let fixture = CorpusFixture::standard();
    fixture.write_paper(
        "A",
        "title: A\ndomains: [chemical]\nsubdomains:\n  chemical.metals: [Pb]\n",
    );
    fixture.write_paper("B", "title: B\ndomain: physical\nsubdomains: [physical.noise]\n");

    let report = validate_corpus(&fixture.layout()).unwrap();
    assert_eq!(report.files_checked, 2);
    assert!(report.passed(), "{}", report.render());
}

#[test]
fn findings_are_collected_across_files() {
    let fixture = CorpusFixture::standard();
    fixture.write_paper("a_missing", "title: no domains\n");
    fixture.write_paper(
        "b_orphan",
        "title: B\ndomains: [chemical]\nsubdomains:\n  physical.noise: [Lden]\n",
    );
    fixture.write_paper("c_schema", "title: 7\ndomains: [chemical]\n");
    fixture.write_paper("d_broken", "domains: [chemical\n");

    let report = validate_corpus(&fixture.layout()).unwrap();
    assert_eq!(report.files_checked, 4);
    assert!(!report.passed());

    let kinds: Vec<&str> = report
        .findings
        .iter()
        .map(|f| match f {
            ValidationFinding::MissingDomains { .. } => "missing",
            ValidationFinding::DomainPrefixMismatch { .. } => "prefix",
            ValidationFinding::Schema { .. } => "schema",
            ValidationFinding::Unreadable { .. } => "unreadable",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["missing", "prefix", "schema", "unreadable"]);
}

#[test]
fn missing_schema_is_fatal() {
    let fixture = CorpusFixture::new();
    fixture.write_taxonomy("domains: []\n");
    fixture.write_paper("A", "domains: [chemical]\n");

    let err = validate_corpus(&fixture.layout()).unwrap_err();
    assert!(matches!(err, CurationError::Load(LoadError::NotFound(_))));
}

#[test]
fn empty_paper_set_is_fatal() {
    let fixture = CorpusFixture::standard();
    let err = validate_corpus(&fixture.layout()).unwrap_err();
    assert!(matches!(err, CurationError::NoPapers { .. }));
}

#[test]
fn sync_twice_is_idempotent() {
    let fixture = CorpusFixture::new();
    fixture.write_paper(
        "A",
        "domains: [chemical, social]\nsubdomains:\n  chemical.phenols: [BPA]\n  social.lifestyle: []\n",
    );
    fixture.write_paper("B", "domain: built\nsubdomain: built.access\n");
    let layout = fixture.layout();

    let first = sync_taxonomy(layout.taxonomy_path(), layout.papers_glob(), SyncOptions::default())
        .unwrap();
    assert_eq!(first.outcome.added_domains, vec!["built", "chemical", "social"]);
    assert_eq!(first.outcome.added_subdomains.len(), 3);

    let second = sync_taxonomy(layout.taxonomy_path(), layout.papers_glob(), SyncOptions::default())
        .unwrap();
    assert!(second.is_noop());

    let taxonomy = Taxonomy::load_required(layout.taxonomy_path()).unwrap();
    assert!(taxonomy.registry().allows_subdomain("chemical.phenols"));
}

#[test]
fn sync_keeps_entries_it_cannot_read() {
    let fixture = CorpusFixture::new();
    fixture.write_taxonomy(
        "version: 1\ndomains:\n  - name: chemical\n    subdomains: [metals, {name: pfas, note: keep}]\n  - subdomains: [orphan]\n",
    );
    fixture.write_paper("A", "domains: [chemical, social]\nsubdomains:\n  chemical.phenols: [BPA]\n");
    let layout = fixture.layout();

    let report = sync_taxonomy(layout.taxonomy_path(), layout.papers_glob(), SyncOptions::default())
        .unwrap();
    assert_eq!(report.outcome.added_domains, vec!["social"]);

    let written = corpus::read_yaml(layout.taxonomy_path()).unwrap();
    let domains = written["domains"].as_sequence().unwrap();
    assert_eq!(domains.len(), 3);
    assert_eq!(domains[0]["name"], "chemical");
    assert_eq!(domains[1]["subdomains"][0], "orphan");
    assert_eq!(domains[2]["name"], "social");

    let chemical = domains[0]["subdomains"].as_sequence().unwrap();
    assert_eq!(chemical.len(), 3);
    assert_eq!(chemical[0], "metals");
    assert_eq!(chemical[1]["name"], "pfas");
    assert_eq!(chemical[1]["note"], "keep");
    assert_eq!(chemical[2], "phenols");

    let again = sync_taxonomy(layout.taxonomy_path(), layout.papers_glob(), SyncOptions::default())
        .unwrap();
    assert!(again.is_noop());
    assert_eq!(corpus::read_yaml(layout.taxonomy_path()).unwrap(), written);
}

#[test]
fn dry_run_does_not_write() {
    let fixture = CorpusFixture::new();
    fixture.write_paper("A", "domains: [climate]\n");
    let layout = fixture.layout();

    let report = sync_taxonomy(
        layout.taxonomy_path(),
        layout.papers_glob(),
        SyncOptions {
            full_keys: false,
            dry_run: true,
        },
    )
    .unwrap();
    assert_eq!(report.outcome.added_domains, vec!["climate"]);
    assert!(!layout.taxonomy_path().exists());
}

#[test]
fn sync_then_validate_accepts_new_keys() {
    let fixture = CorpusFixture::standard();
    fixture.write_paper(
        "A",
        "title: A\ndomains: [climate]\nsubdomains:\n  climate.extremes: [heatwave]\n",
    );
    let layout = fixture.layout();

    let before = validate_corpus(&layout).unwrap();
    assert!(!before.passed());

    sync_taxonomy(layout.taxonomy_path(), layout.papers_glob(), SyncOptions::default()).unwrap();
    let after = validate_corpus(&layout).unwrap();
    assert!(after.passed(), "{}", after.render());
}

#[test]
fn migrate_then_strip_restores_document() {
    let fixture = CorpusFixture::new();
    let path = fixture.write_paper("A", "title: A\nsubdomains:\n  chemical: [PM2.5, xyzzy]\n");
    let original = corpus::read_yaml(&path).unwrap();
    let paths = vec![path.clone()];

    let migrated = migrate_corpus(&paths, &KeywordClassifier::builtin().unwrap()).unwrap();
    assert_eq!(migrated, paths);
    let doc = corpus::read_yaml(&path).unwrap();
    assert!(doc[NORMALIZED_FIELD].get("chemical.UNMAPPED").is_some());
    assert!(doc[NORMALIZED_FIELD].get("chemical.airpollution.ambient").is_some());

    assert_eq!(strip_normalized(&paths).unwrap(), paths);
    assert_eq!(corpus::read_yaml(&path).unwrap(), original);
}
