//! End-to-end runs of the `exposome` commands against a temporary project

use exposome_cli::{run_from, Outcome};
use exposome_test_utils::CorpusFixture;
use pretty_assertions::assert_eq;

fn exposome(fixture: &CorpusFixture, args: &[&str]) -> anyhow::Result<Outcome> {
    let root = fixture.root().to_string_lossy().into_owned();
    let mut argv = vec!["exposome", "--root", root.as_str()];
    argv.extend_from_slice(args);
    run_from(argv)
}

#[test]
fn validate_passes_then_fails() {
    let fixture = CorpusFixture::standard();
    fixture.write_paper(
        "A",
        "title: Lead exposure\ndomains: [chemical]\nsubdomains:\n  chemical.metals: [Pb]\n",
    );
    assert_eq!(exposome(&fixture, &["validate"]).unwrap(), Outcome::Success);

    fixture.write_paper("B", "title: Orphan\n");
    assert_eq!(exposome(&fixture, &["validate"]).unwrap(), Outcome::Failure);
}

#[test]
fn validate_without_schema_is_fatal() {
    let fixture = CorpusFixture::new();
    fixture.write_paper("A", "domains: [chemical]\n");
    let err = exposome(&fixture, &["validate"]).unwrap_err();
    assert!(format!("{err:#}").contains("validation could not run"));
}

#[test]
fn sync_dry_run_leaves_taxonomy_alone() {
    let fixture = CorpusFixture::standard();
    fixture.write_paper("A", "domains: [climate]\nsubdomains:\n  climate.heat: [Tmax]\n");
    let before = fixture.read_file("taxonomy/domains.yaml");

    assert_eq!(
        exposome(&fixture, &["sync-taxonomy", "--dry-run"]).unwrap(),
        Outcome::Success
    );
    assert_eq!(fixture.read_file("taxonomy/domains.yaml"), before);

    exposome(&fixture, &["sync-taxonomy"]).unwrap();
    let after = fixture.read_file("taxonomy/domains.yaml");
    assert!(after.contains("climate"));
    assert!(after.contains("heat"));
}

#[test]
fn export_then_mindmap() {
    let fixture = CorpusFixture::standard();
    fixture.write_paper(
        "A",
        "domains: [chemical]\nsubdomains:\n  chemical.metals: [Pb]\n",
    );
    fixture.write_paper("B", "domain: physical\nindicators: [Noise]\n");

    exposome(&fixture, &["export-csv"]).unwrap();
    assert_eq!(
        fixture.read_file("plot/domain_subdomain_indicator.csv"),
        "domain,subdomain,indicator,paper\n\
         chemical,chemical.metals,Pb,A\n\
         physical,(none),Noise,B\n"
    );

    exposome(
        &fixture,
        &[
            "mindmap",
            "--title",
            "Catalog",
            "--domain-order",
            "physical,chemical",
            "--out-md",
            "map.md",
        ],
    )
    .unwrap();
    let markdown = fixture.read_file("plot/map.md");
    assert!(markdown.starts_with("# Catalog\n\n- physical\n"));
    assert!(fixture
        .read_file("plot/exposome_mindmap.html")
        .contains("<title>Catalog</title>"));
}

#[test]
fn mindmap_rejects_csv_without_columns() {
    let fixture = CorpusFixture::standard();
    fixture.write_file("plot/domain_subdomain_indicator.csv", "domain,paper\nchemical,A\n");
    let err = exposome(&fixture, &["mindmap"]).unwrap_err();
    assert!(format!("{err:#}").contains("missing required columns"));
}

#[test]
fn migrate_then_strip() {
    let fixture = CorpusFixture::standard();
    let original = "domains: [chemical]\nsubdomains:\n  chemical: [PM2.5]\n";
    fixture.write_paper("A", original);

    exposome(&fixture, &["migrate-subdomains"]).unwrap();
    let migrated = fixture.read_file("papers/A.yaml");
    assert!(migrated.contains("subdomains_normalized"));
    assert!(migrated.contains("chemical.airpollution"));

    exposome(&fixture, &["strip-normalized"]).unwrap();
    assert!(!fixture.read_file("papers/A.yaml").contains("subdomains_normalized"));
}

#[test]
fn inspect_schema_reports_and_requires_file() {
    let fixture = CorpusFixture::standard();
    assert_eq!(
        exposome(&fixture, &["inspect-schema"]).unwrap(),
        Outcome::Success
    );
    assert!(exposome(&CorpusFixture::new(), &["inspect-schema"]).is_err());
}

#[test]
fn unknown_subcommand_is_usage_error() {
    assert!(run_from(["exposome", "frobnicate"]).is_err());
}
