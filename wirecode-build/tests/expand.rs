use std::fs;
use std::path::Path;

use wirecode_build::{ExpandSettings, WirecodeConfig};

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const MODELS: &str = r#"
    use wirecode::{codable, one_of};

    #[codable]
    pub struct User {
        #[coding(rename = "userId")]
        pub id: u64,
        pub email: Option<String>,
    }

    #[codable]
    pub struct Legacy {
        pub id: u64,
    }

    impl wirecode::Decode for Legacy {
        fn decode(decoder: &wirecode::Decoder<'_>) -> Result<Self, wirecode::DecodeError> {
            todo!()
        }
    }
"#;

const BROKEN: &str = r#"
    #[one_of]
    pub enum Event {
        Created(Created),
        Pair(u8, u8),
    }
"#;

#[test]
fn reports_expansions_and_conformance_warnings() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/models.rs", MODELS);

    let report = wirecode_build::expand()
        .scan_path(dir.path().join("src"))
        .collect()
        .unwrap();

    let names: Vec<_> = report.items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, ["crate::models::User", "crate::models::Legacy"]);
    assert!(!report.has_errors());

    let warning = report.warnings().next().unwrap();
    assert_eq!(warning.item, "crate::models::Legacy");
    assert_eq!(warning.diagnostic.id.to_string(), "wirecode.codable.redundant-conformance");

    let listing = report.listing();
    assert!(listing.starts_with("// @generated by wirecode. Do not edit.\n"));
    assert!(listing.contains("// crate::models::User (#[codable])"));
    assert!(listing.contains("impl ::wirecode::Decode for User"));
    assert!(listing.contains("impl ::wirecode::Encode for Legacy"));
    assert!(!listing.contains("impl ::wirecode::Decode for Legacy"));
}

#[test]
fn errors_fail_the_run_but_not_collect() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/events.rs", BROKEN);

    let expander = wirecode_build::expand().scan_path(dir.path().join("src"));
    let report = expander.collect().unwrap();
    assert!(report.has_errors());
    assert!(report.items[0].code.is_none());
    let error = report.errors().next().unwrap();
    assert_eq!(error.diagnostic.id.to_string(), "wirecode.one_of.variant-payload");
    assert_eq!(error.location().0, 5);

    assert!(expander.run().is_err());
}

#[test]
fn deny_warnings_turns_warnings_into_failures() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/models.rs", MODELS);

    let lenient = wirecode_build::expand().scan_path(dir.path().join("src"));
    assert!(lenient.run().is_ok());

    let strict = wirecode_build::expand()
        .scan_path(dir.path().join("src"))
        .deny_warnings(true);
    let err = strict.run().unwrap_err();
    assert_eq!(err.to_string(), "wirecode-build: 0 error(s), 1 warning(s)");
}

#[test]
fn output_is_written_only_when_changed_and_never_rescanned() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/models.rs", MODELS);
    let output = dir.path().join("src/expanded/wirecode.rs");

    let expander = wirecode_build::expand()
        .scan_path(dir.path().join("src"))
        .output_file(&output);

    let first = expander.clone().run().unwrap();
    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, first.listing());

    // The listing holds `impl Decode for User`; scanning it would mark User
    // as already conforming.
    let second = expander.collect().unwrap();
    assert_eq!(second.listing(), written);
    assert!(!second.write_to(&output).unwrap());
}

#[test]
fn runtime_path_applies_to_every_item() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/lib.rs", "#[decodable] struct Point { x: i32 }");

    let report = wirecode_build::expand()
        .scan_path(dir.path().join("src"))
        .runtime_path("crate::wire")
        .collect()
        .unwrap();
    assert!(report.listing().contains("impl crate::wire::Decode for Point"));

    let err = wirecode_build::expand()
        .scan_path(dir.path().join("src"))
        .runtime_path("not a path")
        .collect()
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid runtime path `not a path`");
}

#[test]
fn settings_from_a_config_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "models/user.rs", MODELS);
    write(
        dir.path(),
        "wirecode.toml",
        "[expand]\nscan_paths = [\"models\"]\ncrate_name = \"app\"\n",
    );

    let config = WirecodeConfig::load(&dir.path().join("wirecode.toml")).unwrap();
    let settings: ExpandSettings = config.expand.resolved(dir.path());
    let report = settings.expander().collect().unwrap();
    assert_eq!(report.items[0].name, "app::user::User");
}
