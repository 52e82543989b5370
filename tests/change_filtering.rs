// tests/change_filtering.rs

use std::path::Path;

use procwatch::errors::ProcwatchError;
use procwatch::watch::ChangeFilter;
use procwatch_test_utils::builders::SettingsBuilder;
use procwatch_test_utils::init_tracing;

#[test]
fn inclusion_regex_gates_file_events() {
    init_tracing();

    let filter = ChangeFilter::new(r"(^.*\.java$)|(^.*\.js$)|(^.*\.go$)", &[]).unwrap();

    assert!(filter.matches(Path::new("/project/src/main.go"), false));
    assert!(filter.matches(Path::new("/project/web/app.js"), false));
    assert!(!filter.matches(Path::new("/project/README.md"), false));
    assert!(!filter.matches(Path::new("/project/src/main.rs"), false));
}

#[test]
fn directories_never_qualify() {
    init_tracing();

    let filter = ChangeFilter::new(r".*", &[]).unwrap();
    assert!(!filter.matches(Path::new("/project/src"), true));
    assert!(filter.matches(Path::new("/project/src/lib.go"), false));
}

#[test]
fn ignore_prefixes_are_anchored_at_the_path_start() {
    init_tracing();

    let filter = ChangeFilter::new(
        r"^.*\.go$",
        &["/project/vendor".to_string(), "/project/.git".to_string()],
    )
    .unwrap();

    assert!(!filter.matches(Path::new("/project/vendor/dep/dep.go"), false));
    assert!(!filter.matches(Path::new("/project/.git/hooks/x.go"), false));
    assert!(filter.matches(Path::new("/project/src/vendor.go"), false));
    // The prefix only matches at the start, not mid-path.
    assert!(filter.matches(Path::new("/other/project/vendor/a.go"), false));
}

#[test]
fn filter_built_from_settings_applies_regex_and_ignores() {
    init_tracing();

    let settings = SettingsBuilder::new()
        .run("server")
        .watch_regex(r"^.*\.go$")
        .ignore_prefix("/project/build")
        .build();
    let filter = ChangeFilter::from_settings(&settings).unwrap();

    assert!(filter.matches(Path::new("/project/src/main.go"), false));
    assert!(!filter.matches(Path::new("/project/build/gen.go"), false));
    assert!(!filter.matches(Path::new("/project/src/main.c"), false));
}

#[test]
fn invalid_patterns_are_config_errors() {
    init_tracing();

    let err = ChangeFilter::new(r"(unclosed", &[]).unwrap_err();
    assert!(matches!(err, ProcwatchError::Config(_)), "got {err:?}");

    let err = ChangeFilter::new(r".*", &["(bad".to_string()]).unwrap_err();
    assert!(matches!(err, ProcwatchError::Config(_)), "got {err:?}");
}
