use dmetl::{ConfigError, JobArgs};
use std::collections::HashMap;

fn argv(parts: &[&str]) -> Vec<String> {
    std::iter::once("dmetl").chain(parts.iter().copied()).map(String::from).collect()
}

#[test]
fn orchestration_style_arguments() {
    let a = JobArgs::resolve(&argv(&[
        "--JOB_NAME", "normalise", "--SOURCE", "/data/raw/", "--TARGET", "/data/curated//", "--ENV", "prod",
    ]))
    .unwrap();
    assert_eq!(a.job_name.as_deref(), Some("normalise"));
    assert_eq!(a.source, "/data/raw");
    assert_eq!(a.target, "/data/curated");
    assert_eq!(a.env, "prod");
}

#[test]
fn orchestration_style_accepts_equals_form() {
    let a = JobArgs::resolve(&argv(&["--JOB_NAME=j", "--SOURCE=/in", "--TARGET=/out", "--ENV=stage"])).unwrap();
    assert_eq!((a.source.as_str(), a.target.as_str(), a.env.as_str()), ("/in", "/out", "stage"));
}

#[test]
fn lowercase_flags_and_default_env() {
    let a = JobArgs::resolve(&argv(&["--source", "s3://bucket/raw/", "--target", "/out"])).unwrap();
    assert_eq!(a.source, "s3://bucket/raw");
    assert_eq!(a.target, "/out");
    assert_eq!(a.env, "dev");
    assert_eq!(a.job_name, None);
}

/// Without JOB_NAME the named-option lookup is incomplete; the flag scan still
/// finds the uppercase spellings.
#[test]
fn uppercase_flags_without_job_name_use_scan() {
    let a = JobArgs::resolve(&argv(&["--SOURCE", "/in", "--TARGET", "/out"])).unwrap();
    assert_eq!(a.source, "/in");
    assert_eq!(a.env, "dev");
}

#[test]
fn uppercase_wins_over_lowercase_and_empty_falls_through() {
    let a = JobArgs::resolve(&argv(&["--SOURCE", "/upper", "--source", "/lower", "--target", "/t"])).unwrap();
    assert_eq!(a.source, "/upper");

    let b = JobArgs::resolve(&argv(&["--SOURCE", "", "--source", "/lower", "--target", "/t"])).unwrap();
    assert_eq!(b.source, "/lower");
}

#[test]
fn unknown_flags_are_ignored() {
    let a = JobArgs::resolve(&argv(&["--verbose", "1", "--source", "/in", "--target", "/out", "--env", "qa"])).unwrap();
    assert_eq!(a.env, "qa");
}

#[test]
fn options_map_takes_precedence() {
    let mut opts = HashMap::new();
    opts.insert("SOURCE".to_string(), "/from-map/".to_string());
    opts.insert("TARGET".to_string(), "/to-map".to_string());
    opts.insert("ENV".to_string(), "prod".to_string());
    let a = JobArgs::resolve_with(Some(&opts), &argv(&["--source", "/ignored", "--target", "/ignored"])).unwrap();
    assert_eq!(a.source, "/from-map");
    assert_eq!(a.target, "/to-map");
    assert_eq!(a.env, "prod");
}

#[test]
fn missing_paths_is_a_configuration_error() {
    let err = JobArgs::resolve(&argv(&[])).unwrap_err();
    assert_eq!(err, ConfigError::missing_paths("", ""));

    let err = JobArgs::resolve(&argv(&["--SOURCE", "/in/", "--ENV", "prod"])).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("SRC='/in'"), "{msg}");
    assert!(msg.contains("TGT=''"), "{msg}");
}

#[test]
fn root_only_path_strips_to_empty() {
    let err = JobArgs::resolve(&argv(&["--source", "/", "--target", "/out"])).unwrap_err();
    assert_eq!(err, ConfigError::missing_paths("", "/out"));
}

#[test]
fn non_local_scheme_is_a_configuration_error() {
    let err = JobArgs::resolve(&argv(&["--source", "/in", "--target", "s3://bucket/curated/"])).unwrap_err();
    assert_eq!(err, ConfigError::unsupported_scheme("s3://bucket/curated"));
    assert!(err.to_string().contains("'s3://bucket/curated'"), "{err}");

    let err = JobArgs::resolve(&argv(&["--SOURCE", "gs://b/raw", "--TARGET", "/out"])).unwrap_err();
    assert_eq!(err, ConfigError::unsupported_scheme("gs://b/raw"));
}

#[test]
fn file_url_is_accepted_verbatim() {
    let a = JobArgs::resolve(&argv(&["--source", "file:///data/raw/", "--target", "/out"])).unwrap();
    assert_eq!(a.source, "file:///data/raw");
    assert_eq!(a.target, "/out");
}
