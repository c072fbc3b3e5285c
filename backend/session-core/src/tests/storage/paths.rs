use crate::storage::paths::{DATA_DIR_ENV, DataDirSource, detect_data_dir};

use std::path::Path;

use serial_test::serial;

/// **VALUE**: Verifies the configured directory wins over everything else.
///
/// **BUG THIS CATCHES**: Would catch the env var silently overriding explicit config.
#[test]
#[serial]
fn given_configured_dir_when_detecting_then_uses_config() {
    // GIVEN: Both a configured dir and the env var
    // SAFETY: serialized test.
    unsafe { std::env::set_var(DATA_DIR_ENV, "/tmp/from-env") };

    // WHEN: Detecting with a configured dir
    let detected = detect_data_dir(Some(Path::new("/tmp/from-config"))).expect("detect");
    unsafe { std::env::remove_var(DATA_DIR_ENV) };

    // THEN: Config wins
    assert_eq!(detected.source, DataDirSource::Config);
    assert_eq!(detected.path, Path::new("/tmp/from-config"));
}

#[test]
#[serial]
fn given_env_override_when_detecting_then_uses_env() {
    // GIVEN: Only the env var
    // SAFETY: serialized test.
    unsafe { std::env::set_var(DATA_DIR_ENV, "/tmp/from-env") };

    // WHEN: Detecting without configuration
    let detected = detect_data_dir(None).expect("detect");
    unsafe { std::env::remove_var(DATA_DIR_ENV) };

    // THEN: Env wins
    assert_eq!(detected.source, DataDirSource::EnvVar);
    assert_eq!(detected.path, Path::new("/tmp/from-env"));
}

#[test]
#[serial]
fn given_no_override_when_detecting_then_path_ends_with_app_dir() {
    // GIVEN: No config, no env var
    // SAFETY: serialized test.
    unsafe { std::env::remove_var(DATA_DIR_ENV) };

    // WHEN: Detecting
    let detected = detect_data_dir(None).expect("detect");

    // THEN: A platform or home path for this app
    assert!(matches!(
        detected.source,
        DataDirSource::PlatformDefault | DataDirSource::HomeFallback
    ));
    let name = detected.path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(name == "jobtrack" || name == ".jobtrack", "unexpected dir {name}");
}
