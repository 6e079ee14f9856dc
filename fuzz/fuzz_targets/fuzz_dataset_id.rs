#![no_main]

use covboard_core::http::dataset_id;
use covboard_core::http::geckoboard::DATASET_SUFFIX;
use covboard_core::RunConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let repo = String::from_utf8_lossy(data);

    let id = dataset_id(&repo);
    assert!(id.ends_with(DATASET_SUFFIX));
    let stem = &id[..id.len() - DATASET_SUFFIX.len()];
    assert!(stem.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));

    // Owner stripping must never panic on arbitrary splits
    if let Some((owner, _)) = repo.split_once('/') {
        let config = RunConfig {
            hosting_owner: owner.to_string(),
            hosting_repo_with_owner: repo.to_string(),
            coverage_service_token: String::new(),
            dashboard_service_token: String::new(),
        };
        assert!(repo.ends_with(config.repo_name()));
    }
});
