//! Property-based tests using proptest

use covboard_core::config::RunConfig;
use covboard_core::http::codecov::extract_coverage;
use covboard_core::http::dataset_id;
use covboard_core::output::escape_data;
use proptest::prelude::*;
use serde_json::json;

// Repository names as GitHub allows them
fn arb_repo() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9-]{1,20}/[A-Za-z0-9._-]{1,40}").expect("valid regex")
}

proptest! {
    #[test]
    fn test_dataset_id_is_lowercase_alphanumeric(repo in arb_repo()) {
        let id = dataset_id(&repo);
        let stem = id.strip_suffix(".by_day");
        prop_assert!(stem.is_some());
        let stem = stem.unwrap();
        prop_assert!(stem.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_dataset_id_deterministic(repo in arb_repo()) {
        prop_assert_eq!(dataset_id(&repo), dataset_id(&repo));
    }

    #[test]
    fn test_dataset_id_ignores_case_and_separators(repo in arb_repo()) {
        let shouted = repo.to_uppercase().replace('-', "_");
        prop_assert_eq!(dataset_id(&repo), dataset_id(&shouted));
    }

    #[test]
    fn test_dataset_id_never_panics(s in "\\PC*") {
        let _ = dataset_id(&s);
    }

    #[test]
    fn test_repo_name_strips_owner(owner in "[A-Za-z0-9-]{1,20}", name in "[A-Za-z0-9._-]{1,40}") {
        let config = RunConfig {
            hosting_owner: owner.clone(),
            hosting_repo_with_owner: format!("{owner}/{name}"),
            coverage_service_token: "a".into(),
            dashboard_service_token: "b".into(),
        };
        prop_assert_eq!(config.repo_name(), name.as_str());
    }

    #[test]
    fn test_extract_coverage_accepts_any_finite_number(coverage in 0.0f64..=100.0) {
        let report = extract_coverage(&json!({"totals": {"coverage": coverage}}));
        prop_assert_eq!(report.unwrap().coverage_percentage, coverage);
    }

    #[test]
    fn test_escaped_data_is_single_line(s in "\\PC*[\r\n]?\\PC*") {
        let escaped = escape_data(&s);
        prop_assert!(!escaped.contains('\n'));
        prop_assert!(!escaped.contains('\r'));
    }
}
