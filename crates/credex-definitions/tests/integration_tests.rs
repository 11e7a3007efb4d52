//! Integration tests for credex-definitions
//!
//! These run against the definitions shipped at the workspace root.

use credex_definitions::{DefinitionLoader, FieldType, PromptBuilder, SchemaRegistry};
use credex_domain::{CanonicalField, Language, MainCategory, OutputContract, SubCategory};
use std::path::PathBuf;
use std::sync::Arc;

fn shipped_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../definitions")
}

fn registry() -> SchemaRegistry {
    SchemaRegistry::new(Arc::new(DefinitionLoader::new(shipped_root())))
}

#[test]
fn test_shipped_definitions_are_consistent() {
    let registry = registry();
    let report = registry.validate_all().expect("definitions load");

    assert!(report.is_valid(), "problems: {:?}", report.problems);
    assert_eq!(report.checked, SubCategory::ALL.len());
    assert_eq!(registry.loader().cached_sub_categories(), SubCategory::ALL.len());
}

#[test]
fn test_sub_category_ids_follow_taxonomy() {
    let loader = DefinitionLoader::new(shipped_root());
    for main in MainCategory::ALL {
        let ids = loader.sub_category_ids(main).unwrap();
        assert_eq!(ids, main.sub_categories().to_vec(), "{}", main);
    }
}

#[test]
fn test_work_server_port_is_bounded_integer() {
    let schema = registry().schema(SubCategory::WorkServer).unwrap();
    let port = schema.field("port").expect("port declared");

    assert_eq!(port.field_type, FieldType::Integer);
    assert!(port.accepts(22));
    assert!(!port.accepts(99999));
    assert_eq!(schema.integer_fields().count(), 1);
}

#[test]
fn test_mapping_targets_are_canonical() {
    let registry = registry();
    for sub in SubCategory::ALL {
        let rule = registry.mapping_rule(sub).unwrap();
        assert_eq!(rule.sub_category, Some(sub));
        for target in rule.direct_mapping.values() {
            assert!(
                CanonicalField::from_wire_name(target).is_some(),
                "{}: {}",
                sub,
                target
            );
        }
    }
}

#[test]
fn test_work_development_maps_login_fields() {
    let rule = registry().mapping_rule(SubCategory::WorkDevelopment).unwrap();
    assert_eq!(rule.direct_mapping.get("email").map(String::as_str), Some("userID"));
    assert_eq!(
        rule.direct_mapping.get("password").map(String::as_str),
        Some("password")
    );
}

#[test]
fn test_main_category_prompt_lists_every_category() {
    let loader = Arc::new(DefinitionLoader::new(shipped_root()));
    let prompt = PromptBuilder::new(loader, Language::Ja)
        .main_category_prompt("GitHub account: admin@example.com")
        .unwrap();

    for main in MainCategory::ALL {
        assert!(prompt.contains(&format!("**{}（", main)), "{}", main);
    }
    assert!(prompt.contains("GitHub account: admin@example.com"));
    assert!(!prompt.contains("{MAIN_CATEGORY_DEFINITIONS}"));
    assert!(!prompt.contains("{TEXT}"));
}

#[test]
fn test_sub_category_prompt_lists_only_owned_sub_categories() {
    let loader = Arc::new(DefinitionLoader::new(shipped_root()));
    let prompt = PromptBuilder::new(loader, Language::En)
        .sub_category_prompt(MainCategory::Work, "ssh root@10.0.0.1")
        .unwrap();

    for sub in MainCategory::Work.sub_categories() {
        assert!(prompt.contains(&format!("**{} (", sub)), "{}", sub);
    }
    assert!(!prompt.contains("financialBanking"));
    assert!(prompt.contains(" 5 "));
    assert!(!prompt.contains("{SUB_CATEGORY_DEFINITIONS}"));
}

#[test]
fn test_extraction_prompt_explicit_and_fallback() {
    let loader = Arc::new(DefinitionLoader::new(shipped_root()));
    let builder = PromptBuilder::new(loader, Language::En);

    // workServer ships its own template
    let explicit = builder
        .extraction_prompt(SubCategory::WorkServer, "host: 10.0.0.1", OutputContract::Json)
        .unwrap();
    assert!(explicit.contains("server connection details"));
    assert!(explicit.contains("host: 10.0.0.1"));

    let fallback = builder
        .extraction_prompt(SubCategory::WorkDevelopment, "GitHub", OutputContract::Json)
        .unwrap();
    assert!(fallback.contains("Extract information about Development tools"));
    assert!(fallback.contains("\"username\": string | null"));

    let yaml = builder
        .extraction_prompt(SubCategory::WorkDevelopment, "GitHub", OutputContract::Yaml)
        .unwrap();
    assert!(yaml.contains("username: string | null"));
    assert!(yaml.contains("pure YAML object"));
}
