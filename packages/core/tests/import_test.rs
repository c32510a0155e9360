//! Integration tests for bulk import and legacy migration
//!
//! Tests cover:
//! - The three import formats converging on the same tree
//! - Importing parsed documents as new stored versions
//! - Legacy document migration end to end

use carehub_core::db::{FallbackFile, LibsqlContentStore};
use carehub_core::import::{parse, parse_csv_at, parse_outline_at, ImportFormat};
use carehub_core::services::{ContentSource, FormatMigrator, PersistenceGateway};
use carehub_core::{TreeOperations, CAREGIVER_PAGE, CARE_RECIPIENT_PAGE};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

const NOW: &str = "2024-05-01T00:00:00.000Z";

const OUTLINE: &str = "\
# PAGE: Caregiver
## TAB: Financial Support
### SECTION: Government Programs
#### ITEM: Medicare
Hospital coverage
Sources: https://www.medicare.gov
---
#### ITEM: SSDI
Disability income
# PAGE: Care Recipient
## TAB: Daily Living
### SECTION: Meals
#### ITEM: Meal Delivery
Meals on wheels
";

const CSV: &str = "\
Page,Tab,Section,Item,Content,Sources
Caregiver,Financial Support,Government Programs,Medicare,Hospital coverage,https://www.medicare.gov
Caregiver,Financial Support,Government Programs,SSDI,Disability income,
Care Recipient,Daily Living,Meals,Meal Delivery,Meals on wheels,
";

#[test]
fn test_outline_and_csv_build_the_same_tree() {
    let from_outline = parse_outline_at(OUTLINE, NOW).unwrap();
    let from_csv = parse_csv_at(CSV, NOW).unwrap();

    assert_eq!(from_outline, from_csv);
    assert_eq!(from_outline.item_count(), 3);
    assert!(TreeOperations::is_densely_ordered(&from_outline));
    assert!(from_outline.validate().is_ok());
}

#[test]
fn test_exported_json_reimports_unchanged() {
    let doc = parse_outline_at(OUTLINE, NOW).unwrap();
    let exported = serde_json::to_string_pretty(&doc).unwrap();

    let reimported = parse(ImportFormat::Json, &exported).unwrap();
    assert_eq!(reimported, doc);
}

#[tokio::test]
async fn test_import_replaces_visible_content() {
    let temp_dir = TempDir::new().unwrap();
    let store = LibsqlContentStore::open(temp_dir.path().join("carehub.db"))
        .await
        .unwrap();
    let gateway = PersistenceGateway::new(
        Some(Arc::new(store)),
        FallbackFile::new(temp_dir.path().join("content.json")),
    );

    let first = parse_csv_at(CSV, NOW).unwrap();
    gateway.import(first).await.unwrap();

    let second = parse_outline_at("# PAGE: caregiver\n## TAB: Housing\n", NOW).unwrap();
    gateway.import(second).await.unwrap();

    let loaded = gateway.load().await;
    assert_eq!(loaded.source, ContentSource::Primary);
    assert_eq!(loaded.document.pages[CAREGIVER_PAGE].tabs.len(), 1);
    assert_eq!(loaded.document.pages[CAREGIVER_PAGE].tabs[0].id, "housing");
    assert!(loaded.document.pages[CARE_RECIPIENT_PAGE].tabs.is_empty());
    assert_eq!(gateway.history().await.unwrap().len(), 2);
}

#[test]
fn test_legacy_document_migrates_fully() {
    let legacy = json!({
        "caregiver": {
            "financial": {
                "sectionTitle": "Financial Support",
                "parentHeaders": [
                    {
                        "id": "gov",
                        "title": "Government Programs",
                        "childHeaders": [
                            {"id": "medicare", "title": "Medicare", "content": "<p>A</p>",
                             "sources": "https://www.medicare.gov", "last_updated": "2023-01-01"},
                            {"title": "SSDI / SSI", "content": "B"},
                            {"title": "SSDI / SSI", "content": "C"}
                        ]
                    },
                    {"title": "Tax Credits", "childHeaders": []}
                ]
            },
            "legal": {
                "sectionTitle": "Legal",
                "parentHeaders": []
            }
        },
        "carerecipient": {}
    });

    let doc = FormatMigrator::normalize_at(legacy, NOW).unwrap();
    let caregiver = &doc.pages[CAREGIVER_PAGE];

    let tab_ids: Vec<_> = caregiver.tabs.iter().map(|tab| tab.id.as_str()).collect();
    assert_eq!(tab_ids, vec!["financial", "legal"]);

    let financial = &caregiver.tabs[0];
    assert_eq!(financial.title, "Financial Support");
    assert_eq!(financial.sections[1].id, "tax-credits");
    assert_eq!(financial.sections[1].order, 1);

    let items = &financial.sections[0].items;
    let item_ids: Vec<_> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(item_ids, vec!["medicare", "ssdi-ssi", "ssdi-ssi-2"]);
    assert_eq!(items[0].last_updated, "2023-01-01");
    assert_eq!(items[1].last_updated, NOW);
    assert_eq!(items[0].sources.as_deref(), Some("https://www.medicare.gov"));

    assert!(doc.pages[CARE_RECIPIENT_PAGE].tabs.is_empty());
    assert!(TreeOperations::is_densely_ordered(&doc));
    assert!(doc.validate().is_ok());
}

#[test]
fn test_current_documents_pass_through_unchanged() {
    let doc = parse_outline_at(OUTLINE, NOW).unwrap();
    let value = serde_json::to_value(&doc).unwrap();

    assert_eq!(FormatMigrator::normalize(value).unwrap(), doc);
}
