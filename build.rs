use std::collections::HashSet;
use std::path::Path;

fn main() {
    let catalog_path = Path::new("catalogs/sample_medicines.json");
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n",
        catalog_path.display()
    );

    let catalog_contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    let catalog: serde_json::Value = serde_json::from_str(&catalog_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATALOG BUILD ERROR: Root must be a JSON object\n"
    );

    for field in ["version", "created_at"] {
        assert!(
            catalog.get(field).and_then(serde_json::Value::as_str).is_some(),
            "\n\nCATALOG BUILD ERROR: Missing string field '{field}'\n"
        );
    }

    let refs = catalog
        .get("references")
        .and_then(serde_json::Value::as_array)
        .unwrap_or_else(|| {
            panic!("\n\nCATALOG BUILD ERROR: 'references' must be an array\n");
        });

    validate_references(refs);

    println!("cargo:warning=Validated catalog: {} medicines", refs.len());
}

fn validate_references(refs: &[serde_json::Value]) {
    let mut seen = HashSet::new();

    for (i, reference) in refs.iter().enumerate() {
        let id = reference
            .get("id")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or_else(|| {
                panic!("\n\nCATALOG BUILD ERROR: Entry at index {i} has no numeric 'id'\n");
            });
        assert!(
            seen.insert(id),
            "\n\nCATALOG BUILD ERROR: Duplicate id {id} (index {i})\n"
        );

        let name = |field: &str| {
            reference
                .get(field)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_else(|| {
                    panic!("\n\nCATALOG BUILD ERROR: Entry {id} missing '{field}'\n");
                })
                .trim()
                .to_string()
        };
        let generic = name("generic_name");
        let brand = name("brand_name");
        assert!(
            !generic.is_empty() || !brand.is_empty(),
            "\n\nCATALOG BUILD ERROR: Entry {id} has neither a generic nor a brand name\n"
        );
    }
}

fn set_build_dependencies() {
    println!("cargo:rerun-if-changed=catalogs/sample_medicines.json");
    println!("cargo:rerun-if-changed=build.rs");
}
