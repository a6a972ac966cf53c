use std::fs;
use std::path::Path;

use anyhow::Context;
use oasplit_core::bundle::{read_layout, reassemble};
use oasplit_core::compare::compare_files;
use oasplit_core::graph::check_cycles;
use oasplit_core::split::{
    Decomposer, DocumentSplitExt, SplitConfig, dangling_pointers, resolve_relative,
    unify_duplicates, write_layout,
};
use oasplit_core::yaml::{load_node, write_yaml};
use oasplit_core::{Document, Node, RefTarget};
use rstest::rstest;

mod common;
pub use self::common::*;

fn decompose_into(document: Document, output: &Path) -> anyhow::Result<()> {
    let config = SplitConfig::default();
    let result = document.split_with(Decomposer::new(config.clone()));
    write_layout(&result, output, &config).context("writing layout")
}

#[rstest]
fn should_write_conventional_layout(shop: Document) -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;

    decompose_into(shop, output.path())?;

    insta::assert_snapshot!(layout_files(output.path()).join("\n"), @r"
    components/schemas/Health.yaml
    components/schemas/billing/Invoice.yaml
    components/schemas/orders/Address.yaml
    components/schemas/orders/Order.yaml
    components/schemas/shared/Money.yaml
    components/schemas/users/Role.yaml
    components/schemas/users/User.yaml
    paths/admins/admins.yaml
    paths/health/health.yaml
    paths/invoices/invoices.yaml
    paths/orders/orders.yaml
    paths/users/users.yaml
    paths/users/users__id.yaml
    root.yaml
    ");
    Ok(())
}

#[rstest]
fn should_unify_duplicate_definitions(shop: Document) -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;

    decompose_into(shop, output.path())?;

    for file in layout_files(output.path()) {
        let text = fs::read_to_string(output.path().join(&file))?;
        assert!(!text.contains("User_1"), "{file} still mentions User_1");
    }
    for (file, pointer) in [
        ("paths/users/users.yaml", "/operations/get/responses/200/content/application~1json/schema/items"),
        ("paths/admins/admins.yaml", "/operations/get/responses/200/content/application~1json/schema/items"),
        ("paths/users/users__id.yaml", "/operations/get/responses/200/content/application~1json/schema"),
    ] {
        let node = load_node(output.path().join(file))?;
        let reference = follow(&node, pointer)
            .and_then(Node::as_reference)
            .with_context(|| format!("no reference in {file}"))?;
        assert_eq!(
            reference.target.to_string(),
            "../../components/schemas/users/User.yaml"
        );
    }
    Ok(())
}

#[rstest]
fn should_place_definitions_by_tag(shop: Document) -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;

    decompose_into(shop, output.path())?;

    let schemas = output.path().join("components/schemas");
    assert!(schemas.join("orders/Address.yaml").is_file());
    assert!(schemas.join("shared/Money.yaml").is_file());
    assert!(!schemas.join("orders/Money.yaml").exists());
    assert!(!schemas.join("billing/Money.yaml").exists());

    let order = load_node(schemas.join("orders/Order.yaml"))?;
    let targets: Vec<_> = ["total", "shipping"]
        .into_iter()
        .filter_map(|property| order.get("properties")?.get(property)?.as_reference())
        .map(|reference| reference.target.to_string())
        .collect();
    assert_eq!(targets, ["../shared/Money.yaml", "Address.yaml"]);
    Ok(())
}

#[rstest]
fn should_bundle_local_definition_with_its_path(shop: Document) -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;

    decompose_into(shop, output.path())?;

    let files = layout_files(output.path());
    assert!(!files.iter().any(|file| file.contains("CreateUserRequest")));

    let path_file = load_node(output.path().join("paths/users/users__id.yaml"))?;
    let bundled = follow(&path_file, "/components/schemas/CreateUserRequest")
        .context("CreateUserRequest is bundled")?;
    let role = follow(bundled, "/properties/role")
        .and_then(Node::as_reference)
        .context("role reference")?;
    assert_eq!(role.target.to_string(), "../../components/schemas/users/Role.yaml");

    let body = follow(&path_file, "/operations/put/requestBody/content")
        .and_then(|content| content.get("application/json"))
        .and_then(|media| media.get("schema"))
        .and_then(Node::as_reference)
        .context("request body reference")?;
    assert_eq!(body.target, RefTarget::definition("CreateUserRequest"));

    let operations: Vec<_> = path_file
        .get("operations")
        .and_then(Node::as_mapping)
        .map(|operations| operations.keys().cloned().collect())
        .unwrap_or_default();
    assert_eq!(operations, ["get", "put", "parameters"]);
    Ok(())
}

#[rstest]
fn should_resolve_every_file_reference(shop: Document) -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;
    decompose_into(shop, output.path())?;

    let mut checked = 0;
    for file in layout_files(output.path()) {
        let node = load_node(output.path().join(&file))?;
        let mut broken = Vec::new();
        node.visit_references(&mut |reference| match &reference.target {
            RefTarget::External { path, anchor } => {
                let target = output.path().join(resolve_relative(Path::new(&file), path));
                let resolved = load_node(&target).ok().is_some_and(|target| match anchor {
                    Some(anchor) => follow(&target, anchor).is_some(),
                    None => true,
                });
                if !resolved {
                    broken.push(reference.target.to_string());
                }
                checked += 1;
            }
            RefTarget::Definition(name) => {
                if follow(&node, &format!("/components/schemas/{name}")).is_none() {
                    broken.push(reference.target.to_string());
                }
            }
            RefTarget::Pointer(_) => {}
        });
        assert!(broken.is_empty(), "{file} has broken references: {broken:?}");
    }
    assert_eq!(checked, 17);
    Ok(())
}

#[rstest]
fn should_only_keep_non_schema_pointers_in_path_files(shop: Document) -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;
    decompose_into(shop, output.path())?;

    let mut dangling = Vec::new();
    for file in layout_files(output.path()) {
        let node = load_node(output.path().join(&file))?;
        for pointer in dangling_pointers(&node) {
            dangling.push(format!("{file}: {pointer}"));
        }
    }

    insta::assert_snapshot!(dangling.join("\n"), @r"
    paths/users/users.yaml: #/components/parameters/Page
    paths/users/users__id.yaml: #/components/responses/NotFound
    ");
    Ok(())
}

#[rstest]
fn should_produce_an_acyclic_layout(shop: Document) -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;
    decompose_into(shop, output.path())?;

    let report = check_cycles(output.path())?;

    assert!(report.is_clean(), "{report}");
    assert_eq!(report.file_count, 14);
    assert_eq!(report.reference_count, 17);
    Ok(())
}

#[rstest]
fn should_be_deterministic(shop: Document) -> anyhow::Result<()> {
    let first = tempfile::tempdir()?;
    let second = tempfile::tempdir()?;

    decompose_into(shop.clone(), first.path())?;
    decompose_into(shop, second.path())?;

    let files = layout_files(first.path());
    assert_eq!(files, layout_files(second.path()));
    for file in files {
        assert_eq!(
            fs::read(first.path().join(&file))?,
            fs::read(second.path().join(&file))?,
            "{file} differs"
        );
    }
    Ok(())
}

#[rstest]
fn should_replace_previous_output(shop: Document) -> anyhow::Result<()> {
    let output = tempfile::tempdir()?;
    let stale = output.path().join("components/schemas/Stale.yaml");
    fs::create_dir_all(stale.parent().context("parent")?)?;
    fs::write(&stale, "type: object\n")?;

    decompose_into(shop, output.path())?;

    assert!(!stale.exists());
    assert!(output.path().join("root.yaml").is_file());
    Ok(())
}

#[rstest]
fn should_round_trip_through_reassembly(mut shop: Document) -> anyhow::Result<()> {
    let work = tempfile::tempdir()?;
    let layout_dir = work.path().join("layout");
    let config = SplitConfig::default();
    decompose_into(shop.clone(), &layout_dir)?;

    let layout = read_layout(&layout_dir, &config)?;
    let reassembled = reassemble(&layout)?;
    let bundled = work.path().join("bundled.yaml");
    write_yaml(&bundled, &reassembled.into_node())?;

    unify_duplicates(&mut shop);
    let unified = work.path().join("unified.yaml");
    write_yaml(&unified, &shop.into_node())?;

    let comparison = compare_files(&unified, &bundled)?;
    assert!(comparison.identical, "{comparison}");
    Ok(())
}
