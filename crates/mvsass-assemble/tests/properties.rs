//! Property tests for library assembly.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use proptest::prelude::*;
use tempfile::tempdir;

use mvsass_assemble::{AssembleConfig, Assembler};

/// Fragment names: distinct stems, some nested under `functions/`.
fn fragment_names() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-z]{1,6}", 1..8).prop_flat_map(|stems| {
        let stems: Vec<String> = stems.into_iter().collect();
        let len = stems.len();
        proptest::collection::vec(any::<bool>(), len).prop_map(move |nested| {
            stems
                .iter()
                .zip(nested)
                .map(|(stem, nested)| {
                    if nested {
                        format!("functions/_{stem}.scss")
                    } else {
                        format!("_{stem}.scss")
                    }
                })
                .collect()
        })
    })
}

/// Write fragments with a marker body and return the assembled output.
fn assemble(root: &Path, names: &[String], creation_order: &[usize], manifest: &[String]) -> String {
    let src = root.join("src");
    for &i in creation_order {
        let path = src.join(&names[i]);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("/*{}*/", names[i])).unwrap();
    }

    let config = AssembleConfig {
        source_root: src,
        exclude: vec![],
        order: manifest.to_vec(),
        output: root.join("dist/mvsass.scss"),
        auxiliary: None,
        auxiliary_dest: root.join("dist"),
        ..Default::default()
    };

    Assembler::new(config).assemble().unwrap();
    fs::read_to_string(root.join("dist/mvsass.scss")).unwrap()
}

fn positions(output: &str, names: &[String]) -> Vec<usize> {
    names
        .iter()
        .map(|n| output.find(&format!("/*{}*/", n)).unwrap())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: assembling the same inputs twice yields identical bytes.
    #[test]
    fn property_assembly_is_deterministic(
        names in fragment_names(),
        seed in any::<u64>(),
    ) {
        let manifest: Vec<String> = names.iter().step_by(2).cloned().collect();
        let mut order: Vec<usize> = (0..names.len()).collect();
        order.rotate_left((seed as usize) % names.len());

        let first = tempdir().unwrap();
        let second = tempdir().unwrap();

        let a = assemble(first.path(), &names, &order, &manifest);
        order.reverse();
        let b = assemble(second.path(), &names, &order, &manifest);

        prop_assert_eq!(a, b);
    }

    /// PROPERTY: manifested fragments appear in manifest order, before every
    /// unlisted fragment, and every fragment appears exactly once.
    #[test]
    fn property_manifest_order_is_respected(
        (names, mut manifest) in fragment_names()
            .prop_flat_map(|names| (Just(names.clone()), Just(names).prop_shuffle())),
    ) {
        let listed_count = manifest.len() / 2 + 1;
        manifest.truncate(listed_count);

        let temp = tempdir().unwrap();
        let creation: Vec<usize> = (0..names.len()).rev().collect();
        let output = assemble(temp.path(), &names, &creation, &manifest);

        let listed = positions(&output, &manifest);
        prop_assert!(listed.windows(2).all(|w| w[0] < w[1]));

        let listed_set: BTreeSet<&String> = manifest.iter().collect();
        let unlisted: Vec<String> = names
            .iter()
            .filter(|n| !listed_set.contains(n))
            .cloned()
            .collect();
        let last_listed = listed.iter().max().copied().unwrap_or(0);
        for pos in positions(&output, &unlisted) {
            prop_assert!(pos > last_listed);
        }

        for name in &names {
            prop_assert_eq!(output.matches(&format!("/*{}*/", name)).count(), 1);
        }
    }
}
