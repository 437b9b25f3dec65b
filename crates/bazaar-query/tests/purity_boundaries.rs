// SPDX-License-Identifier: Apache-2.0

#[test]
fn predicate_builders_do_not_pull_io_or_db_deps() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let pure_modules = [
        "src/predicate.rs",
        "src/tuple.rs",
        "src/search.rs",
        "src/filters.rs",
        "src/cursor.rs",
        "src/limits.rs",
    ];
    let forbidden = ["rusqlite", "tokio", "std::fs", "std::net", "std::process"];

    for module in pure_modules {
        let path = root.join(module);
        let text = std::fs::read_to_string(&path).expect("read pure module");
        for needle in forbidden {
            assert!(
                !text.contains(needle),
                "forbidden import `{needle}` in {module}"
            );
        }
    }
}
