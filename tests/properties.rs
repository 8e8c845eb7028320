use memfs::{MemoryFileSystem, ResolvedPath};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,8}(\\.txt)?"
}

proptest! {
    #[test]
    fn resolve_is_idempotent(path in "[a-z./]{0,24}") {
        let once = ResolvedPath::resolve(&path);
        let twice = ResolvedPath::resolve(&once.to_string());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn resolved_components_are_plain_names(path in "[a-z./]{0,24}") {
        let resolved = ResolvedPath::resolve(&path);
        for component in resolved.components() {
            prop_assert!(!component.is_empty());
            prop_assert!(component != "." && component != "..");
            prop_assert!(!component.contains('/'));
        }
    }

    #[test]
    fn writefile_then_readfile(
        dirs in prop::collection::vec(name(), 0..4),
        file in name(),
        content in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut fs = MemoryFileSystem::new();
        let dir = format!("/{}", dirs.join("/"));
        fs.makedirs(&dir, true).unwrap();

        let path = format!("{}/{}", dir.trim_end_matches('/'), file);
        prop_assume!(!fs.isdir(&path));
        fs.writefile(&path, &content).unwrap();
        prop_assert_eq!(fs.readfile(&path).unwrap(), content);
    }

    #[test]
    fn makedirs_exist_ok_is_idempotent(dirs in prop::collection::vec(name(), 1..5)) {
        let mut fs = MemoryFileSystem::new();
        let path = format!("/{}", dirs.join("/"));

        fs.makedirs(&path, true).unwrap();
        let first = fs.snapshot();
        fs.makedirs(&path, true).unwrap();
        prop_assert_eq!(fs.snapshot(), first);
        prop_assert_eq!(fs.node_count(), dirs.len());
    }
}
