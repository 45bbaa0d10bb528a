use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use super::*;
use crate::cache::PackageDirs;
use crate::git::fake::FakeCloner;
use crate::net::mock::MockFetch;

fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn spec(entries: &[(&str, Option<&str>)]) -> FileSpec {
    entries
        .iter()
        .map(|(source, target)| (*source, target.map(str::to_string)))
        .collect()
}

struct Fixture {
    _home: TempDir,
    dirs: PackageDirs,
}

impl Fixture {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let dirs = PackageDirs::new(home.path(), "audit").unwrap();
        fs::create_dir_all(&dirs.install).unwrap();
        Self { _home: home, dirs }
    }

    fn installer<'a>(&'a self, fetch: &'a MockFetch, cloner: &'a FakeCloner) -> FileInstaller<'a> {
        FileInstaller::new(&self.dirs, fetch, cloner, Console::new(true))
    }
}

#[cfg(unix)]
fn assert_links_into_cache(link: &Path, cache: &Path) {
    let meta = fs::symlink_metadata(link).unwrap();
    assert!(meta.file_type().is_symlink(), "{} is not a symlink", link.display());
    let resolved = fs::canonicalize(link).unwrap();
    assert!(resolved.is_file());
    assert!(resolved.starts_with(fs::canonicalize(cache).unwrap()));
}

#[test]
#[cfg(unix)]
fn test_zip_url_into_directory_is_unpacked_and_linked() {
    let fx = Fixture::new();
    let fetch = MockFetch::new().with_file(
        "https://host/x.zip",
        &zip_bytes(&[("x/a.txt", "a"), ("x/sub/b.txt", "b")]),
    );
    let cloner = FakeCloner::default();

    let installed = fx
        .installer(&fetch, &cloner)
        .install(&spec(&[("https://host/x.zip", Some("res/"))]), InstallMode::Configuration)
        .unwrap();

    let res = fx.dirs.install.join("res");
    assert_eq!(installed, vec![res.join("a.txt"), res.join("sub/b.txt")]);
    for link in &installed {
        assert_links_into_cache(link, &fx.dirs.cache);
    }
    assert_eq!(fs::read_to_string(res.join("sub/b.txt")).unwrap(), "b");
    assert!(fx.dirs.archive.join("res/x.zip").is_file());
    assert!(!res.join("x").exists());
}

#[test]
fn test_cached_items_are_not_fetched_again() {
    let fx = Fixture::new();
    let files = spec(&[
        ("https://host/x.zip", Some("res/")),
        ("https://host/cat.RData", Some("data/")),
        ("acme/widgets@v1", None),
    ]);
    let first = MockFetch::new()
        .with_file("https://host/x.zip", &zip_bytes(&[("a.txt", "a")]))
        .with_file("https://host/cat.RData", b"meow")
        .with_file(
            "https://codeload.github.com/acme/widgets/zip/v1",
            &zip_bytes(&[("widgets-v1/README.md", "hi")]),
        );
    let cloner = FakeCloner::default();
    fx.installer(&first, &cloner)
        .install(&files, InstallMode::Configuration)
        .unwrap();
    assert_eq!(first.downloads(), 3);

    fs::remove_dir_all(&fx.dirs.install).unwrap();
    fs::create_dir_all(&fx.dirs.install).unwrap();

    let second = MockFetch::new();
    let installed = fx
        .installer(&second, &cloner)
        .install(&files, InstallMode::Configuration)
        .unwrap();

    assert_eq!(second.request_count(), 0);
    assert_eq!(installed.len(), 3);
    assert_eq!(
        fs::read_to_string(fx.dirs.install.join("data/cat.RData")).unwrap(),
        "meow"
    );
    assert_eq!(
        fs::read_to_string(fx.dirs.install.join("widgets/README.md")).unwrap(),
        "hi"
    );
}

#[test]
fn test_plain_file_targets() {
    let fx = Fixture::new();
    let fetch = MockFetch::new()
        .with_file("https://host/def.RData", b"woof")
        .with_named_file("https://host/label", b"l", "labels.txt")
        .with_file("https://host/uvw.zip", b"not unpacked");
    let cloner = FakeCloner::default();

    fx.installer(&fetch, &cloner)
        .install(
            &spec(&[
                ("https://host/def.RData", Some("data/dog.RData")),
                ("https://host/label", None),
                ("https://host/uvw.zip", Some("res/rst.zip")),
            ]),
            InstallMode::Configuration,
        )
        .unwrap();

    let pkg = &fx.dirs.install;
    assert_eq!(fs::read_to_string(pkg.join("data/dog.RData")).unwrap(), "woof");
    assert_eq!(fs::read_to_string(pkg.join("labels.txt")).unwrap(), "l");
    assert_eq!(fs::read_to_string(pkg.join("res/rst.zip")).unwrap(), "not unpacked");
    assert!(fx.dirs.cache.join("res/rst.zip").is_file());
}

#[test]
fn test_missing_item_does_not_stop_the_others() {
    let fx = Fixture::new();
    let fetch = MockFetch::new().with_file("https://host/b.csv", b"b");
    let cloner = FakeCloner::default();

    let result = fx.installer(&fetch, &cloner).install(
        &spec(&[("https://host/a.csv", None), ("https://host/b.csv", None)]),
        InstallMode::Configuration,
    );

    match result {
        Err(MlhubError::DependencyFileNotFound { location }) => {
            assert_eq!(location, "https://host/a.csv");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(fx.dirs.install.join("b.csv").exists());
    assert!(!fx.dirs.cache.join("a.csv").exists());
}

#[test]
fn test_unreachable_host_is_fatal() {
    let fx = Fixture::new();
    let fetch = MockFetch::new().with_unreachable("https://host/a.csv");
    let cloner = FakeCloner::default();

    let result = fx
        .installer(&fetch, &cloner)
        .install(&spec(&[("https://host/a.csv", None)]), InstallMode::Configuration);
    assert!(matches!(result, Err(MlhubError::LocationUnreachable { .. })));
}

#[test]
fn test_repository_directory_keeps_only_that_directory() {
    let fx = Fixture::new();
    let fetch = MockFetch::new()
        .with_file(
            "https://api.github.com/repos/acme/widgets/contents/doc?ref=dev",
            br#"[{"name": "a.md", "type": "file"}]"#,
        )
        .with_file(
            "https://codeload.github.com/acme/widgets/zip/dev",
            &zip_bytes(&[
                ("widgets-dev/README.md", "top"),
                ("widgets-dev/doc/a.md", "A"),
                ("widgets-dev/doc/img/b.png", "B"),
            ]),
        );
    let cloner = FakeCloner::default();

    fx.installer(&fetch, &cloner)
        .install(&spec(&[("acme/widgets@dev:doc", Some("repo/"))]), InstallMode::Configuration)
        .unwrap();

    let doc = fx.dirs.install.join("repo/doc");
    assert_eq!(fs::read_to_string(doc.join("a.md")).unwrap(), "A");
    assert_eq!(fs::read_to_string(doc.join("img/b.png")).unwrap(), "B");
    assert!(!fx.dirs.install.join("repo/doc/README.md").exists());
    assert!(fx.dirs.archive.join("repo/doc/acme-widgets-dev.zip").is_file());
}

#[test]
fn test_private_repository_falls_back_to_clone() {
    let fx = Fixture::new();
    let fetch = MockFetch::new();
    let cloner = FakeCloner::with_files(&[("doc/a.md", "secret"), ("README.md", "top")]);

    fx.installer(&fetch, &cloner)
        .install(&spec(&[("acme/private@v2:doc", None)]), InstallMode::Configuration)
        .unwrap();

    assert_eq!(
        cloner.calls().as_slice(),
        &[("git@github.com:acme/private.git".to_string(), "v2".to_string())]
    );
    assert_eq!(
        fs::read_to_string(fx.dirs.install.join("doc/a.md")).unwrap(),
        "secret"
    );
    assert!(!fx.dirs.install.join("README.md").exists());
}

#[test]
fn test_private_repository_renamed_by_target() {
    let fx = Fixture::new();
    let fetch = MockFetch::new();
    let cloner = FakeCloner::with_files(&[("MLHUB.yaml", "meta: {}"), ("src/x.R", "x")]);

    fx.installer(&fetch, &cloner)
        .install(&spec(&[("acme/private@v2", Some("vendored"))]), InstallMode::Configuration)
        .unwrap();

    // no archive for the whole repository either, so it was cloned
    assert_eq!(fetch.downloads(), 1);
    assert_eq!(cloner.calls().len(), 1);
    let vendored = fx.dirs.install.join("vendored");
    assert!(vendored.join("MLHUB.yaml").is_file());
    assert!(vendored.join("src/x.R").is_file());
    assert!(!vendored.join(".git").exists());
}

fn staged_package() -> TempDir {
    let staged = TempDir::new().unwrap();
    let root = staged.path();
    for (rel, body) in [
        ("description/README.md", "readme"),
        ("res/tree.RData", "tree"),
        ("res/forest.RData", "forest"),
        ("images/a.png", "a"),
        ("audio/b.wav", "b"),
        ("scripts/run.sh", "run"),
        ("scripts/lib/util.R", "util"),
    ] {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
    staged
}

#[test]
fn test_local_entries_are_moved_into_place() {
    let fx = Fixture::new();
    let staged = staged_package();
    let fetch = MockFetch::new();
    let cloner = FakeCloner::default();

    fx.installer(&fetch, &cloner)
        .install(
            &spec(&[
                ("description/README.md", None),
                ("res/tree.RData", Some("resource/")),
                ("res/forest.RData", Some("resource/f.RData")),
                ("images/", Some("img")),
                ("audio/", Some("resource/")),
                ("scripts/*", None),
                ("https://host/remote.csv", None),
            ]),
            InstallMode::Installation {
                staged: staged.path(),
            },
        )
        .unwrap();

    let pkg = &fx.dirs.install;
    for (rel, body) in [
        ("README.md", "readme"),
        ("resource/tree.RData", "tree"),
        ("resource/f.RData", "forest"),
        ("img/a.png", "a"),
        ("resource/audio/b.wav", "b"),
        ("run.sh", "run"),
        ("lib/util.R", "util"),
    ] {
        assert_eq!(fs::read_to_string(pkg.join(rel)).unwrap(), body, "{rel}");
    }
    assert!(!staged.path().join("res/tree.RData").exists());
    assert_eq!(fetch.request_count(), 0);
}

#[test]
fn test_missing_local_entry_removes_package() {
    let fx = Fixture::new();
    let staged = staged_package();
    fs::write(fx.dirs.install.join("MLHUB.yaml"), "meta: {}").unwrap();
    let fetch = MockFetch::new();
    let cloner = FakeCloner::default();

    let result = fx.installer(&fetch, &cloner).install(
        &spec(&[("res/tree.RData", None), ("res/absent.RData", None)]),
        InstallMode::Installation {
            staged: staged.path(),
        },
    );

    assert!(matches!(result, Err(MlhubError::PackageFileMissing { .. })));
    assert!(!fx.dirs.install.exists());
}

#[test]
fn test_configuration_pass_skips_local_entries() {
    let fx = Fixture::new();
    let fetch = MockFetch::new();
    let cloner = FakeCloner::default();

    let installed = fx
        .installer(&fetch, &cloner)
        .install(&spec(&[("res/absent.RData", None)]), InstallMode::Configuration)
        .unwrap();
    assert!(installed.is_empty());
    assert!(fx.dirs.install.exists());
}

#[test]
fn test_server_named_file_is_found_in_cache() {
    let fx = Fixture::new();
    let files = spec(&[("https://host/download", Some("data/"))]);
    let first = MockFetch::new().with_named_file("https://host/download", b"a,b", "table.csv");
    let cloner = FakeCloner::default();

    let installed = fx
        .installer(&first, &cloner)
        .install(&files, InstallMode::Configuration)
        .unwrap();
    assert_eq!(installed, vec![fx.dirs.install.join("data/table.csv")]);

    let second = MockFetch::new();
    let installed = fx
        .installer(&second, &cloner)
        .install(&files, InstallMode::Configuration)
        .unwrap();

    assert_eq!(second.request_count(), 0);
    assert_eq!(
        fs::read_to_string(&installed[0]).unwrap(),
        "a,b"
    );
}

#[test]
#[cfg(unix)]
fn test_links_resolve_under_relative_home() {
    let base = tempfile::tempdir_in(".").unwrap();
    let home = Path::new(base.path().file_name().unwrap());
    let dirs = PackageDirs::new(home, "audit").unwrap();
    fs::create_dir_all(&dirs.install).unwrap();
    let fetch = MockFetch::new().with_file("https://host/cat.RData", b"meow");
    let cloner = FakeCloner::default();

    let installed = FileInstaller::new(&dirs, &fetch, &cloner, Console::new(true))
        .install(&spec(&[("https://host/cat.RData", Some("data/"))]), InstallMode::Configuration)
        .unwrap();

    let link = &installed[0];
    assert!(fs::read_link(link).unwrap().is_absolute());
    assert_eq!(fs::read_to_string(link).unwrap(), "meow");
}
