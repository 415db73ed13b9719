//! Unit tests for release table loading and lookup.

use super::*;
use crate::artefact::naming::AssetName;
use crate::platform::{Arch, Os};
use rstest::rstest;
use std::collections::HashSet;

/// Render a four-entry table whose URLs live under `base`.
fn complete_table(base: &str) -> String {
    let mut doc = String::from("version = \"9.9.9\"\n");
    for (index, platform) in Platform::ALL.iter().enumerate() {
        let digest = format!("{index:x}").repeat(64);
        doc.push_str(&format!(
            concat!(
                "\n[[artefact]]\n",
                "os = \"{os}\"\n",
                "arch = \"{arch}\"\n",
                "url = \"{base}/piam-anc-{suffix}.tar.gz\"\n",
                "sha256 = \"{digest}\"\n",
            ),
            os = platform.os(),
            arch = platform.arch(),
            base = base,
            suffix = platform.asset_suffix(),
            digest = digest,
        ));
    }
    doc
}

#[test]
fn pinned_table_covers_all_platforms() {
    let table = ReleaseTable::pinned().expect("pinned table is valid");
    assert_eq!(table.version(), "1.0.0");
    for platform in Platform::ALL {
        let descriptor = table.resolve(platform).expect("platform is covered");
        assert_eq!(descriptor.platform(), platform);
    }
}

#[test]
fn pinned_digests_are_lowercase_sixty_four_char_hex() {
    let table = ReleaseTable::pinned().expect("pinned table is valid");
    for descriptor in table.descriptors() {
        let digest = descriptor.sha256().to_hex();
        assert_eq!(digest.len(), 64);
        assert!(
            digest
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }
}

#[test]
fn pinned_urls_are_distinct_and_platform_specific() {
    let table = ReleaseTable::pinned().expect("pinned table is valid");
    let urls: HashSet<&str> = table.descriptors().map(ArtefactDescriptor::url).collect();
    assert_eq!(urls.len(), Platform::ALL.len());
    for descriptor in table.descriptors() {
        let url = descriptor.url();
        assert!(url.starts_with("https://github.com/ExclamationLabs/piam-anc/releases/"));
        assert!(url.contains("/v1.0.0/"));
        assert!(
            url.ends_with(&format!("{}.tar.gz", descriptor.platform().asset_suffix())),
            "{url} does not name its platform"
        );
    }
}

#[test]
fn pinned_urls_follow_release_asset_naming() {
    let table = ReleaseTable::pinned().expect("pinned table is valid");
    for descriptor in table.descriptors() {
        let expected = format!(
            "https://github.com/ExclamationLabs/piam-anc/releases/download/v{}/{}",
            table.version(),
            AssetName::new(descriptor.platform())
        );
        assert_eq!(descriptor.url(), expected);
    }
}

#[rstest]
#[case::macos_intel("macos", "x86_64", Os::Macos, Arch::Amd64)]
#[case::macos_apple_silicon("darwin", "arm64", Os::Macos, Arch::Arm64)]
#[case::linux_intel("linux", "amd64", Os::Linux, Arch::Amd64)]
#[case::linux_arm("linux", "aarch64", Os::Linux, Arch::Arm64)]
fn resolve_names_selects_matching_descriptor(
    #[case] os: &str,
    #[case] arch: &str,
    #[case] expected_os: Os,
    #[case] expected_arch: Arch,
) {
    let table = ReleaseTable::pinned().expect("pinned table is valid");
    let descriptor = table.resolve_names(os, arch).expect("supported");
    assert_eq!(descriptor.platform(), Platform::new(expected_os, expected_arch));
}

#[rstest]
#[case::windows("windows", "amd64")]
#[case::riscv("linux", "riscv64")]
#[case::ppc("linux", "powerpc64")]
#[case::unknown_os("plan9", "arm64")]
fn resolve_names_rejects_unsupported_pairs(#[case] os: &str, #[case] arch: &str) {
    let table = ReleaseTable::pinned().expect("pinned table is valid");
    let err = table.resolve_names(os, arch).expect_err("unsupported");
    assert_eq!(err.os, os);
    assert_eq!(err.arch, arch);
}

#[test]
fn parses_complete_custom_table() {
    let table =
        ReleaseTable::from_toml_str(&complete_table("file:///srv/mirror")).expect("valid table");
    assert_eq!(table.version(), "9.9.9");
    assert_eq!(table.descriptors().count(), 4);
}

#[test]
fn rejects_sixty_six_character_digest() {
    let doc = complete_table("https://example.test").replacen(
        &"0".repeat(64),
        &"0".repeat(66),
        1,
    );
    let err = ReleaseTable::from_toml_str(&doc).expect_err("overlong digest rejected");
    assert!(
        matches!(err, ArtefactError::InvalidEntry { ref reason, .. } if reason.contains("64 hex characters")),
        "unexpected error: {err}"
    );
}

#[test]
fn rejects_missing_platform() {
    let doc = complete_table("https://example.test");
    let truncated = doc
        .rsplit_once("[[artefact]]")
        .map(|(head, _)| head.to_owned())
        .expect("table has entries");
    let err = ReleaseTable::from_toml_str(&truncated).expect_err("incomplete table rejected");
    assert_eq!(
        err,
        ArtefactError::MissingPlatform {
            platform: "linux/arm64".to_owned(),
        }
    );
}

#[test]
fn rejects_duplicate_platform() {
    let mut doc = complete_table("https://example.test");
    doc.push_str(concat!(
        "\n[[artefact]]\n",
        "os = \"linux\"\n",
        "arch = \"amd64\"\n",
        "url = \"https://example.test/mirror/piam-anc-linux-amd64.tar.gz\"\n",
    ));
    doc.push_str(&format!("sha256 = \"{}\"\n", "e".repeat(64)));
    let err = ReleaseTable::from_toml_str(&doc).expect_err("duplicate rejected");
    assert!(matches!(err, ArtefactError::DuplicatePlatform { .. }), "got {err:?}");
}

#[rstest]
#[case::other_platform_archive("piam-anc-darwin-amd64.tar.gz")]
#[case::renamed_archive("piam-anc.tar.gz")]
#[case::directory_url("")]
fn rejects_url_not_naming_platform_asset(#[case] file_name: &str) {
    let doc = complete_table("https://example.test")
        .replace("piam-anc-darwin-arm64.tar.gz", file_name);
    let err = ReleaseTable::from_toml_str(&doc).expect_err("misnamed asset rejected");
    assert!(
        matches!(
            err,
            ArtefactError::InvalidEntry { ref platform, ref reason }
                if platform == "macos/arm64" && reason.contains("piam-anc-darwin-arm64.tar.gz")
        ),
        "got {err:?}"
    );
}

#[test]
fn rejects_unknown_platform_entry() {
    let doc = complete_table("https://example.test").replacen("os = \"linux\"", "os = \"windows\"", 1);
    let err = ReleaseTable::from_toml_str(&doc).expect_err("unknown platform rejected");
    assert!(matches!(err, ArtefactError::UnknownPlatform { .. }), "got {err:?}");
}

#[rstest]
#[case::empty("")]
#[case::spaced("1.0 beta")]
fn rejects_invalid_version(#[case] version: &str) {
    let doc = complete_table("https://example.test")
        .replace("version = \"9.9.9\"", &format!("version = \"{version}\""));
    let err = ReleaseTable::from_toml_str(&doc).expect_err("version rejected");
    assert!(matches!(err, ArtefactError::InvalidVersion { .. }), "got {err:?}");
}

#[test]
fn rejects_unknown_fields() {
    let doc = format!("channel = \"beta\"\n{}", complete_table("https://example.test"));
    let err = ReleaseTable::from_toml_str(&doc).expect_err("unknown field rejected");
    assert!(matches!(err, ArtefactError::Parse { .. }), "got {err:?}");
}

#[test]
fn from_file_reports_unreadable_path() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = camino::Utf8PathBuf::try_from(temp.path().join("missing.toml")).expect("UTF-8");
    let err = ReleaseTable::from_file(&path).expect_err("missing file");
    assert!(matches!(err, ArtefactError::Unreadable { .. }), "got {err:?}");
}

#[test]
fn from_file_loads_written_table() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = camino::Utf8PathBuf::try_from(temp.path().join("release.toml")).expect("UTF-8");
    std::fs::write(&path, complete_table("http://mirror.internal")).expect("write table");
    let table = ReleaseTable::from_file(&path).expect("valid table");
    assert_eq!(table.version(), "9.9.9");
}
