use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use proc_macro2::Span;
use toml_edit::{Document, Item, Table};

/// Locates an accessible [`syn::Path`] for a workspace crate as seen from the
/// Cargo.toml of the crate invoking a proc-macro.
///
/// # Example
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("vc_serial"));
/// ```
///
/// Reading the manifest is not cheap; call this once per macro invocation
/// and pass the path around.
///
/// # Resolution rules
///
/// 1. If the requested crate is listed in `dependencies`, return `::crate_name`.
/// 2. If the name begins with `vc_` and the caller depends on the facade
///    `vc_data`, return `::vc_data::short_name` (e.g. `vc_serial` -> `::vc_data::serial`).
/// 3. Repeat 1-2 in `dev-dependencies`.
/// 4. Otherwise fall back to `::crate_name`.
///
/// A crate naming itself from its own doctests or integration tests hits
/// rule 4. Library code of that crate needs `extern crate self as crate_name;`
/// in its root for the fallback to resolve.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FACADE_NAME: &str = "vc_data";
const CRATE_PREFIX: &str = "vc_";

impl Manifest {
    #[inline(never)]
    fn manifest_path() -> PathBuf {
        let dir = env::var_os("CARGO_MANIFEST_DIR")
            .unwrap_or_else(|| panic!("CARGO_MANIFEST_DIR should be set by cargo"));
        let path = PathBuf::from(dir).join("Cargo.toml");
        assert!(path.exists(), "no cargo manifest at {}", path.display());
        path
    }

    #[inline(never)]
    fn modified_time(path: &Path) -> SystemTime {
        std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    #[inline(never)]
    fn read_manifest(path: &Path) -> Document<Box<str>> {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|err| panic!("cannot read {}: {err}", path.display()))
            .into_boxed_str();
        Document::parse(text).unwrap_or_else(|err| panic!("cannot parse {}: {err}", path.display()))
    }

    fn absolute(segments: &[&str]) -> syn::Path {
        let mut path = syn::Path {
            leading_colon: Some(Default::default()),
            segments: Default::default(),
        };
        for segment in segments {
            path.segments
                .push(syn::Ident::new(segment, Span::call_site()).into());
        }
        path
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::absolute(&[name]));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        deps.contains_key(FACADE_NAME)
            .then(|| Self::absolute(&[FACADE_NAME, module]))
    }

    /// Returns the path of the crate `name` as resolved from the caller's
    /// Cargo.toml. See the type docs for the rules.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .find_map(|section| match self.manifest.get(section) {
                Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
                _ => None,
            })
            .unwrap_or_else(|| Self::absolute(&[name]))
    }

    /// Runs `func` with the caller's parsed Cargo.toml.
    ///
    /// Manifests are cached per path and re-read when their modification
    /// time changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified_time = Self::modified_time(&path);

        {
            let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = manifests.get(&path)
                && manifest.modified_time == modified_time
            {
                return func(manifest);
            }
        }

        let manifest = Manifest {
            manifest: Self::read_manifest(&path),
            modified_time,
        };
        let result = func(&manifest);
        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);
        result
    }
}

#[cfg(test)]
mod tests {
    use quote::ToTokens;

    use super::Manifest;

    fn resolve(toml: &str, name: &str) -> String {
        let manifest = Manifest {
            manifest: toml_edit::Document::parse(toml.into()).unwrap(),
            modified_time: std::time::SystemTime::UNIX_EPOCH,
        };
        manifest
            .get_crate_path(name)
            .to_token_stream()
            .to_string()
            .replace(' ', "")
    }

    #[test]
    fn direct_dependency() {
        assert_eq!(resolve("[dependencies]\nvc_serial = \"0.1\"", "vc_serial"), "::vc_serial");
    }

    #[test]
    fn through_facade() {
        assert_eq!(resolve("[dependencies]\nvc_data = \"0.1\"", "vc_serial"), "::vc_data::serial");
        assert_eq!(resolve("[dev-dependencies]\nvc_data = \"0.1\"", "vc_serial"), "::vc_data::serial");
    }

    #[test]
    fn fallback() {
        assert_eq!(resolve("[package]\nname = \"vc_serial\"", "vc_serial"), "::vc_serial");
        assert_eq!(resolve("[dependencies]\nvc_data = \"0.1\"", "serde"), "::serde");
    }
}
