//! Source file scanner for discovering coding annotations.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use proc_macro2::TokenStream;
use syn::visit::{self, Visit};
use syn::{Attribute, Item, ItemImpl, ItemMod, Meta, Type};
use walkdir::WalkDir;
use wirecode_codegen::{ConformanceSet, MacroIdentity};

/// An item carrying one coding annotation.
///
/// An item with several annotations is reported once per annotation.
#[derive(Debug, Clone)]
pub struct AnnotatedItem {
    pub file: PathBuf,
    /// Module the item lives in, e.g. `crate::billing::invoice`.
    pub module_path: String,
    pub identity: MacroIdentity,
    pub item: Item,
    /// Capabilities implemented by hand for the same type in the same file.
    pub existing: ConformanceSet,
}

impl AnnotatedItem {
    pub fn name(&self) -> String {
        match &self.item {
            Item::Struct(item) => item.ident.to_string(),
            Item::Enum(item) => item.ident.to_string(),
            Item::Union(item) => item.ident.to_string(),
            Item::Fn(item) => item.sig.ident.to_string(),
            Item::Trait(item) => item.ident.to_string(),
            Item::Type(item) => item.ident.to_string(),
            Item::Const(item) => item.ident.to_string(),
            Item::Static(item) => item.ident.to_string(),
            Item::Mod(item) => item.ident.to_string(),
            _ => "<item>".to_string(),
        }
    }

    /// `module::Name`, used to label expansions and findings.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module_path, self.name())
    }
}

/// Walks source trees and collects annotated items.
#[derive(Debug, Clone)]
pub struct Scanner {
    crate_name: String,
    excluded: Vec<PathBuf>,
    runtime: Option<Vec<String>>,
}

impl Scanner {
    pub fn new(crate_name: impl Into<String>) -> Self {
        Self {
            crate_name: crate_name.into(),
            excluded: Vec::new(),
            runtime: None,
        }
    }

    /// Also count trait impls written against `path`, besides bare and
    /// `wirecode::` paths.
    pub fn runtime(mut self, path: &syn::Path) -> Self {
        self.runtime = Some(path_idents(path));
        self
    }

    /// Never scan `path`. Used for the expansion listing itself.
    pub fn exclude(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.excluded.push(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
        self
    }

    /// Scan a directory recursively, or a single file.
    ///
    /// Files that do not parse are skipped with a warning; the compiler
    /// reports them anyway.
    pub fn scan_path(&self, path: &Path) -> Result<Vec<AnnotatedItem>> {
        let base = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };

        let mut items = Vec::new();
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path().extension().is_some_and(|ext| ext == "rs")
                    && !e.path().to_string_lossy().contains("/generated/")
                    && !e.path().to_string_lossy().contains("/target/")
            })
        {
            let file_path = entry.path();
            if self.is_excluded(file_path) {
                continue;
            }

            let content = fs::read_to_string(file_path)
                .with_context(|| format!("Failed to read {}", file_path.display()))?;
            let syntax = match syn::parse_file(&content) {
                Ok(syntax) => syntax,
                Err(err) => {
                    log::warn!("skipping {}: {err}", file_path.display());
                    continue;
                }
            };

            let module_path = compute_module_path(file_path, base, &self.crate_name);
            let found = self
                .scan_source(&syntax, file_path, &module_path)
                .with_context(|| format!("Failed to scan {}", file_path.display()))?;
            log::debug!("{}: {} annotated item(s)", file_path.display(), found.len());
            items.extend(found);
        }

        Ok(items)
    }

    /// Collect the annotated items of one parsed file, including inline modules.
    pub fn scan_source(&self, syntax: &syn::File, file: &Path, module_path: &str) -> Result<Vec<AnnotatedItem>> {
        let mut impls = ImplCollector::new(module_path, &self.crate_name, self.runtime.as_deref());
        impls.visit_file(syntax);

        let mut items = Vec::new();
        collect_items(&syntax.items, file, module_path, &impls.existing, &mut items)?;
        Ok(items)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.excluded.contains(&path)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new("crate")
    }
}

fn collect_items(
    items: &[Item],
    file: &Path,
    module_path: &str,
    existing: &HashMap<String, ConformanceSet>,
    out: &mut Vec<AnnotatedItem>,
) -> Result<()> {
    for item in items {
        if let Item::Mod(module) = item
            && let Some((_, content)) = &module.content
        {
            let nested = format!("{module_path}::{}", module.ident);
            collect_items(content, file, &nested, existing, out)?;
        }

        for attr in item_attrs(item) {
            let Some(identity) = coding_macro(attr).transpose().with_context(|| {
                format!("invalid `#[{}]` in {module_path}", attr_name(attr))
            })?
            else {
                continue;
            };

            let mut annotated = AnnotatedItem {
                file: file.to_path_buf(),
                module_path: module_path.to_string(),
                identity,
                item: item.clone(),
                existing: ConformanceSet::EMPTY,
            };
            annotated.existing = existing.get(&annotated.qualified_name()).copied().unwrap_or_default();
            out.push(annotated);
        }
    }
    Ok(())
}

/// Recognise a coding macro attribute and read its arguments.
fn coding_macro(attr: &Attribute) -> Option<syn::Result<MacroIdentity>> {
    let name = attr_name(attr);
    let args = match &attr.meta {
        Meta::Path(_) => TokenStream::new(),
        Meta::List(list) => list.tokens.clone(),
        Meta::NameValue(meta) => {
            MacroIdentity::from_attribute(&name, TokenStream::new())?;
            return Some(Err(syn::Error::new_spanned(
                meta,
                format!("`#[{name}]` does not take a value"),
            )));
        }
    };
    MacroIdentity::from_attribute(&name, args)
}

fn attr_name(attr: &Attribute) -> String {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
        .unwrap_or_default()
}

fn item_attrs(item: &Item) -> &[Attribute] {
    match item {
        Item::Struct(item) => &item.attrs,
        Item::Enum(item) => &item.attrs,
        Item::Union(item) => &item.attrs,
        Item::Fn(item) => &item.attrs,
        Item::Trait(item) => &item.attrs,
        Item::Type(item) => &item.attrs,
        Item::Const(item) => &item.attrs,
        Item::Static(item) => &item.attrs,
        Item::Impl(item) => &item.attrs,
        Item::Mod(item) => &item.attrs,
        _ => &[],
    }
}

/// Records `impl Decode for T` / `impl Encode for T` blocks, keyed by the
/// module-qualified name of `T`.
struct ImplCollector<'a> {
    crate_name: &'a str,
    runtime: Option<&'a [String]>,
    module: Vec<String>,
    existing: HashMap<String, ConformanceSet>,
}

impl<'a> ImplCollector<'a> {
    fn new(module_path: &str, crate_name: &'a str, runtime: Option<&'a [String]>) -> Self {
        Self {
            crate_name,
            runtime,
            module: module_path.split("::").map(str::to_string).collect(),
            existing: HashMap::new(),
        }
    }

    /// Capability named by a bare trait or one under the runtime crate.
    fn capability(&self, trait_path: &syn::Path) -> Option<ConformanceSet> {
        let mut prefix = path_idents(trait_path);
        let capability = ConformanceSet::from_trait_name(&prefix.pop()?)?;

        let known = (prefix.is_empty() && trait_path.leading_colon.is_none())
            || prefix == ["wirecode"]
            || self.runtime.is_some_and(|runtime| prefix == runtime);
        known.then_some(capability)
    }

    /// Qualified name of the implementing type, resolved from the current module.
    fn qualify(&self, ty: &syn::Path) -> Option<String> {
        if ty.leading_colon.is_some() {
            return None;
        }
        let mut segments = path_idents(ty);
        let name = segments.pop()?;

        let mut module = self.module.clone();
        for segment in segments {
            match segment.as_str() {
                "crate" => module = vec![self.crate_name.to_string()],
                "self" => {}
                "super" => {
                    module.pop();
                }
                other => module.push(other.to_string()),
            }
        }
        module.push(name);
        Some(module.join("::"))
    }
}

impl<'ast> Visit<'ast> for ImplCollector<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        self.module.push(node.ident.to_string());
        visit::visit_item_mod(self, node);
        self.module.pop();
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        if let Some((None, trait_path, _)) = &node.trait_
            && let Some(capability) = self.capability(trait_path)
            && let Type::Path(self_ty) = &*node.self_ty
            && self_ty.qself.is_none()
            && let Some(name) = self.qualify(&self_ty.path)
        {
            let entry = self.existing.entry(name).or_default();
            *entry = entry.union(capability);
        }
        visit::visit_item_impl(self, node);
    }
}

fn path_idents(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|segment| segment.ident.to_string()).collect()
}

/// Compute the module path from a file path.
/// e.g., "src/billing/invoice.rs" -> "crate::billing::invoice"
fn compute_module_path(file_path: &Path, base_path: &Path, crate_name: &str) -> String {
    let relative = file_path.strip_prefix(base_path).unwrap_or(file_path);

    let without_extension = relative.with_extension("");
    let mut parts: Vec<&str> = without_extension
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();

    if let Some(last) = parts.last()
        && (*last == "mod" || *last == "lib" || *last == "main")
    {
        parts.pop();
    }

    if parts.is_empty() {
        crate_name.to_string()
    } else {
        format!("{}::{}", crate_name, parts.join("::"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirecode_codegen::MacroShape;

    fn scan(code: &str) -> Result<Vec<AnnotatedItem>> {
        let syntax: syn::File = syn::parse_str(code).unwrap();
        Scanner::default().scan_source(&syntax, Path::new("src/lib.rs"), "crate")
    }

    #[test]
    fn finds_annotations_by_last_segment() {
        let items = scan(
            r#"
            #[derive(Debug)]
            #[wirecode::codable]
            struct User { id: u64 }

            #[one_of(decode)]
            enum Shape { Circle(f64) }

            struct Plain;
            "#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name(), "User");
        assert_eq!(items[0].identity, MacroIdentity::CODABLE);
        assert_eq!(items[1].identity.shape, MacroShape::OneOf);
        assert_eq!(items[1].identity.requested, ConformanceSet::DECODE);
    }

    #[test]
    fn hand_written_impls_count_as_existing() {
        let items = scan(
            r#"
            #[codable]
            struct Legacy { id: u64 }

            impl wirecode::Decode for Legacy {
                fn decode(decoder: &wirecode::Decoder<'_>) -> Result<Self, wirecode::DecodeError> {
                    todo!()
                }
            }

            impl Default for Legacy {
                fn default() -> Self { todo!() }
            }
            "#,
        )
        .unwrap();

        assert_eq!(items[0].existing, ConformanceSet::DECODE);
    }

    #[test]
    fn inline_modules_extend_the_path() {
        let items = scan(
            r#"
            mod billing {
                #[all_of]
                pub struct Invoice { header: Header }

                impl Encode for Invoice {}
            }
            "#,
        )
        .unwrap();

        assert_eq!(items[0].qualified_name(), "crate::billing::Invoice");
        assert_eq!(items[0].existing, ConformanceSet::ENCODE);
    }

    #[test]
    fn impls_apply_only_to_the_type_in_their_module() {
        let items = scan(
            r#"
            mod a {
                #[codable]
                pub struct Id(u64);

                impl Decode for Id {}
            }

            mod b {
                #[codable]
                pub struct Id(u64);
            }

            #[codable]
            struct Root { id: u64 }

            impl Encode for b::Id {}
            impl wirecode::Decode for self::b::Id {}
            "#,
        )
        .unwrap();

        let existing: Vec<_> = items.iter().map(|item| (item.qualified_name(), item.existing)).collect();
        assert_eq!(
            existing,
            [
                ("crate::a::Id".to_string(), ConformanceSet::DECODE),
                ("crate::b::Id".to_string(), ConformanceSet::BOTH),
                ("crate::Root".to_string(), ConformanceSet::EMPTY),
            ]
        );
    }

    #[test]
    fn traits_from_other_crates_are_not_conformance() {
        let code = r#"
            #[codable]
            struct Frame { len: u32 }

            impl bincode::Decode for Frame {}
            impl ::serde_like::Encode for Frame {}
            impl wire::Encode for Frame {}
        "#;
        assert_eq!(scan(code).unwrap()[0].existing, ConformanceSet::EMPTY);

        let syntax: syn::File = syn::parse_str(code).unwrap();
        let items = Scanner::default()
            .runtime(&syn::parse_quote!(wire))
            .scan_source(&syntax, Path::new("src/lib.rs"), "crate")
            .unwrap();
        assert_eq!(items[0].existing, ConformanceSet::ENCODE);
    }

    #[test]
    fn malformed_arguments_fail_the_scan() {
        let err = scan("#[codable(decode)] struct S { a: u8 }").unwrap_err();
        assert!(err.to_string().contains("invalid `#[codable]`"));

        let err = scan("#[one_of = \"x\"] enum E { A(u8) }").unwrap_err();
        assert!(format!("{err:#}").contains("does not take a value"));
    }

    #[test]
    fn module_path_from_file() {
        let base = Path::new("src");
        assert_eq!(compute_module_path(Path::new("src/lib.rs"), base, "crate"), "crate");
        assert_eq!(
            compute_module_path(Path::new("src/billing/mod.rs"), base, "crate"),
            "crate::billing"
        );
        assert_eq!(
            compute_module_path(Path::new("src/billing/invoice.rs"), base, "app"),
            "app::billing::invoice"
        );
    }

    #[test]
    fn directory_scan_skips_generated_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("generated")).unwrap();
        fs::write(src.join("lib.rs"), "#[codable] pub struct A { x: u8 }").unwrap();
        fs::write(src.join("broken.rs"), "#[codable] pub struct {").unwrap();
        fs::write(src.join("generated/out.rs"), "#[codable] pub struct B { x: u8 }").unwrap();
        fs::write(src.join("other.rs"), "#[decodable] pub struct C { x: u8 }").unwrap();

        let items = Scanner::default().exclude(src.join("other.rs")).scan_path(&src).unwrap();
        let names: Vec<_> = items.iter().map(AnnotatedItem::qualified_name).collect();
        assert_eq!(names, ["crate::A"]);
    }
}
