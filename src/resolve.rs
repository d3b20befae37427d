use crate::ir::{ClassRef, Primitive, Type};

/// Lookup from a simple class name to its package, supplied by the embedder.
///
/// Classpath scanning, import tables, and whatever else backs the answer
/// stay outside the core; from here it is a pure function. `None` means the
/// name cannot be qualified, a non-error outcome.
pub trait PackageLookup {
    fn package_of(&self, simple_name: &str) -> Option<String>;
}

impl<F> PackageLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn package_of(&self, simple_name: &str) -> Option<String> {
        self(simple_name)
    }
}

/// Qualifies source-level type spellings into decodable types.
///
/// Handles the spellings a source extractor emits: primitive names, trailing
/// `[]` pairs, generic-argument suffixes (stripped before lookup), and
/// `Outer.Inner` chains whose outermost name is qualified through the
/// lookup.
pub struct SourceTypeResolver<L> {
    lookup: L,
}

impl<L: PackageLookup> SourceTypeResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Resolve a source spelling such as `int`, `List<String>[]`, or
    /// `Outer.Inner` into a type.
    pub fn resolve(&self, source_type: &str) -> Option<Type> {
        let mut name = source_type.trim();
        let mut dimensions = 0usize;
        while let Some(stripped) = name.strip_suffix("[]") {
            name = stripped.trim_end();
            dimensions += 1;
        }
        // generic arguments never reach the lookup
        let name = name.split('<').next().unwrap_or(name).trim();
        let base = self.resolve_base(name)?;
        Some((0..dimensions).fold(base, |element, _| Type::array(element)))
    }

    /// Descriptor string for a source spelling, ready for the decoder.
    pub fn descriptor_of(&self, source_type: &str) -> Option<String> {
        Some(self.resolve(source_type)?.descriptor())
    }

    /// Qualify a simple class name, possibly an `Outer.Inner` chain, into a
    /// class reference.
    pub fn class_of(&self, name: &str) -> Option<ClassRef> {
        let names: Vec<&str> = name.split('.').collect();
        if names.iter().any(|part| part.is_empty()) {
            return None;
        }
        let package = self.lookup.package_of(names[0])?;
        let package = if package.is_empty() {
            Vec::new()
        } else {
            package.split('.').map(str::to_string).collect()
        };
        Some(ClassRef::new(
            package,
            names.into_iter().map(str::to_string).collect(),
        ))
    }

    fn resolve_base(&self, name: &str) -> Option<Type> {
        if name.is_empty() {
            return None;
        }
        if let Some(primitive) = Primitive::from_name(name) {
            return Some(Type::Primitive(primitive));
        }
        Some(Type::Class(self.class_of(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_lookup(simple_name: &str) -> Option<String> {
        match simple_name {
            "String" => Some("java.lang".to_string()),
            "List" => Some("java.util".to_string()),
            "Outer" => Some("com.example".to_string()),
            _ => None,
        }
    }

    fn resolver() -> SourceTypeResolver<fn(&str) -> Option<String>> {
        SourceTypeResolver::new(fixed_lookup)
    }

    #[test]
    fn primitives_resolve_without_the_lookup() {
        assert_eq!(resolver().descriptor_of("int"), Some("I".to_string()));
        assert_eq!(resolver().descriptor_of("boolean"), Some("Z".to_string()));
        assert_eq!(resolver().descriptor_of("void"), Some("V".to_string()));
    }

    #[test]
    fn array_suffixes_nest() {
        assert_eq!(resolver().descriptor_of("int[][]"), Some("[[I".to_string()));
        assert_eq!(
            resolver().descriptor_of("String[]"),
            Some("[Ljava/lang/String;".to_string())
        );
    }

    #[test]
    fn generic_arguments_are_stripped_before_qualification() {
        assert_eq!(
            resolver().descriptor_of("List<String>"),
            Some("Ljava/util/List;".to_string())
        );
        assert_eq!(
            resolver().descriptor_of("List<List<String>>[]"),
            Some("[Ljava/util/List;".to_string())
        );
    }

    #[test]
    fn inner_chains_qualify_through_the_outermost_name() {
        let class = resolver().class_of("Outer.Inner").expect("qualify");
        assert_eq!(class.package, vec!["com", "example"]);
        assert_eq!(class.names, vec!["Outer", "Inner"]);
        assert_eq!(class.descriptor(), "Lcom/example/Outer$Inner;");
    }

    #[test]
    fn unknown_names_yield_none() {
        assert_eq!(resolver().resolve("Widget"), None);
        assert_eq!(resolver().resolve(""), None);
    }

    #[test]
    fn resolved_descriptors_survive_the_decoder() {
        let descriptor = resolver().descriptor_of("List<String>[]").expect("resolve");
        let decoded: Type = descriptor.parse().expect("decode");
        assert_eq!(decoded.descriptor(), descriptor);
    }
}
