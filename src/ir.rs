use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::DecodeError;

/// Primitive JVM types, including `void` for return positions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Void,
}

impl Primitive {
    /// Descriptor tag character for this primitive.
    pub fn tag(self) -> char {
        match self {
            Primitive::Byte => 'B',
            Primitive::Char => 'C',
            Primitive::Double => 'D',
            Primitive::Float => 'F',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Short => 'S',
            Primitive::Boolean => 'Z',
            Primitive::Void => 'V',
        }
    }

    /// Map a descriptor tag character to its primitive, if it is one.
    pub fn from_tag(tag: char) -> Option<Self> {
        let primitive = match tag {
            'B' => Primitive::Byte,
            'C' => Primitive::Char,
            'D' => Primitive::Double,
            'F' => Primitive::Float,
            'I' => Primitive::Int,
            'J' => Primitive::Long,
            'S' => Primitive::Short,
            'Z' => Primitive::Boolean,
            'V' => Primitive::Void,
            _ => return None,
        };
        Some(primitive)
    }

    /// Java source spelling of this primitive.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Short => "short",
            Primitive::Boolean => "boolean",
            Primitive::Void => "void",
        }
    }

    /// Map a Java source spelling to its primitive, if it is one.
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "double" => Primitive::Double,
            "float" => Primitive::Float,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "short" => Primitive::Short,
            "boolean" => Primitive::Boolean,
            "void" => Primitive::Void,
            _ => return None,
        };
        Some(primitive)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a class: an ordered package path plus the enclosing chain of
/// simple names, outermost first. Nested classes carry a chain longer than
/// one. Type variables are represented with an empty package path and the
/// variable name as the only chain entry.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ClassRef {
    pub package: Vec<String>,
    pub names: Vec<String>,
}

impl ClassRef {
    pub fn new(package: Vec<String>, names: Vec<String>) -> Self {
        Self { package, names }
    }

    /// Class reference standing in for an unresolved type variable.
    pub fn type_variable(name: impl Into<String>) -> Self {
        Self {
            package: Vec::new(),
            names: vec![name.into()],
        }
    }

    /// Innermost simple name.
    pub fn simple_name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or("")
    }

    /// Slash-and-dollar form used inside descriptors, e.g.
    /// `com/example/Outer$Inner`.
    pub fn binary_name(&self) -> String {
        let chain = self.names.join("$");
        if self.package.is_empty() {
            chain
        } else {
            format!("{}/{}", self.package.join("/"), chain)
        }
    }

    /// Dotted form, e.g. `com.example.Outer.Inner`.
    pub fn qualified_name(&self) -> String {
        let chain = self.names.join(".");
        if self.package.is_empty() {
            chain
        } else {
            format!("{}.{}", self.package.join("."), chain)
        }
    }

    /// Canonical descriptor encoding, e.g. `Lcom/example/Outer$Inner;`.
    pub fn descriptor(&self) -> String {
        format!("L{};", self.binary_name())
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Decoded JVM type: primitive, class reference, or array. Arrays of arrays
/// nest recursively; no dimension count is stored.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Type {
    Primitive(Primitive),
    Class(ClassRef),
    Array(Box<Type>),
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Canonical descriptor encoding of this type.
    pub fn descriptor(&self) -> String {
        match self {
            Type::Primitive(primitive) => primitive.tag().to_string(),
            Type::Class(class) => class.descriptor(),
            Type::Array(element) => format!("[{}", element.descriptor()),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(primitive) => write!(f, "{primitive}"),
            Type::Class(class) => write!(f, "{class}"),
            Type::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// Decoded method descriptor: ordered parameter types and the return type.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub parameters: Vec<Type>,
    pub return_type: Type,
}

impl MethodDescriptor {
    /// Canonical descriptor encoding, e.g. `(Ljava/lang/String;I)V`.
    pub fn descriptor(&self) -> String {
        let parameters: String = self.parameters.iter().map(Type::descriptor).collect();
        format!("({}){}", parameters, self.return_type.descriptor())
    }
}

/// Decoded generic method signature: the formal type-parameter bounds plus
/// the descriptor shape. Type variables are recorded by raw name and never
/// resolved against the bounds here; resolution is the caller's business.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub generics: BTreeMap<String, Type>,
    pub parameters: Vec<Type>,
    pub return_type: Type,
}

/// Structural key addressing a method: owning class, method name, and the
/// raw descriptor string.
///
/// The descriptor is kept raw rather than decoded so that identity
/// comparison stays exact even across decoding ambiguity, and so the key is
/// hashable and orderable without decoding.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct MethodIdentity {
    pub owner: ClassRef,
    pub name: String,
    pub descriptor: String,
}

impl MethodIdentity {
    pub fn new(owner: ClassRef, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Decode the raw descriptor on demand.
    pub fn decoded(&self) -> Result<MethodDescriptor, DecodeError> {
        self.descriptor.parse()
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}{}", self.owner, self.name, self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_class() -> ClassRef {
        ClassRef::new(
            vec!["java".to_string(), "lang".to_string()],
            vec!["String".to_string()],
        )
    }

    #[test]
    fn class_ref_renders_binary_and_qualified_names() {
        let inner = ClassRef::new(
            vec!["com".to_string(), "example".to_string()],
            vec!["Outer".to_string(), "Inner".to_string()],
        );

        assert_eq!(inner.binary_name(), "com/example/Outer$Inner");
        assert_eq!(inner.qualified_name(), "com.example.Outer.Inner");
        assert_eq!(inner.descriptor(), "Lcom/example/Outer$Inner;");
        assert_eq!(inner.simple_name(), "Inner");
    }

    #[test]
    fn type_descriptor_round_trips_through_the_decoder() {
        let types = [
            Type::Primitive(Primitive::Long),
            Type::Class(string_class()),
            Type::array(Type::array(Type::Primitive(Primitive::Int))),
            Type::array(Type::Class(string_class())),
        ];

        for ty in types {
            let decoded: Type = ty.descriptor().parse().expect("decode canonical form");
            assert_eq!(decoded, ty);
        }
    }

    #[test]
    fn method_descriptor_round_trips_through_the_decoder() {
        let descriptor = MethodDescriptor {
            parameters: vec![Type::Class(string_class()), Type::Primitive(Primitive::Int)],
            return_type: Type::Primitive(Primitive::Void),
        };

        assert_eq!(descriptor.descriptor(), "(Ljava/lang/String;I)V");
        let decoded: MethodDescriptor = descriptor
            .descriptor()
            .parse()
            .expect("decode canonical form");
        assert_eq!(decoded, descriptor);
    }

    #[test]
    fn identity_equality_uses_the_raw_descriptor() {
        let owner = string_class();
        let a = MethodIdentity::new(owner.clone(), "valueOf", "(I)Ljava/lang/String;");
        let b = MethodIdentity::new(owner.clone(), "valueOf", "(I)Ljava/lang/String;");
        let c = MethodIdentity::new(owner, "valueOf", "(J)Ljava/lang/String;");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            a.to_string(),
            "java.lang.String#valueOf(I)Ljava/lang/String;"
        );
    }

    #[test]
    fn type_display_is_human_readable() {
        let ty = Type::array(Type::Class(string_class()));
        assert_eq!(ty.to_string(), "java.lang.String[]");
        assert_eq!(Type::Primitive(Primitive::Boolean).to_string(), "boolean");
    }
}
