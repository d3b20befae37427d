use std::collections::BTreeMap;
use std::str::FromStr;

use crate::descriptor::{DecodeError, decode_type, split_method_descriptor};
use crate::ir::{ClassRef, MethodSignature, Type};

/// Decode a generic method signature such as `<T:Ljava/lang/Object;>(TT;)TT;`.
///
/// The optional leading block declares formal type parameters and their
/// bounds; the remainder follows the method descriptor grammar extended with
/// `T`-name-`;` type-variable references.
pub fn decode_method_signature(text: &str) -> Result<MethodSignature, DecodeError> {
    let (generics, rest) = decode_formal_generics(text)?;
    let (parameter_slices, return_slice) = split_method_descriptor(rest)?;
    let parameters = parameter_slices
        .into_iter()
        .map(decode_signature_type)
        .collect::<Result<Vec<_>, _>>()?;
    if return_slice.is_empty() {
        return Err(DecodeError::UnexpectedEndOfInput {
            expected: "a return type",
        });
    }
    let return_type = decode_signature_type(return_slice)?;
    Ok(MethodSignature {
        generics,
        parameters,
        return_type,
    })
}

/// Decode a type within a generic signature: the descriptor grammar plus
/// type-variable references, which decode to a class reference holding the
/// raw variable name and an empty package path.
pub fn decode_signature_type(text: &str) -> Result<Type, DecodeError> {
    match text.chars().next() {
        Some('T') => decode_type_variable(text).map(Type::Class),
        Some('[') => Ok(Type::array(decode_signature_type(&text[1..])?)),
        _ => decode_type(text),
    }
}

fn decode_type_variable(text: &str) -> Result<ClassRef, DecodeError> {
    let name = text
        .strip_prefix('T')
        .and_then(|rest| rest.strip_suffix(';'))
        .ok_or_else(|| DecodeError::InvalidClassName {
            input: text.to_string(),
        })?;
    if name.is_empty() || name.contains(['<', '>', ';', '/', '.', '[']) {
        return Err(DecodeError::InvalidClassName {
            input: text.to_string(),
        });
    }
    Ok(ClassRef::type_variable(name))
}

/// Parse the optional leading `<Name:Bound;...>` block. Returns the generics
/// mapping and the remainder of the input.
fn decode_formal_generics(text: &str) -> Result<(BTreeMap<String, Type>, &str), DecodeError> {
    let Some(body) = text.strip_prefix('<') else {
        return Ok((BTreeMap::new(), text));
    };
    let mut generics = BTreeMap::new();
    let mut depth = 1usize;
    let mut declaration_start = 0usize;
    for (index, ch) in body.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    let dangling = &body[declaration_start..index];
                    if !dangling.is_empty() {
                        return Err(DecodeError::InvalidGenericDeclaration {
                            declaration: dangling.to_string(),
                        });
                    }
                    return Ok((generics, &body[index + 1..]));
                }
            }
            ';' if depth == 1 => {
                let declaration = &body[declaration_start..=index];
                let (name, bound) = split_formal_declaration(declaration)?;
                // duplicate formal names: the last occurrence wins
                generics.insert(name.to_string(), bound);
                declaration_start = index + 1;
            }
            _ => {}
        }
    }
    Err(DecodeError::UnexpectedEndOfInput {
        expected: "'>' closing the formal generics block",
    })
}

/// Split one `Name:Bound;` declaration. Interface-only bounds use a double
/// separator (`Name::Bound;`); anything else with a stray separator, an
/// empty side, or a primitive bound is malformed.
fn split_formal_declaration(declaration: &str) -> Result<(&str, Type), DecodeError> {
    let invalid = || DecodeError::InvalidGenericDeclaration {
        declaration: declaration.to_string(),
    };
    let (name, bound) = declaration.split_once(':').ok_or_else(invalid)?;
    let bound = bound.strip_prefix(':').unwrap_or(bound);
    if name.is_empty() || bound.is_empty() || bound.contains(':') {
        return Err(invalid());
    }
    let decoded = decode_signature_type(bound).map_err(|error| match error {
        // junk inside one declaration chunk is a malformed declaration
        DecodeError::TrailingInput { .. } => invalid(),
        other => other,
    })?;
    match decoded {
        Type::Primitive(_) => Err(invalid()),
        bound => Ok((name, bound)),
    }
}

impl FromStr for MethodSignature {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_method_signature(s)
    }
}
