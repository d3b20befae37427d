use std::str::FromStr;

use thiserror::Error;

use crate::ir::{ClassRef, MethodDescriptor, Primitive, Type};

/// Errors produced while decoding descriptor or signature strings.
///
/// Each variant carries enough of the offending input to render a
/// diagnostic. Decoding never produces partial results: a malformed input
/// fails as a whole.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input while decoding {expected}")]
    UnexpectedEndOfInput { expected: &'static str },
    #[error("unrecognized type tag '{tag}' at offset {offset}")]
    UnrecognizedTag { tag: char, offset: usize },
    #[error("expected '(' at the start of a method descriptor, found '{found}'")]
    MissingOpenParen { found: char },
    #[error("unbalanced generic brackets in {input:?}")]
    UnbalancedGenerics { input: String },
    #[error("invalid class name {input:?}")]
    InvalidClassName { input: String },
    #[error("invalid formal generic declaration {declaration:?}")]
    InvalidGenericDeclaration { declaration: String },
    #[error("trailing input {rest:?} after a complete {decoded}")]
    TrailingInput { rest: String, decoded: &'static str },
}

/// Decode a standalone field type descriptor such as `I`, `[[J`, or
/// `Ljava/lang/String;`. The whole input must be consumed.
pub fn decode_type(text: &str) -> Result<Type, DecodeError> {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return Err(DecodeError::UnexpectedEndOfInput {
            expected: "a type descriptor",
        });
    };
    if let Some(primitive) = Primitive::from_tag(first) {
        let rest = chars.as_str();
        if !rest.is_empty() {
            return Err(DecodeError::TrailingInput {
                rest: rest.to_string(),
                decoded: "primitive type",
            });
        }
        return Ok(Type::Primitive(primitive));
    }
    match first {
        'L' => Ok(Type::Class(decode_class(text)?)),
        '[' => Ok(Type::array(decode_type(chars.as_str())?)),
        _ => Err(DecodeError::UnrecognizedTag {
            tag: first,
            offset: 0,
        }),
    }
}

/// Decode a class reference of the form `Lpkg/path/Outer$Inner;`.
///
/// Generic-argument regions are balanced and discarded: a `;` only
/// terminates the reference at bracket depth zero, so nested references
/// inside `<...>` never cut the scan short.
pub fn decode_class(text: &str) -> Result<ClassRef, DecodeError> {
    let Some(body) = text.strip_prefix('L') else {
        return Err(DecodeError::InvalidClassName {
            input: text.to_string(),
        });
    };
    let mut name = String::new();
    let mut depth = 0usize;
    let mut terminated = false;
    for (offset, ch) in body.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                if depth == 0 {
                    return Err(DecodeError::UnbalancedGenerics {
                        input: text.to_string(),
                    });
                }
                depth -= 1;
            }
            ';' if depth == 0 => {
                let rest = &body[offset + 1..];
                if !rest.is_empty() {
                    return Err(DecodeError::TrailingInput {
                        rest: rest.to_string(),
                        decoded: "class reference",
                    });
                }
                terminated = true;
                break;
            }
            _ if depth == 0 => name.push(ch),
            _ => {}
        }
    }
    if !terminated {
        if depth > 0 {
            return Err(DecodeError::UnbalancedGenerics {
                input: text.to_string(),
            });
        }
        return Err(DecodeError::UnexpectedEndOfInput {
            expected: "';' terminating a class reference",
        });
    }
    split_class_name(&name, text)
}

fn split_class_name(name: &str, input: &str) -> Result<ClassRef, DecodeError> {
    let invalid = || DecodeError::InvalidClassName {
        input: input.to_string(),
    };
    let mut segments: Vec<&str> = name.split(['/', '.']).collect();
    let last = segments
        .pop()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(invalid)?;
    if segments.is_empty() || segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid());
    }
    let mut names: Vec<String> = last.split('$').map(str::to_string).collect();
    // compiler-generated names may end in '$'; drop the empty tail
    while names.last().is_some_and(String::is_empty) {
        names.pop();
    }
    if names.is_empty() || names.iter().any(String::is_empty) {
        return Err(invalid());
    }
    let package = segments.into_iter().map(str::to_string).collect();
    Ok(ClassRef::new(package, names))
}

/// Decode a raw method descriptor such as `(Ljava/util/List;I)V`.
pub fn decode_method_descriptor(text: &str) -> Result<MethodDescriptor, DecodeError> {
    let (parameter_slices, return_slice) = split_method_descriptor(text)?;
    let parameters = parameter_slices
        .into_iter()
        .map(decode_type)
        .collect::<Result<Vec<_>, _>>()?;
    if return_slice.is_empty() {
        return Err(DecodeError::UnexpectedEndOfInput {
            expected: "a return type",
        });
    }
    let return_type = decode_type(return_slice)?;
    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

/// Split a raw method descriptor into parameter slices and the return slice
/// without decoding them. Shared by descriptor and signature decoding.
pub(crate) fn split_method_descriptor(text: &str) -> Result<(Vec<&str>, &str), DecodeError> {
    let mut chars = text.chars();
    match chars.next() {
        None => {
            return Err(DecodeError::UnexpectedEndOfInput {
                expected: "'(' opening a parameter list",
            });
        }
        Some('(') => {}
        Some(found) => return Err(DecodeError::MissingOpenParen { found }),
    }
    let mut rest = chars.as_str();
    let mut offset = 1usize;
    let mut parameters = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            return Ok((parameters, after));
        }
        if rest.is_empty() {
            return Err(DecodeError::UnexpectedEndOfInput {
                expected: "')' closing a parameter list",
            });
        }
        let end = parameter_extent(rest, offset)?;
        parameters.push(&rest[..end]);
        rest = &rest[end..];
        offset += end;
    }
}

/// Byte length of the single parameter type at the head of `text`.
///
/// Leading `[` markers belong to the parameter. A primitive tag ends it in
/// one character; `L` and `T` references run to the `;` at bracket depth
/// zero. `offset` positions `text` within the whole input for diagnostics.
fn parameter_extent(text: &str, offset: usize) -> Result<usize, DecodeError> {
    let mut iter = text.char_indices();
    let mut head = None;
    for (index, ch) in iter.by_ref() {
        if ch != '[' {
            head = Some((index, ch));
            break;
        }
    }
    let Some((index, ch)) = head else {
        return Err(DecodeError::UnexpectedEndOfInput {
            expected: "a type after array markers",
        });
    };
    if ch == 'V' {
        // void is only legal as a return type
        return Err(DecodeError::UnrecognizedTag {
            tag: ch,
            offset: offset + index,
        });
    }
    if Primitive::from_tag(ch).is_some() {
        return Ok(index + 1);
    }
    if ch != 'L' && ch != 'T' {
        return Err(DecodeError::UnrecognizedTag {
            tag: ch,
            offset: offset + index,
        });
    }
    let mut depth = 0usize;
    for (position, ch) in iter {
        match ch {
            '<' => depth += 1,
            '>' => {
                if depth == 0 {
                    return Err(DecodeError::UnbalancedGenerics {
                        input: text.to_string(),
                    });
                }
                depth -= 1;
            }
            ';' if depth == 0 => return Ok(position + 1),
            _ => {}
        }
    }
    if depth > 0 {
        return Err(DecodeError::UnbalancedGenerics {
            input: text.to_string(),
        });
    }
    Err(DecodeError::UnexpectedEndOfInput {
        expected: "';' terminating a reference parameter",
    })
}

/// Count parameters in a JVM method descriptor.
pub fn method_param_count(descriptor: &str) -> Result<usize, DecodeError> {
    let descriptor = MethodDescriptor::from_str(descriptor)?;
    Ok(descriptor.parameters.len())
}

/// Return kind of a JVM method descriptor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReturnKind {
    Void,
    Primitive,
    Reference,
}

/// Determine the return kind from a JVM method descriptor.
pub fn method_return_kind(descriptor: &str) -> Result<ReturnKind, DecodeError> {
    let descriptor = MethodDescriptor::from_str(descriptor)?;
    let kind = match descriptor.return_type {
        Type::Primitive(Primitive::Void) => ReturnKind::Void,
        Type::Class(_) | Type::Array(_) => ReturnKind::Reference,
        Type::Primitive(_) => ReturnKind::Primitive,
    };
    Ok(kind)
}

impl FromStr for Type {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_type(s)
    }
}

impl FromStr for MethodDescriptor {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_method_descriptor(s)
    }
}
