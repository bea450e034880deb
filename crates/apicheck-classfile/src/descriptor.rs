use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    /// The Java source keyword for this primitive.
    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/lang/String`.
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    match parse_field_type(desc)? {
        (ty, "") => Ok(ty),
        _ => Err(Error::InvalidDescriptor(desc.to_string())),
    }
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let invalid = || Error::InvalidDescriptor(desc.to_string());

    let mut rest = desc.strip_prefix('(').ok_or_else(invalid)?;
    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(invalid());
        }
        let (param, after) = parse_field_type(rest).map_err(|_| invalid())?;
        params.push(param);
        rest = after;
    }

    let return_type = match rest {
        "V" => ReturnType::Void,
        _ => match parse_field_type(rest).map_err(|_| invalid())? {
            (ty, "") => ReturnType::Type(ty),
            _ => return Err(invalid()),
        },
    };

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let invalid = || Error::InvalidDescriptor(input.to_string());
    let first = *input.as_bytes().first().ok_or_else(invalid)?;

    if let Some(base) = BaseType::from_tag(first) {
        return Ok((FieldType::Base(base), &input[1..]));
    }
    match first {
        b'L' => {
            let end = input.find(';').ok_or_else(invalid)?;
            if end == 1 {
                return Err(invalid());
            }
            Ok((FieldType::Object(input[1..end].to_string()), &input[end + 1..]))
        }
        b'[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_descriptor_primitives_and_arrays() {
        assert_eq!(parse_field_descriptor("Z").unwrap(), FieldType::Base(BaseType::Boolean));
        assert_eq!(
            parse_field_descriptor("[[Ljava/lang/Integer;").unwrap(),
            FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Object(
                "java/lang/Integer".to_string()
            )))))
        );
        assert!(parse_field_descriptor("I;").is_err());
        assert!(parse_field_descriptor("L;").is_err());
    }

    #[test]
    fn parse_method_descriptor_void_and_params() {
        let desc = parse_method_descriptor("(JLjava/lang/Object;[D)V").unwrap();
        assert_eq!(
            desc.params,
            vec![
                FieldType::Base(BaseType::Long),
                FieldType::Object("java/lang/Object".to_string()),
                FieldType::Array(Box::new(FieldType::Base(BaseType::Double))),
            ]
        );
        assert_eq!(desc.return_type, ReturnType::Void);
    }

    #[test]
    fn parse_method_descriptor_rejects_garbage() {
        assert!(parse_method_descriptor("I)V").is_err());
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_method_descriptor("(I)").is_err());
        assert!(parse_method_descriptor("()VV").is_err());
    }
}
