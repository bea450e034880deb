use crate::error::{Error, Result};
use crate::reader::Reader;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// Only the entries needed to name things are kept; everything else is recorded as
/// `Other` so that indices stay aligned.
#[derive(Debug, Clone)]
enum Entry {
    /// Slot 0, and the second slot of `Long`/`Double` constants.
    Unusable,
    Utf8(String),
    Class { name_index: u16 },
    Other(&'static str),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Unusable => "unusable",
            Entry::Utf8(_) => "Utf8",
            Entry::Class { .. } => "Class",
            Entry::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    entries: Vec<Entry>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(Entry::Unusable);

        while entries.len() < count {
            let tag = reader.read_u1()?;
            match tag {
                TAG_UTF8 => {
                    let len = reader.read_u2()? as usize;
                    let bytes = reader.read_bytes(len)?;
                    entries.push(Entry::Utf8(decode_modified_utf8(bytes)?));
                }
                TAG_INTEGER | TAG_FLOAT => {
                    reader.skip(4)?;
                    entries.push(Entry::Other("numeric"));
                }
                TAG_LONG | TAG_DOUBLE => {
                    reader.skip(8)?;
                    entries.push(Entry::Other("wide numeric"));
                    entries.push(Entry::Unusable);
                }
                TAG_CLASS => {
                    let name_index = reader.read_u2()?;
                    entries.push(Entry::Class { name_index });
                }
                TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                    reader.skip(2)?;
                    entries.push(Entry::Other("reference"));
                }
                TAG_FIELDREF | TAG_METHODREF | TAG_INTERFACE_METHODREF | TAG_NAME_AND_TYPE
                | TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => {
                    reader.skip(4)?;
                    entries.push(Entry::Other("member reference"));
                }
                TAG_METHOD_HANDLE => {
                    reader.skip(3)?;
                    entries.push(Entry::Other("method handle"));
                }
                other => return Err(Error::InvalidConstantPoolTag(other)),
            }
        }

        Ok(Self { entries })
    }

    fn entry(&self, index: u16) -> Result<&Entry> {
        match self.entries.get(index as usize) {
            Some(Entry::Unusable) | None => Err(Error::InvalidConstantPoolIndex(index)),
            Some(entry) => Ok(entry),
        }
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Entry::Utf8(value) => Ok(value),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }

    /// Returns the internal name (`java/lang/String`) referenced by a `Class` entry.
    pub(crate) fn get_class_name(&self, index: u16) -> Result<String> {
        match self.entry(index)? {
            Entry::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Class",
                found: other.kind(),
            }),
        }
    }
}

/// Decodes the JVM's "modified UTF-8": NUL is encoded as `C0 80` and supplementary
/// characters as surrogate pairs of three-byte sequences.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        if !s.contains('\u{0}') {
            return Ok(s.to_string());
        }
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i] as u16;
        if b0 & 0x80 == 0 {
            if b0 == 0 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push(b0);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = continuation(bytes, i + 1)?;
            units.push(((b0 & 0x1F) << 6) | b1);
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = continuation(bytes, i + 1)?;
            let b2 = continuation(bytes, i + 2)?;
            units.push(((b0 & 0x0F) << 12) | (b1 << 6) | b2);
            i += 3;
        } else {
            return Err(Error::InvalidModifiedUtf8);
        }
    }

    String::from_utf16(&units).map_err(|_| Error::InvalidModifiedUtf8)
}

fn continuation(bytes: &[u8], index: usize) -> Result<u16> {
    match bytes.get(index) {
        Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        _ => Err(Error::InvalidModifiedUtf8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modified_utf8_decodes_encoded_nul_and_surrogates() {
        assert_eq!(decode_modified_utf8(b"Foo").unwrap(), "Foo");
        assert_eq!(decode_modified_utf8(&[b'a', 0xC0, 0x80, b'b']).unwrap(), "a\u{0}b");
        // U+1F600 as a CESU-8 surrogate pair.
        let smiley = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode_modified_utf8(&smiley).unwrap(), "\u{1F600}");
        assert!(decode_modified_utf8(&[0xC0]).is_err());
    }

    #[test]
    fn wide_constants_take_two_slots() {
        // count = 4: [1] Long (slots 1 and 2), [3] Utf8 "x"
        let bytes = [
            0x00, 0x04, TAG_LONG, 0, 0, 0, 0, 0, 0, 0, 1, TAG_UTF8, 0x00, 0x01, b'x',
        ];
        let mut reader = Reader::new(&bytes);
        let cp = ConstantPool::parse(&mut reader).unwrap();
        assert_eq!(cp.get_utf8(3).unwrap(), "x");
        assert!(matches!(
            cp.get_utf8(2),
            Err(Error::InvalidConstantPoolIndex(2))
        ));
        assert!(matches!(
            cp.get_class_name(3),
            Err(Error::ConstantPoolTypeMismatch { index: 3, .. })
        ));
    }
}
